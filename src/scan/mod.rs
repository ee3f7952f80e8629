// src/scan/mod.rs

//! Lexical scanner for dirty regions.
//!
//! This is a bounded heuristic, not a tokenizer: it only knows enough about
//! string literals and comments to keep keyword searches from matching text
//! that merely looks like code. The rest of the crate talks to it through
//! [`DirtyRegions`] and the `find_*` helpers below, so a real tokenizer can
//! replace it later without touching the transformer.

pub mod regions;

pub use regions::{regions, DirtyRegion, DirtyRegions, RegionKind};

/// Find the first occurrence of `needle` at or after `from` that does not
/// start inside a dirty region.
pub fn find_clean(text: &str, dirty: &DirtyRegions, needle: &str, from: usize) -> Option<usize> {
    let mut at = from;
    while at <= text.len() {
        let pos = at + text.get(at..)?.find(needle)?;
        if !dirty.is_dirty(pos) {
            return Some(pos);
        }
        at = pos + needle.len().max(1);
    }
    None
}

/// Like [`find_clean`] for a single character.
pub fn find_clean_char(text: &str, dirty: &DirtyRegions, ch: char, from: usize) -> Option<usize> {
    text.get(from..)?
        .char_indices()
        .map(|(i, c)| (from + i, c))
        .find(|&(i, c)| c == ch && !dirty.is_dirty(i))
        .map(|(i, _)| i)
}

/// Find `keyword` as a whole word outside dirty regions.
///
/// A match must not be glued to identifier characters on either side, and
/// must not follow a `.` (so `Foo.class` is a member access, not a
/// declaration).
pub fn find_keyword(text: &str, dirty: &DirtyRegions, keyword: &str, from: usize) -> Option<usize> {
    let mut at = from;
    loop {
        let pos = find_clean(text, dirty, keyword, at)?;
        if is_word_at(text, pos, keyword.len()) {
            return Some(pos);
        }
        at = pos + keyword.len();
    }
}

/// True if `keyword` occurs as a whole word anywhere outside comments and
/// string literals of `text`.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    let dirty = DirtyRegions::scan(text);
    find_keyword(text, &dirty, keyword, 0).is_some()
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_word_at(text: &str, pos: usize, len: usize) -> bool {
    let before = text[..pos].chars().next_back();
    let after = text[pos + len..].chars().next();
    let clean_before = before.is_none_or(|c| !is_ident_char(c) && c != '.');
    let clean_after = after.is_none_or(|c| !is_ident_char(c));
    clean_before && clean_after
}
