// src/scan/regions.rs

use std::fmt;

/// What kind of construct made a region dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    StringLiteral,
    LineComment,
    BlockComment,
}

/// Half-open byte range `[start, end)` of text that is inside a string
/// literal or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRegion {
    pub start: usize,
    pub end: usize,
    pub kind: RegionKind,
}

impl DirtyRegion {
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

impl fmt::Display for DirtyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}..{})", self.kind, self.start, self.end)
    }
}

/// Sorted, non-overlapping set of dirty regions over one source text.
///
/// Built from scratch by [`DirtyRegions::scan`] and never edited afterwards;
/// after the text changes, scan again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRegions {
    regions: Vec<DirtyRegion>,
}

impl DirtyRegions {
    /// Classify `text`.
    ///
    /// Three independent passes over the unmodified text:
    /// 1. every unescaped `"` is a boundary; boundaries pair up in scan order
    ///    into string literals,
    /// 2. `//` outside earlier regions runs to the next newline,
    /// 3. `/*` outside earlier regions runs through the next `*/` that is not
    ///    the opener's own `*` (so `/*/` does not close itself).
    ///
    /// An unterminated literal or comment extends to the end of the text.
    pub fn scan(text: &str) -> Self {
        let mut found = string_literals(text);
        line_comments(text, &mut found);
        block_comments(text, &mut found);
        Self {
            regions: merge(found),
        }
    }

    pub fn is_dirty(&self, pos: usize) -> bool {
        self.region_at(pos).is_some()
    }

    /// The region containing `pos`, if any.
    pub fn region_at(&self, pos: usize) -> Option<&DirtyRegion> {
        // Regions are sorted and disjoint: only the last region starting at or
        // before `pos` can contain it.
        let idx = self.regions.partition_point(|r| r.start <= pos);
        if idx == 0 {
            return None;
        }
        let region = &self.regions[idx - 1];
        region.contains(pos).then_some(region)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirtyRegion> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn into_vec(self) -> Vec<DirtyRegion> {
        self.regions
    }
}

impl<'a> IntoIterator for &'a DirtyRegions {
    type Item = &'a DirtyRegion;
    type IntoIter = std::slice::Iter<'a, DirtyRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

/// Convenience wrapper returning the plain region list.
pub fn regions(text: &str) -> Vec<DirtyRegion> {
    DirtyRegions::scan(text).into_vec()
}

fn string_literals(text: &str) -> Vec<DirtyRegion> {
    let bytes = text.as_bytes();
    let boundaries: Vec<usize> = text
        .match_indices('"')
        .map(|(i, _)| i)
        .filter(|&i| !is_escaped(bytes, i))
        .collect();

    boundaries
        .chunks(2)
        .map(|pair| DirtyRegion {
            start: pair[0],
            end: pair.get(1).map_or(text.len(), |close| close + 1),
            kind: RegionKind::StringLiteral,
        })
        .collect()
}

/// A byte is escaped when an odd number of backslashes directly precede it.
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    let slashes = bytes[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    slashes % 2 == 1
}

fn inside(found: &[DirtyRegion], pos: usize) -> bool {
    found.iter().any(|r| r.contains(pos))
}

fn line_comments(text: &str, found: &mut Vec<DirtyRegion>) {
    let mut from = 0;
    while let Some(rel) = text[from..].find("//") {
        let start = from + rel;
        if inside(found, start) {
            from = start + 1;
            continue;
        }
        let end = text[start + 2..]
            .find('\n')
            .map_or(text.len(), |nl| start + 2 + nl);
        found.push(DirtyRegion {
            start,
            end,
            kind: RegionKind::LineComment,
        });
        from = end;
    }
}

fn block_comments(text: &str, found: &mut Vec<DirtyRegion>) {
    let mut from = 0;
    while let Some(rel) = text[from..].find("/*") {
        let start = from + rel;
        if inside(found, start) {
            from = start + 1;
            continue;
        }
        let end = text[start + 2..]
            .find("*/")
            .map_or(text.len(), |close| start + 2 + close + 2);
        found.push(DirtyRegion {
            start,
            end,
            kind: RegionKind::BlockComment,
        });
        from = end;
    }
}

/// Sort by start and fold any region that begins inside its predecessor into
/// it. Quotes inside comments are the usual source of overlap.
fn merge(mut found: Vec<DirtyRegion>) -> Vec<DirtyRegion> {
    found.sort_by_key(|r| r.start);

    let mut merged: Vec<DirtyRegion> = Vec::with_capacity(found.len());
    for region in found {
        match merged.last_mut() {
            Some(prev) if region.start < prev.end => {
                prev.end = prev.end.max(region.end);
            }
            _ => merged.push(region),
        }
    }
    merged
}
