// src/transform/imports.rs

use std::collections::HashSet;

use crate::scan::{find_clean_char, find_keyword, DirtyRegions};

pub const IMPORT_KEYWORD: &str = "import";

/// Pull every `import ...;` statement that sits outside comments and string
/// literals out of `source`.
///
/// Returns the remaining text and the statements in order of first
/// appearance; a statement repeated verbatim is kept once. An `import` with
/// no terminating semicolon is left in place for the compiler to reject.
pub fn extract_imports(source: &str) -> (String, Vec<String>) {
    let mut code = source.to_string();
    let mut imports = Vec::new();
    let mut seen = HashSet::new();
    let mut from = 0;

    loop {
        let dirty = DirtyRegions::scan(&code);
        let Some(start) = find_keyword(&code, &dirty, IMPORT_KEYWORD, from) else {
            break;
        };
        let Some(semi) = find_clean_char(&code, &dirty, ';', start) else {
            break;
        };

        let end = semi + 1;
        let statement = code[start..end].to_string();
        code.replace_range(start..end, "");

        if seen.insert(statement.clone()) {
            imports.push(statement);
        }
        from = start;
    }

    (code, imports)
}
