// src/transform/methods.rs

//! Heuristic extraction of free-standing method declarations.
//!
//! Every `(` outside comments and literals is a candidate. Walking backward
//! from it to the previous statement boundary yields the would-be signature
//! head; walking forward finds the body. The rules are deliberately simple
//! and some valid declarations (generic methods, for one) are missed; those
//! stay in `main` and surface as compile errors.

use crate::scan::{contains_keyword, find_clean_char, is_ident_char, DirtyRegions};

use super::unit::ExtractedMethod;

/// Words that mark a parenthesis as a control-flow header or object
/// construction rather than a method declaration.
const NON_DECLARATION_KEYWORDS: &[&str] = &[
    "for", "while", "do", "if", "else", "switch", "try", "catch", "finally", "new",
];

#[derive(Debug, PartialEq, Eq)]
enum Candidate {
    /// A method declaration spanning `[start, end)`.
    Declaration { start: usize, end: usize },
    /// A control-flow or `new` header; parens inside it are not candidates.
    Excluded,
    /// A call, cast or other expression.
    NotDeclaration,
}

/// Remove method declarations from `source`.
///
/// Returns the remaining text and the methods in extraction order.
pub fn extract_methods(source: &str) -> (String, Vec<ExtractedMethod>) {
    let mut code = source.to_string();
    let mut methods = Vec::new();
    let mut from = 0;

    loop {
        let dirty = DirtyRegions::scan(&code);
        let Some(paren) = find_clean_char(&code, &dirty, '(', from) else {
            break;
        };

        match classify(&code, &dirty, paren) {
            Candidate::Declaration { start, end } => {
                let text = code[start..end].trim().to_string();
                code.replace_range(start..end, "");
                methods.push(ExtractedMethod::new(text));
                from = start;
            }
            Candidate::Excluded => {
                from = matching(&code, &dirty, paren, '(', ')').map_or(paren + 1, |close| close + 1);
            }
            Candidate::NotDeclaration => from = paren + 1,
        }
    }

    (code, methods)
}

fn classify(code: &str, dirty: &DirtyRegions, paren: usize) -> Candidate {
    // Free methods are top-level; anything nested belongs to a body.
    if brace_depth(code, dirty, paren) > 0 {
        return Candidate::NotDeclaration;
    }
    let Some(start) = statement_start(code, dirty, paren) else {
        return Candidate::NotDeclaration;
    };

    let head = &code[start..paren];
    if NON_DECLARATION_KEYWORDS
        .iter()
        .any(|kw| contains_keyword(head, kw))
    {
        return Candidate::Excluded;
    }
    if !looks_like_signature(head) {
        return Candidate::NotDeclaration;
    }

    let Some(open) = find_clean_char(code, dirty, '{', paren + 1) else {
        return Candidate::NotDeclaration;
    };
    // A semicolon before the body means this was a call expression.
    if find_clean_char(code, dirty, ';', paren + 1).is_some_and(|semi| semi < open) {
        return Candidate::NotDeclaration;
    }

    match matching(code, dirty, open, '{', '}') {
        Some(close) => Candidate::Declaration {
            start,
            end: close + 1,
        },
        None => Candidate::NotDeclaration,
    }
}

/// Number of `{` still open at `pos`.
fn brace_depth(code: &str, dirty: &DirtyRegions, pos: usize) -> usize {
    code[..pos]
        .char_indices()
        .filter(|&(i, _)| !dirty.is_dirty(i))
        .fold(0usize, |depth, (_, c)| match c {
            '{' => depth + 1,
            '}' => depth.saturating_sub(1),
            _ => depth,
        })
}

/// Walk backward from `paren` to the previous `;`, `{`, `}` or the start of
/// the text. A `.` on the way means a qualified call, not a declaration.
fn statement_start(code: &str, dirty: &DirtyRegions, paren: usize) -> Option<usize> {
    for (i, c) in code[..paren].char_indices().rev() {
        if dirty.is_dirty(i) {
            continue;
        }
        match c {
            '.' => return None,
            ';' | '{' | '}' => return Some(i + c.len_utf8()),
            _ => {}
        }
    }
    Some(0)
}

/// A signature head ends in the method name and has at least one word
/// (return type, modifier) before it. Assignments are never declarations.
fn looks_like_signature(head: &str) -> bool {
    let head = strip_comments(head);
    if head.contains('=') {
        return false;
    }
    let trimmed = head.trim_end();
    let name_len = trimmed
        .chars()
        .rev()
        .take_while(|&c| is_ident_char(c))
        .map(char::len_utf8)
        .sum::<usize>();
    if name_len == 0 {
        return false;
    }
    let before_name = &trimmed[..trimmed.len() - name_len];
    before_name.chars().any(is_ident_char) && before_name.ends_with(|c: char| c.is_whitespace() || c == '>' || c == ']')
}

fn strip_comments(text: &str) -> String {
    let dirty = DirtyRegions::scan(text);
    text.char_indices()
        .filter(|&(i, _)| !dirty.is_dirty(i))
        .map(|(_, c)| c)
        .collect()
}

/// Position of the delimiter closing the one at `open`, counting nesting and
/// ignoring delimiters inside dirty regions.
fn matching(code: &str, dirty: &DirtyRegions, open: usize, opener: char, closer: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in code[open..].char_indices() {
        let pos = open + i;
        if dirty.is_dirty(pos) {
            continue;
        }
        if c == opener {
            depth += 1;
        } else if c == closer {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(pos);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_free_function_and_keeps_call() {
        let (rest, methods) = extract_methods("int square(int n){return n*n;}\nsquare(4);");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].text(), "int square(int n){return n*n;}");
        assert!(methods[0].needs_static());
        assert_eq!(rest, "\nsquare(4);");
    }

    #[test]
    fn qualified_calls_are_not_declarations() {
        let src = "System.out.println(\"hi\");";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty());
        assert_eq!(rest, src);
    }

    #[test]
    fn control_flow_blocks_stay_in_main() {
        let src = "for (int i = 0; i < 3; i++) { x(i); }\nwhile (ok()) { step(); }\nif (a) { b(); }";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty(), "{methods:?}");
        assert_eq!(rest, src);
    }

    #[test]
    fn try_catch_and_new_are_excluded() {
        let src = "try { run(); } catch (Exception e) { log(e); }\nObject o = new Object() { };";
        let (_, methods) = extract_methods(src);
        assert!(methods.is_empty(), "{methods:?}");
    }

    #[test]
    fn keyword_lookalikes_do_not_exclude() {
        let (_, methods) = extract_methods("void format(String s) { print(s); }");
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn lambda_assignment_is_not_a_method() {
        let src = "Runnable r = () -> { go(); };\nr.run();";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty(), "{methods:?}");
        assert_eq!(rest, src);
    }

    #[test]
    fn static_methods_are_left_as_is() {
        let (_, methods) = extract_methods("static void hi() { }\nhi();");
        assert_eq!(methods.len(), 1);
        assert!(!methods[0].needs_static());
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_body_matching() {
        let src = "String f() { return \"}\"; }\nf();";
        let (rest, methods) = extract_methods(src);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].text(), "String f() { return \"}\"; }");
        assert_eq!(rest, "\nf();");
    }

    #[test]
    fn several_methods_after_statements() {
        let src = "int x = 1;\nint a() { return 1; }\nprint(a() + b());\nint b() { return 2; }";
        let (rest, methods) = extract_methods(src);
        let names: Vec<_> = methods.iter().map(|m| m.text()).collect();
        assert_eq!(names, vec!["int a() { return 1; }", "int b() { return 2; }"]);
        assert!(rest.contains("int x = 1;"));
        assert!(rest.contains("print(a() + b());"));
    }

    #[test]
    fn unbalanced_body_is_left_for_the_compiler() {
        let src = "void broken() { if (x) {";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty());
        assert_eq!(rest, src);
    }

    #[test]
    fn anonymous_class_methods_stay_in_place() {
        let src = "Runnable r = new Runnable() { public void run() { System.out.println(1); } };\nr.run();";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty(), "{methods:?}");
        assert_eq!(rest, src);
    }

    #[test]
    fn listener_passed_inline_is_not_extracted() {
        let src = "frame.addWindowListener(new WindowAdapter() {\n    public void windowClosing(WindowEvent e) { System.exit(0); }\n});";
        let (rest, methods) = extract_methods(src);
        assert!(methods.is_empty(), "{methods:?}");
        assert_eq!(rest, src);
    }

    #[test]
    fn free_method_after_anonymous_class_is_still_found() {
        let src = "Runnable r = new Runnable() { public void run() { hi(); } };\nvoid hi() { System.out.println(2); }\nr.run();";
        let (rest, methods) = extract_methods(src);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].text(), "void hi() { System.out.println(2); }");
        assert!(rest.contains("public void run()"));
    }

    #[test]
    fn parens_in_commented_out_code_are_ignored() {
        let src = "// void fake() { }\nint real() { return 0; }";
        let (_, methods) = extract_methods(src);
        assert_eq!(methods.len(), 1);
        assert!(methods[0].text().contains("int real()"));
    }
}
