// src/transform/unit.rs

//! Compilation unit data model and synthesis of the wrapper type.

use std::fmt::Write as _;

use crate::scan::contains_keyword;

/// How the unit's source came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// The user wrote a complete type declaration; the source is verbatim.
    Declared,
    /// A bare script wrapped in an autogenerated entry type.
    Wrapped,
}

/// A free-standing method pulled out of a bare script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMethod {
    text: String,
    needs_static: bool,
}

impl ExtractedMethod {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let signature = text.split('(').next().unwrap_or_default();
        let needs_static = !contains_keyword(signature, "static");
        Self { text, needs_static }
    }

    /// The method exactly as it appeared in the script (trimmed).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the signature lacks a `static` modifier.
    pub fn needs_static(&self) -> bool {
        self.needs_static
    }

    /// The method as emitted into the wrapper type.
    pub fn render(&self) -> String {
        if self.needs_static {
            format!("static {}", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Final source text plus its class name, ready to be persisted and compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    class_name: String,
    source: String,
    kind: UnitKind,
    default_imports: Vec<String>,
    user_imports: Vec<String>,
    methods: Vec<ExtractedMethod>,
    main_body: Option<String>,
}

impl CompilationUnit {
    /// A user-authored unit, compiled verbatim.
    pub fn declared(class_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            source: source.into(),
            kind: UnitKind::Declared,
            default_imports: Vec::new(),
            user_imports: Vec::new(),
            methods: Vec::new(),
            main_body: None,
        }
    }

    /// Build the wrapper type around a bare script's leftovers.
    pub fn wrapped(
        class_name: impl Into<String>,
        default_imports: Vec<String>,
        user_imports: Vec<String>,
        methods: Vec<ExtractedMethod>,
        main_body: impl Into<String>,
    ) -> Self {
        let class_name = class_name.into();
        let main_body = main_body.into();

        let mut source = String::from("//User and auto-imports pre-defined\n");
        for import in default_imports.iter().chain(user_imports.iter()) {
            source.push_str(import);
            source.push('\n');
        }
        source.push_str("//Autogenerated class\n");
        // Writing into a String cannot fail.
        let _ = writeln!(source, "public class {class_name} {{");
        source.push_str("public static void main(String[] args) {\n");
        source.push_str(&main_body);
        source.push_str("\n}\n");
        for method in &methods {
            source.push_str(&method.render());
            source.push('\n');
        }
        source.push('}');

        Self {
            class_name,
            source,
            kind: UnitKind::Wrapped,
            default_imports,
            user_imports,
            methods,
            main_body: Some(main_body),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// `<ClassName>.java`
    pub fn file_name(&self) -> String {
        format!("{}.java", self.class_name)
    }

    /// Every import statement emitted, defaults first.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.default_imports
            .iter()
            .chain(self.user_imports.iter())
            .map(String::as_str)
    }

    pub fn default_imports(&self) -> &[String] {
        &self.default_imports
    }

    pub fn user_imports(&self) -> &[String] {
        &self.user_imports
    }

    pub fn methods(&self) -> &[ExtractedMethod] {
        &self.methods
    }

    /// Body of the synthesized `main`; `None` for declared units.
    pub fn main_body(&self) -> Option<&str> {
        self.main_body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_detection_looks_only_at_signature() {
        let m = ExtractedMethod::new("int f(){ return STATIC_VALUE; }");
        assert!(m.needs_static());
        assert_eq!(m.render(), "static int f(){ return STATIC_VALUE; }");

        let m = ExtractedMethod::new("public static void g() {}");
        assert!(!m.needs_static());
        assert_eq!(m.render(), "public static void g() {}");
    }

    #[test]
    fn wrapped_unit_layout() {
        let unit = CompilationUnit::wrapped(
            "Main",
            vec!["import java.util.*;".to_string()],
            vec!["import java.util.List;".to_string()],
            vec![ExtractedMethod::new("void hi() {}")],
            "hi();",
        );
        assert_eq!(
            unit.source(),
            "//User and auto-imports pre-defined\n\
             import java.util.*;\n\
             import java.util.List;\n\
             //Autogenerated class\n\
             public class Main {\n\
             public static void main(String[] args) {\n\
             hi();\n\
             }\n\
             static void hi() {}\n\
             }"
        );
        assert_eq!(unit.file_name(), "Main.java");
        assert_eq!(unit.imports().count(), 2);
    }
}
