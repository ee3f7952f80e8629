// src/transform/mod.rs

//! Script transformer: turns whatever the user typed into a compilation unit.
//!
//! - Input that declares a type (`class` outside comments and literals) is
//!   compiled verbatim under that type's name.
//! - Anything else is a bare script: imports ([`imports`]) and free methods
//!   ([`methods`]) are pulled out, and the leftovers become the body of a
//!   generated `main` ([`unit`]).

pub mod imports;
pub mod methods;
pub mod unit;

use tracing::debug;

use crate::errors::{JplayError, Result};
use crate::scan::{find_clean_char, find_keyword, is_ident_char, DirtyRegions};

pub use imports::extract_imports;
pub use methods::extract_methods;
pub use unit::{CompilationUnit, ExtractedMethod, UnitKind};

pub const CLASS_KEYWORD: &str = "class";

/// Imports every wrapped script gets for free.
pub const DEFAULT_IMPORTS: &[&str] = &[
    "java.util.*",
    "javax.swing.*",
    "javax.swing.event.*",
    "java.awt.*",
    "java.awt.event.*",
    "java.io.*",
];

/// Knobs for [`ScriptTransformer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Name of the generated entry type for bare scripts.
    pub wrapper_class: String,
    /// Type name the user may never declare.
    pub reserved_class: String,
    /// Packages/types imported into every wrapped script, e.g. `java.util.*`.
    pub default_imports: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            wrapper_class: "Main".to_string(),
            reserved_class: "Playground".to_string(),
            default_imports: DEFAULT_IMPORTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptTransformer {
    options: TransformOptions,
}

impl ScriptTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Produce a compilation unit for `text`.
    ///
    /// Fails with [`JplayError::TransformRefused`] when the declared type uses
    /// the reserved name, and with [`JplayError::UnnamedType`] when a `class`
    /// keyword is not followed by a name.
    pub fn transform(&self, text: &str) -> Result<CompilationUnit> {
        let dirty = DirtyRegions::scan(text);

        if let Some(pos) = find_keyword(text, &dirty, CLASS_KEYWORD, 0) {
            let name = declared_name(text, &dirty, pos).ok_or(JplayError::UnnamedType)?;
            if name == self.options.reserved_class {
                return Err(JplayError::TransformRefused(name));
            }
            debug!(class = %name, "input declares its own type; compiling verbatim");
            return Ok(CompilationUnit::declared(name, text));
        }

        let (code, user_imports) = extract_imports(text);
        let (body, methods) = extract_methods(&code);
        debug!(
            imports = user_imports.len(),
            methods = methods.len(),
            "wrapping bare script"
        );

        let default_imports = self
            .options
            .default_imports
            .iter()
            .map(|target| format!("import {target};"))
            .collect::<Vec<_>>();
        let user_imports = user_imports
            .into_iter()
            .filter(|stmt| !default_imports.contains(stmt))
            .collect();

        Ok(CompilationUnit::wrapped(
            self.options.wrapper_class.clone(),
            default_imports,
            user_imports,
            methods,
            body,
        ))
    }
}

/// The identifier between `class` and the next opening brace.
///
/// Only the leading identifier is kept, so `Foo<T> extends Bar` yields `Foo`.
fn declared_name(text: &str, dirty: &DirtyRegions, keyword_pos: usize) -> Option<String> {
    let after = keyword_pos + CLASS_KEYWORD.len();
    let brace = find_clean_char(text, dirty, '{', after).unwrap_or(text.len());
    let header = text[after..brace].trim();
    let name: String = header.chars().take_while(|&c| is_ident_char(c)).collect();
    (!name.is_empty()).then_some(name)
}
