// src/exec/misuse.rs

//! Recognise launcher errors caused by a malformed entry point.
//!
//! When the user's type is not public or its `main` has the wrong shape, the
//! JVM prints a terse launcher error rather than an ordinary exception. These
//! are turned into a hint that says what to change.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMisuse {
    /// The entry type cannot be accessed reflectively.
    NonPublicType,
    /// `main` is missing, not static, or has the wrong signature.
    EntrySignature,
    /// The launcher could not load the class at all.
    ClassNotLoadable,
}

impl RuntimeMisuse {
    pub fn guidance(self) -> &'static str {
        match self {
            RuntimeMisuse::NonPublicType => {
                "Error: The entry type is not accessible. Please use \"public class <ClassName>\"."
            }
            RuntimeMisuse::EntrySignature => {
                "Error: Malformed main method. Make sure it is declared as \"public static void main(String[] args)\"."
            }
            RuntimeMisuse::ClassNotLoadable => {
                "Error: The class could not be loaded. Make sure the file has no package declaration and the class name matches."
            }
        }
    }
}

static MARKERS: LazyLock<Vec<(Regex, RuntimeMisuse)>> = LazyLock::new(|| {
    [
        (r"IllegalAccess(Exception|Error)", RuntimeMisuse::NonPublicType),
        (r"Main method not found in class", RuntimeMisuse::EntrySignature),
        (r"Main method is not static", RuntimeMisuse::EntrySignature),
        (r"Main method must return a value of type void", RuntimeMisuse::EntrySignature),
        (r"NoSuchMethodError: main\b", RuntimeMisuse::EntrySignature),
        (r"Could not find or load main class", RuntimeMisuse::ClassNotLoadable),
        (r"NoClassDefFoundError: .*\(wrong name", RuntimeMisuse::ClassNotLoadable),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("valid misuse regex"), kind))
    .collect()
});

/// Classify child stderr text. Ordinary runtime exceptions yield `None`.
pub fn classify(stderr: &str) -> Option<RuntimeMisuse> {
    MARKERS
        .iter()
        .find(|(re, _)| re.is_match(stderr))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_main_is_a_signature_problem() {
        let text = "Error: Main method not found in class Main, please define the main method as:\n   public static void main(String[] args)\n";
        assert_eq!(classify(text), Some(RuntimeMisuse::EntrySignature));
    }

    #[test]
    fn non_static_main() {
        assert_eq!(
            classify("Error: Main method is not static in class Foo, please define the main method as:"),
            Some(RuntimeMisuse::EntrySignature)
        );
    }

    #[test]
    fn illegal_access_means_non_public_type() {
        let text = "Exception in thread \"main\" java.lang.IllegalAccessException: Class sun.launcher.LauncherHelper can not access a member of class Foo";
        assert_eq!(classify(text), Some(RuntimeMisuse::NonPublicType));
    }

    #[test]
    fn unloadable_class() {
        assert_eq!(
            classify("Error: Could not find or load main class Foo\nCaused by: java.lang.ClassNotFoundException: Foo"),
            Some(RuntimeMisuse::ClassNotLoadable)
        );
    }

    #[test]
    fn ordinary_exception_is_not_misuse() {
        let text = "Exception in thread \"main\" java.lang.ArithmeticException: / by zero\n\tat Main.main(Main.java:5)";
        assert_eq!(classify(text), None);
    }
}
