//! Supported languages and their comment grammars.
//!
//! This module provides the closed [`Language`] enumeration, the static
//! extension table used to resolve a file's language, and the
//! [`CommentStyle`] each language is classified with.
//!
//! Files whose extension is not in the table never enter a scan: resolution
//! returns `None` and the caller drops the file silently.

use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// The comment grammar a language is classified with.
///
/// Every supported language uses `//` line comments and `/* */` block
/// comments. They differ only in whether block comments nest.
///
/// # Examples
///
/// ```
/// use cloc_core::{CommentStyle, Language};
///
/// assert_eq!(Language::C.comment_style(), CommentStyle::CStyle);
/// assert_eq!(Language::Rust.comment_style(), CommentStyle::NestedCStyle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStyle {
    /// `//` line comments and non-nesting `/* */` block comments.
    CStyle,

    /// `//` line comments and nesting `/* */` block comments.
    ///
    /// `/* a /* b */ c */` is a single comment.
    NestedCStyle,
}

/// A language recognised by the scanner.
///
/// The set is closed: adding a language means adding a variant, a row in
/// the extension table, and a comment style.
///
/// # Examples
///
/// ```
/// use cloc_core::Language;
///
/// assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
/// assert_eq!(Language::from_extension("HPP"), Some(Language::Cpp));
/// assert_eq!(Language::from_extension("md"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// C source files.
    C,
    /// C and C++ header files with the `.h` extension.
    CHeader,
    /// C++ sources and headers.
    Cpp,
    /// C#.
    #[serde(rename = "csharp")]
    CSharp,
    /// Go.
    Go,
    /// Java.
    Java,
    /// JavaScript, including JSX and the module variants.
    #[serde(rename = "javascript")]
    JavaScript,
    /// TypeScript, including TSX and the module variants.
    #[serde(rename = "typescript")]
    TypeScript,
    /// Kotlin sources and scripts.
    Kotlin,
    /// Rust.
    Rust,
    /// Swift.
    Swift,
    /// Jai.
    Jai,
    /// Odin.
    Odin,
}

/// Extension to language table.
///
/// Extensions are stored lowercase and matched ASCII case-insensitively.
const EXTENSIONS: &[(&str, Language)] = &[
    ("c", Language::C),
    ("h", Language::CHeader),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("c++", Language::Cpp),
    ("hpp", Language::Cpp),
    ("hh", Language::Cpp),
    ("hxx", Language::Cpp),
    ("inl", Language::Cpp),
    ("cs", Language::CSharp),
    ("go", Language::Go),
    ("java", Language::Java),
    ("js", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("rs", Language::Rust),
    ("swift", Language::Swift),
    ("jai", Language::Jai),
    ("odin", Language::Odin),
];

impl Language {
    /// Every language, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::C,
        Self::CHeader,
        Self::Cpp,
        Self::CSharp,
        Self::Go,
        Self::Java,
        Self::JavaScript,
        Self::TypeScript,
        Self::Kotlin,
        Self::Rust,
        Self::Swift,
        Self::Jai,
        Self::Odin,
    ];

    /// Number of supported languages.
    pub const COUNT: usize = Self::ALL.len();

    /// Resolves a language from a bare extension (without the leading dot).
    ///
    /// Returns `None` for unrecognised extensions.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|&(_, language)| language)
    }

    /// Resolves a language from a file path's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use cloc_core::Language;
    ///
    /// assert_eq!(Language::from_path(Utf8Path::new("/src/main.c")), Some(Language::C));
    /// assert_eq!(Language::from_path(Utf8Path::new("Makefile")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }

    /// Returns the comment grammar used to classify this language.
    #[inline]
    #[must_use]
    pub const fn comment_style(self) -> CommentStyle {
        match self {
            Self::Kotlin | Self::Rust | Self::Swift | Self::Jai | Self::Odin => {
                CommentStyle::NestedCStyle
            }
            Self::C
            | Self::CHeader
            | Self::Cpp
            | Self::CSharp
            | Self::Go
            | Self::Java
            | Self::JavaScript
            | Self::TypeScript => CommentStyle::CStyle,
        }
    }

    /// Returns the display name used in reports.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CHeader => "C Header",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Go => "Go",
            Self::Java => "Java",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Kotlin => "Kotlin",
            Self::Rust => "Rust",
            Self::Swift => "Swift",
            Self::Jai => "Jai",
            Self::Odin => "Odin",
        }
    }

    /// Returns the extensions that resolve to this language.
    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        EXTENSIONS
            .iter()
            .filter(move |(_, language)| *language == self)
            .map(|&(ext, _)| ext)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_known() {
        assert_eq!(Language::from_extension("c"), Some(Language::C));
        assert_eq!(Language::from_extension("h"), Some(Language::CHeader));
        assert_eq!(Language::from_extension("cpp"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("jai"), Some(Language::Jai));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
    }

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(Language::from_extension("RS"), Some(Language::Rust));
        assert_eq!(Language::from_extension("Java"), Some(Language::Java));
    }

    #[test]
    fn test_from_extension_unknown() {
        assert_eq!(Language::from_extension("py"), None);
        assert_eq!(Language::from_extension(""), None);
        assert_eq!(Language::from_extension("c.bak"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Language::from_path(Utf8Path::new("/tmp/project/lib.rs")),
            Some(Language::Rust)
        );
        assert_eq!(Language::from_path(Utf8Path::new("/tmp/README")), None);
        assert_eq!(Language::from_path(Utf8Path::new("/tmp/.gitignore")), None);
    }

    #[test]
    fn test_every_language_has_an_extension() {
        for language in Language::ALL {
            assert!(
                language.extensions().next().is_some(),
                "{language} has no extension"
            );
        }
    }

    #[test]
    fn test_extension_table_round_trips() {
        for &(ext, language) in EXTENSIONS {
            assert_eq!(Language::from_extension(ext), Some(language));
        }
    }

    #[test]
    fn test_comment_styles() {
        assert_eq!(Language::C.comment_style(), CommentStyle::CStyle);
        assert_eq!(Language::Cpp.comment_style(), CommentStyle::CStyle);
        assert_eq!(Language::Jai.comment_style(), CommentStyle::NestedCStyle);
        assert_eq!(Language::Rust.comment_style(), CommentStyle::NestedCStyle);
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Language::Cpp.to_string(), "C++");
        assert_eq!(Language::CSharp.to_string(), "C#");
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&Language::CHeader).unwrap(),
            r#""c_header""#
        );
        let parsed: Language = serde_json::from_str(r#""javascript""#).unwrap();
        assert_eq!(parsed, Language::JavaScript);
    }

    #[test]
    fn test_serialized_names_are_single_words() {
        let names: Vec<String> = Language::ALL
            .iter()
            .map(|language| serde_json::to_string(language).unwrap())
            .collect();
        insta::assert_snapshot!(names.join(" "), @r#""c" "c_header" "cpp" "csharp" "go" "java" "javascript" "typescript" "kotlin" "rust" "swift" "jai" "odin""#);
        assert!(serde_json::from_str::<Language>(r#""java_script""#).is_err());
    }
}
