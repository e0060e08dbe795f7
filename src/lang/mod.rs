//! Target-language naming rules.
//!
//! A rename is only admissible if the new name is syntactically an
//! identifier of the target language and does not collide with a keyword
//! or a well-known library name.
//!
//! # Example
//!
//! ```
//! use codeflip::lang::Language;
//!
//! let c = Language::C;
//! assert!(c.is_valid_identifier("buffer_len"));
//! assert!(!c.is_valid_identifier("while"));
//! assert!(!c.is_valid_identifier("2fast"));
//! assert_eq!(Language::parse("c++"), Some(Language::Cpp));
//! ```

mod keywords;

use keywords::{
    CPP_KEYWORDS, CPP_SPECIAL_IDS, C_KEYWORDS, C_SPECIAL_IDS, GO_KEYWORDS, GO_SPECIAL_IDS,
    JAVASCRIPT_KEYWORDS, JAVASCRIPT_SPECIAL_IDS, JAVA_KEYWORDS, JAVA_SPECIAL_IDS,
    MODEL_SPECIAL_TOKENS, PHP_KEYWORDS, PHP_SPECIAL_IDS, PYTHON_KEYWORDS, PYTHON_SPECIAL_IDS,
    RUBY_KEYWORDS, RUBY_SPECIAL_IDS,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language of the attacked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C (the default, defect-detection benchmarks are C)
    #[default]
    C,
    /// C++
    #[serde(alias = "c++")]
    Cpp,
    /// Java
    Java,
    /// Python 3
    Python,
    /// Go
    Go,
    /// JavaScript
    #[serde(alias = "js")]
    JavaScript,
    /// PHP (variables carry a leading `$`)
    Php,
    /// Ruby
    Ruby,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 8] = [
        Self::C,
        Self::Cpp,
        Self::Java,
        Self::Python,
        Self::Go,
        Self::JavaScript,
        Self::Php,
        Self::Ruby,
    ];

    /// Get string name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::Python => "python",
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::Php => "php",
            Self::Ruby => "ruby",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "c" => Some(Self::C),
            "cpp" | "c++" | "cxx" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "python" | "py" => Some(Self::Python),
            "go" | "golang" => Some(Self::Go),
            "javascript" | "js" => Some(Self::JavaScript),
            "php" => Some(Self::Php),
            "ruby" | "rb" => Some(Self::Ruby),
            _ => None,
        }
    }

    /// Keywords of the language.
    #[must_use]
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::C => C_KEYWORDS,
            Self::Cpp => CPP_KEYWORDS,
            Self::Java => JAVA_KEYWORDS,
            Self::Python => PYTHON_KEYWORDS,
            Self::Go => GO_KEYWORDS,
            Self::JavaScript => JAVASCRIPT_KEYWORDS,
            Self::Php => PHP_KEYWORDS,
            Self::Ruby => RUBY_KEYWORDS,
        }
    }

    /// Library names and builtins that must not be introduced by a rename.
    #[must_use]
    pub fn special_ids(&self) -> &'static [&'static str] {
        match self {
            Self::C => C_SPECIAL_IDS,
            Self::Cpp => CPP_SPECIAL_IDS,
            Self::Java => JAVA_SPECIAL_IDS,
            Self::Python => PYTHON_SPECIAL_IDS,
            Self::Go => GO_SPECIAL_IDS,
            Self::JavaScript => JAVASCRIPT_SPECIAL_IDS,
            Self::Php => PHP_SPECIAL_IDS,
            Self::Ruby => RUBY_SPECIAL_IDS,
        }
    }

    /// Check if `name` is a keyword.
    #[must_use]
    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords().contains(&name)
    }

    /// Check if `name` is a keyword or a special identifier.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.is_keyword(name) || self.special_ids().contains(&name)
    }

    /// Check the lexical identifier rule of the language (ASCII only).
    #[must_use]
    pub fn is_identifier_syntax(&self, name: &str) -> bool {
        let body = match self {
            Self::Php => name.strip_prefix('$').unwrap_or(name),
            Self::Ruby => name
                .strip_prefix("@@")
                .or_else(|| name.strip_prefix('@'))
                .or_else(|| name.strip_prefix('$'))
                .unwrap_or(name),
            _ => name,
        };
        let body = match self {
            Self::Ruby => body
                .strip_suffix('?')
                .or_else(|| body.strip_suffix('!'))
                .unwrap_or(body),
            _ => body,
        };

        let dollar_ok = matches!(self, Self::Java | Self::JavaScript);
        let mut chars = body.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let head_ok = first.is_ascii_alphabetic() || first == '_' || (dollar_ok && first == '$');
        head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || (dollar_ok && c == '$'))
    }

    /// A name that may appear as a rename target: syntactically an
    /// identifier and not reserved.
    #[must_use]
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        self.is_identifier_syntax(name) && !self.is_reserved(name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check if `token` is a control token of the suggestion model
/// (`<s>`, `[MASK]`, any `<...>` marker).
#[must_use]
pub fn is_special_token(token: &str) -> bool {
    MODEL_SPECIAL_TOKENS.contains(&token)
        || (token.len() > 2 && token.starts_with('<') && token.ends_with('>'))
}
