//! Identifier extraction.
//!
//! Real deployments plug a language front-end in through
//! [`IdentifierExtractor`]. [`LexicalExtractor`] is a dependency-free
//! stand-in: it lexes words, literals and punctuation, drops comments, and
//! treats every non-reserved word that is neither called nor accessed as a
//! member as a renameable identifier. It does not resolve scopes.

use crate::error::Result;
use crate::lang::Language;
use crate::program::TokenizedProgram;
use serde::{Deserialize, Serialize};

/// Tokens of a program plus the names that may be renamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Renameable names in first-occurrence order
    pub names: Vec<String>,
    /// Token sequence
    pub tokens: Vec<String>,
}

impl Extraction {
    /// Locate the names in the tokens
    #[must_use]
    pub fn into_program(self) -> TokenizedProgram {
        TokenizedProgram::new(self.tokens, self.names)
    }
}

/// Source of tokens and identifier names.
pub trait IdentifierExtractor {
    /// Tokenize `source` and list its renameable identifiers.
    ///
    /// # Errors
    ///
    /// Implementations report unusable input as
    /// [`crate::CodeflipError::OracleFailure`] with
    /// [`crate::error::OracleKind::Extractor`].
    fn extract(&self, source: &str, language: Language) -> Result<Extraction>;
}

/// Lexical identifier extractor.
///
/// # Example
///
/// ```
/// use codeflip::extract::{IdentifierExtractor, LexicalExtractor};
/// use codeflip::lang::Language;
///
/// let src = "int add(int a, int b) { /* sum */ return a + b; }";
/// let extraction = LexicalExtractor::new().extract(src, Language::C).unwrap();
/// assert_eq!(extraction.names, vec!["a", "b"]);
/// assert_eq!(extraction.tokens.len(), 16);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalExtractor {
    include_calls: bool,
}

impl LexicalExtractor {
    /// Extractor that skips called names
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treat names followed by `(` as identifiers
    #[must_use]
    pub fn with_calls(mut self, include: bool) -> Self {
        self.include_calls = include;
        self
    }

    /// Split `source` into tokens, dropping whitespace and comments.
    #[must_use]
    pub fn tokenize(&self, source: &str, language: Language) -> Vec<String> {
        let chars: Vec<char> = source.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if c.is_whitespace() {
                i += 1;
            } else if starts_line_comment(language, c, next) {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            } else if has_block_comments(language) && c == '/' && next == Some('*') {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            } else if is_quote(language, c) {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != c {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(chars.len());
                tokens.push(chars[start..i].iter().collect());
            } else if is_word_start(language, c) {
                let start = i;
                i += 1;
                while i < chars.len() && is_word_char(language, chars[i]) {
                    i += 1;
                }
                tokens.push(chars[start..i].iter().collect());
            } else {
                tokens.push(c.to_string());
                i += 1;
            }
        }
        tokens
    }
}

impl IdentifierExtractor for LexicalExtractor {
    fn extract(&self, source: &str, language: Language) -> Result<Extraction> {
        let tokens = self.tokenize(source, language);
        let mut names: Vec<String> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if !language.is_valid_identifier(token) || names.contains(token) {
                continue;
            }
            let prev = i.checked_sub(1).map(|p| tokens[p].as_str());
            let member = prev == Some(".")
                || (prev == Some(">") && i >= 2 && tokens[i - 2] == "-")
                || (prev == Some(":") && i >= 2 && tokens[i - 2] == ":");
            let called = tokens.get(i + 1).is_some_and(|t| t == "(");
            if member || (called && !self.include_calls) {
                continue;
            }
            names.push(token.clone());
        }

        Ok(Extraction { names, tokens })
    }
}

fn starts_line_comment(language: Language, c: char, next: Option<char>) -> bool {
    match language {
        Language::Python | Language::Ruby => c == '#',
        Language::Php => c == '#' || (c == '/' && next == Some('/')),
        _ => c == '/' && next == Some('/'),
    }
}

fn has_block_comments(language: Language) -> bool {
    !matches!(language, Language::Python | Language::Ruby)
}

fn is_quote(language: Language, c: char) -> bool {
    c == '"' || c == '\'' || (c == '`' && matches!(language, Language::Go | Language::JavaScript))
}

fn is_word_start(language: Language, c: char) -> bool {
    is_word_char(language, c) || (c == '@' && language == Language::Ruby)
}

fn is_word_char(language: Language, c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || (c == '$'
            && matches!(
                language,
                Language::Php | Language::Java | Language::JavaScript | Language::Ruby
            ))
}
