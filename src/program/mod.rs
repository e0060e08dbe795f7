//! Tokenized programs and identifier occurrences.
//!
//! A [`TokenizedProgram`] is the read-only view every search engine works
//! on: the whitespace-separated word tokens of the source plus, for each
//! renameable identifier, the ordered token positions where it occurs.
//!
//! Renames are always uniform: an identifier is replaced at every one of its
//! occurrences or not at all.
//!
//! # Example
//!
//! ```
//! use codeflip::program::TokenizedProgram;
//!
//! let program = TokenizedProgram::from_source(
//!     "int f ( int x ) { return x + x ; }",
//!     ["f", "x"],
//! );
//! assert_eq!(program.positions("x"), &[4, 8, 10]);
//!
//! let working = program.working();
//! let renamed = working.renamed(program.identifier("x").unwrap(), "y");
//! assert_eq!(renamed.code(), "int f ( int y ) { return y + y ; }");
//! // the original value is untouched
//! assert_eq!(working.code(), program.code());
//! ```

use crate::error::{CodeflipError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Identifier -> replacement. Identity entries mean "left unchanged".
pub type Substitutions = BTreeMap<String, String>;

/// A renameable name and the token positions where it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    name: String,
    positions: Vec<usize>,
}

impl Identifier {
    /// Identifier name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Occurrence positions, ascending
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of occurrences
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.positions.len()
    }
}

/// Word tokens of a program plus identifier occurrence index.
///
/// Deserialized programs go through [`TokenizedProgram::with_positions`],
/// so stored positions are checked like parser-supplied ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProgram")]
pub struct TokenizedProgram {
    tokens: Vec<String>,
    identifiers: Vec<Identifier>,
}

/// Unchecked wire form of [`TokenizedProgram`].
#[derive(Deserialize)]
struct RawProgram {
    tokens: Vec<String>,
    identifiers: Vec<Identifier>,
}

impl TryFrom<RawProgram> for TokenizedProgram {
    type Error = CodeflipError;

    fn try_from(raw: RawProgram) -> Result<Self> {
        let occurrences = raw
            .identifiers
            .into_iter()
            .map(|ident| (ident.name, ident.positions))
            .collect();
        Self::with_positions(raw.tokens, occurrences)
    }
}

impl TokenizedProgram {
    /// Build from tokens, locating every name by exact token match.
    ///
    /// Names containing whitespace, repeated names and names that never occur
    /// are dropped; the remaining identifiers keep extraction order.
    pub fn new<I, S>(tokens: Vec<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();
        for name in names {
            let name: String = name.into();
            let name = name.trim().to_string();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                continue;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            let positions: Vec<usize> = tokens
                .iter()
                .enumerate()
                .filter(|(_, tok)| **tok == name)
                .map(|(i, _)| i)
                .collect();
            if !positions.is_empty() {
                identifiers.push(Identifier { name, positions });
            }
        }
        Self {
            tokens,
            identifiers,
        }
    }

    /// Split `source` on whitespace and locate `names`.
    pub fn from_source<I, S>(source: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = source.split_whitespace().map(str::to_string).collect();
        Self::new(tokens, names)
    }

    /// Build from explicit occurrence lists supplied by a parser.
    ///
    /// # Errors
    ///
    /// Returns [`CodeflipError::InvalidProgram`] if a position is out of range
    /// or claimed by two identifiers.
    pub fn with_positions(tokens: Vec<String>, occurrences: Vec<(String, Vec<usize>)>) -> Result<Self> {
        let mut owner: BTreeMap<usize, String> = BTreeMap::new();
        let mut identifiers = Vec::new();
        let mut seen = HashSet::new();

        for (name, mut positions) in occurrences {
            if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
                continue;
            }
            if !seen.insert(name.clone()) {
                return Err(CodeflipError::InvalidProgram(format!(
                    "identifier '{name}' listed twice"
                )));
            }
            positions.sort_unstable();
            positions.dedup();
            for &pos in &positions {
                if pos >= tokens.len() {
                    return Err(CodeflipError::InvalidProgram(format!(
                        "position {pos} of '{name}' out of range (len={})",
                        tokens.len()
                    )));
                }
                if let Some(other) = owner.insert(pos, name.clone()) {
                    return Err(CodeflipError::InvalidProgram(format!(
                        "position {pos} shared by '{other}' and '{name}'"
                    )));
                }
            }
            if !positions.is_empty() {
                identifiers.push(Identifier { name, positions });
            }
        }

        Ok(Self {
            tokens,
            identifiers,
        })
    }

    /// Word tokens
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of word tokens (program length)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the program has no tokens
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Attackable identifiers in extraction order
    #[must_use]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Look up an identifier by name
    #[must_use]
    pub fn identifier(&self, name: &str) -> Option<&Identifier> {
        self.identifiers.iter().find(|id| id.name == name)
    }

    /// Positions of `name`, empty if it is not an identifier
    #[must_use]
    pub fn positions(&self, name: &str) -> &[usize] {
        self.identifier(name).map_or(&[], Identifier::positions)
    }

    /// Identifier names in extraction order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(Identifier::name)
    }

    /// Total number of identifier occurrences
    #[must_use]
    pub fn total_positions(&self) -> usize {
        self.identifiers.iter().map(Identifier::occurrences).sum()
    }

    /// Tokens joined by single spaces, as the classifier sees them
    #[must_use]
    pub fn code(&self) -> String {
        self.tokens.join(" ")
    }

    /// Unmodified working copy
    #[must_use]
    pub fn working(&self) -> WorkingProgram {
        WorkingProgram {
            tokens: self.tokens.clone(),
            renames: Substitutions::new(),
        }
    }

    /// Tokens with every substitution in `subs` applied.
    ///
    /// Unknown names are ignored.
    #[must_use]
    pub fn apply(&self, subs: &Substitutions) -> Vec<String> {
        let mut tokens = self.tokens.clone();
        for (name, replacement) in subs {
            for &pos in self.positions(name) {
                tokens[pos].clone_from(replacement);
            }
        }
        tokens
    }

    /// One variant per identifier occurrence with that single token masked.
    ///
    /// Variants are ordered by identifier, then position.
    #[must_use]
    pub fn masked_variants(&self, mask: &str) -> Vec<(usize, Vec<String>)> {
        let mut variants = Vec::with_capacity(self.total_positions());
        for ident in &self.identifiers {
            for &pos in &ident.positions {
                let mut tokens = self.tokens.clone();
                tokens[pos] = mask.to_string();
                variants.push((pos, tokens));
            }
        }
        variants
    }

    /// Number of identifiers actually renamed by `subs` and the number of
    /// token positions they cover.
    #[must_use]
    pub fn change_counts(&self, subs: &Substitutions) -> (usize, usize) {
        subs.iter()
            .filter(|(name, replacement)| name != replacement)
            .filter_map(|(name, _)| self.identifier(name))
            .fold((0, 0), |(vars, positions), ident| {
                (vars + 1, positions + ident.occurrences())
            })
    }
}

/// A program with some renames committed.
///
/// Each rename produces a new value; nothing is shared or mutated behind the
/// caller's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingProgram {
    tokens: Vec<String>,
    renames: Substitutions,
}

impl WorkingProgram {
    /// Copy of `self` with `ident` replaced at every occurrence.
    #[must_use]
    pub fn renamed(&self, ident: &Identifier, replacement: &str) -> Self {
        let mut next = self.clone();
        for &pos in &ident.positions {
            next.tokens[pos] = replacement.to_string();
        }
        next.renames
            .insert(ident.name.clone(), replacement.to_string());
        next
    }

    /// Copy of `self` recording that `ident` was considered and kept.
    #[must_use]
    pub fn kept(&self, ident: &Identifier) -> Self {
        let mut next = self.clone();
        next.renames.insert(ident.name.clone(), ident.name.clone());
        next
    }

    /// Current tokens
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Renames recorded so far, identity entries included
    #[must_use]
    pub fn renames(&self) -> &Substitutions {
        &self.renames
    }

    /// Tokens joined by single spaces
    #[must_use]
    pub fn code(&self) -> String {
        self.tokens.join(" ")
    }

    /// Tokens of a rename of `ident` on top of `self`, without recording it.
    #[must_use]
    pub fn preview(&self, ident: &Identifier, replacement: &str) -> Vec<String> {
        let mut tokens = self.tokens.clone();
        for &pos in &ident.positions {
            tokens[pos] = replacement.to_string();
        }
        tokens
    }
}
