//! Search engines and their result record.
//!
//! - [`GreedyAttack`]: importance-ranked hill climbing, one identifier at a time
//! - [`GeneticAttack`]: population search over simultaneous substitutions
//! - [`Attacker`]: runs greedy, then the genetic fallback on exhaustion
//!
//! Every engine ends in an [`AttackOutcome`]. Negative outcomes are normal
//! results; only oracle failures surface as errors.

mod driver;
mod genetic;
mod greedy;

pub use driver::Attacker;
pub use genetic::GeneticAttack;
pub use greedy::{GreedyAttack, GreedyRun};

use crate::error::{CodeflipError, Result};
use crate::extract::IdentifierExtractor;
use crate::lang::Language;
use crate::oracle::OracleUsage;
use crate::program::{Substitutions, TokenizedProgram};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of an attack, with its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum AttackOutcome {
    /// Prediction was already wrong; nothing attempted (-4)
    AlreadyMisclassified,
    /// No renameable identifier (-3)
    NoIdentifiers,
    /// No identifier has a valid candidate (-2, genetic engine only)
    NoValidCandidates,
    /// Search finished without flipping the label (-1)
    Exhausted,
    /// Label flipped (1)
    Success,
}

impl AttackOutcome {
    /// All outcomes, in code order
    pub const ALL: [AttackOutcome; 5] = [
        Self::AlreadyMisclassified,
        Self::NoIdentifiers,
        Self::NoValidCandidates,
        Self::Exhausted,
        Self::Success,
    ];

    /// Integer outcome code
    #[must_use]
    pub fn code(&self) -> i8 {
        match self {
            Self::AlreadyMisclassified => -4,
            Self::NoIdentifiers => -3,
            Self::NoValidCandidates => -2,
            Self::Exhausted => -1,
            Self::Success => 1,
        }
    }

    /// Outcome for an integer code
    #[must_use]
    pub fn from_code(code: i8) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.code() == code)
    }

    /// Get string name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyMisclassified => "already_misclassified",
            Self::NoIdentifiers => "no_identifiers",
            Self::NoValidCandidates => "no_valid_candidates",
            Self::Exhausted => "exhausted",
            Self::Success => "success",
        }
    }

    /// True if a search actually ran (counts toward the success rate)
    #[must_use]
    pub fn is_attempted(&self) -> bool {
        self.code() >= -2
    }

    /// True if the label flipped
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

impl From<AttackOutcome> for i8 {
    fn from(outcome: AttackOutcome) -> Self {
        outcome.code()
    }
}

impl TryFrom<i8> for AttackOutcome {
    type Error = String;

    fn try_from(code: i8) -> std::result::Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown outcome code {code}"))
    }
}

/// One labelled program to attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Source as supplied
    pub source: String,
    /// Tokenized form with identifier occurrences
    pub program: TokenizedProgram,
    /// Ground-truth label
    pub true_label: usize,
}

impl Example {
    /// Create an example from an already tokenized program
    #[must_use]
    pub fn new(source: impl Into<String>, program: TokenizedProgram, true_label: usize) -> Self {
        Self {
            source: source.into(),
            program,
            true_label,
        }
    }

    /// Tokenize `source` with `extractor`.
    ///
    /// # Errors
    ///
    /// Propagates extractor failures.
    pub fn extract<E: IdentifierExtractor + ?Sized>(
        extractor: &E,
        source: &str,
        language: Language,
        true_label: usize,
    ) -> Result<Self> {
        let extraction = extractor.extract(source, language)?;
        Ok(Self::new(source, extraction.into_program(), true_label))
    }

    /// Build from parser-supplied occurrence lists.
    ///
    /// # Errors
    ///
    /// Returns [`CodeflipError::InvalidProgram`] for bad positions.
    pub fn with_positions(
        source: impl Into<String>,
        tokens: Vec<String>,
        occurrences: Vec<(String, Vec<usize>)>,
        true_label: usize,
    ) -> Result<Self> {
        let program = TokenizedProgram::with_positions(tokens, occurrences)?;
        Ok(Self::new(source, program, true_label))
    }
}

/// Everything known about one finished attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Terminal outcome (serialized as its code)
    pub outcome: AttackOutcome,
    /// Source as supplied with the example
    pub original_code: String,
    /// Token count of the program
    pub program_length: usize,
    /// Adversarial program as space-joined tokens, empty if nothing was
    /// committed
    pub adversarial_code: String,
    /// Ground-truth label
    pub true_label: usize,
    /// Label predicted on the unmodified program
    pub original_label: usize,
    /// Label predicted on the last evaluated mutation, if any
    pub final_label: Option<usize>,
    /// Identifier names in extraction order
    pub names: Vec<String>,
    /// Importance scores aligned with `names` (greedy only)
    pub importance_scores: Vec<f32>,
    /// Identifiers actually renamed
    pub nb_changed_var: usize,
    /// Token positions actually rewritten
    pub nb_changed_pos: usize,
    /// Substitution map, identity entries included
    pub substitutions: Substitutions,
    /// Oracle usage of the whole attack
    pub usage: OracleUsage,
    /// Genetic iterations run (0 if the genetic engine did not run)
    pub genetic_iterations: usize,
}

impl AttackResult {
    /// Result for `example` with nothing committed yet
    pub(crate) fn pending(example: &Example, original_label: usize) -> Self {
        let program = &example.program;
        Self {
            outcome: AttackOutcome::Exhausted,
            original_code: example.source.clone(),
            program_length: program.len(),
            adversarial_code: String::new(),
            true_label: example.true_label,
            original_label,
            final_label: None,
            names: program.names().map(str::to_string).collect(),
            importance_scores: Vec::new(),
            nb_changed_var: 0,
            nb_changed_pos: 0,
            substitutions: Substitutions::new(),
            usage: OracleUsage::default(),
            genetic_iterations: 0,
        }
    }

    /// Record `subs` and the program they produce.
    pub(crate) fn commit(&mut self, program: &TokenizedProgram, subs: Substitutions, code: String) {
        let (vars, positions) = program.change_counts(&subs);
        self.nb_changed_var = vars;
        self.nb_changed_pos = positions;
        self.substitutions = subs;
        self.adversarial_code = code;
    }

    /// Serialize to a JSON line.
    ///
    /// # Errors
    ///
    /// Returns a serialization error (not expected for this type).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(CodeflipError::from)
    }

    /// Parse a JSON record.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
