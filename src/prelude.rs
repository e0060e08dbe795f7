//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use codeflip::prelude::*;
//! ```

pub use crate::attack::{
    AttackOutcome, AttackResult, Attacker, Example, GeneticAttack, GreedyAttack,
};
pub use crate::candidates::{CandidateMap, CandidateProvider, CandidateSet};
pub use crate::config::AttackConfig;
pub use crate::error::{CodeflipError, Result};
pub use crate::extract::{Extraction, IdentifierExtractor, LexicalExtractor};
pub use crate::importance::{Importance, ImportanceEstimator};
pub use crate::lang::Language;
pub use crate::oracle::{BatchClassifier, Classifier, Prediction, Suggestion, SuggestionOracle};
pub use crate::program::{Substitutions, TokenizedProgram};
pub use crate::stats::AttackStats;
