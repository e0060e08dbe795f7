//! Codeflip: identifier-renaming adversarial attacks on code classifiers.
//!
//! Codeflip searches for renamings of a program's identifiers that flip the
//! label a black-box classifier assigns to it. Replacements come from a
//! masked-language-model style suggestion oracle, so the rewritten program
//! stays natural; renames are uniform, so it stays equivalent.
//!
//! # Quick Start
//!
//! ```
//! use codeflip::prelude::*;
//!
//! // Label 1 ("buggy") unless the loop counter is called `idx`
//! let classifier = |programs: &[String]| -> codeflip::Result<Vec<Prediction>> {
//!     Ok(programs
//!         .iter()
//!         .map(|p| if p.contains(" idx ") {
//!             Prediction::from_probs(vec![0.6, 0.4])
//!         } else {
//!             Prediction::from_probs(vec![0.1, 0.9])
//!         })
//!         .collect())
//! };
//! let suggester = |_: &TokenizedProgram, _: usize, _: usize| -> codeflip::Result<Vec<Vec<Suggestion>>> {
//!     Ok(vec![vec![Suggestion::new("j", 0.4), Suggestion::new("idx", 0.3)]])
//! };
//!
//! let source = "for (i = 0; i < n; i++) sum += i;";
//! let example = Example::extract(&LexicalExtractor::new(), source, Language::C, 1).unwrap();
//!
//! let attacker = Attacker::new(&classifier, &suggester, AttackConfig::new().with_seed(1)).unwrap();
//! let result = attacker.attack(&example).unwrap();
//! assert_eq!(result.outcome.code(), 1);
//! assert_eq!(result.substitutions.get("i").map(String::as_str), Some("idx"));
//! ```
//!
//! # Modules
//!
//! - [`program`]: Tokenized programs and identifier occurrences
//! - [`lang`]: Identifier syntax and reserved words per language
//! - [`extract`]: Identifier extraction (lexical reference extractor)
//! - [`oracle`]: Classifier and suggestion oracle interfaces, batching
//! - [`candidates`]: Replacement candidates and the validity filter
//! - [`importance`]: Occlusion importance of identifiers
//! - [`attack`]: Greedy and genetic engines, results, driver
//! - [`stats`]: Success-rate aggregation
//! - [`config`]: Attack configuration

pub mod attack;
pub mod candidates;
pub mod config;
pub mod error;
pub mod extract;
pub mod importance;
pub mod lang;
pub mod oracle;
pub mod prelude;
pub mod program;
pub mod stats;

pub use attack::{AttackOutcome, AttackResult, Attacker, Example};
pub use config::AttackConfig;
pub use error::{CodeflipError, Result};
