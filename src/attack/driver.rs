//! Per-example attack driver.

use super::{AttackOutcome, AttackResult, Example, GeneticAttack, GreedyAttack};
use crate::config::AttackConfig;
use crate::error::Result;
use crate::oracle::{Classifier, SuggestionOracle};
use crate::stats::AttackStats;
use tracing::{info, warn};

/// Greedy search with genetic fallback.
///
/// # Example
///
/// ```
/// use codeflip::prelude::*;
///
/// let classifier = |programs: &[String]| -> codeflip::Result<Vec<Prediction>> {
///     Ok(programs
///         .iter()
///         .map(|p| if p.contains("total") {
///             Prediction::from_probs(vec![0.3, 0.7])
///         } else {
///             Prediction::from_probs(vec![0.8, 0.2])
///         })
///         .collect())
/// };
/// let suggester = |_: &TokenizedProgram, _: usize, _: usize| -> codeflip::Result<Vec<Vec<Suggestion>>> {
///     Ok(vec![vec![Suggestion::new("sum", 0.6), Suggestion::new("total", 0.3)]])
/// };
///
/// let source = "int f ( int n ) { return n * 2 ; }";
/// let example = Example::new(source, TokenizedProgram::from_source(source, ["n"]), 0);
///
/// let attacker = Attacker::new(&classifier, &suggester, AttackConfig::new()).unwrap();
/// let result = attacker.attack(&example).unwrap();
/// assert_eq!(result.outcome, AttackOutcome::Success);
/// assert_eq!(result.adversarial_code, "int f ( int total ) { return total * 2 ; }");
/// ```
#[derive(Debug)]
pub struct Attacker<'a, C: ?Sized, S: ?Sized> {
    classifier: &'a C,
    suggester: &'a S,
    config: AttackConfig,
}

impl<'a, C, S> Attacker<'a, C, S>
where
    C: Classifier + ?Sized,
    S: SuggestionOracle + ?Sized,
{
    /// Create a driver.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CodeflipError::InvalidConfig`] if `config` is invalid.
    pub fn new(classifier: &'a C, suggester: &'a S, config: AttackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier,
            suggester,
            config,
        })
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Attack one example.
    ///
    /// Runs the greedy engine; if it ends exhausted and the fallback is
    /// enabled, runs the genetic engine seeded with the greedy substitutions
    /// and the candidate sets greedy already fetched.
    ///
    /// # Errors
    ///
    /// Propagates oracle failures.
    pub fn attack(&self, example: &Example) -> Result<AttackResult> {
        let greedy = GreedyAttack::new(self.classifier, self.suggester, &self.config).run(example)?;
        if greedy.result.outcome != AttackOutcome::Exhausted || !self.config.genetic_fallback {
            return Ok(greedy.result);
        }

        info!("greedy search exhausted, starting genetic search");
        let mut result = GeneticAttack::new(self.classifier, &self.config).run(
            example,
            &greedy.original,
            &greedy.candidates,
            Some(&greedy.result.substitutions),
        )?;
        result.importance_scores = greedy.result.importance_scores;
        result.usage += greedy.result.usage;
        Ok(result)
    }

    /// Attack every example, logging and counting failures instead of
    /// stopping at the first one.
    pub fn attack_all<'e, I>(&self, examples: I) -> (Vec<AttackResult>, AttackStats)
    where
        I: IntoIterator<Item = &'e Example>,
    {
        let mut results = Vec::new();
        let mut stats = AttackStats::new();
        for (index, example) in examples.into_iter().enumerate() {
            match self.attack(example) {
                Ok(result) => {
                    stats.record(&result);
                    info!(
                        index,
                        outcome = %result.outcome,
                        success_rate = stats.success_rate(),
                        "example finished"
                    );
                    results.push(result);
                }
                Err(err) => {
                    warn!(index, error = %err, "example failed");
                    stats.record_failure();
                }
            }
        }
        (results, stats)
    }
}
