//! Importance-ranked greedy renaming.
//!
//! Identifiers are visited most-important first. For each one every
//! candidate is applied on top of the renames committed so far and the
//! whole set is classified in one batch. The first candidate that flips the
//! label wins; otherwise the candidate with the largest strictly positive
//! probability drop is committed and the search moves on.

use super::{AttackOutcome, AttackResult, Example};
use crate::candidates::{CandidateMap, CandidateProvider};
use crate::config::AttackConfig;
use crate::error::Result;
use crate::importance::ImportanceEstimator;
use crate::oracle::{BatchClassifier, Classifier, OracleUsage, Prediction, SuggestionOracle};
use tracing::{debug, info};

/// Greedy engine output plus what the genetic fallback reuses.
#[derive(Debug, Clone)]
pub struct GreedyRun {
    /// Greedy result
    pub result: AttackResult,
    /// Prediction on the unmodified program
    pub original: Prediction,
    /// Candidate sets fetched during the search
    pub candidates: CandidateMap,
}

/// Greedy attack engine.
#[derive(Debug)]
pub struct GreedyAttack<'a, C: ?Sized, S: ?Sized> {
    classifier: &'a C,
    suggester: &'a S,
    config: &'a AttackConfig,
}

impl<'a, C, S> GreedyAttack<'a, C, S>
where
    C: Classifier + ?Sized,
    S: SuggestionOracle + ?Sized,
{
    /// Create an engine over the two oracles
    #[must_use]
    pub fn new(classifier: &'a C, suggester: &'a S, config: &'a AttackConfig) -> Self {
        Self {
            classifier,
            suggester,
            config,
        }
    }

    /// Attack `example`.
    ///
    /// # Errors
    ///
    /// Propagates oracle failures; no partial result is returned.
    pub fn run(&self, example: &Example) -> Result<GreedyRun> {
        let program = &example.program;
        let mut clf = BatchClassifier::new(self.classifier, self.config.eval_batch_size);
        let mut provider = CandidateProvider::new(self.suggester, self.config);
        let mut candidates = CandidateMap::new();

        let original = clf.classify_one(&program.code())?;
        let label = original.label;
        let mut result = AttackResult::pending(example, label);

        if label != example.true_label {
            debug!(predicted = label, truth = example.true_label, "already misclassified");
            let result = finish(
                result,
                AttackOutcome::AlreadyMisclassified,
                clf.usage(),
                provider.suggestion_calls(),
            );
            return Ok(GreedyRun {
                result,
                original,
                candidates,
            });
        }
        if program.identifiers().is_empty() {
            let result = finish(
                result,
                AttackOutcome::NoIdentifiers,
                clf.usage(),
                provider.suggestion_calls(),
            );
            return Ok(GreedyRun {
                result,
                original,
                candidates,
            });
        }

        let estimator = ImportanceEstimator::new(self.config.mask_token.clone());
        let Some(importance) = estimator.estimate(&mut clf, program, label)? else {
            let result = finish(
                result,
                AttackOutcome::NoIdentifiers,
                clf.usage(),
                provider.suggestion_calls(),
            );
            return Ok(GreedyRun {
                result,
                original,
                candidates,
            });
        };
        result.importance_scores = importance.scores().iter().map(|(_, s)| *s).collect();
        info!(identifiers = program.identifiers().len(), "greedy search started");

        let mut working = program.working();
        let mut current_prob = original.prob(label);
        let mut outcome = AttackOutcome::Exhausted;

        for (name, _) in importance.ranked() {
            let Some(ident) = program.identifier(name) else {
                continue;
            };
            let set = provider.candidates_for(program, ident)?;
            candidates.insert(set.clone());
            if set.is_empty() {
                debug!(identifier = name, "no valid candidates, skipped");
                continue;
            }

            let variants: Vec<Vec<String>> =
                set.iter().map(|c| working.preview(ident, c)).collect();
            let preds = clf.classify_tokens(&variants)?;
            result.final_label = Some(label);

            if let Some(i) = preds.iter().position(|p| p.label != label) {
                let replacement = &set.as_slice()[i];
                working = working.renamed(ident, replacement);
                result.final_label = Some(preds[i].label);
                info!(
                    "SUC! {} => {} ({:.5} => {:.5})",
                    name,
                    replacement,
                    current_prob,
                    preds[i].prob(label)
                );
                outcome = AttackOutcome::Success;
                break;
            }

            match best_gap(&preds, label, current_prob) {
                Some((i, gap)) => {
                    let replacement = &set.as_slice()[i];
                    working = working.renamed(ident, replacement);
                    info!(
                        "ACC! {} => {} ({:.5} => {:.5})",
                        name,
                        replacement,
                        current_prob,
                        current_prob - gap
                    );
                    current_prob -= gap;
                }
                None => working = working.kept(ident),
            }
        }

        if working.renames().iter().any(|(from, to)| from != to) {
            result.commit(program, working.renames().clone(), working.code());
        } else {
            result.substitutions = working.renames().clone();
        }
        let result = finish(result, outcome, clf.usage(), provider.suggestion_calls());
        debug!(
            outcome = %result.outcome,
            changed = result.nb_changed_var,
            "greedy search finished"
        );

        Ok(GreedyRun {
            result,
            original,
            candidates,
        })
    }
}

/// Index and size of the largest strictly positive drop of `label`'s
/// probability below `current`; the first candidate wins ties.
pub(crate) fn best_gap(preds: &[Prediction], label: usize, current: f32) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, pred) in preds.iter().enumerate() {
        let gap = current - pred.prob(label);
        if gap > best.map_or(0.0, |(_, g)| g) {
            best = Some((i, gap));
        }
    }
    best
}

fn finish(
    mut result: AttackResult,
    outcome: AttackOutcome,
    mut usage: OracleUsage,
    suggestion_calls: usize,
) -> AttackResult {
    usage.suggestion_calls = suggestion_calls;
    result.outcome = outcome;
    result.usage = usage;
    result
}
