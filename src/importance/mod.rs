//! Occlusion importance of identifiers.
//!
//! Every occurrence of every identifier is masked on its own; the drop in
//! probability of the originally predicted label is that occurrence's
//! sub-score, and an identifier's importance is the sum of its sub-scores.
//! Summing (rather than averaging) promotes identifiers that occur often.
//!
//! The unmodified program travels in the same logical classifier request as
//! the masked variants and provides the baseline probability.

use crate::error::{CodeflipError, OracleKind, Result};
use crate::oracle::{BatchClassifier, Classifier};
use crate::program::TokenizedProgram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Importance of every identifier of one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Importance {
    /// Originally predicted label the scores refer to
    pub label: usize,
    /// Probability of `label` on the unmodified program
    pub baseline: f32,
    /// (identifier, summed score) in extraction order
    scores: Vec<(String, f32)>,
    /// position -> sub-score of that single occurrence
    position_scores: BTreeMap<usize, f32>,
}

impl Importance {
    /// Scores in extraction order
    #[must_use]
    pub fn scores(&self) -> &[(String, f32)] {
        &self.scores
    }

    /// Score of `name`
    #[must_use]
    pub fn score(&self, name: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Sub-score of the occurrence at `position`
    #[must_use]
    pub fn position_score(&self, position: usize) -> Option<f32> {
        self.position_scores.get(&position).copied()
    }

    /// Per-position sub-scores
    #[must_use]
    pub fn position_scores(&self) -> &BTreeMap<usize, f32> {
        &self.position_scores
    }

    /// Identifiers sorted by score, most important first.
    ///
    /// The sort is stable: equal scores keep extraction order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> =
            self.scores.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Masks occurrences and measures the probability drop.
#[derive(Debug, Clone)]
pub struct ImportanceEstimator {
    mask: String,
}

impl Default for ImportanceEstimator {
    fn default() -> Self {
        Self::new("<unk>")
    }
}

impl ImportanceEstimator {
    /// Estimator replacing occurrences with `mask`
    #[must_use]
    pub fn new(mask: impl Into<String>) -> Self {
        Self { mask: mask.into() }
    }

    /// Mask token
    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Score every identifier of `program` against `label`.
    ///
    /// Returns `Ok(None)` when the program has no identifier occurrences.
    ///
    /// # Errors
    ///
    /// Propagates classifier failures.
    pub fn estimate<C: Classifier + ?Sized>(
        &self,
        classifier: &mut BatchClassifier<'_, C>,
        program: &TokenizedProgram,
        label: usize,
    ) -> Result<Option<Importance>> {
        if program.total_positions() == 0 {
            return Ok(None);
        }

        let variants = program.masked_variants(&self.mask);
        let mut batch = Vec::with_capacity(variants.len() + 1);
        batch.push(program.tokens().to_vec());
        batch.extend(variants.iter().map(|(_, tokens)| tokens.clone()));

        let preds = classifier.classify_tokens(&batch)?;
        let (base, masked) = preds.split_first().ok_or_else(|| {
            CodeflipError::oracle(OracleKind::Classifier, "empty importance batch")
        })?;
        let baseline = base.prob(label);

        let position_scores: BTreeMap<usize, f32> = variants
            .iter()
            .zip(masked)
            .map(|((pos, _), pred)| (*pos, baseline - pred.prob(label)))
            .collect();

        let scores = program
            .identifiers()
            .iter()
            .map(|ident| {
                let total = ident
                    .positions()
                    .iter()
                    .filter_map(|p| position_scores.get(p))
                    .sum();
                (ident.name().to_string(), total)
            })
            .collect();

        debug!(
            identifiers = program.identifiers().len(),
            positions = position_scores.len(),
            baseline,
            "importance estimated"
        );

        Ok(Some(Importance {
            label,
            baseline,
            scores,
            position_scores,
        }))
    }
}
