//! Interfaces to the external oracles.
//!
//! The search engines never look inside a model. They send batches of
//! programs to a [`Classifier`] and ask a [`SuggestionOracle`] for ranked
//! replacement tokens, nothing else.
//!
//! [`BatchClassifier`] sits between the engines and the classifier: it keeps
//! every physical call within the configured batch limit, rejects malformed
//! answers as [`CodeflipError::OracleFailure`] and counts usage.

use crate::error::{CodeflipError, OracleKind, Result};
use crate::program::TokenizedProgram;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Classifier output for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability per label
    pub probs: Vec<f32>,
    /// Predicted label
    pub label: usize,
}

impl Prediction {
    /// Create a prediction with an explicit label
    #[must_use]
    pub fn new(probs: Vec<f32>, label: usize) -> Self {
        Self { probs, label }
    }

    /// Create a prediction labelled with the arg-max of `probs`
    #[must_use]
    pub fn from_probs(probs: Vec<f32>) -> Self {
        let label = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(0, |(i, _)| i);
        Self { probs, label }
    }

    /// Probability assigned to `label` (0 if out of range)
    #[must_use]
    pub fn prob(&self, label: usize) -> f32 {
        self.probs.get(label).copied().unwrap_or(0.0)
    }

    /// Probability of the predicted label
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.prob(self.label)
    }
}

/// Black-box classification model.
pub trait Classifier {
    /// Classify a batch of programs, one prediction per input, same order.
    ///
    /// # Errors
    ///
    /// Any error is treated as a fatal oracle failure for the current example.
    fn classify(&self, programs: &[String]) -> Result<Vec<Prediction>>;
}

impl<F> Classifier for F
where
    F: Fn(&[String]) -> Result<Vec<Prediction>>,
{
    fn classify(&self, programs: &[String]) -> Result<Vec<Prediction>> {
        self(programs)
    }
}

/// One ranked replacement proposal for a sub-piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Proposed token (may carry subword markers)
    pub token: String,
    /// Model score, higher is better
    pub score: f32,
}

impl Suggestion {
    /// Create a suggestion
    #[must_use]
    pub fn new(token: impl Into<String>, score: f32) -> Self {
        Self {
            token: token.into(),
            score,
        }
    }
}

/// Masked-language-model style replacement suggestions.
pub trait SuggestionOracle {
    /// Ranked suggestions for the word at `position`.
    ///
    /// The outer vector has one entry per sub-piece the model split the word
    /// into (a single entry for unsplit words); each inner list is ranked
    /// best-first and holds at most `top_k` suggestions.
    ///
    /// # Errors
    ///
    /// Any error is treated as a fatal oracle failure for the current example.
    fn suggest(
        &self,
        program: &TokenizedProgram,
        position: usize,
        top_k: usize,
    ) -> Result<Vec<Vec<Suggestion>>>;
}

impl<F> SuggestionOracle for F
where
    F: Fn(&TokenizedProgram, usize, usize) -> Result<Vec<Vec<Suggestion>>>,
{
    fn suggest(
        &self,
        program: &TokenizedProgram,
        position: usize,
        top_k: usize,
    ) -> Result<Vec<Vec<Suggestion>>> {
        self(program, position, top_k)
    }
}

/// Oracle usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleUsage {
    /// Physical classifier calls
    pub classifier_calls: usize,
    /// Programs sent to the classifier
    pub programs_classified: usize,
    /// Suggestion oracle calls
    pub suggestion_calls: usize,
}

impl AddAssign for OracleUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.classifier_calls += rhs.classifier_calls;
        self.programs_classified += rhs.programs_classified;
        self.suggestion_calls += rhs.suggestion_calls;
    }
}

/// Batch-limited, validating front for a [`Classifier`].
#[derive(Debug)]
pub struct BatchClassifier<'a, C: ?Sized> {
    inner: &'a C,
    max_batch: usize,
    num_labels: Option<usize>,
    usage: OracleUsage,
}

impl<'a, C: Classifier + ?Sized> BatchClassifier<'a, C> {
    /// Wrap `inner`, never sending more than `max_batch` programs per call.
    #[must_use]
    pub fn new(inner: &'a C, max_batch: usize) -> Self {
        Self {
            inner,
            max_batch: max_batch.max(1),
            num_labels: None,
            usage: OracleUsage::default(),
        }
    }

    /// Pin the expected label-space size (otherwise learned from the first answer).
    #[must_use]
    pub fn with_num_labels(mut self, num_labels: usize) -> Self {
        self.num_labels = Some(num_labels);
        self
    }

    /// Classify `programs`, split into batches of at most `max_batch`.
    ///
    /// # Errors
    ///
    /// Propagates classifier errors and reports malformed answers (wrong
    /// length, empty or non-finite probabilities, label out of range,
    /// changing label space) as oracle failures.
    pub fn classify(&mut self, programs: &[String]) -> Result<Vec<Prediction>> {
        let mut out = Vec::with_capacity(programs.len());
        for chunk in programs.chunks(self.max_batch) {
            let preds = self.inner.classify(chunk)?;
            self.usage.classifier_calls += 1;
            self.usage.programs_classified += chunk.len();

            if preds.len() != chunk.len() {
                return Err(CodeflipError::oracle(
                    OracleKind::Classifier,
                    format!("expected {} predictions, got {}", chunk.len(), preds.len()),
                ));
            }
            for pred in &preds {
                self.validate(pred)?;
            }
            out.extend(preds);
        }
        Ok(out)
    }

    /// Classify token sequences (joined by single spaces).
    ///
    /// # Errors
    ///
    /// See [`Self::classify`].
    pub fn classify_tokens(&mut self, variants: &[Vec<String>]) -> Result<Vec<Prediction>> {
        let programs: Vec<String> = variants.iter().map(|t| t.join(" ")).collect();
        self.classify(&programs)
    }

    /// Classify a single program.
    ///
    /// # Errors
    ///
    /// See [`Self::classify`].
    pub fn classify_one(&mut self, program: &str) -> Result<Prediction> {
        self.classify(&[program.to_string()])?
            .pop()
            .ok_or_else(|| CodeflipError::oracle(OracleKind::Classifier, "empty answer"))
    }

    /// Usage so far
    #[must_use]
    pub fn usage(&self) -> OracleUsage {
        self.usage
    }

    /// Batch limit
    #[must_use]
    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    fn validate(&mut self, pred: &Prediction) -> Result<()> {
        if pred.probs.is_empty() {
            return Err(CodeflipError::oracle(
                OracleKind::Classifier,
                "empty probability vector",
            ));
        }
        if pred.probs.iter().any(|p| !p.is_finite()) {
            return Err(CodeflipError::oracle(
                OracleKind::Classifier,
                "non-finite probability",
            ));
        }
        if pred.label >= pred.probs.len() {
            return Err(CodeflipError::oracle(
                OracleKind::Classifier,
                format!(
                    "label {} out of range for {} classes",
                    pred.label,
                    pred.probs.len()
                ),
            ));
        }
        match self.num_labels {
            Some(n) if n != pred.probs.len() => Err(CodeflipError::oracle(
                OracleKind::Classifier,
                format!(
                    "label space changed: expected {n} classes, got {}",
                    pred.probs.len()
                ),
            )),
            Some(_) => Ok(()),
            None => {
                self.num_labels = Some(pred.probs.len());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests;
