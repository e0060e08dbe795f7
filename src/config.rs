//! Attack configuration.
//!
//! Defaults: batches of 4, top-30 suggestions per masked position,
//! crossover probability 0.7, C sources.
//!
//! # Example
//!
//! ```
//! use codeflip::config::AttackConfig;
//! use codeflip::lang::Language;
//!
//! let config = AttackConfig::new()
//!     .with_language(Language::Java)
//!     .with_eval_batch_size(16)
//!     .with_seed(42);
//! assert!(config.validate().is_ok());
//!
//! let parsed = AttackConfig::from_json_str(r#"{ "language": "python", "top_k": 10 }"#).unwrap();
//! assert_eq!(parsed.top_k, 10);
//! assert_eq!(parsed.eval_batch_size, 4);
//! ```

use crate::error::{CodeflipError, Result};
use crate::lang::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by the candidate provider and both search engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Source language of the attacked programs
    pub language: Language,
    /// Maximum programs per classifier call; also the number of children
    /// the genetic engine evaluates per iteration
    pub eval_batch_size: usize,
    /// Suggestions requested per masked sub-piece
    pub top_k: usize,
    /// Single-piece suggestions scoring below this are dropped; 0 disables
    /// the cut so log-probabilities and logits pass
    pub threshold_pred_score: f32,
    /// Merge multi-piece words into whole-word candidates
    pub use_bpe: bool,
    /// Pieces kept per sub-position when merging
    pub bpe_top_k: usize,
    /// Merged candidates kept per occurrence
    pub max_bpe_candidates: usize,
    /// Token substituted for an occurrence during importance estimation
    pub mask_token: String,
    /// Crossover probability in the genetic engine
    pub crossover_prob: f64,
    /// Genetic iteration budget (default: `max(5 * population, 10)`)
    pub max_iterations: Option<usize>,
    /// Run the genetic engine when greedy search is exhausted
    pub genetic_fallback: bool,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            language: Language::C,
            eval_batch_size: 4,
            top_k: 30,
            threshold_pred_score: 0.0,
            use_bpe: true,
            bpe_top_k: 4,
            max_bpe_candidates: 24,
            mask_token: "<unk>".to_string(),
            crossover_prob: 0.7,
            max_iterations: None,
            genetic_fallback: true,
            seed: None,
        }
    }
}

impl AttackConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set source language
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set batch size
    #[must_use]
    pub fn with_eval_batch_size(mut self, size: usize) -> Self {
        self.eval_batch_size = size;
        self
    }

    /// Set suggestions per masked position
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set minimum suggestion score
    #[must_use]
    pub fn with_threshold_pred_score(mut self, threshold: f32) -> Self {
        self.threshold_pred_score = threshold;
        self
    }

    /// Enable or disable subword merging
    #[must_use]
    pub fn with_bpe(mut self, use_bpe: bool) -> Self {
        self.use_bpe = use_bpe;
        self
    }

    /// Set the mask token
    #[must_use]
    pub fn with_mask_token(mut self, mask: impl Into<String>) -> Self {
        self.mask_token = mask.into();
        self
    }

    /// Set crossover probability
    #[must_use]
    pub fn with_crossover_prob(mut self, prob: f64) -> Self {
        self.crossover_prob = prob.clamp(0.0, 1.0);
        self
    }

    /// Override the genetic iteration budget
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Enable or disable the genetic fallback
    #[must_use]
    pub fn with_genetic_fallback(mut self, enabled: bool) -> Self {
        self.genetic_fallback = enabled;
        self
    }

    /// Set random seed for reproducibility
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CodeflipError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.eval_batch_size == 0 {
            return Err(CodeflipError::invalid_config(
                "eval_batch_size",
                self.eval_batch_size,
                ">= 1",
            ));
        }
        if self.top_k == 0 {
            return Err(CodeflipError::invalid_config("top_k", self.top_k, ">= 1"));
        }
        if self.use_bpe && (self.bpe_top_k == 0 || self.max_bpe_candidates == 0) {
            return Err(CodeflipError::invalid_config(
                "bpe_top_k/max_bpe_candidates",
                format!("{}/{}", self.bpe_top_k, self.max_bpe_candidates),
                ">= 1 when use_bpe is set",
            ));
        }
        if !self.threshold_pred_score.is_finite() {
            return Err(CodeflipError::invalid_config(
                "threshold_pred_score",
                self.threshold_pred_score,
                "a finite number",
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_prob) {
            return Err(CodeflipError::invalid_config(
                "crossover_prob",
                self.crossover_prob,
                "in [0, 1]",
            ));
        }
        if self.mask_token.trim().is_empty() {
            return Err(CodeflipError::invalid_config(
                "mask_token",
                format!("{:?}", self.mask_token),
                "a non-blank token",
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(CodeflipError::invalid_config("max_iterations", 0, ">= 1"));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON, or a config error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, serialization or config error.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error (not expected for this type).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
