//! Scripted oracles shared by the integration tests.

#![allow(dead_code)]

use codeflip::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;

/// Install a test subscriber once; `RUST_LOG=codeflip=debug` shows engine logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two-label classifier scripted on whole tokens.
///
/// P(label 0) starts at `base` and drops by the weight of every listed token
/// present in the program. Any `flip` combination present forces label 1.
#[derive(Debug)]
pub struct ScriptedClassifier {
    base: f32,
    drops: Vec<(String, f32)>,
    flips: Vec<Vec<String>>,
    floor: f32,
    batches: RefCell<Vec<Vec<String>>>,
}

impl ScriptedClassifier {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            drops: Vec::new(),
            flips: Vec::new(),
            floor: 0.0,
            batches: RefCell::new(Vec::new()),
        }
    }

    pub fn drop_on(mut self, token: &str, weight: f32) -> Self {
        self.drops.push((token.to_string(), weight));
        self
    }

    /// Label 1 whenever all of `tokens` are present
    pub fn flip_on(mut self, tokens: &[&str]) -> Self {
        self.flips
            .push(tokens.iter().map(|t| (*t).to_string()).collect());
        self
    }

    /// P(label 0) never falls below `floor` without a flip combination
    pub fn with_floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    /// Sizes of every physical call
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.borrow().iter().map(Vec::len).collect()
    }

    /// Every program sent, in order
    pub fn programs(&self) -> Vec<String> {
        self.batches.borrow().iter().flatten().cloned().collect()
    }

    fn predict(&self, program: &str) -> Prediction {
        let tokens: Vec<&str> = program.split(' ').collect();
        let has = |t: &str| tokens.contains(&t);
        if self
            .flips
            .iter()
            .any(|combo| combo.iter().all(|t| has(t)))
        {
            return Prediction::new(vec![0.2, 0.8], 1);
        }
        let mut p0 = self.base;
        for (token, weight) in &self.drops {
            if has(token) {
                p0 -= weight;
            }
        }
        let p0 = p0.max(self.floor);
        let label = usize::from(p0 < 0.5);
        Prediction::new(vec![p0, 1.0 - p0], label)
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, programs: &[String]) -> codeflip::Result<Vec<Prediction>> {
        self.batches.borrow_mut().push(programs.to_vec());
        Ok(programs.iter().map(|p| self.predict(p)).collect())
    }
}

/// Suggestions keyed by the token currently at the queried position.
#[derive(Debug, Default)]
pub struct ScriptedSuggestions {
    by_token: HashMap<String, Vec<Vec<Suggestion>>>,
    calls: RefCell<Vec<usize>>,
}

impl ScriptedSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-piece suggestions for every occurrence of `token`, ranked
    /// best first with descending scores
    pub fn on(mut self, token: &str, words: &[&str]) -> Self {
        let ranked = words
            .iter()
            .enumerate()
            .map(|(i, w)| Suggestion::new(*w, 1.0 - 0.01 * i as f32))
            .collect();
        self.by_token.insert(token.to_string(), vec![ranked]);
        self
    }

    /// Positions queried, in order
    pub fn calls(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }
}

impl SuggestionOracle for ScriptedSuggestions {
    fn suggest(
        &self,
        program: &TokenizedProgram,
        position: usize,
        top_k: usize,
    ) -> codeflip::Result<Vec<Vec<Suggestion>>> {
        self.calls.borrow_mut().push(position);
        let token = &program.tokens()[position];
        Ok(self
            .by_token
            .get(token)
            .map(|pieces| {
                pieces
                    .iter()
                    .map(|p| p.iter().take(top_k).cloned().collect())
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Example over whitespace tokens of `source`
pub fn example(source: &str, names: &[&str], true_label: usize) -> Example {
    Example::new(
        source,
        TokenizedProgram::from_source(source, names.iter().copied()),
        true_label,
    )
}
