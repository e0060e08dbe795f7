//! Replacement candidates for identifiers.
//!
//! For every occurrence of an identifier the [`SuggestionOracle`] proposes
//! ranked tokens. Words the model split into several sub-pieces are merged
//! back into whole-word candidates, every proposal goes through the
//! [`CandidateFilter`], and the survivors of all occurrences are unioned:
//! an identifier is always renamed uniformly.
//!
//! Enumeration order is deterministic: occurrence order, then rank order,
//! first occurrence wins on duplicates.

mod merge;

pub use merge::{merge_pieces, strip_subword_markers};

use crate::config::AttackConfig;
use crate::error::{CodeflipError, OracleKind, Result};
use crate::lang::{is_special_token, Language};
use crate::oracle::{Suggestion, SuggestionOracle};
use crate::program::{Identifier, TokenizedProgram};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Validity rules a proposal must pass to become a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFilter {
    language: Language,
}

impl CandidateFilter {
    /// Filter for `language`
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Target language
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Normalized candidate, or `None` if `raw` may not replace `original`.
    ///
    /// Rejects blanks, model control tokens, anything that is not an
    /// identifier of the language, reserved words, and `original` itself.
    #[must_use]
    pub fn accept(&self, raw: &str, original: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_special_token(trimmed) {
            return None;
        }
        let cleaned = strip_subword_markers(trimmed);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() || cleaned == original.trim() {
            return None;
        }
        if !self.language.is_valid_identifier(cleaned) {
            return None;
        }
        Some(cleaned.to_string())
    }
}

/// Ordered, duplicate-free candidates for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    identifier: String,
    candidates: Vec<String>,
}

impl CandidateSet {
    /// Empty set for `identifier`
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            candidates: Vec::new(),
        }
    }

    /// Set with pre-validated candidates (duplicates and identity dropped)
    #[must_use]
    pub fn from_candidates<I, S>(identifier: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(identifier);
        for c in candidates {
            set.insert(c.into());
        }
        set
    }

    /// Add `candidate` unless already present or equal to the identifier
    pub fn insert(&mut self, candidate: String) -> bool {
        if candidate == self.identifier || self.candidates.contains(&candidate) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    /// Identifier these candidates replace
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Candidates in enumeration order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    /// Iterate candidates in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.candidates.iter()
    }

    /// Number of candidates
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if nothing survived filtering
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Membership test
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }
}

/// Candidate sets of every identifier of one program, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMap {
    sets: Vec<CandidateSet>,
}

impl CandidateMap {
    /// Empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the set of its identifier
    pub fn insert(&mut self, set: CandidateSet) {
        match self
            .sets
            .iter_mut()
            .find(|s| s.identifier == set.identifier)
        {
            Some(slot) => *slot = set,
            None => self.sets.push(set),
        }
    }

    /// Set for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CandidateSet> {
        self.sets.iter().find(|s| s.identifier == name)
    }

    /// Candidates for `name`, empty if unknown
    #[must_use]
    pub fn candidates(&self, name: &str) -> &[String] {
        self.get(name).map_or(&[], CandidateSet::as_slice)
    }

    /// Identifiers with at least one candidate, in extraction order
    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.sets
            .iter()
            .filter(|s| !s.is_empty())
            .map(CandidateSet::identifier)
    }

    /// Number of identifiers with at least one candidate
    #[must_use]
    pub fn attackable(&self) -> usize {
        self.sets.iter().filter(|s| !s.is_empty()).count()
    }

    /// All sets, empty ones included
    #[must_use]
    pub fn sets(&self) -> &[CandidateSet] {
        &self.sets
    }
}

impl FromIterator<CandidateSet> for CandidateMap {
    fn from_iter<T: IntoIterator<Item = CandidateSet>>(iter: T) -> Self {
        let mut map = Self::new();
        for set in iter {
            map.insert(set);
        }
        map
    }
}

/// Queries the suggestion oracle and turns proposals into candidates.
#[derive(Debug)]
pub struct CandidateProvider<'a, S: ?Sized> {
    oracle: &'a S,
    config: &'a AttackConfig,
    filter: CandidateFilter,
    calls: usize,
}

impl<'a, S: SuggestionOracle + ?Sized> CandidateProvider<'a, S> {
    /// Provider using `config.language` rules
    #[must_use]
    pub fn new(oracle: &'a S, config: &'a AttackConfig) -> Self {
        Self {
            oracle,
            config,
            filter: CandidateFilter::new(config.language),
            calls: 0,
        }
    }

    /// Suggestion oracle calls made so far
    #[must_use]
    pub fn suggestion_calls(&self) -> usize {
        self.calls
    }

    /// Validated candidates for `ident`, unioned over all its occurrences.
    ///
    /// An identifier whose own name is not a valid identifier of the language
    /// gets an empty set without querying the oracle.
    ///
    /// # Errors
    ///
    /// Propagates suggestion-oracle failures; non-finite scores are reported
    /// as oracle failures.
    pub fn candidates_for(
        &mut self,
        program: &TokenizedProgram,
        ident: &Identifier,
    ) -> Result<CandidateSet> {
        let mut set = CandidateSet::new(ident.name());
        if !self.filter.language().is_valid_identifier(ident.name()) {
            trace!(identifier = ident.name(), "not renameable, skipped");
            return Ok(set);
        }

        for &pos in ident.positions() {
            let pieces = self.oracle.suggest(program, pos, self.config.top_k)?;
            self.calls += 1;
            for raw in self.proposals(&pieces)? {
                if let Some(candidate) = self.filter.accept(&raw, ident.name()) {
                    set.insert(candidate);
                }
            }
        }

        trace!(
            identifier = ident.name(),
            candidates = set.len(),
            "candidate set built"
        );
        Ok(set)
    }

    /// Candidate sets for every identifier of `program`.
    ///
    /// # Errors
    ///
    /// See [`Self::candidates_for`].
    pub fn build_map(&mut self, program: &TokenizedProgram) -> Result<CandidateMap> {
        let mut map = CandidateMap::new();
        for ident in program.identifiers() {
            map.insert(self.candidates_for(program, ident)?);
        }
        debug!(
            identifiers = program.identifiers().len(),
            attackable = map.attackable(),
            "candidate map built"
        );
        Ok(map)
    }

    /// Raw whole-word proposals for one occurrence, best first.
    fn proposals(&self, pieces: &[Vec<Suggestion>]) -> Result<Vec<String>> {
        if pieces
            .iter()
            .flatten()
            .any(|s| !s.score.is_finite())
        {
            return Err(CodeflipError::oracle(
                OracleKind::Suggestion,
                "non-finite suggestion score",
            ));
        }

        match pieces {
            [] => Ok(Vec::new()),
            [single] => {
                let threshold = self.config.threshold_pred_score;
                Ok(single
                    .iter()
                    .take(self.config.top_k)
                    .take_while(|s| threshold == 0.0 || s.score >= threshold)
                    .map(|s| s.token.clone())
                    .collect())
            }
            _ if self.config.use_bpe => Ok(merge_pieces(
                pieces,
                self.config.bpe_top_k,
                self.config.max_bpe_candidates,
            )),
            _ => Ok(Vec::new()),
        }
    }
}

/// Deduplicate `items` keeping first occurrences.
pub(crate) fn dedup_ordered(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
