//! Success-rate bookkeeping over many attacks.

use crate::attack::{AttackOutcome, AttackResult};
use crate::oracle::OracleUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Running totals over finished attacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    /// Results recorded
    pub examples: usize,
    /// Results whose outcome code is >= -2
    pub attempted: usize,
    /// Results that flipped the label
    pub successes: usize,
    /// Examples aborted by an oracle failure
    pub failures: usize,
    /// Count per outcome code
    pub outcomes: BTreeMap<i8, usize>,
    /// Identifiers renamed, summed over successes
    pub changed_vars: usize,
    /// Positions rewritten, summed over successes
    pub changed_positions: usize,
    /// Program length, summed over successes
    pub success_program_length: usize,
    /// Oracle usage of every recorded result
    pub usage: OracleUsage,
}

impl AttackStats {
    /// Empty totals
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals over `results`
    #[must_use]
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a AttackResult>) -> Self {
        let mut stats = Self::new();
        for result in results {
            stats.record(result);
        }
        stats
    }

    /// Add one finished attack.
    pub fn record(&mut self, result: &AttackResult) {
        self.examples += 1;
        *self.outcomes.entry(result.outcome.code()).or_default() += 1;
        self.usage += result.usage;
        if result.outcome.is_attempted() {
            self.attempted += 1;
        }
        if result.outcome.is_success() {
            self.successes += 1;
            self.changed_vars += result.nb_changed_var;
            self.changed_positions += result.nb_changed_pos;
            self.success_program_length += result.program_length;
        }
    }

    /// Count an example that ended in an error.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Results with `outcome`
    #[must_use]
    pub fn count(&self, outcome: AttackOutcome) -> usize {
        self.outcomes.get(&outcome.code()).copied().unwrap_or(0)
    }

    /// Successes over attempted attacks (0 when nothing was attempted)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempted as f64
        }
    }

    /// Mean identifiers renamed per success
    #[must_use]
    pub fn avg_changed_vars(&self) -> f64 {
        ratio(self.changed_vars, self.successes)
    }

    /// Mean positions rewritten per success
    #[must_use]
    pub fn avg_changed_positions(&self) -> f64 {
        ratio(self.changed_positions, self.successes)
    }

    /// Share of tokens rewritten over all successful programs
    #[must_use]
    pub fn changed_position_ratio(&self) -> f64 {
        ratio(self.changed_positions, self.success_program_length)
    }

    /// Mean programs classified per recorded example
    #[must_use]
    pub fn avg_queries(&self) -> f64 {
        ratio(self.usage.programs_classified, self.examples)
    }
}

fn ratio(total: usize, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        total as f64 / n as f64
    }
}

impl fmt::Display for AttackStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "success rate {:.4} ({}/{}), {} examples, {} failures, {:.2} vars / {:.2} positions per success, {:.1} queries per example",
            self.success_rate(),
            self.successes,
            self.attempted,
            self.examples,
            self.failures,
            self.avg_changed_vars(),
            self.avg_changed_positions(),
            self.avg_queries()
        )
    }
}
