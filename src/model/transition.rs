use super::normal_pdf;
use crate::types::{ChestType, GENERATION_COUNT};
use log::debug;
use serde::{Deserialize, Serialize};

/// Gaussian moments of the branch observations for one label pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionStats {
    pub scale_diff_mean: f64,
    pub scale_diff_variance: f64,
    pub angle_mean: f64,
    pub angle_variance: f64,
}

impl TransitionStats {
    /// Joint density of an observed scale difference and branch angle.
    pub fn density(&self, scale_diff: f64, angle_deg: f64) -> f64 {
        normal_pdf(scale_diff, self.scale_diff_mean, self.scale_diff_variance)
            * normal_pdf(angle_deg, self.angle_mean, self.angle_variance)
    }
}

/// How stored transition information becomes a likelihood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Stored probability only.
    Direct,
    /// Gaussian density of the branch observations only.
    Gaussian,
    /// Product of both when both exist, otherwise whichever exists.
    Combined,
}

/// Transition information for every (from, to) generation pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransitionTable {
    probabilities: [[Option<f64>; GENERATION_COUNT]; GENERATION_COUNT],
    stats: [[Option<TransitionStats>; GENERATION_COUNT]; GENERATION_COUNT],
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(from: ChestType, to: ChestType) -> Option<(usize, usize)> {
        Some((from.generation_index()?, to.generation_index()?))
    }

    pub fn set_probability(&mut self, from: ChestType, to: ChestType, probability: f64) -> bool {
        match Self::slot(from, to) {
            Some((f, t)) => {
                self.probabilities[f][t] = Some(probability);
                true
            }
            None => false,
        }
    }

    pub fn set_stats(&mut self, from: ChestType, to: ChestType, stats: TransitionStats) -> bool {
        match Self::slot(from, to) {
            Some((f, t)) => {
                self.stats[f][t] = Some(stats);
                true
            }
            None => false,
        }
    }

    pub fn probability(&self, from: ChestType, to: ChestType) -> Option<f64> {
        let (f, t) = Self::slot(from, to)?;
        self.probabilities[f][t]
    }

    pub fn stats(&self, from: ChestType, to: ChestType) -> Option<&TransitionStats> {
        let (f, t) = Self::slot(from, to)?;
        self.stats[f][t].as_ref()
    }

    pub fn probability_count(&self) -> usize {
        self.probabilities.iter().flatten().filter(|p| p.is_some()).count()
    }

    pub fn stats_count(&self) -> usize {
        self.stats.iter().flatten().filter(|s| s.is_some()).count()
    }

    /// Overlay `other`; entries present in `other` win.
    pub fn merge(&mut self, other: &TransitionTable) {
        for f in 0..GENERATION_COUNT {
            for t in 0..GENERATION_COUNT {
                if other.probabilities[f][t].is_some() {
                    self.probabilities[f][t] = other.probabilities[f][t];
                }
                if other.stats[f][t].is_some() {
                    self.stats[f][t] = other.stats[f][t];
                }
            }
        }
    }

    /// Transition likelihood for a parent→child step.
    ///
    /// Returns `None` when the table holds nothing usable for the pair under
    /// `mode`; the caller substitutes its floor value.
    pub fn likelihood(
        &self,
        mode: TransitionMode,
        from: ChestType,
        to: ChestType,
        scale_diff: f64,
        angle_deg: f64,
    ) -> Option<f64> {
        let direct = self.probability(from, to);
        let gaussian = self.stats(from, to).map(|s| s.density(scale_diff, angle_deg));
        match mode {
            TransitionMode::Direct => direct,
            TransitionMode::Gaussian => gaussian,
            TransitionMode::Combined => match (direct, gaussian) {
                (Some(p), Some(d)) => Some(p * d),
                (p, d) => p.or(d),
            },
        }
    }

    /// Row sums of the direct probabilities, for rows with any entry.
    ///
    /// Rows are not required to sum to one; this only feeds diagnostics.
    pub fn row_sums(&self) -> Vec<(ChestType, f64)> {
        self.probabilities
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .filter_map(|(f, row)| {
                let label = ChestType::generation(f)?;
                Some((label, row.iter().flatten().sum()))
            })
            .collect()
    }

    pub(crate) fn log_row_sums(&self) {
        for (label, sum) in self.row_sums() {
            if (sum - 1.0).abs() > 1e-3 {
                debug!("transition row {} sums to {:.4}", label, sum);
            }
        }
    }
}
