//! Agreement between predicted and reference labels.

use crate::error::{LabelError, Result};
use crate::types::{states, ChestType, GENERATION_COUNT, STATE_COUNT};
use serde::Serialize;
use std::fmt::Write as _;

/// Dice overlap `2·|A∩B| / (|A| + |B|)`; `None` when both sets are empty.
pub fn dice(intersection: usize, in_count: usize, out_count: usize) -> Option<f64> {
    let denom = in_count + out_count;
    (denom > 0).then(|| 2.0 * intersection as f64 / denom as f64)
}

/// Confusion matrix over the HMM states, rows = reference, columns = prediction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: [[usize; STATE_COUNT]; STATE_COUNT],
    /// Pairs where either label is not an HMM state.
    ignored: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelDice {
    pub label: ChestType,
    pub name: String,
    pub reference: usize,
    pub predicted: usize,
    pub intersection: usize,
    pub dice: f64,
}

impl ConfusionMatrix {
    /// Tally `reference` against `predicted`; both must have the same length.
    pub fn from_labels(reference: &[ChestType], predicted: &[ChestType]) -> Result<Self> {
        if reference.len() != predicted.len() {
            return Err(LabelError::LabelCount {
                expected: reference.len(),
                found: predicted.len(),
            });
        }
        let mut matrix = Self::default();
        for (&r, &p) in reference.iter().zip(predicted) {
            matrix.record(r, p);
        }
        Ok(matrix)
    }

    pub fn record(&mut self, reference: ChestType, predicted: ChestType) {
        match (reference.state_index(), predicted.state_index()) {
            (Some(r), Some(p)) => self.counts[r][p] += 1,
            _ => self.ignored += 1,
        }
    }

    pub fn count(&self, reference: ChestType, predicted: ChestType) -> usize {
        match (reference.state_index(), predicted.state_index()) {
            (Some(r), Some(p)) => self.counts[r][p],
            _ => 0,
        }
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction of recorded pairs on the diagonal.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        let hits: usize = (0..STATE_COUNT).map(|s| self.counts[s][s]).sum();
        (total > 0).then(|| hits as f64 / total as f64)
    }

    pub fn reference_count(&self, label: ChestType) -> usize {
        label
            .state_index()
            .map(|r| self.counts[r].iter().sum())
            .unwrap_or(0)
    }

    pub fn predicted_count(&self, label: ChestType) -> usize {
        label
            .state_index()
            .map(|p| self.counts.iter().map(|row| row[p]).sum())
            .unwrap_or(0)
    }

    pub fn dice_of(&self, label: ChestType) -> Option<f64> {
        dice(
            self.count(label, label),
            self.reference_count(label),
            self.predicted_count(label),
        )
    }

    /// Dice of every generation present in either labeling.
    pub fn dice_report(&self) -> Vec<LabelDice> {
        states()
            .filter(|l| l.is_generation())
            .filter_map(|label| {
                let dice = self.dice_of(label)?;
                Some(LabelDice {
                    label,
                    name: label.name(),
                    reference: self.reference_count(label),
                    predicted: self.predicted_count(label),
                    intersection: self.count(label, label),
                    dice,
                })
            })
            .collect()
    }

    /// Per-generation Dice lines followed by the 11×11 generation block.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in self.dice_report() {
            let _ = writeln!(out, "Dice for {}: {:.4}", entry.name, entry.dice);
        }
        let _ = writeln!(out, "Confusion matrix (rows = reference, columns = predicted)");
        let _ = write!(out, "{:>5}", "");
        for g in 0..GENERATION_COUNT {
            let _ = write!(out, "{:>7}", format!("G{g}"));
        }
        out.push('\n');
        for r in 0..GENERATION_COUNT {
            let _ = write!(out, "{:>5}", format!("G{r}"));
            for p in 0..GENERATION_COUNT {
                let _ = write!(out, "{:>7}", self.counts[r + 1][p + 1]);
            }
            out.push('\n');
        }
        out
    }
}
