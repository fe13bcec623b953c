use crate::types::{ChestType, GENERATION_COUNT};
use serde::{Deserialize, Serialize};

/// Emission statistics for one generation label.
///
/// The scale/distance/angle moments describe how atlas particles of this
/// label differ from a query particle of the same label; they parameterise
/// the label's KDE kernel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionStats {
    pub scale_mean: f64,
    pub scale_std: f64,
    pub distance_mean: f64,
    pub distance_std: f64,
    pub angle_mean: f64,
    pub angle_std: f64,
    pub sample_count: f64,
}

/// Emission statistics keyed by generation label.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EmissionTable {
    entries: [Option<EmissionStats>; GENERATION_COUNT],
}

impl EmissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store statistics for a generation label; other labels are ignored.
    pub fn set(&mut self, label: ChestType, stats: EmissionStats) -> bool {
        match label.generation_index() {
            Some(g) => {
                self.entries[g] = Some(stats);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, label: ChestType) -> Option<&EmissionStats> {
        label
            .generation_index()
            .and_then(|g| self.entries[g].as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlay `other` onto `self`; entries present in `other` win.
    pub fn merge(&mut self, other: &EmissionTable) {
        for (dst, src) in self.entries.iter_mut().zip(other.entries.iter()) {
            if src.is_some() {
                *dst = *src;
            }
        }
    }
}
