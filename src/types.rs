use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of airway generation labels (generation 0 through 10).
pub const GENERATION_COUNT: usize = 11;
/// Number of HMM states: the reject state plus every generation.
pub const STATE_COUNT: usize = GENERATION_COUNT + 1;

const GENERATION_NAMES: [&str; GENERATION_COUNT] = [
    "AIRWAYGENERATION0",
    "AIRWAYGENERATION1",
    "AIRWAYGENERATION2",
    "AIRWAYGENERATION3",
    "AIRWAYGENERATION4",
    "AIRWAYGENERATION5",
    "AIRWAYGENERATION6",
    "AIRWAYGENERATION7",
    "AIRWAYGENERATION8",
    "AIRWAYGENERATION9",
    "AIRWAYGENERATION10",
];

/// Chest-type code as stored in the `ChestType` field array.
///
/// Airway generations occupy the contiguous codes 38..=48; code 0 is the
/// undefined type. Ordering follows the numeric code, which is also the
/// tie-break order used during inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChestType(pub u8);

impl ChestType {
    pub const UNDEFINED: Self = Self(0);
    const GENERATION_BASE: u8 = 38;

    /// Label for airway generation `g`, if `g` is within 0..=10.
    pub fn generation(g: usize) -> Option<Self> {
        if g < GENERATION_COUNT {
            Some(Self(Self::GENERATION_BASE + g as u8))
        } else {
            None
        }
    }

    /// Generation depth (0 = trachea) for generation labels.
    pub fn generation_index(self) -> Option<usize> {
        let g = self.0.checked_sub(Self::GENERATION_BASE)? as usize;
        (g < GENERATION_COUNT).then_some(g)
    }

    pub fn is_generation(self) -> bool {
        self.generation_index().is_some()
    }

    /// Position in the HMM state vector: 0 for undefined, `g + 1` for
    /// generation `g`. Other chest types are not HMM states.
    pub fn state_index(self) -> Option<usize> {
        if self == Self::UNDEFINED {
            Some(0)
        } else {
            self.generation_index().map(|g| g + 1)
        }
    }

    /// Inverse of [`ChestType::state_index`].
    pub fn from_state_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::UNDEFINED),
            _ => Self::generation(idx - 1),
        }
    }

    /// Resolve a conventional type name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name == "UNDEFINEDTYPE" {
            return Some(Self::UNDEFINED);
        }
        GENERATION_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(Self::generation)
    }

    /// Decode a label stored as a floating-point field value.
    pub fn from_field_value(value: f64) -> Self {
        if value.is_finite() && (0.0..=255.0).contains(&value) {
            Self(value.round() as u8)
        } else {
            Self::UNDEFINED
        }
    }

    pub fn name(self) -> String {
        match self.generation_index() {
            Some(g) => GENERATION_NAMES[g].to_string(),
            None if self == Self::UNDEFINED => "UNDEFINEDTYPE".to_string(),
            None => format!("CHESTTYPE{}", self.0),
        }
    }
}

impl Default for ChestType {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl fmt::Display for ChestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// All HMM states in ascending code order.
pub fn states() -> impl Iterator<Item = ChestType> {
    (0..STATE_COUNT).filter_map(ChestType::from_state_index)
}

/// Per-state scores indexed by [`ChestType::state_index`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LabelScores(pub [f64; STATE_COUNT]);

impl LabelScores {
    pub fn zeros() -> Self {
        Self([0.0; STATE_COUNT])
    }

    pub fn uniform(value: f64) -> Self {
        let mut scores = [value; STATE_COUNT];
        scores[0] = 0.0;
        Self(scores)
    }

    pub fn get(&self, label: ChestType) -> f64 {
        label.state_index().map(|i| self.0[i]).unwrap_or(0.0)
    }

    pub fn set(&mut self, label: ChestType, value: f64) {
        if let Some(i) = label.state_index() {
            self.0[i] = value;
        }
    }

    pub fn add(&mut self, label: ChestType, value: f64) {
        if let Some(i) = label.state_index() {
            self.0[i] += value;
        }
    }

    /// Highest-scoring state; ties resolve to the lowest code and
    /// non-finite scores never win.
    pub fn argmax(&self) -> (ChestType, f64) {
        let mut best_idx = 0usize;
        let mut best = sanitize(self.0[0]);
        for (idx, &score) in self.0.iter().enumerate().skip(1) {
            let score = sanitize(score);
            if score > best {
                best = score;
                best_idx = idx;
            }
        }
        (
            ChestType::from_state_index(best_idx).unwrap_or(ChestType::UNDEFINED),
            best,
        )
    }
}

fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        f64::NEG_INFINITY
    }
}
