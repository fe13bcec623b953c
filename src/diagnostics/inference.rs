use crate::hmm::Labeling;
use crate::types::states;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub name: String,
    pub count: usize,
}

/// Label histogram produced by the HMM pass. Labels with no particles are
/// omitted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStage {
    pub elapsed_ms: f64,
    pub labeled: usize,
    pub undefined: usize,
    pub label_counts: Vec<LabelCount>,
}

impl InferenceStage {
    pub fn new(labeling: &Labeling, elapsed_ms: f64) -> Self {
        let counts = labeling.counts();
        let label_counts = states()
            .zip(counts)
            .filter(|(label, count)| label.is_generation() && *count > 0)
            .map(|(label, count)| LabelCount {
                name: label.name(),
                count,
            })
            .collect();
        let undefined = labeling.undefined_count();
        Self {
            elapsed_ms,
            labeled: labeling.len() - undefined,
            undefined,
            label_counts,
        }
    }
}
