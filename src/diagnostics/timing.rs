//! Wall-clock timings of the three labeling stages.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Timed stages of [`crate::AirwayLabeler::process_with_diagnostics`], in
/// run order. Model construction happens before the run and is not timed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelingStage {
    Graph,
    Forest,
    Inference,
}

impl LabelingStage {
    pub const ALL: [LabelingStage; 3] = [Self::Graph, Self::Forest, Self::Inference];

    pub fn name(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Forest => "forest",
            Self::Inference => "inference",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub stage: LabelingStage,
    pub elapsed_ms: f64,
}

/// Stage timings of one labeling run plus the end-to-end total, which also
/// covers building the diagnostics records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    /// Record `stage`; a repeated stage replaces the earlier entry.
    pub fn record(&mut self, stage: LabelingStage, elapsed_ms: f64) {
        match self.stages.iter_mut().find(|s| s.stage == stage) {
            Some(existing) => existing.elapsed_ms = elapsed_ms,
            None => self.stages.push(StageTiming { stage, elapsed_ms }),
        }
    }

    pub fn stage(&self, stage: LabelingStage) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.elapsed_ms)
    }

    pub fn stages_ms(&self) -> f64 {
        self.stages.iter().map(|s| s.elapsed_ms).sum()
    }
}
