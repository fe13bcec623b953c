//! Parameter types configuring the labeling stages.
//!
//! Defaults match the conventional particle-based airway settings: a 2 mm
//! neighbourhood, a scale ratio of 1 (no scale gating in practice), a 70°
//! alignment tolerance and an unbounded KDE region of interest.

use crate::connectivity::ConnectivityOptions;
use crate::error::{LabelError, Result};
use crate::graph::GraphOptions;
use crate::hmm::InferenceOptions;
use crate::model::ModelOptions;
use serde::{Deserialize, Serialize};

/// Labeler-wide parameters, fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelerParams {
    /// Pairwise connectivity thresholds.
    pub connectivity: ConnectivityOptions,
    /// Candidate search and root selection.
    pub graph: GraphOptions,
    /// KDE bandwidths/ROI and transition handling.
    pub model: ModelOptions,
    pub inference: InferenceOptions,
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LabelError::config(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LabelError::config(format!(
            "{name} must be a finite positive number, got {value}"
        )))
    }
}

impl LabelerParams {
    /// Reject values no stage can work with.
    ///
    /// An infinite distance threshold is accepted and switches the candidate
    /// search to the exhaustive scan.
    pub fn validate(&self) -> Result<()> {
        let c = &self.connectivity;
        non_negative("scale_ratio_threshold", c.scale_ratio_threshold)?;
        if c.particle_distance_threshold.is_nan() || c.particle_distance_threshold < 0.0 {
            return Err(LabelError::config(format!(
                "particle_distance_threshold must be non-negative, got {}",
                c.particle_distance_threshold
            )));
        }
        non_negative("particle_angle_threshold_deg", c.particle_angle_threshold_deg)?;

        let kde = &self.model.kde;
        if let Some(r) = kde.roi_radius {
            if r.is_nan() || r < 0.0 {
                return Err(LabelError::config(format!(
                    "roi_radius must be non-negative, got {r}"
                )));
            }
        }
        positive("scale_bandwidth", kde.scale_bandwidth)?;
        positive("distance_bandwidth", kde.distance_bandwidth)?;
        positive("angle_bandwidth_deg", kde.angle_bandwidth_deg)?;
        non_negative("unseen_transition", self.model.unseen_transition)?;
        non_negative("reject_likelihood", self.inference.reject_likelihood)?;
        Ok(())
    }
}
