//! Pairwise connectivity test between airway particles.
//!
//! Two particles are joined by a graph edge when they have comparable scale,
//! lie within the distance threshold, and both minor eigenvectors are
//! aligned with the vector connecting them. Eigenvector sign is arbitrary,
//! so alignment angles are folded into [0°, 90°].

use crate::angle::angle_between_dirless_deg;
use crate::particles::ParticleSet;
use serde::{Deserialize, Serialize};

/// Thresholds controlling edge formation.
///
/// - `scale_ratio_threshold`: maximum `|s_i - s_j| / max(s_i, s_j)`.
/// - `particle_distance_threshold`: maximum Euclidean distance (mm).
/// - `particle_angle_threshold_deg`: maximum angle between either particle's
///   minor eigenvector and the connecting vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityOptions {
    pub scale_ratio_threshold: f64,
    pub particle_distance_threshold: f64,
    pub particle_angle_threshold_deg: f64,
}

impl Default for ConnectivityOptions {
    fn default() -> Self {
        Self {
            scale_ratio_threshold: 1.0,
            particle_distance_threshold: 2.0,
            particle_angle_threshold_deg: 70.0,
        }
    }
}

/// Geometry of an accepted particle pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PairGeometry {
    pub distance: f64,
    /// Angle between the first particle's `hevec2` and the connecting vector.
    pub angle_i_deg: f64,
    /// Angle between the second particle's `hevec2` and the connecting vector.
    pub angle_j_deg: f64,
}

impl PairGeometry {
    /// Edge weight used by the spanning pass; smaller is a stronger link.
    /// Monotonic in the distance and in both alignment angles.
    pub fn weight(&self) -> f64 {
        self.distance * (1.0 + (self.angle_i_deg + self.angle_j_deg) / 180.0)
    }
}

/// Reason a pair was rejected, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    ScaleRatio,
    Distance,
    Angle,
    Degenerate,
}

/// Pure connectivity predicate over a fixed particle set.
pub struct ConnectivityEvaluator<'a> {
    particles: &'a ParticleSet,
    options: ConnectivityOptions,
}

impl<'a> ConnectivityEvaluator<'a> {
    pub fn new(particles: &'a ParticleSet, options: ConnectivityOptions) -> Self {
        Self { particles, options }
    }

    pub fn options(&self) -> &ConnectivityOptions {
        &self.options
    }

    pub fn is_connected(&self, i: usize, j: usize) -> bool {
        self.evaluate(i, j).is_ok()
    }

    /// Evaluate a pair, returning its geometry when connected.
    ///
    /// The result is symmetric: swapping `i` and `j` swaps the two angles
    /// and leaves the verdict and the weight unchanged.
    pub fn evaluate(&self, i: usize, j: usize) -> Result<PairGeometry, Rejection> {
        let opts = &self.options;
        let scale_i = self.particles.scale(i);
        let scale_j = self.particles.scale(j);
        let max_scale = scale_i.max(scale_j);
        if !(max_scale.is_finite() && max_scale > 0.0) {
            return Err(Rejection::Degenerate);
        }
        if (scale_i - scale_j).abs() / max_scale > opts.scale_ratio_threshold {
            return Err(Rejection::ScaleRatio);
        }

        let connecting = self.particles.position(i) - self.particles.position(j);
        let distance = connecting.norm();
        if !distance.is_finite() {
            return Err(Rejection::Degenerate);
        }
        if distance > opts.particle_distance_threshold {
            return Err(Rejection::Distance);
        }

        let angle_i = angle_between_dirless_deg(self.particles.hevec2(i), &connecting)
            .ok_or(Rejection::Degenerate)?;
        let angle_j = angle_between_dirless_deg(self.particles.hevec2(j), &connecting)
            .ok_or(Rejection::Degenerate)?;
        if angle_i > opts.particle_angle_threshold_deg
            || angle_j > opts.particle_angle_threshold_deg
        {
            return Err(Rejection::Angle);
        }

        Ok(PairGeometry {
            distance,
            angle_i_deg: angle_i,
            angle_j_deg: angle_j,
        })
    }
}
