//! Synthetic bifurcating airway trees for demos and tests.
//!
//! Each branch is a straight run of particles whose minor eigenvector points
//! along the branch. Every branch splits into two children deflected by
//! `branch_angle_deg` on either side; consecutive bifurcation planes are
//! perpendicular. Particles carry their generation as `chest_type`, so the
//! generated set doubles as a reference labeling.

use crate::error::{LabelError, Result};
use crate::model::TransitionTable;
use crate::particles::{Particle, ParticleSet};
use crate::types::{ChestType, GENERATION_COUNT};
use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTreeConfig {
    /// Number of generations (trachea included), at most 11.
    pub generations: usize,
    pub root_scale: f64,
    /// Scale multiplier from one generation to the next.
    pub scale_decay: f64,
    pub segment_length: f64,
    /// Particle spacing along a branch.
    pub spacing: f64,
    pub branch_angle_deg: f64,
    pub origin: [f64; 3],
}

impl Default for SyntheticTreeConfig {
    fn default() -> Self {
        Self {
            generations: 4,
            root_scale: 8.0,
            scale_decay: 0.8,
            segment_length: 8.0,
            spacing: 1.0,
            branch_angle_deg: 35.0,
            origin: [0.0; 3],
        }
    }
}

/// Upper bound on particles per branch.
pub const MAX_BRANCH_STEPS: f64 = 100_000.0;

impl SyntheticTreeConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("root_scale", self.root_scale),
            ("scale_decay", self.scale_decay),
            ("segment_length", self.segment_length),
            ("spacing", self.spacing),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LabelError::config(format!(
                    "tree.{name} must be a finite positive number, got {value}"
                )));
            }
        }
        if self.generations > GENERATION_COUNT {
            return Err(LabelError::config(format!(
                "tree.generations must be at most {GENERATION_COUNT}, got {}",
                self.generations
            )));
        }
        if self.segment_length / self.spacing > MAX_BRANCH_STEPS {
            return Err(LabelError::config(format!(
                "tree.segment_length / tree.spacing exceeds {MAX_BRANCH_STEPS}"
            )));
        }
        if !self.branch_angle_deg.is_finite() || self.origin.iter().any(|v| !v.is_finite()) {
            return Err(LabelError::config("tree angle and origin must be finite"));
        }
        Ok(())
    }
}

struct Branch {
    start: Vector3<f64>,
    dir: Vector3<f64>,
    normal: Vector3<f64>,
    generation: usize,
}

/// Generate the tree described by `config`. The first particle is the top
/// of the trachea. A config failing [`SyntheticTreeConfig::validate`] yields
/// an empty set.
pub fn synthetic_airway(config: &SyntheticTreeConfig) -> ParticleSet {
    if let Err(err) = config.validate() {
        warn!("synthetic_airway: {err}");
        return ParticleSet::default();
    }
    let generations = config.generations.min(GENERATION_COUNT);
    let steps = (config.segment_length / config.spacing).round().max(1.0) as usize;
    let (sin_a, cos_a) = config.branch_angle_deg.to_radians().sin_cos();

    let mut particles = Vec::new();
    let mut pending = std::collections::VecDeque::new();
    if generations > 0 {
        pending.push_back(Branch {
            start: Vector3::from(config.origin),
            dir: -Vector3::z(),
            normal: Vector3::x(),
            generation: 0,
        });
    }

    while let Some(branch) = pending.pop_front() {
        let Some(label) = ChestType::generation(branch.generation) else {
            continue;
        };
        let scale = config.root_scale * config.scale_decay.powi(branch.generation as i32);
        // The trachea starts on its first particle; children start one step
        // past the bifurcation point.
        let first = usize::from(branch.generation > 0);
        for k in first..=steps {
            let p = branch.start + branch.dir * (k as f64 * config.spacing);
            particles.push(
                Particle::new(p.into(), scale, branch.dir.into()).with_chest_type(label),
            );
        }
        if branch.generation + 1 >= generations {
            continue;
        }
        let end = branch.start + branch.dir * (steps as f64 * config.spacing);
        let side = branch.normal.cross(&branch.dir).normalize();
        for sign in [1.0, -1.0] {
            let dir = (branch.dir * cos_a + side * (sign * sin_a)).normalize();
            let normal = (side - dir * side.dot(&dir)).normalize();
            pending.push_back(Branch {
                start: end,
                dir,
                normal,
                generation: branch.generation + 1,
            });
        }
    }
    ParticleSet::new(particles)
}

/// Shift every particle by `offset`, keeping labels.
pub fn translated(particles: &ParticleSet, offset: [f64; 3]) -> ParticleSet {
    let offset = Vector3::from(offset);
    particles
        .iter()
        .map(|p| {
            let mut p = p.clone();
            p.position += offset;
            p
        })
        .collect()
}

/// Copy of `particles` with every label cleared.
pub fn unlabeled(particles: &ParticleSet) -> ParticleSet {
    particles
        .iter()
        .map(|p| p.clone().with_chest_type(ChestType::UNDEFINED))
        .collect()
}

/// Transition table where a branch keeps its generation with probability
/// `stay` and otherwise descends exactly one generation.
pub fn chain_transitions(stay: f64) -> TransitionTable {
    let mut table = TransitionTable::new();
    for g in 0..GENERATION_COUNT {
        let (Some(from), next) = (ChestType::generation(g), ChestType::generation(g + 1)) else {
            continue;
        };
        match next {
            Some(to) => {
                table.set_probability(from, from, stay);
                table.set_probability(from, to, 1.0 - stay);
            }
            None => {
                table.set_probability(from, from, 1.0);
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_count_follows_generations() {
        let config = SyntheticTreeConfig::default();
        let tree = synthetic_airway(&config);
        // 9 trachea particles, 8 per later branch, 2 + 4 + 8 later branches.
        assert_eq!(tree.len(), 9 + 14 * 8);
        assert_eq!(tree.chest_type(0), ChestType::generation(0).unwrap());
        assert_eq!(tree.scale(0), 8.0);
        let last = tree.len() - 1;
        assert_eq!(tree.chest_type(last), ChestType::generation(3).unwrap());
        assert!((tree.scale(last) - 8.0 * 0.8f64.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn children_start_one_step_past_the_bifurcation() {
        let tree = synthetic_airway(&SyntheticTreeConfig {
            generations: 2,
            ..Default::default()
        });
        let trachea_end = tree.position(8);
        for child_first in [9, 17] {
            let d = (tree.position(child_first) - trachea_end).norm();
            assert!((d - 1.0).abs() < 1e-9, "distance {d}");
        }
    }

    #[test]
    fn chain_transitions_rows_sum_to_one() {
        let table = chain_transitions(0.9);
        for (_, sum) in table.row_sums() {
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert_eq!(table.probability_count(), 2 * 10 + 1);
    }

    #[test]
    fn helpers_keep_geometry_or_labels() {
        let tree = synthetic_airway(&SyntheticTreeConfig::default());
        let moved = translated(&tree, [0.5, 0.0, 0.0]);
        assert!((moved.position(3).x - tree.position(3).x - 0.5).abs() < 1e-12);
        assert_eq!(moved.chest_type(3), tree.chest_type(3));
        let cleared = unlabeled(&tree);
        assert!(cleared.iter().all(|p| p.chest_type == ChestType::UNDEFINED));
    }

    #[test]
    fn invalid_spacing_is_rejected_without_generating() {
        for spacing in [0.0, -1.0, f64::NAN] {
            let config = SyntheticTreeConfig {
                spacing,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "spacing {spacing}");
            assert!(synthetic_airway(&config).is_empty());
        }
        let too_fine = SyntheticTreeConfig {
            spacing: 1e-9,
            ..Default::default()
        };
        assert!(too_fine.validate().is_err());
        let too_deep = SyntheticTreeConfig {
            generations: 12,
            ..Default::default()
        };
        assert!(too_deep.validate().is_err());
        assert!(SyntheticTreeConfig::default().validate().is_ok());
    }
}
