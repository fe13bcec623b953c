//! Kernel density estimate of the emission likelihood against labeled atlases.
//!
//! Every atlas particle inside the spherical ROI around a query particle
//! contributes the product of three Gaussian kernels (scale difference,
//! distance, orientation difference) to the score of its own label. Kernel
//! moments come from the label's [`EmissionStats`] when available, otherwise
//! from the default bandwidths in [`KdeOptions`]. Scores are averaged over
//! the number of atlases so that adding atlases does not inflate them.

use super::emission::EmissionTable;
use super::gaussian_kernel;
use crate::angle::angle_between_dirless_deg;
use crate::error::{LabelError, Result};
use crate::graph::spatial::SpatialGrid;
use crate::particles::{Particle, ParticleDataset, ParticleSet, CHEST_TYPE_FIELD};
use crate::types::{ChestType, LabelScores, GENERATION_COUNT};
use serde::{Deserialize, Serialize};

/// Kernel density estimation settings.
///
/// - `roi_radius`: spherical ROI (mm); `None` lets every atlas particle
///   contribute.
/// - `*_bandwidth`: kernel widths used for labels without emission stats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdeOptions {
    pub roi_radius: Option<f64>,
    pub scale_bandwidth: f64,
    pub distance_bandwidth: f64,
    pub angle_bandwidth_deg: f64,
}

impl Default for KdeOptions {
    fn default() -> Self {
        Self {
            roi_radius: None,
            scale_bandwidth: 0.5,
            distance_bandwidth: 2.0,
            angle_bandwidth_deg: 20.0,
        }
    }
}

impl KdeOptions {
    /// ROI radius when it is a usable finite bound.
    pub fn bounded_roi(&self) -> Option<f64> {
        self.roi_radius.filter(|r| r.is_finite() && *r >= 0.0)
    }
}

/// Labeled reference particle set in the input's coordinate frame.
pub struct Atlas {
    particles: ParticleSet,
    grid: Option<SpatialGrid>,
}

impl Atlas {
    pub fn new(particles: ParticleSet) -> Self {
        Self {
            particles,
            grid: None,
        }
    }

    /// Validate an atlas dataset; unlike query input it must carry labels.
    pub fn from_dataset(index: usize, dataset: &ParticleDataset) -> Result<Self> {
        if dataset.required_field(CHEST_TYPE_FIELD, 1).is_err() {
            return Err(LabelError::MissingAtlasLabels {
                index,
                field: CHEST_TYPE_FIELD.to_string(),
            });
        }
        Ok(Self::new(ParticleSet::from_dataset(dataset)?))
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn index_for_radius(&mut self, radius: f64) {
        // a zero radius still needs a positive cell size
        self.grid = SpatialGrid::build(
            self.particles.iter().map(|p| &p.position),
            radius.max(1e-6),
        );
    }
}

#[derive(Clone, Copy, Debug)]
struct KernelMoments {
    scale: (f64, f64),
    distance: (f64, f64),
    angle: (f64, f64),
}

impl KernelMoments {
    fn evaluate(&self, scale_diff: f64, distance: f64, angle: f64) -> f64 {
        gaussian_kernel(scale_diff, self.scale.0, self.scale.1)
            * gaussian_kernel(distance, self.distance.0, self.distance.1)
            * gaussian_kernel(angle, self.angle.0, self.angle.1)
    }
}

fn moment(mean: f64, std: f64, fallback_std: f64) -> (f64, f64) {
    if std.is_finite() && std > 0.0 && mean.is_finite() {
        (mean, std)
    } else {
        (0.0, fallback_std)
    }
}

/// Atlas-backed emission estimator.
pub struct KernelDensityEstimator {
    atlases: Vec<Atlas>,
    roi: Option<f64>,
    moments: [KernelMoments; GENERATION_COUNT],
}

impl KernelDensityEstimator {
    pub fn new(mut atlases: Vec<Atlas>, options: &KdeOptions, stats: &EmissionTable) -> Self {
        let roi = options.bounded_roi();
        if let Some(radius) = roi {
            for atlas in &mut atlases {
                atlas.index_for_radius(radius);
            }
        }
        let default = KernelMoments {
            scale: (0.0, options.scale_bandwidth),
            distance: (0.0, options.distance_bandwidth),
            angle: (0.0, options.angle_bandwidth_deg),
        };
        let mut moments = [default; GENERATION_COUNT];
        for (g, m) in moments.iter_mut().enumerate() {
            let Some(label) = ChestType::generation(g) else {
                continue;
            };
            if let Some(s) = stats.get(label) {
                *m = KernelMoments {
                    scale: moment(s.scale_mean, s.scale_std, options.scale_bandwidth),
                    distance: moment(s.distance_mean, s.distance_std, options.distance_bandwidth),
                    angle: moment(s.angle_mean, s.angle_std, options.angle_bandwidth_deg),
                };
            }
        }
        Self {
            atlases,
            roi,
            moments,
        }
    }

    pub fn atlas_count(&self) -> usize {
        self.atlases.len()
    }

    pub fn atlas_particle_count(&self) -> usize {
        self.atlases.iter().map(Atlas::len).sum()
    }

    /// Per-label emission scores for `query`. The reject state stays at 0.
    pub fn estimate(&self, query: &Particle) -> LabelScores {
        let mut scores = LabelScores::zeros();
        if self.atlases.is_empty() {
            return scores;
        }
        for atlas in &self.atlases {
            match (&atlas.grid, self.roi) {
                (Some(grid), Some(radius)) => {
                    for idx in grid.candidates_within(&query.position, radius) {
                        self.accumulate(&mut scores, query, atlas.particles.get(idx), Some(radius));
                    }
                }
                _ => {
                    for p in atlas.particles.iter() {
                        self.accumulate(&mut scores, query, p, self.roi);
                    }
                }
            }
        }
        let n = self.atlases.len() as f64;
        for s in scores.0.iter_mut() {
            *s /= n;
        }
        scores
    }

    fn accumulate(
        &self,
        scores: &mut LabelScores,
        query: &Particle,
        sample: &Particle,
        radius: Option<f64>,
    ) {
        let Some(g) = sample.chest_type.generation_index() else {
            return;
        };
        let distance = (query.position - sample.position).norm();
        if let Some(r) = radius {
            if !(distance <= r) {
                return;
            }
        }
        let Some(angle) = angle_between_dirless_deg(&query.hevec2, &sample.hevec2) else {
            return;
        };
        let scale_diff = (query.scale - sample.scale).abs();
        let k = self.moments[g].evaluate(scale_diff, distance, angle);
        if k.is_finite() {
            scores.add(sample.chest_type, k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmissionStats;

    fn labeled(pos: [f64; 3], scale: f64, g: usize) -> Particle {
        Particle::new(pos, scale, [0.0, 0.0, 1.0])
            .with_chest_type(ChestType::generation(g).unwrap())
    }

    #[test]
    fn represented_label_dominates_unrepresented() {
        let atlas: ParticleSet = (0..10)
            .map(|k| labeled([0.0, 0.0, k as f64 * 0.5], 2.0, 3))
            .collect();
        let kde = KernelDensityEstimator::new(
            vec![Atlas::new(atlas)],
            &KdeOptions {
                roi_radius: Some(10.0),
                ..Default::default()
            },
            &EmissionTable::new(),
        );
        let query = Particle::new([0.0, 0.0, 2.0], 2.0, [0.0, 0.0, 1.0]);
        let scores = kde.estimate(&query);
        let g3 = scores.get(ChestType::generation(3).unwrap());
        assert!(g3 > 0.0);
        for g in (0..GENERATION_COUNT).filter(|&g| g != 3) {
            assert!(g3 > scores.get(ChestType::generation(g).unwrap()));
        }
        assert_eq!(scores.argmax().0, ChestType::generation(3).unwrap());
    }

    #[test]
    fn roi_excludes_distant_atlas_particles() {
        let atlas: ParticleSet = vec![
            labeled([0.0, 0.0, 0.0], 2.0, 1),
            labeled([50.0, 0.0, 0.0], 2.0, 2),
        ]
        .into_iter()
        .collect();
        let options = KdeOptions {
            roi_radius: Some(5.0),
            distance_bandwidth: 100.0,
            ..Default::default()
        };
        let kde =
            KernelDensityEstimator::new(vec![Atlas::new(atlas)], &options, &EmissionTable::new());
        let scores = kde.estimate(&Particle::new([1.0, 0.0, 0.0], 2.0, [0.0, 0.0, 1.0]));
        assert!(scores.get(ChestType::generation(1).unwrap()) > 0.0);
        assert_eq!(scores.get(ChestType::generation(2).unwrap()), 0.0);
    }

    #[test]
    fn unbounded_roi_uses_every_atlas_particle() {
        let atlas: ParticleSet = vec![
            labeled([0.0, 0.0, 0.0], 2.0, 1),
            labeled([8.0, 0.0, 0.0], 2.0, 2),
        ]
        .into_iter()
        .collect();
        let options = KdeOptions {
            distance_bandwidth: 100.0,
            ..Default::default()
        };
        let kde =
            KernelDensityEstimator::new(vec![Atlas::new(atlas)], &options, &EmissionTable::new());
        let scores = kde.estimate(&Particle::new([1.0, 0.0, 0.0], 2.0, [0.0, 0.0, 1.0]));
        assert!(scores.get(ChestType::generation(2).unwrap()) > 0.0);
    }

    #[test]
    fn emission_stats_reshape_the_kernel() {
        let g = ChestType::generation(4).unwrap();
        let atlas: ParticleSet = std::iter::once(labeled([0.0, 0.0, 0.0], 3.0, 4)).collect();
        let query = Particle::new([0.0, 0.0, 0.0], 2.0, [0.0, 0.0, 1.0]);

        let plain = KernelDensityEstimator::new(
            vec![Atlas::new(atlas.clone())],
            &KdeOptions::default(),
            &EmissionTable::new(),
        );
        let mut table = EmissionTable::new();
        table.set(
            g,
            EmissionStats {
                scale_mean: 1.0,
                scale_std: 0.5,
                distance_mean: 0.0,
                distance_std: 2.0,
                angle_mean: 0.0,
                angle_std: 20.0,
                sample_count: 50.0,
            },
        );
        let tuned =
            KernelDensityEstimator::new(vec![Atlas::new(atlas)], &KdeOptions::default(), &table);
        // scale difference of 1.0 sits on the tuned mean
        assert!(tuned.estimate(&query).get(g) > plain.estimate(&query).get(g));
        assert!((tuned.estimate(&query).get(g) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn atlas_without_labels_is_rejected() {
        let mut ds =
            ParticleSet::new(vec![Particle::new([0.0; 3], 1.0, [1.0, 0.0, 0.0])]).to_dataset();
        ds.fields.remove(CHEST_TYPE_FIELD);
        let err = Atlas::from_dataset(2, &ds).err().expect("atlas must be rejected");
        assert!(matches!(err, LabelError::MissingAtlasLabels { index: 2, .. }));
    }
}
