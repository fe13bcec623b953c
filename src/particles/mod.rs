//! Particle datasets and the per-particle feature accessor.
//!
//! A [`ParticleDataset`] mirrors the point-set layout produced by the
//! particle extraction tools: a list of points plus named per-point field
//! arrays (`scale`, `hevec2`, `ChestType`, ...). The labeling engine never
//! touches raw field arrays; it works on a validated [`ParticleSet`], which
//! is built once and fails if a required field is missing or mis-sized.

pub mod io;

use crate::error::{LabelError, Result};
use crate::types::ChestType;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCALE_FIELD: &str = "scale";
pub const HEVEC2_FIELD: &str = "hevec2";
pub const CHEST_TYPE_FIELD: &str = "ChestType";

/// Flattened per-point field array with a fixed number of components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldArray {
    pub components: usize,
    pub values: Vec<f64>,
}

impl FieldArray {
    pub fn scalars(values: Vec<f64>) -> Self {
        Self {
            components: 1,
            values,
        }
    }

    pub fn vectors(values: &[[f64; 3]]) -> Self {
        Self {
            components: 3,
            values: values.iter().flatten().copied().collect(),
        }
    }

    /// Number of complete tuples stored.
    pub fn tuple_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    pub fn tuple(&self, index: usize) -> &[f64] {
        let start = index * self.components;
        &self.values[start..start + self.components]
    }
}

/// Raw point set with named field arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleDataset {
    pub points: Vec<[f64; 3]>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldArray>,
}

impl ParticleDataset {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldArray> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, array: FieldArray) {
        self.fields.insert(name.into(), array);
    }

    /// Fetch a field and check it carries `components` values per point.
    pub fn required_field(&self, name: &str, components: usize) -> Result<&FieldArray> {
        let array = self
            .field(name)
            .ok_or_else(|| LabelError::missing_field(name))?;
        let expected = components * self.len();
        if array.components != components || array.values.len() != expected {
            return Err(LabelError::FieldShape {
                name: name.to_string(),
                components,
                expected,
                found: array.values.len(),
            });
        }
        Ok(array)
    }

    /// Chest-type labels, if the dataset carries a well-formed `ChestType`.
    pub fn chest_types(&self) -> Option<Vec<ChestType>> {
        let array = self.required_field(CHEST_TYPE_FIELD, 1).ok()?;
        Some(
            array
                .values
                .iter()
                .map(|&v| ChestType::from_field_value(v))
                .collect(),
        )
    }
}

/// Validated particle with the features the labeling engine consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vector3<f64>,
    pub scale: f64,
    /// Minor Hessian eigenvector; sign is arbitrary.
    pub hevec2: Vector3<f64>,
    #[serde(default)]
    pub chest_type: ChestType,
}

impl Particle {
    pub fn new(position: [f64; 3], scale: f64, hevec2: [f64; 3]) -> Self {
        Self {
            position: Vector3::from(position),
            scale,
            hevec2: Vector3::from(hevec2),
            chest_type: ChestType::UNDEFINED,
        }
    }

    pub fn with_chest_type(mut self, chest_type: ChestType) -> Self {
        self.chest_type = chest_type;
        self
    }
}

/// Immutable, index-addressed collection of particles.
#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Build the accessor from a dataset. `scale` and `hevec2` are required;
    /// `ChestType` is optional and defaults to undefined.
    pub fn from_dataset(dataset: &ParticleDataset) -> Result<Self> {
        let scale = dataset.required_field(SCALE_FIELD, 1)?;
        let hevec2 = dataset.required_field(HEVEC2_FIELD, 3)?;
        let labels = dataset.chest_types();

        let particles = dataset
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let e = hevec2.tuple(i);
                Particle {
                    position: Vector3::from(*p),
                    scale: scale.values[i],
                    hevec2: Vector3::new(e[0], e[1], e[2]),
                    chest_type: labels
                        .as_ref()
                        .map(|l| l[i])
                        .unwrap_or(ChestType::UNDEFINED),
                }
            })
            .collect();
        Ok(Self { particles })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn position(&self, index: usize) -> &Vector3<f64> {
        &self.particles[index].position
    }

    pub fn scale(&self, index: usize) -> f64 {
        self.particles[index].scale
    }

    pub fn hevec2(&self, index: usize) -> &Vector3<f64> {
        &self.particles[index].hevec2
    }

    pub fn chest_type(&self, index: usize) -> ChestType {
        self.particles[index].chest_type
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Convert back into a dataset carrying `scale`, `hevec2` and `ChestType`.
    pub fn to_dataset(&self) -> ParticleDataset {
        let mut dataset = ParticleDataset {
            points: self
                .particles
                .iter()
                .map(|p| [p.position.x, p.position.y, p.position.z])
                .collect(),
            fields: BTreeMap::new(),
        };
        dataset.set_field(
            SCALE_FIELD,
            FieldArray::scalars(self.particles.iter().map(|p| p.scale).collect()),
        );
        let hevecs: Vec<[f64; 3]> = self
            .particles
            .iter()
            .map(|p| [p.hevec2.x, p.hevec2.y, p.hevec2.z])
            .collect();
        dataset.set_field(HEVEC2_FIELD, FieldArray::vectors(&hevecs));
        dataset.set_field(
            CHEST_TYPE_FIELD,
            FieldArray::scalars(
                self.particles
                    .iter()
                    .map(|p| f64::from(p.chest_type.0))
                    .collect(),
            ),
        );
        dataset
    }
}

impl FromIterator<Particle> for ParticleSet {
    fn from_iter<T: IntoIterator<Item = Particle>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
