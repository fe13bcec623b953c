//! Uniform 3D hash grid for bounded-radius neighbour queries.

use nalgebra::Vector3;
use std::collections::HashMap;

type CellKey = [i64; 3];

/// Points bucketed into cubic cells of a fixed edge length.
pub struct SpatialGrid {
    cell: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket `points` (indexed by position in the iterator). Returns `None`
    /// when `cell` is not a positive finite length.
    pub fn build<'a, I>(points: I, cell: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vector3<f64>>,
    {
        if !(cell.is_finite() && cell > 0.0) {
            return None;
        }
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (idx, p) in points.into_iter().enumerate() {
            cells.entry(key_of(p, cell)).or_default().push(idx);
        }
        Some(Self { cell, cells })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    /// Indices whose cell intersects the axis-aligned box of half-width
    /// `radius` around `center`. Callers apply the exact distance test.
    pub fn candidates_within(&self, center: &Vector3<f64>, radius: f64) -> Vec<usize> {
        let lo = key_of(&center.add_scalar(-radius), self.cell);
        let hi = key_of(&center.add_scalar(radius), self.cell);
        let mut out = Vec::new();
        let span: f64 = (0..3)
            .map(|a| (i128::from(hi[a]) - i128::from(lo[a]) + 1) as f64)
            .product();
        if span > self.cells.len() as f64 {
            // Box wider than the occupied cells: scan the buckets instead.
            for (key, bucket) in &self.cells {
                if (0..3).all(|a| lo[a] <= key[a] && key[a] <= hi[a]) {
                    out.extend_from_slice(bucket);
                }
            }
            out.sort_unstable();
            return out;
        }
        for x in lo[0]..=hi[0] {
            for y in lo[1]..=hi[1] {
                for z in lo[2]..=hi[2] {
                    if let Some(bucket) = self.cells.get(&[x, y, z]) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
        out
    }

    /// Every unordered pair `(i, j)`, `i < j`, whose cells are 26-adjacent or
    /// equal, sorted ascending. Each pair is reported once.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (key, bucket) in &self.cells {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        // Saturated keys sit on the i64 boundary; no cell lies past it.
                        let (Some(x), Some(y), Some(z)) = (
                            key[0].checked_add(dx),
                            key[1].checked_add(dy),
                            key[2].checked_add(dz),
                        ) else {
                            continue;
                        };
                        let Some(other) = self.cells.get(&[x, y, z]) else {
                            continue;
                        };
                        for &i in bucket {
                            for &j in other {
                                if i < j {
                                    pairs.push((i, j));
                                }
                            }
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Cell of `p`; coordinates beyond the i64 range saturate to its bounds.
fn key_of(p: &Vector3<f64>, cell: f64) -> CellKey {
    [
        (p.x / cell).floor() as i64,
        (p.y / cell).floor() as i64,
        (p.z / cell).floor() as i64,
    ]
}
