//! Probability model store consumed by the HMM labeling engine.
//!
//! - [`emission`] – per-label emission statistics.
//! - [`kde`] – atlas particle sets and the kernel density estimate of the
//!   emission likelihood.
//! - [`transition`] – direct transition probabilities and Gaussian
//!   transition statistics per label pair.
//! - [`store`] – the immutable [`ProbabilityModel`] combining all of them.
//!
//! The store is populated before inference and never mutated afterwards.

pub mod emission;
pub mod kde;
pub mod store;
pub mod transition;

pub use emission::{EmissionStats, EmissionTable};
pub use kde::{Atlas, KdeOptions};
pub use store::{ModelOptions, ProbabilityModel, ProbabilityModelBuilder};
pub use transition::{TransitionMode, TransitionStats, TransitionTable};

use std::f64::consts::PI;

/// Unnormalised Gaussian kernel `exp(-½((x-μ)/σ)²)`, in (0, 1].
#[inline]
pub fn gaussian_kernel(x: f64, mean: f64, std: f64) -> f64 {
    let z = (x - mean) / std;
    (-0.5 * z * z).exp()
}

/// Normal density with the given mean and variance. A non-positive or
/// non-finite variance yields 0.
#[inline]
pub fn normal_pdf(x: f64, mean: f64, variance: f64) -> f64 {
    if !(variance.is_finite() && variance > 0.0) {
        return 0.0;
    }
    let d = x - mean;
    (-(d * d) / (2.0 * variance)).exp() / (2.0 * PI * variance).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_peaks_at_mean() {
        assert!((gaussian_kernel(1.0, 1.0, 0.5) - 1.0).abs() < 1e-12);
        assert!(gaussian_kernel(2.0, 1.0, 0.5) < gaussian_kernel(1.5, 1.0, 0.5));
    }

    #[test]
    fn normal_pdf_matches_closed_form() {
        let peak = normal_pdf(0.0, 0.0, 1.0);
        assert!((peak - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-12);
        assert_eq!(normal_pdf(0.0, 0.0, 0.0), 0.0);
        assert_eq!(normal_pdf(0.0, 0.0, f64::NAN), 0.0);
    }
}
