//! Angle utilities used by connectivity, KDE and transition scoring.

use nalgebra::Vector3;

const EPS: f64 = 1e-12;

/// Computes the unsigned angle between two 3D vectors in degrees.
/// Returns a value in [0, 180], or `None` when either vector is degenerate.
#[inline]
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let na = a.norm();
    let nb = b.norm();
    if !(na > EPS && nb > EPS) {
        return None;
    }
    // atan2 form: exact for parallel and antiparallel vectors.
    let theta = a.cross(b).norm().atan2(a.dot(b));
    theta.is_finite().then(|| theta.to_degrees())
}

/// Orientation difference between two 3D vectors, treating antipodal
/// directions as equivalent. Returns a value in [0, 90] degrees.
///
/// Eigenvectors have arbitrary sign, so every comparison involving `hevec2`
/// goes through this function.
#[inline]
pub fn angle_between_dirless_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    if !(a.norm() > EPS && b.norm() > EPS) {
        return None;
    }
    let theta = a.cross(b).norm().atan2(a.dot(b).abs());
    theta.is_finite().then(|| theta.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn angle_between_basic() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);
        assert!(approx_eq(angle_between_deg(&x, &x).unwrap(), 0.0));
        assert!(approx_eq(angle_between_deg(&x, &y).unwrap(), 90.0));
        assert!(approx_eq(angle_between_deg(&x, &(-x)).unwrap(), 180.0));
    }

    #[test]
    fn dirless_angle_folds_antipodes() {
        let a = Vector3::new(1.0, 1.0, 0.0);
        let b = Vector3::new(-1.0, 0.0, 0.0);
        assert!(approx_eq(angle_between_dirless_deg(&a, &b).unwrap(), 45.0));
        assert!(approx_eq(angle_between_dirless_deg(&a, &(-a)).unwrap(), 0.0));
    }

    #[test]
    fn parallel_vectors_are_exactly_aligned() {
        let v = Vector3::new(0.3, -0.7, 0.64);
        assert_eq!(angle_between_deg(&v, &v), Some(0.0));
        assert_eq!(angle_between_dirless_deg(&v, &(-v)), Some(0.0));
    }

    #[test]
    fn degenerate_vectors_have_no_angle() {
        let zero = Vector3::zeros();
        let x = Vector3::new(1.0, 0.0, 0.0);
        assert!(angle_between_deg(&zero, &x).is_none());
        assert!(angle_between_dirless_deg(&x, &Vector3::new(f64::NAN, 0.0, 0.0)).is_none());
    }
}
