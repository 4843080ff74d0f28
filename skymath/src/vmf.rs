//! von Mises-Fisher sampling on the unit sphere.
//!
//! The von Mises-Fisher distribution is the rotationally symmetric analogue
//! of an isotropic Gaussian on the sphere, parameterized by a mean direction
//! and a concentration κ. Larger κ pulls samples tighter around the mean.
//! It is used here as the dispersion kernel for angular reconstruction
//! smearing.

use std::f64::consts::TAU;

use nalgebra::Vector3;
use rand::Rng;

/// Draw one unit vector from a von Mises-Fisher distribution.
///
/// `mean` must be a unit vector and `kappa` strictly positive. The cosine of
/// the angular offset from the mean is drawn by inverting the vMF CDF:
///
/// w = 1 + ln(u + (1 − u)·e^(−2κ)) / κ
///
/// and the azimuth around the mean is uniform.
pub fn sample_vmf<R: Rng + ?Sized>(mean: &Vector3<f64>, kappa: f64, rng: &mut R) -> Vector3<f64> {
    debug_assert!(kappa > 0.0, "vMF concentration must be positive");
    let mu = *mean;

    let u: f64 = rng.gen();
    let w = 1.0 + (u + (1.0 - u) * (-2.0 * kappa).exp()).ln() / kappa;
    let w = w.clamp(-1.0, 1.0);

    // Orthonormal basis in the tangent plane at the mean. The reference axis
    // switches away from z when the mean is nearly polar so the cross
    // product stays well conditioned.
    let reference = if mu.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    };
    let e1 = reference.cross(&mu).normalize();
    let e2 = mu.cross(&e1);

    let alpha = TAU * rng.gen::<f64>();
    let s = (1.0 - w * w).max(0.0).sqrt();

    (mu * w + e1 * (s * alpha.cos()) + e2 * (s * alpha.sin())).normalize()
}

/// Median angular offset of a vMF kernel with the given concentration, in
/// radians. Follows from solving the offset CDF at one half.
pub fn vmf_median_offset(kappa: f64) -> f64 {
    let w_med = 1.0 + (0.5 * (1.0 + (-2.0 * kappa).exp())).ln() / kappa;
    w_med.clamp(-1.0, 1.0).acos()
}
