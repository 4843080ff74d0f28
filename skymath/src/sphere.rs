//! Uniform sampling of directions on the celestial sphere.

use std::f64::consts::TAU;

use rand::Rng;

use crate::equatorial::{spherical_to_equatorial, Equatorial};

/// Draw one direction uniformly distributed over the sphere.
///
/// The colatitude is drawn as θ = arccos(2v − 1); drawing θ uniformly in
/// [0, π] instead would oversample the poles.
pub fn sample_uniform_sphere<R: Rng + ?Sized>(rng: &mut R) -> Equatorial {
    let u: f64 = rng.gen();
    let v: f64 = rng.gen();

    let phi = TAU * u;
    let theta = (2.0 * v - 1.0).acos();

    spherical_to_equatorial(theta, phi)
}
