//! Equatorial sky coordinates and their unit-vector representation.
//!
//! Conversions follow the usual colatitude/azimuth mapping: θ = π/2 − dec,
//! φ = ra. The inverse mapping recovers the azimuth with a four-quadrant
//! `atan2`, which stays well defined for x ≤ 0 where a single-argument
//! arctangent is ambiguous in sign.

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::Vector3;

/// Sky position in the equatorial (ICRS) frame.
///
/// Both angles are stored in radians: right ascension in [0, 2π) and
/// declination in [−π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    /// Right ascension in radians.
    pub ra: f64,
    /// Declination in radians.
    pub dec: f64,
}

impl Equatorial {
    /// Create from angles in radians.
    pub fn from_radians(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Create from angles in degrees.
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra: ra_deg.to_radians(),
            dec: dec_deg.to_radians(),
        }
    }

    /// Right ascension in degrees.
    pub fn ra_degrees(&self) -> f64 {
        self.ra.to_degrees()
    }

    /// Declination in degrees.
    pub fn dec_degrees(&self) -> f64 {
        self.dec.to_degrees()
    }

    /// Convert to a Cartesian unit vector.
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let theta = FRAC_PI_2 - self.dec;
        let phi = self.ra;
        Vector3::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        )
    }

    /// Recover ra/dec from a unit vector.
    ///
    /// At the poles (x == y == 0) the azimuth is undefined; the convention
    /// here is to report ra = 0.
    pub fn from_unit_vector(v: &Vector3<f64>) -> Self {
        let theta = v.z.clamp(-1.0, 1.0).acos();

        let ra = if v.x == 0.0 && v.y == 0.0 {
            0.0
        } else {
            let phi = v.y.atan2(v.x);
            if phi < 0.0 {
                phi + TAU
            } else {
                phi
            }
        };

        Self {
            ra,
            dec: FRAC_PI_2 - theta,
        }
    }

    /// Angular separation to another position in radians.
    ///
    /// Uses the haversine form, which keeps precision for small separations
    /// where the plain spherical law of cosines loses digits.
    pub fn separation(&self, other: &Equatorial) -> f64 {
        let d_ra = other.ra - self.ra;
        let d_dec = other.dec - self.dec;

        let a = (d_dec / 2.0).sin().powi(2)
            + self.dec.cos() * other.dec.cos() * (d_ra / 2.0).sin().powi(2);

        2.0 * a.sqrt().min(1.0).asin()
    }
}

/// Map colatitude/azimuth to equatorial coordinates.
pub fn spherical_to_equatorial(theta: f64, phi: f64) -> Equatorial {
    Equatorial {
        ra: phi,
        dec: FRAC_PI_2 - theta,
    }
}
