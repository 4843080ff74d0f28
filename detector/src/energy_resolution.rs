//! Energy reconstruction smearing.

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

/// Errors raised when constructing an energy-resolution model.
#[derive(Debug, Error)]
pub enum EnergyResolutionError {
    /// The smearing width must be strictly positive and finite.
    #[error("invalid energy resolution width: {0}")]
    InvalidWidth(f64),
}

/// Maps a true energy to a reconstructed-energy sample.
pub trait EnergyResolution {
    /// Draw one reconstructed energy for the given true energy.
    fn sample(&self, true_energy: f64, rng: &mut dyn RngCore) -> f64;
}

/// Log-normal energy smearing.
///
/// Reconstructed energies are drawn as 10^(log10(Etrue) + N(0, σ)), which
/// keeps them strictly positive and models the roughly constant relative
/// resolution of large neutrino detectors.
#[derive(Debug, Clone, Copy)]
pub struct LogNormalEnergyResolution {
    sigma_log10: f64,
    dist: Normal<f64>,
}

impl LogNormalEnergyResolution {
    /// Create a model with the given smearing width in decades of energy.
    pub fn new(sigma_log10: f64) -> Result<Self, EnergyResolutionError> {
        if !(sigma_log10 > 0.0 && sigma_log10.is_finite()) {
            return Err(EnergyResolutionError::InvalidWidth(sigma_log10));
        }

        // Width validated above, Normal::new cannot fail here
        let dist = Normal::new(0.0, sigma_log10)
            .map_err(|_| EnergyResolutionError::InvalidWidth(sigma_log10))?;

        Ok(Self { sigma_log10, dist })
    }

    /// Smearing width in decades of energy.
    pub fn sigma_log10(&self) -> f64 {
        self.sigma_log10
    }
}

impl EnergyResolution for LogNormalEnergyResolution {
    fn sample(&self, true_energy: f64, rng: &mut dyn RngCore) -> f64 {
        let log_reco = true_energy.log10() + self.dist.sample(rng);
        10f64.powf(log_reco)
    }
}
