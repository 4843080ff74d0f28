//! Common stub models for simulation integration tests

use detector::{EnergyResolution, FixedAngularResolution};
use rand::RngCore;
use simulator::FluxModel;

/// Spectrum that returns the same energy for every draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedEnergyFlux {
    pub energy: f64,
    pub upper: f64,
    pub index: f64,
}

impl FixedEnergyFlux {
    pub fn new(energy: f64) -> Self {
        Self {
            energy,
            upper: energy * 10.0,
            index: 2.0,
        }
    }
}

impl FluxModel for FixedEnergyFlux {
    fn sample(&self, count: usize, _rng: &mut dyn RngCore) -> Vec<f64> {
        vec![self.energy; count]
    }

    fn upper_energy_bound(&self) -> f64 {
        self.upper
    }

    fn spectral_index(&self) -> f64 {
        self.index
    }
}

/// Energy "resolution" that deterministically scales the true energy.
#[derive(Debug, Clone, Copy)]
pub struct ScaledEnergyResolution {
    pub factor: f64,
}

impl EnergyResolution for ScaledEnergyResolution {
    fn sample(&self, true_energy: f64, _rng: &mut dyn RngCore) -> f64 {
        true_energy * self.factor
    }
}

/// A smearing model for runs where direction reconstruction is irrelevant.
pub fn unused_smearing() -> FixedAngularResolution {
    FixedAngularResolution::new(1.0).unwrap()
}
