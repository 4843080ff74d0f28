//! Detector models for neutrino detection simulation
//!
//! This crate provides the three capability models a simulated detector is
//! composed of: an effective-area lookup producing detection probabilities,
//! an energy-resolution model producing reconstructed energies, and an
//! angular-resolution model producing reconstructed directions. The
//! event-generation engine treats these as opaque capabilities and never
//! inspects their internals.

pub mod angular_resolution;
pub mod effective_area;
pub mod energy_resolution;

// Re-exports for easier access
pub use angular_resolution::{
    AngularResolution, AngularResolutionError, AngularResolutionTable, AngularSmearing,
    FixedAngularResolution, TableFormat,
};
pub use effective_area::{ConstantEffectiveArea, EffectiveArea};
pub use energy_resolution::{EnergyResolution, EnergyResolutionError, LogNormalEnergyResolution};

/// Immutable bundle of the three detector capability models.
///
/// A detector is a fixed input to a simulation run; changing any model means
/// constructing a new `Detector`.
#[derive(Debug, Clone)]
pub struct Detector<A, E, S> {
    /// Energy- and zenith-dependent detection efficiency.
    pub effective_area: A,
    /// Energy reconstruction smearing.
    pub energy_resolution: E,
    /// Direction reconstruction smearing, applied to point-like sources.
    pub angular_resolution: S,
}

impl<A: EffectiveArea, E: EnergyResolution, S: AngularSmearing> Detector<A, E, S> {
    /// Assemble a detector from its three capability models.
    pub fn new(effective_area: A, energy_resolution: E, angular_resolution: S) -> Self {
        Self {
            effective_area,
            energy_resolution,
            angular_resolution,
        }
    }
}
