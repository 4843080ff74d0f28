//! Emission sources and their energy spectra.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use skymath::Equatorial;
use thiserror::Error;

/// Errors raised when constructing sources or flux models.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The energy support must satisfy 0 < lower < upper.
    #[error("invalid energy support [{lower}, {upper}]")]
    InvalidSupport {
        /// Lower energy bound.
        lower: f64,
        /// Upper energy bound.
        upper: f64,
    },
}

/// Energy spectrum of a source.
///
/// Implementations must return exactly `count` energies per `sample` call,
/// all within the model's declared support.
pub trait FluxModel: Send + Sync {
    /// Draw `count` true energies from the spectrum.
    fn sample(&self, count: usize, rng: &mut dyn RngCore) -> Vec<f64>;

    /// Upper bound of the energy support.
    fn upper_energy_bound(&self) -> f64;

    /// Spectral index, reported in catalog metadata.
    fn spectral_index(&self) -> f64;
}

/// Power-law spectrum dN/dE ∝ E^(−γ) on a bounded energy support.
#[derive(Debug, Clone, Copy)]
pub struct PowerLawFlux {
    index: f64,
    lower_energy: f64,
    upper_energy: f64,
}

impl PowerLawFlux {
    /// Create a power law with spectral index `index` on
    /// [`lower_energy`, `upper_energy`].
    pub fn new(index: f64, lower_energy: f64, upper_energy: f64) -> Result<Self, SourceError> {
        if !(lower_energy > 0.0 && upper_energy > lower_energy) {
            return Err(SourceError::InvalidSupport {
                lower: lower_energy,
                upper: upper_energy,
            });
        }

        Ok(Self {
            index,
            lower_energy,
            upper_energy,
        })
    }

    /// Lower bound of the energy support.
    pub fn lower_energy_bound(&self) -> f64 {
        self.lower_energy
    }

    fn sample_one(&self, rng: &mut dyn RngCore) -> f64 {
        let x: f64 = rng.gen();
        let gamma = self.index;

        // Inverse CDF of E^-gamma on [lower, upper]; gamma = 1 degenerates
        // to a log-uniform draw
        if (gamma - 1.0).abs() < 1e-12 {
            self.lower_energy * (self.upper_energy / self.lower_energy).powf(x)
        } else {
            let one_minus = 1.0 - gamma;
            let low = self.lower_energy.powf(one_minus);
            let high = self.upper_energy.powf(one_minus);
            (low + x * (high - low)).powf(1.0 / one_minus)
        }
    }
}

impl FluxModel for PowerLawFlux {
    fn sample(&self, count: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        (0..count).map(|_| self.sample_one(rng)).collect()
    }

    fn upper_energy_bound(&self) -> f64 {
        self.upper_energy
    }

    fn spectral_index(&self) -> f64 {
        self.index
    }
}

/// Spatial classification of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Localized source with a fixed sky position.
    Point,
    /// Emission spread over the whole sky.
    Diffuse,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Point => write!(f, "point"),
            SourceType::Diffuse => write!(f, "diffuse"),
        }
    }
}

/// Spatial model of a source. Point sources carry their sky position; the
/// type system makes a direction-less point source unrepresentable.
#[derive(Debug, Clone, Copy)]
pub enum SourceGeometry {
    /// Fixed sky position.
    Point {
        /// True emission direction.
        direction: Equatorial,
    },
    /// Isotropic emission.
    Diffuse,
}

/// An emission source: a spectrum plus a spatial model.
///
/// Sources are immutable inputs to a simulation run, owned by the caller and
/// borrowed by the engine.
pub struct Source {
    name: String,
    flux: Box<dyn FluxModel>,
    geometry: SourceGeometry,
}

impl Source {
    /// Create a point-like source at a fixed sky position.
    pub fn point(
        name: impl Into<String>,
        flux: impl FluxModel + 'static,
        direction: Equatorial,
    ) -> Self {
        Self {
            name: name.into(),
            flux: Box::new(flux),
            geometry: SourceGeometry::Point { direction },
        }
    }

    /// Create a diffuse, all-sky source.
    pub fn diffuse(name: impl Into<String>, flux: impl FluxModel + 'static) -> Self {
        Self {
            name: name.into(),
            flux: Box::new(flux),
            geometry: SourceGeometry::Diffuse,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flux(&self) -> &dyn FluxModel {
        self.flux.as_ref()
    }

    pub fn geometry(&self) -> SourceGeometry {
        self.geometry
    }

    pub fn source_type(&self) -> SourceType {
        match self.geometry {
            SourceGeometry::Point { .. } => SourceType::Point,
            SourceGeometry::Diffuse => SourceType::Diffuse,
        }
    }

    /// Fixed sky position for point sources, None for diffuse ones.
    pub fn direction(&self) -> Option<Equatorial> {
        match self.geometry {
            SourceGeometry::Point { direction } => Some(direction),
            SourceGeometry::Diffuse => None,
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("source_type", &self.source_type())
            .field("spectral_index", &self.flux.spectral_index())
            .finish()
    }
}
