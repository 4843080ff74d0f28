//! Event catalog accumulation and persistence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skymath::Equatorial;

use crate::error::SimulationError;
use crate::source::SourceType;

/// One accepted neutrino event.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// True energy at arrival.
    pub true_energy: f64,
    /// Detector-reconstructed energy.
    pub reco_energy: f64,
    /// True arrival direction.
    pub true_dir: Equatorial,
    /// Reconstructed direction; equals the true direction for diffuse
    /// sources.
    pub reco_dir: Equatorial,
    /// Index of the source that produced the event.
    pub source_label: usize,
}

/// Aligned per-event columns for one simulation run.
///
/// `ra`/`dec` hold the true direction; `reco_ra`/`reco_dec` the
/// reconstructed one. All columns always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub true_energy: Vec<f64>,
    pub reco_energy: Vec<f64>,
    /// True right ascension in radians.
    pub ra: Vec<f64>,
    /// True declination in radians.
    pub dec: Vec<f64>,
    /// Reconstructed right ascension in radians.
    pub reco_ra: Vec<f64>,
    /// Reconstructed declination in radians.
    pub reco_dec: Vec<f64>,
    pub source_label: Vec<usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            true_energy: Vec::with_capacity(capacity),
            reco_energy: Vec::with_capacity(capacity),
            ra: Vec::with_capacity(capacity),
            dec: Vec::with_capacity(capacity),
            reco_ra: Vec::with_capacity(capacity),
            reco_dec: Vec::with_capacity(capacity),
            source_label: Vec::with_capacity(capacity),
        }
    }

    /// Append one accepted event; all columns grow together.
    pub fn push(&mut self, event: Event) {
        self.true_energy.push(event.true_energy);
        self.reco_energy.push(event.reco_energy);
        self.ra.push(event.true_dir.ra);
        self.dec.push(event.true_dir.dec);
        self.reco_ra.push(event.reco_dir.ra);
        self.reco_dec.push(event.reco_dir.dec);
        self.source_label.push(event.source_label);
    }

    pub fn len(&self) -> usize {
        self.true_energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_energy.is_empty()
    }
}

/// Run-level metadata persisted alongside the event columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Spectral index of the simulated source.
    pub index: f64,
    /// Spatial type of the simulated source.
    pub source_type: SourceType,
    /// Detector exposure in years.
    pub livetime_years: f64,
    /// RNG seed the run was configured with, if any.
    pub seed: Option<u64>,
}

/// On-disk container: metadata plus the event columns. One file per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub metadata: RunMetadata,
    pub catalog: Catalog,
}

impl CatalogFile {
    pub fn new(metadata: RunMetadata, catalog: Catalog) -> Self {
        Self { metadata, catalog }
    }

    /// Write the catalog to `path` as JSON, replacing any existing file.
    ///
    /// Serialization happens before the file is touched, so a failure never
    /// leaves a partial catalog on disk.
    pub fn save(&self, path: &Path) -> Result<(), SimulationError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a catalog previously written by [`CatalogFile::save`].
    pub fn load(path: &Path) -> Result<Self, SimulationError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
