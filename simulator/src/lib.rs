//! Neutrino production and detection simulation
//!
//! This crate turns a population of emission sources and a detector model
//! into a synthetic event catalog. Expected yields are computed per source
//! and normalized into a selection distribution; a rejection-sampling loop
//! converts thrown neutrinos into accepted events through the detector's
//! energy- and zenith-dependent acceptance; accepted events are smeared in
//! energy and, for point-like sources, in direction.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod source;
pub mod weights;

// Re-exports for easier access
pub use catalog::{Catalog, CatalogFile, Event, RunMetadata};
pub use engine::{PointSourceThrowing, RunConfig, Simulator};
pub use error::SimulationError;
pub use source::{FluxModel, PowerLawFlux, Source, SourceGeometry, SourceType};
pub use weights::{ExpectedCounts, SourceWeights, UniformExpectedCounts};
