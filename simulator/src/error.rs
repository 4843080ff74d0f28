use thiserror::Error;

/// Errors produced by simulation runs and catalog persistence.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A source reported a negative or non-finite expected event count.
    #[error("source {index} reported an invalid expected count ({value})")]
    InvalidExpectedCount {
        /// Index of the offending source.
        index: usize,
        /// The reported count.
        value: f64,
    },

    /// Every source has zero expected events, so no selection distribution
    /// exists.
    #[error("all sources have zero expected events; nothing to normalize")]
    AllSourcesEmpty,

    /// A flux model returned no energy for a one-sample request.
    #[error("flux model of source {index} returned an empty sample")]
    EmptyFluxSample {
        /// Index of the offending source.
        index: usize,
    },

    /// The rejection sub-loop exceeded its attempt budget without accepting.
    #[error("trial {trial} exhausted the attempt budget after {attempts} rejections")]
    AttemptBudgetExhausted {
        /// Zero-based trial index that failed to accept.
        trial: u64,
        /// Number of rejected attempts.
        attempts: u64,
    },

    /// Angular reconstruction smearing failed.
    #[error("angular reconstruction failed")]
    AngularResolution(#[from] detector::AngularResolutionError),

    /// Catalog I/O failed.
    #[error("catalog I/O failed")]
    Io(#[from] std::io::Error),

    /// Catalog (de)serialization failed.
    #[error("catalog serialization failed")]
    Serialization(#[from] serde_json::Error),
}
