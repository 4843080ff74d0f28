//! Per-source yield weighting.
//!
//! Each source's detector-and-livetime-integrated expected event count is
//! supplied by an external calculator; this module normalizes the counts
//! into the source-selection distribution used by the event engine. The
//! weighting is computed once per run and is invariant across trials.

use rand::Rng;

use crate::error::SimulationError;
use crate::source::Source;

/// Expected-yield coupling between a source's spectrum and the detector's
/// effective area, integrated over the livetime.
pub trait ExpectedCounts: Sync {
    /// Expected number of detected events from `source` over the livetime,
    /// subject to the horizon cutoff. Must be finite and non-negative.
    fn expected_count(&self, source: &Source, livetime_years: f64, max_cos_zenith: f64) -> f64;
}

/// Uniform exposure: every source yields the same rate per livetime year.
/// Useful for tests and demo runs where the spectral/effective-area coupling
/// is out of scope.
#[derive(Debug, Clone, Copy)]
pub struct UniformExpectedCounts {
    /// Expected events per source per livetime year.
    pub events_per_year: f64,
}

impl UniformExpectedCounts {
    pub fn new(events_per_year: f64) -> Self {
        Self { events_per_year }
    }
}

impl ExpectedCounts for UniformExpectedCounts {
    fn expected_count(&self, _source: &Source, livetime_years: f64, _max_cos_zenith: f64) -> f64 {
        self.events_per_year * livetime_years
    }
}

/// Normalized source-selection distribution for one simulation run.
#[derive(Debug, Clone)]
pub struct SourceWeights {
    expected: Vec<f64>,
    weights: Vec<f64>,
    total: f64,
}

impl SourceWeights {
    /// Compute expected counts for every source and normalize them into
    /// selection weights.
    ///
    /// Fails with [`SimulationError::AllSourcesEmpty`] when the counts sum
    /// to zero: a forced event total could not be attributed to any source.
    pub fn compute(
        sources: &[Source],
        calculator: &dyn ExpectedCounts,
        livetime_years: f64,
        max_cos_zenith: f64,
    ) -> Result<Self, SimulationError> {
        let mut expected = Vec::with_capacity(sources.len());

        for (index, source) in sources.iter().enumerate() {
            let count = calculator.expected_count(source, livetime_years, max_cos_zenith);
            if !count.is_finite() || count < 0.0 {
                return Err(SimulationError::InvalidExpectedCount {
                    index,
                    value: count,
                });
            }
            expected.push(count);
        }

        let total: f64 = expected.iter().sum();
        if total <= 0.0 {
            return Err(SimulationError::AllSourcesEmpty);
        }

        let weights = expected.iter().map(|n| n / total).collect();

        Ok(Self {
            expected,
            weights,
            total,
        })
    }

    /// Normalized selection weights, summing to one.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Expected event counts per source.
    pub fn expected(&self) -> &[f64] {
        &self.expected
    }

    /// Total expected event count over all sources.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Select a source index according to the weight distribution.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let x: f64 = rng.gen();

        let mut acc = 0.0;
        for (index, weight) in self.weights.iter().enumerate() {
            acc += weight;
            if x < acc {
                return index;
            }
        }

        // Rounding can leave acc marginally below one
        self.weights.len() - 1
    }
}
