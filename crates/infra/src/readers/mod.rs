//! Read interfaces over farm data.
//!
//! The engine consumes these interfaces and never writes through them.
//! Implementations must deliver count history chronologically ascending and
//! treatments most-recent-first; the *service* layer, not the reader, owns
//! the degrade-to-default policy when a read fails.

mod in_memory;
mod postgres;

pub use in_memory::{FailureInjection, InMemoryFarmData, LiceCountSample};
pub use postgres::PostgresFarmDataReader;

use async_trait::async_trait;

use licewatch_core::{CountPoint, EnvironmentQuality, PopulationId, TreatmentRecord};

/// Error raised by a read interface.
///
/// Callers on the forecast path convert these into the documented defaults
/// and flag the degradation; they never abort a fleet run over one of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReaderError {
    /// The backing source could not be reached.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The source was reachable but the query failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Read access to the observational data the engine forecasts from.
#[async_trait]
pub trait FarmDataReader: Send + Sync {
    /// Identities of all populations currently active.
    async fn active_populations(&self) -> Result<Vec<PopulationId>, ReaderError>;

    /// Chronologically ascending `(date, ratio)` points inside the trailing
    /// window. The ratio is (adult females + 0.5 × mobiles) per fish examined
    /// on the sampling day; days with zero examined fish are excluded.
    /// Empty means cold start, not failure.
    async fn count_history(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<CountPoint>, ReaderError>;

    /// Most recent water temperature, if any reading exists.
    async fn latest_temperature(&self, population: PopulationId)
        -> Result<Option<f64>, ReaderError>;

    /// Completed treatments inside the trailing window, most recent first.
    async fn recent_treatments(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<TreatmentRecord>, ReaderError>;

    /// Average daily mortality count over the trailing window, if recorded.
    async fn mortality_rate(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Option<f64>, ReaderError>;

    /// Most recent temperature + oxygen reading for the composite scorer.
    async fn environment_quality(
        &self,
        population: PopulationId,
    ) -> Result<Option<EnvironmentQuality>, ReaderError>;
}
