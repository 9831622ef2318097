//! `licewatch-infra`
//!
//! **Responsibility:** everything around the pure engine: the read
//! interfaces over farm data, the prediction/score store, the forecast
//! service that wires reads into the engine, and the daily scheduler.
//!
//! The engine itself (`licewatch-forecast`) stays free of I/O; this crate
//! owns the seams: traits with in-memory implementations for tests/dev and
//! Postgres-backed implementations for production.

pub mod readers;
pub mod scheduler;
pub mod service;
pub mod store;


pub use readers::{
    FailureInjection, FarmDataReader, InMemoryFarmData, LiceCountSample, PostgresFarmDataReader,
    ReaderError,
};
pub use scheduler::{ForecastScheduler, SchedulerConfig, SchedulerStatus};
pub use service::{
    aggregate_risk, CriticalAlertSink, ForecastConfig, ForecastService, InMemoryAlertSink,
    NoopAlertSink, RunSummary, ServiceError,
};
pub use store::{
    InMemoryPredictionStore, Pagination, PostgresPredictionStore, PredictionFilter,
    PredictionPage, PredictionStore, PredictionSummary, StoreError,
};
