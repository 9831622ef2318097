//! `licewatch-forecast`
//!
//! **Responsibility:** the deterministic statistical engine.
//!
//! This crate is intentionally **not** part of the infrastructure:
//! - It performs no I/O and holds no storage dependencies.
//! - Every function is deterministic: same inputs, same forecast.
//! - It emits forecast records, not domain events.
//!
//! Inputs (count history, temperature, treatments) are provided by callers
//! (the infra service), already resolved to their defaults where reads
//! degraded.

pub mod classifier;
pub mod engine;
pub mod factors;
pub mod limits;
pub mod projector;
pub mod scorer;
pub mod trend;

pub use classifier::{classify, exceedance_probability};
pub use engine::{forecast_at, ForecastInputs};
pub use factors::{seasonal_factor, temperature_factor, treatment_damping};
pub use limits::{limit_for_month, LiceLimits, MODEL_VERSION, PREDICTION_CEILING};
pub use projector::{project, GrowthProjection, ProjectionMode};
pub use scorer::{blend, ComponentScores};
pub use trend::{estimate, TrendEstimate};
