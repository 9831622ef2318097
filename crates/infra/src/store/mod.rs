//! Prediction/score persistence.
//!
//! Predictions are an append-only log: one batch per scheduler cycle per
//! horizon, atomic, never updated. Composite scores accumulate as fresh rows
//! with latest-per-population read semantics.

mod in_memory;
mod postgres;
mod query;
mod r#trait;

pub use in_memory::InMemoryPredictionStore;
pub use postgres::PostgresPredictionStore;
pub use query::{Pagination, PredictionFilter, PredictionPage, PredictionSummary};
pub use r#trait::{PredictionStore, StoreError};
