//! `licewatch-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): identifiers, observation types, forecast/score records and the
//! domain error model shared by the forecast engine and the persistence
//! layer.

pub mod error;
pub mod id;
pub mod observation;
pub mod prediction;
pub mod risk;
pub mod score;

pub use error::{DomainError, DomainResult};
pub use id::{PopulationId, SiteId};
pub use observation::{CountPoint, EnvironmentQuality, TreatmentRecord};
pub use prediction::{DefaultsUsed, FactorBreakdown, Prediction};
pub use risk::{RecommendedAction, RiskLevel, ScoreLevel};
pub use score::RiskScore;
