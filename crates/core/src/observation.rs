//! Observation types consumed by the forecast engine.
//!
//! These are read-side views over data recorded elsewhere (counting app,
//! environment sensors, treatment log). The engine never writes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One sampling day's normalized lice load for a population.
///
/// `value` is the weighted count ratio: (adult females + 0.5 × mobile stage)
/// per fish examined that day. Days with zero examined fish are excluded at
/// the read boundary, so the ratio is always well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl CountPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A completed delousing treatment, as seen by the engine.
///
/// Only treatments with status `completed` inside the trailing lookback
/// window are read; ordering is most-recent-first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRecord {
    pub completed_date: NaiveDate,
    pub effectiveness_percent: f64,
}

/// Environment reading used by the composite scorer (temperature + oxygen).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentQuality {
    /// Water temperature in °C.
    pub temperature: f64,
    /// Dissolved oxygen saturation in percent.
    pub oxygen_percent: f64,
}
