//! Forecast service: wires the read interfaces into the pure engine and the
//! store.
//!
//! Degradation policy lives here, not in the readers: a failed or empty read
//! resolves to its documented default and the substitution is recorded on
//! the emitted prediction's provenance flags. A fleet run iterates
//! populations sequentially and isolates per-population failures: one bad
//! population is logged and skipped, the rest of the fleet still forecasts.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use licewatch_core::{
    CountPoint, DomainError, PopulationId, Prediction, RiskScore, ScoreLevel, TreatmentRecord,
};
use licewatch_forecast::scorer::{
    self, ComponentScores, DEFAULT_ENVIRONMENT_SCORE, DEFAULT_MORTALITY_SCORE,
    DEFAULT_TREATMENT_SCORE,
};
use licewatch_forecast::{forecast_at, ForecastInputs};

use crate::readers::{FarmDataReader, ReaderError};
use crate::store::{PredictionStore, StoreError};

/// Temperature assumed when no environment reading is available, °C.
const DEFAULT_TEMPERATURE: f64 = 10.0;

/// Service-level error.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Tunable windows and horizons for the forecast pipeline.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Count-history lookback, days.
    pub history_window_days: u32,
    /// Treatment lookback for growth damping, days.
    pub treatment_window_days: u32,
    /// Mortality lookback for the composite scorer, days.
    pub mortality_window_days: u32,
    /// Treatment-effectiveness lookback for the composite scorer, days.
    pub effectiveness_window_days: u32,
    /// Horizons generated per cycle; the first is the alerting horizon.
    pub horizons: Vec<u32>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_window_days: 30,
            treatment_window_days: 14,
            mortality_window_days: 7,
            effectiveness_window_days: 30,
            horizons: vec![7, 14],
        }
    }
}

impl ForecastConfig {
    pub fn with_horizons(mut self, horizons: Vec<u32>) -> Self {
        self.horizons = horizons;
        self
    }

    pub fn with_history_window(mut self, days: u32) -> Self {
        self.history_window_days = days;
        self
    }
}

/// Downstream alerting hook.
///
/// The engine classifies; the excluded notification subsystem sends. When a
/// cycle produces CRITICAL predictions, the sink receives exactly that
/// filtered subset.
pub trait CriticalAlertSink: Send + Sync {
    fn notify_critical(&self, predictions: &[Prediction]);
}

/// Sink that drops alerts (default wiring).
#[derive(Debug, Default)]
pub struct NoopAlertSink;

impl CriticalAlertSink for NoopAlertSink {
    fn notify_critical(&self, _predictions: &[Prediction]) {}
}

/// In-memory sink for tests/dev: records each notified batch.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    inner: Mutex<Vec<Vec<Prediction>>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn batches(&self) -> Vec<Vec<Prediction>> {
        self.inner.lock().unwrap().clone()
    }
}

impl CriticalAlertSink for InMemoryAlertSink {
    fn notify_critical(&self, predictions: &[Prediction]) {
        self.inner.lock().unwrap().push(predictions.to_vec());
    }
}

/// Outcome of one scheduler cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub success: bool,
    /// Persisted prediction count per horizon.
    pub prediction_counts: BTreeMap<u32, usize>,
    /// Populations skipped because their forecast failed.
    pub skipped: usize,
    /// CRITICAL predictions on the alerting horizon.
    pub critical_count: usize,
    pub error: Option<String>,
}

/// Aggregate (site-wide) risk roll-up: average of the latest overall scores,
/// banded like an individual score. `None` when there are no scores.
pub fn aggregate_risk(scores: &[RiskScore]) -> Option<(u8, ScoreLevel)> {
    if scores.is_empty() {
        return None;
    }
    let sum: u32 = scores.iter().map(|s| u32::from(s.overall_score)).sum();
    let avg = (sum as f64 / scores.len() as f64).round() as u8;
    Some((avg, scorer::level_for(avg)))
}

struct FleetBatch {
    predictions: Vec<Prediction>,
    skipped: usize,
}

/// The forecast engine's service facade: reads, computes, classifies,
/// persists.
pub struct ForecastService<R, S> {
    reader: Arc<R>,
    store: Arc<S>,
    alerts: Arc<dyn CriticalAlertSink>,
    config: ForecastConfig,
    /// Serializes timer-driven and manually triggered cycles.
    run_lock: tokio::sync::Mutex<()>,
}

impl<R, S> ForecastService<R, S>
where
    R: FarmDataReader,
    S: PredictionStore,
{
    pub fn new(reader: Arc<R>, store: Arc<S>) -> Self {
        Self {
            reader,
            store,
            alerts: Arc::new(NoopAlertSink),
            config: ForecastConfig::default(),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_alert_sink(mut self, sink: Arc<dyn CriticalAlertSink>) -> Self {
        self.alerts = sink;
        self
    }

    /// Forecast one population at the injected instant.
    pub async fn forecast_population_at(
        &self,
        population: PopulationId,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Prediction, ServiceError> {
        let (history, history_defaulted) = match self
            .reader
            .count_history(population, self.config.history_window_days)
            .await
        {
            Ok(history) => (history, false),
            Err(e) => {
                warn!(population = %population, error = %e, "count history read failed, using empty history");
                (Vec::new(), true)
            }
        };

        let (temperature, temperature_defaulted) =
            match self.reader.latest_temperature(population).await {
                Ok(Some(t)) => (t, false),
                Ok(None) => (DEFAULT_TEMPERATURE, true),
                Err(e) => {
                    warn!(population = %population, error = %e, "temperature read failed, assuming {DEFAULT_TEMPERATURE}°C");
                    (DEFAULT_TEMPERATURE, true)
                }
            };

        let (treatments, treatments_defaulted) = match self
            .reader
            .recent_treatments(population, self.config.treatment_window_days)
            .await
        {
            Ok(treatments) => (treatments, false),
            Err(e) => {
                warn!(population = %population, error = %e, "treatment read failed, assuming none");
                (Vec::new(), true)
            }
        };

        validate_inputs(&history, temperature)?;

        let mut prediction = forecast_at(
            population,
            ForecastInputs { history: &history, temperature, treatments: &treatments },
            horizon_days,
            now,
        );
        prediction.defaults_used.history = history_defaulted;
        prediction.defaults_used.temperature = temperature_defaulted;
        prediction.defaults_used.treatments = treatments_defaulted;
        Ok(prediction)
    }

    /// Forecast one population against the wall clock.
    pub async fn forecast_population(
        &self,
        population: PopulationId,
        horizon_days: u32,
    ) -> Result<Prediction, ServiceError> {
        self.forecast_population_at(population, horizon_days, Utc::now()).await
    }

    async fn fleet_forecasts_at(
        &self,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> Result<FleetBatch, ServiceError> {
        // The fleet enumeration itself has no sensible default; if it fails
        // the whole run fails.
        let populations = self.reader.active_populations().await?;

        let mut predictions = Vec::with_capacity(populations.len());
        let mut skipped = 0;
        for population in populations {
            match self.forecast_population_at(population, horizon_days, now).await {
                Ok(prediction) => predictions.push(prediction),
                Err(e) => {
                    error!(population = %population, horizon_days, error = %e, "forecast failed, skipping population");
                    skipped += 1;
                }
            }
        }
        Ok(FleetBatch { predictions, skipped })
    }

    /// Compute the fleet's forecasts for one horizon (no persistence).
    pub async fn generate_forecasts(
        &self,
        horizon_days: u32,
    ) -> Result<Vec<Prediction>, ServiceError> {
        Ok(self.fleet_forecasts_at(horizon_days, Utc::now()).await?.predictions)
    }

    /// Persist one batch atomically.
    pub async fn persist_forecasts(&self, batch: &[Prediction]) -> Result<(), ServiceError> {
        self.store.append_predictions(batch).await?;
        info!(count = batch.len(), "stored forecast batch");
        Ok(())
    }

    /// Compute (and record) a composite risk score at the injected instant.
    ///
    /// Each scorer input degrades to its own default independently.
    pub async fn compute_risk_score_at(
        &self,
        population: PopulationId,
        now: DateTime<Utc>,
    ) -> Result<RiskScore, ServiceError> {
        let prediction = self.forecast_population_at(population, 7, now).await?;

        let mortality = match self
            .reader
            .mortality_rate(population, self.config.mortality_window_days)
            .await
        {
            Ok(Some(avg)) => scorer::mortality_score(avg),
            Ok(None) => DEFAULT_MORTALITY_SCORE,
            Err(e) => {
                warn!(population = %population, error = %e, "mortality read failed, using default score");
                DEFAULT_MORTALITY_SCORE
            }
        };

        let environment = match self.reader.environment_quality(population).await {
            Ok(Some(quality)) => scorer::environment_score(&quality),
            Ok(None) => DEFAULT_ENVIRONMENT_SCORE,
            Err(e) => {
                warn!(population = %population, error = %e, "environment read failed, using default score");
                DEFAULT_ENVIRONMENT_SCORE
            }
        };

        let treatment = match self
            .reader
            .recent_treatments(population, self.config.effectiveness_window_days)
            .await
        {
            Ok(treatments) if !treatments.is_empty() => mean_effectiveness(&treatments),
            Ok(_) => DEFAULT_TREATMENT_SCORE,
            Err(e) => {
                warn!(population = %population, error = %e, "treatment read failed, using default score");
                DEFAULT_TREATMENT_SCORE
            }
        };

        let components = ComponentScores {
            lice: scorer::lice_score(prediction.exceedance_probability),
            mortality,
            environment,
            treatment,
        };
        let (overall, level) = scorer::blend(&components);

        let score = RiskScore {
            population_id: population,
            lice_score: components.lice.round() as u8,
            mortality_score: components.mortality.round() as u8,
            environment_score: components.environment.round() as u8,
            treatment_score: components.treatment.round() as u8,
            overall_score: overall,
            risk_level: level,
            computed_at: now,
        };
        self.store.record_score(&score).await?;
        Ok(score)
    }

    /// Compute (and record) a composite risk score against the wall clock.
    pub async fn compute_risk_score(
        &self,
        population: PopulationId,
    ) -> Result<RiskScore, ServiceError> {
        self.compute_risk_score_at(population, Utc::now()).await
    }

    /// One full scheduler cycle at the injected instant.
    ///
    /// Generates and persists a batch per configured horizon, refreshes the
    /// composite scores, and hands CRITICAL predictions on the alerting
    /// horizon to the sink. A persistence failure aborts the cycle: the
    /// failed batch is rolled back, already-computed predictions are
    /// discarded, and no retry is attempted; the next cycle starts clean.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> RunSummary {
        let _guard = self.run_lock.lock().await;
        info!("starting forecast cycle");

        let mut prediction_counts = BTreeMap::new();
        let mut skipped = 0;
        let mut criticals: Vec<Prediction> = Vec::new();
        let alert_horizon = self.config.horizons.first().copied();

        for &horizon in &self.config.horizons {
            let fleet = match self.fleet_forecasts_at(horizon, now).await {
                Ok(fleet) => fleet,
                Err(e) => {
                    error!(horizon_days = horizon, error = %e, "forecast cycle failed");
                    return RunSummary {
                        success: false,
                        prediction_counts,
                        skipped,
                        critical_count: 0,
                        error: Some(e.to_string()),
                    };
                }
            };
            skipped += fleet.skipped;

            if let Err(e) = self.store.append_predictions(&fleet.predictions).await {
                error!(horizon_days = horizon, error = %e, "failed to persist forecast batch");
                return RunSummary {
                    success: false,
                    prediction_counts,
                    skipped,
                    critical_count: 0,
                    error: Some(e.to_string()),
                };
            }

            if Some(horizon) == alert_horizon {
                criticals = fleet
                    .predictions
                    .iter()
                    .filter(|p| p.is_critical())
                    .cloned()
                    .collect();
            }
            prediction_counts.insert(horizon, fleet.predictions.len());
        }

        self.refresh_scores(now).await;

        if !criticals.is_empty() {
            warn!(
                count = criticals.len(),
                "critical lice forecasts detected, notifying alert hook"
            );
            self.alerts.notify_critical(&criticals);
        }

        let summary = RunSummary {
            success: true,
            prediction_counts,
            skipped,
            critical_count: criticals.len(),
            error: None,
        };
        info!(
            critical = summary.critical_count,
            skipped = summary.skipped,
            "forecast cycle complete"
        );
        summary
    }

    /// One full scheduler cycle against the wall clock.
    pub async fn run_cycle(&self) -> RunSummary {
        self.run_cycle_at(Utc::now()).await
    }

    /// Refresh the composite-score table for the whole fleet. Score failures
    /// degrade per population: logged, never fatal to the cycle.
    async fn refresh_scores(&self, now: DateTime<Utc>) {
        let populations = match self.reader.active_populations().await {
            Ok(populations) => populations,
            Err(e) => {
                warn!(error = %e, "skipping score refresh, population list unavailable");
                return;
            }
        };
        for population in populations {
            if let Err(e) = self.compute_risk_score_at(population, now).await {
                warn!(population = %population, error = %e, "risk score refresh failed");
            }
        }
    }
}

fn validate_inputs(history: &[CountPoint], temperature: f64) -> Result<(), DomainError> {
    if !temperature.is_finite() {
        return Err(DomainError::validation("non-finite temperature reading"));
    }
    if history.iter().any(|p| !p.value.is_finite()) {
        return Err(DomainError::validation("non-finite count ratio in history"));
    }
    Ok(())
}

fn mean_effectiveness(treatments: &[TreatmentRecord]) -> f64 {
    treatments.iter().map(|t| t.effectiveness_percent).sum::<f64>() / treatments.len() as f64
}
