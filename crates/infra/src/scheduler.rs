//! Daily forecast scheduler.
//!
//! An explicit object owning its timer task, not a module-global handle. One
//! process holds one scheduler; `start` is idempotent while armed, `stop`
//! clears the held handle, and a later `start` re-arms from scratch with no
//! memory of elapsed time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::readers::FarmDataReader;
use crate::service::ForecastService;
use crate::store::PredictionStore;

/// Scheduler tuning. The defaults fire once a day at 06:00 local time.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Local hour (0–23) the daily run targets.
    pub target_hour: u32,
    /// Cadence between runs once aligned to the target hour.
    pub period: Duration,
    /// Fire one run immediately on `start` (production wiring).
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_hour: 6,
            period: Duration::from_secs(24 * 60 * 60),
            run_on_start: false,
        }
    }
}

impl SchedulerConfig {
    pub fn with_target_hour(mut self, hour: u32) -> Self {
        self.target_hour = hour % 24;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Read overrides from the environment, with logged defaults:
    /// `LICEWATCH_FORECAST_HOUR` and `LICEWATCH_RUN_ON_START`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("LICEWATCH_FORECAST_HOUR") {
            match raw.parse::<u32>() {
                Ok(hour) if hour < 24 => config.target_hour = hour,
                _ => warn!(value = %raw, "invalid LICEWATCH_FORECAST_HOUR, keeping default"),
            }
        }
        if let Ok(raw) = std::env::var("LICEWATCH_RUN_ON_START") {
            config.run_on_start = matches!(raw.as_str(), "1" | "true" | "TRUE");
        }
        config
    }
}

/// Snapshot of the scheduler's state, recomputed from the wall clock on
/// every call so it never drifts from system clock changes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchedulerStatus {
    pub armed: bool,
    pub minutes_until_next_run: Option<i64>,
}

/// Time until the next occurrence of `target_hour:00` local. If that hour
/// has already passed today (or is exactly now), the next occurrence is
/// tomorrow.
pub fn delay_until_target_hour(target_hour: u32, now: NaiveDateTime) -> chrono::Duration {
    let today_target = now
        .date()
        .and_hms_opt(target_hour % 24, 0, 0)
        .expect("hour is in range after modulo");
    let next = if today_target <= now {
        today_target + chrono::Duration::days(1)
    } else {
        today_target
    };
    next - now
}

fn delay_from_wall_clock(target_hour: u32) -> Duration {
    let delay = delay_until_target_hour(target_hour, Local::now().naive_local());
    Duration::from_millis(delay.num_milliseconds().max(0) as u64)
}

/// Process-wide daily scheduler for forecast cycles.
///
/// Lifecycle: `Stopped → Armed → (fires repeatedly) → Stopped`. State is
/// in-memory only; after a process restart a fresh `start` call is required.
pub struct ForecastScheduler {
    config: SchedulerConfig,
    timer: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ForecastScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config, timer: Mutex::new(None) }
    }

    /// Arm the daily timer. A no-op (with a warning) while already armed;
    /// the single held handle guards against duplicate timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<R, S>(&self, service: Arc<ForecastService<R, S>>)
    where
        R: FarmDataReader + 'static,
        S: PredictionStore + 'static,
    {
        let mut slot = self.timer.lock().unwrap();
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                warn!("forecast scheduler already armed");
                return;
            }
        }

        if self.config.run_on_start {
            info!("running initial forecast cycle");
            let initial = Arc::clone(&service);
            // Fire and forget: a failed initial run is logged, never thrown.
            tokio::spawn(async move {
                let summary = initial.run_cycle().await;
                if !summary.success {
                    error!(error = ?summary.error, "initial forecast cycle failed");
                }
            });
        }

        let delay = delay_from_wall_clock(self.config.target_hour);
        info!(
            next_run_in_minutes = delay.as_secs() / 60,
            target_hour = self.config.target_hour,
            "forecast scheduler started"
        );

        let period = self.config.period;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            loop {
                let summary = service.run_cycle().await;
                if !summary.success {
                    error!(error = ?summary.error, "scheduled forecast cycle failed");
                }
                tokio::time::sleep(period).await;
            }
        });
        *slot = Some(handle);
    }

    /// Clear the held timer and transition to Stopped. A later `start`
    /// re-arms from scratch.
    pub fn stop(&self) {
        let mut slot = self.timer.lock().unwrap();
        if let Some(handle) = slot.take() {
            handle.abort();
            info!("forecast scheduler stopped");
        }
    }

    /// Current state, with minutes-to-next-run computed fresh from the wall
    /// clock rather than from stored state.
    pub fn status(&self) -> SchedulerStatus {
        let slot = self.timer.lock().unwrap();
        let armed = slot.as_ref().is_some_and(|handle| !handle.is_finished());
        SchedulerStatus {
            armed,
            minutes_until_next_run: armed.then(|| {
                delay_until_target_hour(self.config.target_hour, Local::now().naive_local())
                    .num_minutes()
            }),
        }
    }
}

impl Drop for ForecastScheduler {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.timer.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
