//! In-memory farm data for tests/dev.
//!
//! Holds raw observational rows and computes the same derived views the
//! Postgres reader computes in SQL, so the weighted-ratio and windowing
//! rules are exercised without a database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use licewatch_core::{CountPoint, EnvironmentQuality, PopulationId, TreatmentRecord};

use super::{FarmDataReader, ReaderError};

/// One raw counting-session row: stage counts plus fish examined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiceCountSample {
    pub date: NaiveDate,
    pub adult_females: u32,
    pub mobiles: u32,
    pub fish_examined: u32,
}

#[derive(Debug, Clone, Copy)]
struct EnvReading {
    temperature: f64,
    oxygen_percent: f64,
}

#[derive(Debug, Clone, Copy)]
struct MortalityRow {
    date: NaiveDate,
    count: f64,
}

#[derive(Debug, Default)]
struct PopulationData {
    active: bool,
    samples: Vec<LiceCountSample>,
    /// Insertion order is chronological; the last entry is the latest.
    environment: Vec<EnvReading>,
    treatments: Vec<TreatmentRecord>,
    mortality: Vec<MortalityRow>,
}

/// Per-source failure switches for degrade-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureInjection {
    pub populations: bool,
    pub history: bool,
    pub temperature: bool,
    pub treatments: bool,
    pub mortality: bool,
    pub environment: bool,
}

/// In-memory [`FarmDataReader`] for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryFarmData {
    inner: RwLock<HashMap<PopulationId, PopulationData>>,
    /// Override for "today" so window arithmetic is deterministic in tests.
    today: RwLock<Option<NaiveDate>>,
    failures: RwLock<FailureInjection>,
}

impl InMemoryFarmData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn add_population(&self, id: PopulationId) {
        let mut inner = self.inner.write().unwrap();
        inner.entry(id).or_default().active = true;
    }

    pub fn deactivate(&self, id: PopulationId) {
        if let Some(data) = self.inner.write().unwrap().get_mut(&id) {
            data.active = false;
        }
    }

    pub fn record_count(&self, id: PopulationId, sample: LiceCountSample) {
        let mut inner = self.inner.write().unwrap();
        inner.entry(id).or_default().samples.push(sample);
    }

    pub fn record_environment(&self, id: PopulationId, temperature: f64, oxygen_percent: f64) {
        let mut inner = self.inner.write().unwrap();
        inner
            .entry(id)
            .or_default()
            .environment
            .push(EnvReading { temperature, oxygen_percent });
    }

    pub fn record_treatment(
        &self,
        id: PopulationId,
        completed_date: NaiveDate,
        effectiveness_percent: f64,
    ) {
        let mut inner = self.inner.write().unwrap();
        inner
            .entry(id)
            .or_default()
            .treatments
            .push(TreatmentRecord { completed_date, effectiveness_percent });
    }

    pub fn record_mortality(&self, id: PopulationId, date: NaiveDate, count: f64) {
        let mut inner = self.inner.write().unwrap();
        inner.entry(id).or_default().mortality.push(MortalityRow { date, count });
    }

    /// Pin "today" for deterministic window arithmetic in tests.
    pub fn set_today(&self, today: NaiveDate) {
        *self.today.write().unwrap() = Some(today);
    }

    /// Flip per-source failure switches for degrade-path tests.
    pub fn inject_failures(&self, failures: FailureInjection) {
        *self.failures.write().unwrap() = failures;
    }

    fn today(&self) -> NaiveDate {
        self.today.read().unwrap().unwrap_or_else(|| Utc::now().date_naive())
    }

    fn failures(&self) -> FailureInjection {
        *self.failures.read().unwrap()
    }

    fn unavailable(source: &str) -> ReaderError {
        ReaderError::Unavailable(format!("injected {source} failure"))
    }
}

#[async_trait]
impl FarmDataReader for InMemoryFarmData {
    async fn active_populations(&self) -> Result<Vec<PopulationId>, ReaderError> {
        if self.failures().populations {
            return Err(Self::unavailable("populations"));
        }
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<PopulationId> = inner
            .iter()
            .filter(|(_, data)| data.active)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn count_history(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<CountPoint>, ReaderError> {
        if self.failures().history {
            return Err(Self::unavailable("history"));
        }
        let cutoff = self.today() - Duration::days(i64::from(window_days));
        let inner = self.inner.read().unwrap();
        let Some(data) = inner.get(&population) else {
            return Ok(Vec::new());
        };

        // Aggregate per sampling day: weighted stage counts over fish examined.
        let mut by_day: std::collections::BTreeMap<NaiveDate, (f64, u64)> =
            std::collections::BTreeMap::new();
        for s in &data.samples {
            if s.date < cutoff {
                continue;
            }
            let entry = by_day.entry(s.date).or_insert((0.0, 0));
            entry.0 += f64::from(s.adult_females) + 0.5 * f64::from(s.mobiles);
            entry.1 += u64::from(s.fish_examined);
        }

        Ok(by_day
            .into_iter()
            .filter(|(_, (_, fish))| *fish > 0)
            .map(|(date, (weighted, fish))| CountPoint::new(date, weighted / fish as f64))
            .collect())
    }

    async fn latest_temperature(
        &self,
        population: PopulationId,
    ) -> Result<Option<f64>, ReaderError> {
        if self.failures().temperature {
            return Err(Self::unavailable("temperature"));
        }
        let inner = self.inner.read().unwrap();
        Ok(inner
            .get(&population)
            .and_then(|data| data.environment.last())
            .map(|r| r.temperature))
    }

    async fn recent_treatments(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<TreatmentRecord>, ReaderError> {
        if self.failures().treatments {
            return Err(Self::unavailable("treatments"));
        }
        let cutoff = self.today() - Duration::days(i64::from(window_days));
        let inner = self.inner.read().unwrap();
        let Some(data) = inner.get(&population) else {
            return Ok(Vec::new());
        };
        let mut recent: Vec<TreatmentRecord> = data
            .treatments
            .iter()
            .filter(|t| t.completed_date >= cutoff)
            .copied()
            .collect();
        recent.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
        Ok(recent)
    }

    async fn mortality_rate(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Option<f64>, ReaderError> {
        if self.failures().mortality {
            return Err(Self::unavailable("mortality"));
        }
        let cutoff = self.today() - Duration::days(i64::from(window_days));
        let inner = self.inner.read().unwrap();
        let counts: Vec<f64> = inner
            .get(&population)
            .map(|data| {
                data.mortality
                    .iter()
                    .filter(|m| m.date >= cutoff)
                    .map(|m| m.count)
                    .collect()
            })
            .unwrap_or_default();
        if counts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(counts.iter().sum::<f64>() / counts.len() as f64))
        }
    }

    async fn environment_quality(
        &self,
        population: PopulationId,
    ) -> Result<Option<EnvironmentQuality>, ReaderError> {
        if self.failures().environment {
            return Err(Self::unavailable("environment"));
        }
        let inner = self.inner.read().unwrap();
        Ok(inner
            .get(&population)
            .and_then(|data| data.environment.last())
            .map(|r| EnvironmentQuality {
                temperature: r.temperature,
                oxygen_percent: r.oxygen_percent,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    fn sample(date: NaiveDate, af: u32, mob: u32, fish: u32) -> LiceCountSample {
        LiceCountSample { date, adult_females: af, mobiles: mob, fish_examined: fish }
    }

    #[tokio::test]
    async fn ratio_weights_mobiles_at_half() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(30));
        // 4 adult females + 6 mobiles over 20 fish → (4 + 3) / 20 = 0.35.
        reader.record_count(id, sample(day(10), 4, 6, 20));

        let history = reader.count_history(id, 30).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!((history[0].value - 0.35).abs() < 1e-12);
    }

    #[tokio::test]
    async fn same_day_sessions_are_pooled_before_dividing() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(30));
        reader.record_count(id, sample(day(10), 2, 0, 10));
        reader.record_count(id, sample(day(10), 4, 4, 10));

        // (2 + 4 + 0.5·4) / 20 = 8 / 20 = 0.4, one point for the day.
        let history = reader.count_history(id, 30).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!((history[0].value - 0.4).abs() < 1e-12);
    }

    #[tokio::test]
    async fn zero_fish_days_are_excluded() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(30));
        reader.record_count(id, sample(day(10), 3, 0, 0));
        reader.record_count(id, sample(day(12), 3, 0, 10));

        let history = reader.count_history(id, 30).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, day(12));
    }

    #[tokio::test]
    async fn history_is_windowed_and_ascending() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(31));
        reader.record_count(id, sample(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), 9, 0, 10));
        reader.record_count(id, sample(day(20), 2, 0, 10));
        reader.record_count(id, sample(day(10), 1, 0, 10));

        let history = reader.count_history(id, 30).await.unwrap();
        assert_eq!(history.len(), 2, "out-of-window day must be dropped");
        assert!(history[0].date < history[1].date);
    }

    #[tokio::test]
    async fn treatments_come_back_most_recent_first_within_window() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(30));
        reader.record_treatment(id, day(20), 85.0);
        reader.record_treatment(id, day(27), 70.0);
        reader.record_treatment(id, day(1), 95.0); // outside 14-day window

        let treatments = reader.recent_treatments(id, 14).await.unwrap();
        assert_eq!(treatments.len(), 2);
        assert_eq!(treatments[0].completed_date, day(27));
        assert_eq!(treatments[1].completed_date, day(20));
    }

    #[tokio::test]
    async fn unknown_population_reads_as_absence() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        assert!(reader.count_history(id, 30).await.unwrap().is_empty());
        assert!(reader.latest_temperature(id).await.unwrap().is_none());
        assert!(reader.recent_treatments(id, 14).await.unwrap().is_empty());
        assert!(reader.mortality_rate(id, 7).await.unwrap().is_none());
        assert!(reader.environment_quality(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_populations_are_not_listed() {
        let reader = InMemoryFarmData::new();
        let a = PopulationId::new();
        let b = PopulationId::new();
        reader.add_population(a);
        reader.add_population(b);
        reader.deactivate(b);

        let active = reader.active_populations().await.unwrap();
        assert_eq!(active, vec![a]);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_reader_errors() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.inject_failures(FailureInjection { temperature: true, ..Default::default() });

        assert!(reader.latest_temperature(id).await.is_err());
        // Other sources are unaffected.
        assert!(reader.count_history(id, 30).await.is_ok());
    }

    #[tokio::test]
    async fn mortality_rate_averages_the_window() {
        let reader = InMemoryFarmData::new();
        let id = PopulationId::new();
        reader.add_population(id);
        reader.set_today(day(30));
        reader.record_mortality(id, day(25), 2.0);
        reader.record_mortality(id, day(26), 4.0);
        reader.record_mortality(id, day(1), 100.0); // outside the week

        let rate = reader.mortality_rate(id, 7).await.unwrap();
        assert_eq!(rate, Some(3.0));
    }
}
