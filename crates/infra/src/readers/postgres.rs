//! Postgres-backed farm data reader.
//!
//! Expected schema (managed by the surrounding application, not this crate):
//!
//! ```sql
//! populations        (id uuid PK, site_id uuid, name text, is_active boolean)
//! lice_counts        (population_id uuid, sample_date date,
//!                     adult_females int, mobiles int, fish_examined int)
//! environment_readings (population_id uuid, recorded_at timestamptz,
//!                     temperature_celsius float8, oxygen_percent float8)
//! treatments         (population_id uuid, status text,
//!                     completed_date date, effectiveness_percent float8)
//! mortality_records  (population_id uuid, date date, count float8)
//! ```
//!
//! The weighted-ratio aggregation runs in SQL: stage counts are pooled per
//! sampling day and divided by the day's examined-fish total, with zero-fish
//! days dropped via the HAVING clause (the Rust-side in-memory reader
//! implements the identical rule).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{PgPool, Row};

use licewatch_core::{CountPoint, EnvironmentQuality, PopulationId, TreatmentRecord};

use super::{FarmDataReader, ReaderError};

/// Postgres implementation of [`FarmDataReader`].
///
/// Shares a SQLx connection pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresFarmDataReader {
    pool: Arc<PgPool>,
}

impl PostgresFarmDataReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    fn cutoff(window_days: u32) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(i64::from(window_days))
    }
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> ReaderError {
    match &error {
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ReaderError::Unavailable(format!("{operation}: {error}"))
        }
        _ => ReaderError::Query(format!("{operation}: {error}")),
    }
}

#[async_trait]
impl FarmDataReader for PostgresFarmDataReader {
    async fn active_populations(&self) -> Result<Vec<PopulationId>, ReaderError> {
        let rows = sqlx::query(
            r#"
            SELECT id
            FROM populations
            WHERE is_active = true
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("active_populations", e))?;

        Ok(rows
            .into_iter()
            .map(|row| PopulationId::from_uuid(row.get("id")))
            .collect())
    }

    async fn count_history(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<CountPoint>, ReaderError> {
        let rows = sqlx::query(
            r#"
            SELECT
                sample_date,
                (SUM(adult_females)::float8 + 0.5 * SUM(mobiles)::float8)
                    / SUM(fish_examined)::float8 AS ratio
            FROM lice_counts
            WHERE population_id = $1
              AND sample_date >= $2
            GROUP BY sample_date
            HAVING SUM(fish_examined) > 0
            ORDER BY sample_date ASC
            "#,
        )
        .bind(population.as_uuid())
        .bind(Self::cutoff(window_days))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_history", e))?;

        Ok(rows
            .into_iter()
            .map(|row| CountPoint::new(row.get("sample_date"), row.get("ratio")))
            .collect())
    }

    async fn latest_temperature(
        &self,
        population: PopulationId,
    ) -> Result<Option<f64>, ReaderError> {
        let row = sqlx::query(
            r#"
            SELECT temperature_celsius
            FROM environment_readings
            WHERE population_id = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(population.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_temperature", e))?;

        Ok(row.map(|r| r.get("temperature_celsius")))
    }

    async fn recent_treatments(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Vec<TreatmentRecord>, ReaderError> {
        let rows = sqlx::query(
            r#"
            SELECT completed_date, effectiveness_percent
            FROM treatments
            WHERE population_id = $1
              AND status = 'COMPLETED'
              AND completed_date >= $2
            ORDER BY completed_date DESC
            "#,
        )
        .bind(population.as_uuid())
        .bind(Self::cutoff(window_days))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_treatments", e))?;

        Ok(rows
            .into_iter()
            .map(|row| TreatmentRecord {
                completed_date: row.get("completed_date"),
                effectiveness_percent: row.get("effectiveness_percent"),
            })
            .collect())
    }

    async fn mortality_rate(
        &self,
        population: PopulationId,
        window_days: u32,
    ) -> Result<Option<f64>, ReaderError> {
        let row = sqlx::query(
            r#"
            SELECT AVG(count)::float8 AS avg_mortality
            FROM mortality_records
            WHERE population_id = $1
              AND date >= $2
            "#,
        )
        .bind(population.as_uuid())
        .bind(Self::cutoff(window_days))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mortality_rate", e))?;

        Ok(row.get("avg_mortality"))
    }

    async fn environment_quality(
        &self,
        population: PopulationId,
    ) -> Result<Option<EnvironmentQuality>, ReaderError> {
        let row = sqlx::query(
            r#"
            SELECT temperature_celsius, oxygen_percent
            FROM environment_readings
            WHERE population_id = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(population.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("environment_quality", e))?;

        Ok(row.map(|r| EnvironmentQuality {
            temperature: r.get("temperature_celsius"),
            oxygen_percent: r.get("oxygen_percent"),
        }))
    }
}
