//! Postgres-backed prediction/score store.
//!
//! Expected schema (managed by the surrounding application):
//!
//! ```sql
//! predictions (
//!     id bigserial PK,
//!     population_id uuid NOT NULL,
//!     generated_at timestamptz NOT NULL,
//!     target_date date NOT NULL,
//!     horizon_days int NOT NULL,
//!     current_value float8 NOT NULL,
//!     predicted_value float8 NOT NULL,
//!     confidence float8 NOT NULL,
//!     exceedance_probability float8 NOT NULL,
//!     risk_level text NOT NULL,
//!     recommended_action text NOT NULL,
//!     model_version text NOT NULL,
//!     factors jsonb NOT NULL,
//!     defaults_used jsonb NOT NULL
//! )
//! risk_scores (
//!     id bigserial PK,
//!     population_id uuid NOT NULL,
//!     lice_score int NOT NULL,
//!     mortality_score int NOT NULL,
//!     environment_score int NOT NULL,
//!     treatment_score int NOT NULL,
//!     overall_score int NOT NULL,
//!     risk_level text NOT NULL,
//!     computed_at timestamptz NOT NULL
//! )
//! ```
//!
//! The batch append runs inside one transaction: a failed insert rolls the
//! whole cycle's rows back (the transaction is dropped un-committed), which
//! is what makes the append atomic and keeps concurrent batches from
//! interleaving rows of a half-written generation.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use licewatch_core::{PopulationId, Prediction, RecommendedAction, RiskLevel, RiskScore, ScoreLevel};

use super::query::{Pagination, PredictionFilter, PredictionPage, PredictionSummary};
use super::r#trait::{PredictionStore, StoreError};

/// Postgres implementation of [`PredictionStore`].
#[derive(Debug, Clone)]
pub struct PostgresPredictionStore {
    pool: Arc<PgPool>,
}

impl PostgresPredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> StoreError {
    StoreError::Storage(format!("{operation}: {error}"))
}

fn parse_risk_level(s: &str) -> Result<RiskLevel, StoreError> {
    match s {
        "LOW" => Ok(RiskLevel::Low),
        "MEDIUM" => Ok(RiskLevel::Medium),
        "HIGH" => Ok(RiskLevel::High),
        "CRITICAL" => Ok(RiskLevel::Critical),
        other => Err(StoreError::CorruptRow(format!("unknown risk level: {other}"))),
    }
}

fn parse_action(s: &str) -> Result<RecommendedAction, StoreError> {
    match s {
        "NO_ACTION" => Ok(RecommendedAction::NoAction),
        "MONITOR" => Ok(RecommendedAction::Monitor),
        "SCHEDULE_TREATMENT" => Ok(RecommendedAction::ScheduleTreatment),
        "IMMEDIATE_TREATMENT" => Ok(RecommendedAction::ImmediateTreatment),
        other => Err(StoreError::CorruptRow(format!("unknown action: {other}"))),
    }
}

fn parse_score_level(s: &str) -> Result<ScoreLevel, StoreError> {
    match s {
        "LOW" => Ok(ScoreLevel::Low),
        "MODERATE" => Ok(ScoreLevel::Moderate),
        "HIGH" => Ok(ScoreLevel::High),
        "CRITICAL" => Ok(ScoreLevel::Critical),
        other => Err(StoreError::CorruptRow(format!("unknown score level: {other}"))),
    }
}

fn decode_prediction(row: &sqlx::postgres::PgRow) -> Result<Prediction, StoreError> {
    let risk_level = parse_risk_level(row.get("risk_level"))?;
    let recommended_action = parse_action(row.get("recommended_action"))?;
    let factors = serde_json::from_value(row.get("factors"))
        .map_err(|e| StoreError::CorruptRow(format!("factors: {e}")))?;
    let defaults_used = serde_json::from_value(row.get("defaults_used"))
        .map_err(|e| StoreError::CorruptRow(format!("defaults_used: {e}")))?;

    Ok(Prediction {
        population_id: PopulationId::from_uuid(row.get("population_id")),
        generated_at: row.get("generated_at"),
        target_date: row.get("target_date"),
        horizon_days: row.get::<i32, _>("horizon_days") as u32,
        current_value: row.get("current_value"),
        predicted_value: row.get("predicted_value"),
        confidence: row.get("confidence"),
        exceedance_probability: row.get("exceedance_probability"),
        risk_level,
        recommended_action,
        model_version: row.get("model_version"),
        factors,
        defaults_used,
    })
}

fn decode_score(row: &sqlx::postgres::PgRow) -> Result<RiskScore, StoreError> {
    Ok(RiskScore {
        population_id: PopulationId::from_uuid(row.get("population_id")),
        lice_score: row.get::<i32, _>("lice_score") as u8,
        mortality_score: row.get::<i32, _>("mortality_score") as u8,
        environment_score: row.get::<i32, _>("environment_score") as u8,
        treatment_score: row.get::<i32, _>("treatment_score") as u8,
        overall_score: row.get::<i32, _>("overall_score") as u8,
        risk_level: parse_score_level(row.get("risk_level"))?,
        computed_at: row.get("computed_at"),
    })
}

#[async_trait]
impl PredictionStore for PostgresPredictionStore {
    async fn append_predictions(&self, batch: &[Prediction]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("append_predictions/begin", e))?;

        for p in batch {
            let factors = serde_json::to_value(&p.factors)
                .map_err(|e| StoreError::Storage(format!("encode factors: {e}")))?;
            let defaults_used = serde_json::to_value(p.defaults_used)
                .map_err(|e| StoreError::Storage(format!("encode defaults_used: {e}")))?;

            sqlx::query(
                r#"
                INSERT INTO predictions (
                    population_id, generated_at, target_date, horizon_days,
                    current_value, predicted_value, confidence,
                    exceedance_probability, risk_level, recommended_action,
                    model_version, factors, defaults_used
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(p.population_id.as_uuid())
            .bind(p.generated_at)
            .bind(p.target_date)
            .bind(p.horizon_days as i32)
            .bind(p.current_value)
            .bind(p.predicted_value)
            .bind(p.confidence)
            .bind(p.exceedance_probability)
            .bind(p.risk_level.as_str())
            .bind(p.recommended_action.as_str())
            .bind(&p.model_version)
            .bind(factors)
            .bind(defaults_used)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("append_predictions/insert", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("append_predictions/commit", e))
    }

    async fn query_predictions(
        &self,
        filter: &PredictionFilter,
        page: &Pagination,
    ) -> Result<PredictionPage, StoreError> {
        let population = filter.population_id.map(|id| *id.as_uuid());
        let risk_level = filter.risk_level.map(|l| l.as_str());
        let horizon = filter.horizon_days.map(|h| h as i32);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM predictions
            WHERE ($1::uuid IS NULL OR population_id = $1)
              AND ($2::text IS NULL OR risk_level = $2)
              AND ($3::int IS NULL OR horizon_days = $3)
            "#,
        )
        .bind(population)
        .bind(risk_level)
        .bind(horizon)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_predictions/count", e))?;

        let rows = sqlx::query(
            r#"
            SELECT
                population_id, generated_at, target_date, horizon_days,
                current_value, predicted_value, confidence,
                exceedance_probability, risk_level, recommended_action,
                model_version, factors, defaults_used
            FROM predictions
            WHERE ($1::uuid IS NULL OR population_id = $1)
              AND ($2::text IS NULL OR risk_level = $2)
              AND ($3::int IS NULL OR horizon_days = $3)
            ORDER BY generated_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(population)
        .bind(risk_level)
        .bind(horizon)
        .bind(page.per_page as i64)
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_predictions/page", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(decode_prediction(row)?);
        }

        Ok(PredictionPage {
            items,
            total: total.max(0) as u64,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn prediction_summary(
        &self,
        horizon_days: u32,
    ) -> Result<PredictionSummary, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (population_id)
                population_id, generated_at, target_date, horizon_days,
                current_value, predicted_value, confidence,
                exceedance_probability, risk_level, recommended_action,
                model_version, factors, defaults_used
            FROM predictions
            WHERE horizon_days = $1
            ORDER BY population_id, generated_at DESC
            "#,
        )
        .bind(horizon_days as i32)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("prediction_summary", e))?;

        let mut current = Vec::with_capacity(rows.len());
        for row in &rows {
            current.push(decode_prediction(row)?);
        }
        let refs: Vec<&Prediction> = current.iter().collect();
        Ok(PredictionSummary::from_current(&refs))
    }

    async fn record_score(&self, score: &RiskScore) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO risk_scores (
                population_id, lice_score, mortality_score, environment_score,
                treatment_score, overall_score, risk_level, computed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(score.population_id.as_uuid())
        .bind(i32::from(score.lice_score))
        .bind(i32::from(score.mortality_score))
        .bind(i32::from(score.environment_score))
        .bind(i32::from(score.treatment_score))
        .bind(i32::from(score.overall_score))
        .bind(score.risk_level.as_str())
        .bind(score.computed_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_score", e))?;
        Ok(())
    }

    async fn latest_score(
        &self,
        population: PopulationId,
    ) -> Result<Option<RiskScore>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                population_id, lice_score, mortality_score, environment_score,
                treatment_score, overall_score, risk_level, computed_at
            FROM risk_scores
            WHERE population_id = $1
            ORDER BY computed_at DESC
            LIMIT 1
            "#,
        )
        .bind(population.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_score", e))?;

        row.as_ref().map(decode_score).transpose()
    }

    async fn latest_scores(&self) -> Result<Vec<RiskScore>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (population_id)
                population_id, lice_score, mortality_score, environment_score,
                treatment_score, overall_score, risk_level, computed_at
            FROM risk_scores
            ORDER BY population_id, computed_at DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_scores", e))?;

        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            scores.push(decode_score(row)?);
        }
        scores.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        Ok(scores)
    }
}
