use crate::error::DbError;
use chrono::{DateTime, Duration, Utc};
use core_types::{ErrorKind, Observation, Provider};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::debug;

/// The `ObservationRepository` provides a high-level, application-specific
/// interface to the observation store. It encapsulates all SQL and data
/// access logic. Writes are append-only: rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct ObservationRepository {
    pool: PgPool,
}

/// A row fetched from the `observations` table. Enum columns travel as text
/// and are parsed back into their variants on the way out.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbObservation {
    pub id: i64,
    pub provider: String,
    pub test_type: String,
    pub latency_ms: f64,
    pub success: bool,
    pub error_kind: String,
    pub observed_value: Option<f64>,
    pub reference_value: Option<f64>,
    pub is_accurate: Option<bool>,
    pub deviation_pct: Option<f64>,
    pub response_size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl DbObservation {
    fn into_observation(self) -> Result<Observation, DbError> {
        let provider: Provider = self
            .provider
            .parse()
            .map_err(|_| DbError::InvalidRow(format!("unknown provider '{}'", self.provider)))?;
        let error_kind: ErrorKind = self
            .error_kind
            .parse()
            .map_err(|_| DbError::InvalidRow(format!("unknown error kind '{}'", self.error_kind)))?;

        Ok(Observation {
            provider,
            test_type: self.test_type,
            latency_ms: self.latency_ms,
            success: self.success,
            error_kind,
            observed_value: self.observed_value,
            reference_value: self.reference_value,
            is_accurate: self.is_accurate,
            deviation_pct: self.deviation_pct,
            response_size_bytes: self.response_size_bytes,
            timestamp: self.created_at,
        })
    }
}

impl ObservationRepository {
    /// Creates a new `ObservationRepository` with a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a single observation. Called once per probe, as each
    /// observation is produced, rather than batched at the end of a run.
    pub async fn save_observation(&self, observation: &Observation) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO observations (
                provider, test_type, latency_ms, success, error_kind,
                observed_value, reference_value, is_accurate, deviation_pct,
                response_size_bytes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(observation.provider.as_str())
        .bind(&observation.test_type)
        .bind(observation.latency_ms)
        .bind(observation.success)
        .bind(observation.error_kind.as_str())
        .bind(observation.observed_value)
        .bind(observation.reference_value)
        .bind(observation.is_accurate)
        .bind(observation.deviation_pct)
        .bind(observation.response_size_bytes)
        .bind(observation.timestamp)
        .execute(&self.pool)
        .await?;

        debug!(provider = %observation.provider, test_type = %observation.test_type, "Observation persisted");
        Ok(())
    }

    /// Fetches all observations within the lookback window, oldest first.
    pub async fn get_observations_since(&self, hours: i64) -> Result<Vec<Observation>, DbError> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let rows = sqlx::query_as::<_, DbObservation>(
            r#"
            SELECT id, provider, test_type, latency_ms, success, error_kind,
                   observed_value, reference_value, is_accurate, deviation_pct,
                   response_size_bytes, created_at
            FROM observations
            WHERE created_at >= $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbObservation::into_observation).collect()
    }

    /// Fetches price-test observations within the lookback window, oldest
    /// first. Used by accuracy queries, which ignore wallet tests.
    pub async fn get_price_observations_since(
        &self,
        hours: i64,
    ) -> Result<Vec<Observation>, DbError> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let rows = sqlx::query_as::<_, DbObservation>(
            r#"
            SELECT id, provider, test_type, latency_ms, success, error_kind,
                   observed_value, reference_value, is_accurate, deviation_pct,
                   response_size_bytes, created_at
            FROM observations
            WHERE created_at >= $1 AND test_type LIKE 'price_%'
            ORDER BY created_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbObservation::into_observation).collect()
    }

    /// Fetches one provider's observations within the lookback window,
    /// oldest first.
    pub async fn get_provider_observations_since(
        &self,
        provider: Provider,
        hours: i64,
    ) -> Result<Vec<Observation>, DbError> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let rows = sqlx::query_as::<_, DbObservation>(
            r#"
            SELECT id, provider, test_type, latency_ms, success, error_kind,
                   observed_value, reference_value, is_accurate, deviation_pct,
                   response_size_bytes, created_at
            FROM observations
            WHERE created_at >= $1 AND provider = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(cutoff)
        .bind(provider.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbObservation::into_observation).collect()
    }
}
