use crate::error::{AppError, Result};
use crate::models::IdempotencyRecord;
use anyhow::Context;
use sqlx::PgConnection;

/// Outcome of a cache probe for (key, endpoint).
#[derive(Debug, Clone)]
pub enum IdempotencyLookup {
    /// The key was used before on the same endpoint; replay this body.
    Hit(serde_json::Value),
    /// The key is unused (or its record expired).
    Miss,
    /// The key was used on a different endpoint, which is a client bug.
    Conflict,
}

/// Content-addressable cache over persisted request outcomes, keyed by the
/// client-supplied idempotency token and scoped to one endpoint.
///
/// Both operations run on the caller's open transaction so that the cached
/// record commits (or rolls back) together with the ledger writes.
#[derive(Clone)]
pub struct IdempotencyStore {
    ttl_hours: i64,
}

impl IdempotencyStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self { ttl_hours }
    }

    /// Probes the cache. Expired records count as a miss and are deleted
    /// lazily; there is no background pruner.
    pub async fn lookup(
        &self,
        conn: &mut PgConnection,
        key: &str,
        endpoint: &str,
    ) -> Result<IdempotencyLookup> {
        let record = sqlx::query_as::<_, IdempotencyRecord>(
            r#"
            SELECT id, key, endpoint, response_body, created_at, expires_at
            FROM idempotency_keys
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;

        let record = match record {
            None => return Ok(IdempotencyLookup::Miss),
            Some(record) => record,
        };

        if record.is_expired() {
            sqlx::query("DELETE FROM idempotency_keys WHERE id = $1")
                .bind(record.id)
                .execute(&mut *conn)
                .await?;
            return Ok(IdempotencyLookup::Miss);
        }

        if record.endpoint != endpoint {
            return Ok(IdempotencyLookup::Conflict);
        }

        let body: serde_json::Value = serde_json::from_str(&record.response_body)
            .with_context(|| format!("corrupt cached response for idempotency key '{key}'"))?;
        Ok(IdempotencyLookup::Hit(body))
    }

    /// Inserts the outcome for a fresh key. A unique violation means a
    /// concurrent request stored the same key first; the caller rolls back
    /// and retries, taking the `Hit` path on the next attempt.
    pub async fn store(
        &self,
        conn: &mut PgConnection,
        key: &str,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let record = IdempotencyRecord::new(
            key.to_string(),
            endpoint.to_string(),
            body.to_string(),
            self.ttl_hours,
        );

        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (id, key, endpoint, response_body, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.key)
        .bind(&record.endpoint)
        .bind(&record.response_body)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateRace(key.to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(())
    }
}
