use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A cached outcome for one client-supplied idempotency key, scoped to the
/// endpoint that produced it. Written in the same store transaction as the
/// movement it caches; eligible for pruning after `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdempotencyRecord {
    pub id: Uuid,
    pub key: String,
    pub endpoint: String,
    pub response_body: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl IdempotencyRecord {
    pub fn new(key: String, endpoint: String, response_body: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key,
            endpoint,
            response_body,
            created_at: now,
            expires_at: Some(now + Duration::hours(ttl_hours)),
        }
    }

    /// Records without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() > at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_not_expired() {
        let record = IdempotencyRecord::new(
            "k1".to_string(),
            "top_up".to_string(),
            "{}".to_string(),
            24,
        );
        assert!(!record.is_expired());
        let ttl = record.expires_at.unwrap() - record.created_at;
        assert_eq!(ttl, Duration::hours(24));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let mut record = IdempotencyRecord::new(
            "k2".to_string(),
            "spend".to_string(),
            "{}".to_string(),
            24,
        );
        record.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(record.is_expired());
    }

    #[test]
    fn test_missing_expiry_never_expires() {
        let mut record = IdempotencyRecord::new(
            "k3".to_string(),
            "spend".to_string(),
            "{}".to_string(),
            24,
        );
        record.expires_at = None;
        assert!(!record.is_expired());
    }
}
