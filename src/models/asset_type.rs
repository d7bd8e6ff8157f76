use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A virtual currency managed by the platform (e.g. coins, points).
/// Inactive asset types cannot back new movements.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetType {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AssetType {
    pub fn new(name: String, symbol: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            symbol,
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
