use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Username of the system account that funds top-ups.
pub const SYSTEM_TREASURY: &str = "system_treasury";
/// Username of the system account that funds bonuses.
pub const SYSTEM_BONUS_POOL: &str = "system_bonus_pool";
/// Username of the system account that collects spends.
pub const SYSTEM_REVENUE: &str = "system_revenue";

/// All well-known system accounts, in bootstrap order.
pub const SYSTEM_USERNAMES: [&str; 3] = [SYSTEM_TREASURY, SYSTEM_BONUS_POOL, SYSTEM_REVENUE];

/// A platform account. User accounts are created by registration; system
/// accounts are seeded once and well-known by username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new user account. The password hash is produced by the
    /// auth layer before persisting.
    pub fn new_user(username: String, email: Option<String>, hashed_password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            hashed_password: Some(hashed_password),
            is_system: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Creates a system account. System accounts have no credentials.
    pub fn new_system(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            hashed_password: None,
            is_system: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_account_defaults() {
        let account = Account::new_user(
            "alice".to_string(),
            Some("alice@test.com".to_string()),
            "hash".to_string(),
        );
        assert!(!account.is_system);
        assert!(account.is_active);
        assert_eq!(account.email.as_deref(), Some("alice@test.com"));
    }

    #[test]
    fn test_system_account_has_no_credentials() {
        let account = Account::new_system(SYSTEM_TREASURY);
        assert!(account.is_system);
        assert!(account.hashed_password.is_none());
        assert_eq!(account.username, "system_treasury");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let account = Account::new_user("bob".to_string(), None, "secret-hash".to_string());
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"username\":\"bob\""));
    }
}
