use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field-level validation error produced at the HTTP boundary, before the
/// engine runs.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Credits the user's wallet after an external payment was processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub user_account_id: Uuid,
    pub asset_type_id: Uuid,
    pub amount: Decimal,
    pub payment_reference: Option<String>,
    pub description: Option<String>,
}

impl TopUpRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_amount(self.amount)
    }
}

/// System-issued free credits (referral bonus, login reward, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusRequest {
    pub user_account_id: Uuid,
    pub asset_type_id: Uuid,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub description: Option<String>,
}

impl BonusRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_amount(self.amount)
    }
}

/// Deducts credits from the user's wallet for an in-app purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendRequest {
    pub user_account_id: Uuid,
    pub asset_type_id: Uuid,
    pub amount: Decimal,
    pub item_reference: Option<String>,
    pub description: Option<String>,
}

impl SpendRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_amount(self.amount)
    }
}

fn validate_amount(amount: Decimal) -> Result<(), Vec<ValidationError>> {
    if amount <= Decimal::ZERO {
        return Err(vec![ValidationError::new(
            "amount",
            "amount must be positive",
        )]);
    }
    Ok(())
}

/// Query parameters for the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl HistoryQuery {
    /// Resolves defaults and enforces limit in [1, 100], offset >= 0.
    pub fn validate(&self) -> Result<(i64, i64), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let limit = self.limit.unwrap_or(20);
        let offset = self.offset.unwrap_or(0);

        if !(1..=100).contains(&limit) {
            errors.push(ValidationError::new(
                "limit",
                "limit must be between 1 and 100",
            ));
        }
        if offset < 0 {
            errors.push(ValidationError::new("offset", "offset must be >= 0"));
        }

        if errors.is_empty() {
            Ok((limit, offset))
        } else {
            Err(errors)
        }
    }
}

/// Query parameters for the accounts listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountsQuery {
    pub include_system: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.username.trim().len() < 3 || self.username.len() > 150 {
            errors.push(ValidationError::new(
                "username",
                "username must be between 3 and 150 characters",
            ));
        }
        if self.password.len() < 6 {
            errors.push(ValidationError::new(
                "password",
                "password must be at least 6 characters",
            ));
        }
        if let Some(email) = &self.email {
            if email.len() > 255 {
                errors.push(ValidationError::new("email", "email too long"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_must_be_positive() {
        let request = SpendRequest {
            user_account_id: Uuid::new_v4(),
            asset_type_id: Uuid::new_v4(),
            amount: dec!(0),
            item_reference: None,
            description: None,
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].field, "amount");

        let negative = TopUpRequest {
            user_account_id: Uuid::new_v4(),
            asset_type_id: Uuid::new_v4(),
            amount: dec!(-1),
            payment_reference: None,
            description: None,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_smallest_representable_amount_is_valid() {
        let request = TopUpRequest {
            user_account_id: Uuid::new_v4(),
            asset_type_id: Uuid::new_v4(),
            amount: dec!(0.0001),
            payment_reference: None,
            description: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_history_query_bounds() {
        assert_eq!(HistoryQuery::default().validate().unwrap(), (20, 0));
        assert!(HistoryQuery {
            limit: Some(0),
            offset: None
        }
        .validate()
        .is_err());
        assert!(HistoryQuery {
            limit: Some(101),
            offset: None
        }
        .validate()
        .is_err());
        assert!(HistoryQuery {
            limit: None,
            offset: Some(-1)
        }
        .validate()
        .is_err());
        assert_eq!(
            HistoryQuery {
                limit: Some(100),
                offset: Some(40)
            }
            .validate()
            .unwrap(),
            (100, 40)
        );
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: Some("alice@test.com".to_string()),
            password: "secret-pw".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: "al".to_string(),
            email: None,
            password: "short".to_string(),
        };
        assert_eq!(invalid.validate().unwrap_err().len(), 2);
    }
}
