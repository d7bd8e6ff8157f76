use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::models::{TransactionType, SYSTEM_BONUS_POOL, SYSTEM_REVENUE, SYSTEM_TREASURY};

/// Which side of a movement the user wallet sits on. The source wallet is
/// always locked first, so the direction also fixes the lock order:
/// system wallet first for credits to the user, user wallet first for spends.
/// That ordering is acyclic across all three flows, which is what rules out
/// lock cycles between concurrent top-ups and spends on the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// System counterparty pays the user (top-up, bonus).
    CreditUser,
    /// User pays the system counterparty (spend).
    DebitUser,
}

/// Descriptor for one of the three mutating flows. The flows share a single
/// execution template in the engine and differ only in the data here:
/// endpoint tag, ledger entry type, system counterparty, lock order, message
/// wording, and what lands in the entry metadata.
#[derive(Debug, Clone)]
pub enum MovementKind {
    TopUp { payment_reference: Option<String> },
    Bonus { reason: Option<String> },
    Spend { item_reference: Option<String> },
}

impl MovementKind {
    /// Endpoint tag used to scope idempotency records.
    pub fn endpoint(&self) -> &'static str {
        match self {
            MovementKind::TopUp { .. } => "top_up",
            MovementKind::Bonus { .. } => "issue_bonus",
            MovementKind::Spend { .. } => "spend",
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            MovementKind::TopUp { .. } => TransactionType::Topup,
            MovementKind::Bonus { .. } => TransactionType::Bonus,
            MovementKind::Spend { .. } => TransactionType::Spend,
        }
    }

    /// Username of the system account on the other side of the movement.
    pub fn counterparty(&self) -> &'static str {
        match self {
            MovementKind::TopUp { .. } => SYSTEM_TREASURY,
            MovementKind::Bonus { .. } => SYSTEM_BONUS_POOL,
            MovementKind::Spend { .. } => SYSTEM_REVENUE,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            MovementKind::TopUp { .. } | MovementKind::Bonus { .. } => Direction::CreditUser,
            MovementKind::Spend { .. } => Direction::DebitUser,
        }
    }

    /// Flow-specific reference carried in both ledger entries' metadata.
    pub fn metadata(&self) -> Option<serde_json::Value> {
        match self {
            MovementKind::TopUp {
                payment_reference: Some(reference),
            } => Some(json!({ "payment_reference": reference })),
            MovementKind::Bonus {
                reason: Some(reason),
            } => Some(json!({ "reason": reason })),
            MovementKind::Spend {
                item_reference: Some(reference),
            } => Some(json!({ "item_reference": reference })),
            _ => None,
        }
    }

    pub fn debit_description(
        &self,
        description: Option<&str>,
        amount: Decimal,
        symbol: &str,
    ) -> String {
        match self {
            MovementKind::TopUp { .. } => {
                format!("Treasury debit for top-up: {}", description.unwrap_or(""))
            }
            MovementKind::Bonus { reason } => {
                format!("Bonus pool debit: {}", reason.as_deref().unwrap_or(""))
            }
            MovementKind::Spend { .. } => description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Spent {amount} {symbol}")),
        }
    }

    pub fn credit_description(
        &self,
        description: Option<&str>,
        amount: Decimal,
        symbol: &str,
    ) -> String {
        match self {
            MovementKind::TopUp { .. } => description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Top-up of {amount} {symbol}")),
            MovementKind::Bonus { reason } => description.map(str::to_string).unwrap_or_else(|| {
                format!(
                    "Bonus: {} - {amount} {symbol}",
                    reason.as_deref().unwrap_or("system grant")
                )
            }),
            MovementKind::Spend { item_reference } => format!(
                "Revenue credit from spend: {}",
                item_reference.as_deref().unwrap_or("")
            ),
        }
    }

    pub fn success_message(&self, amount: Decimal, symbol: &str) -> String {
        match self {
            MovementKind::TopUp { .. } => {
                format!("Successfully credited {amount} {symbol} to your wallet.")
            }
            MovementKind::Bonus { .. } => {
                format!("Bonus of {amount} {symbol} issued successfully.")
            }
            MovementKind::Spend { .. } => format!("Successfully spent {amount} {symbol}."),
        }
    }
}

/// A fully described mutation request, independent of the HTTP layer.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub user_account_id: Uuid,
    pub asset_type_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}
