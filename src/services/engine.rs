use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::idempotency::{IdempotencyLookup, IdempotencyStore};
use crate::models::{Account, AssetType, Transaction, TransactionType, Wallet};
use crate::observability::logging::mask_sensitive;
use crate::services::flows::{Direction, MovementKind, MovementRequest};

/// Response body produced by every mutating flow. Serialized once and, when
/// an idempotency key is present, cached verbatim so replays are
/// byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub status: String,
    pub reference_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub message: String,
}

/// Result of a mutating flow. `replayed` distinguishes the cached-response
/// path (HTTP 200) from a freshly committed movement (HTTP 201).
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    pub body: serde_json::Value,
    pub replayed: bool,
}

/// The wallet transaction engine.
///
/// Each movement runs inside one store transaction: idempotency probe,
/// reference validation, wallet row locks in the flow's fixed order, a
/// balanced debit/credit pair, the cached idempotency outcome, commit.
/// Failures before commit roll the whole transaction back, so there are no
/// externally visible partial effects.
#[derive(Clone)]
pub struct WalletEngine {
    pool: PgPool,
    idempotency: IdempotencyStore,
}

impl WalletEngine {
    pub fn new(pool: PgPool, idempotency_ttl_hours: i64) -> Self {
        Self {
            pool,
            idempotency: IdempotencyStore::new(idempotency_ttl_hours),
        }
    }

    /// Credits a user from the treasury, e.g. after an external payment.
    pub async fn top_up(
        &self,
        user_account_id: Uuid,
        asset_type_id: Uuid,
        amount: Decimal,
        payment_reference: Option<String>,
        description: Option<String>,
        idempotency_key: Option<String>,
    ) -> Result<MovementOutcome> {
        self.execute(MovementRequest {
            kind: MovementKind::TopUp { payment_reference },
            user_account_id,
            asset_type_id,
            amount,
            description,
            idempotency_key,
        })
        .await
    }

    /// Credits a user from the bonus pool (referral reward, login bonus, ...).
    pub async fn issue_bonus(
        &self,
        user_account_id: Uuid,
        asset_type_id: Uuid,
        amount: Decimal,
        reason: Option<String>,
        description: Option<String>,
        idempotency_key: Option<String>,
    ) -> Result<MovementOutcome> {
        self.execute(MovementRequest {
            kind: MovementKind::Bonus { reason },
            user_account_id,
            asset_type_id,
            amount,
            description,
            idempotency_key,
        })
        .await
    }

    /// Debits a user in favour of the revenue account for an in-app purchase.
    pub async fn spend(
        &self,
        user_account_id: Uuid,
        asset_type_id: Uuid,
        amount: Decimal,
        item_reference: Option<String>,
        description: Option<String>,
        idempotency_key: Option<String>,
    ) -> Result<MovementOutcome> {
        self.execute(MovementRequest {
            kind: MovementKind::Spend { item_reference },
            user_account_id,
            asset_type_id,
            amount,
            description,
            idempotency_key,
        })
        .await
    }

    /// Runs a movement, absorbing one idempotency-key insert race: the retry
    /// finds the winner's committed record and replays it.
    pub async fn execute(&self, request: MovementRequest) -> Result<MovementOutcome> {
        match self.run_once(&request).await {
            Err(AppError::DuplicateRace(key)) => {
                tracing::warn!(
                    endpoint = request.kind.endpoint(),
                    key = %mask_sensitive(&key, 4),
                    "idempotency key insert race, retrying"
                );
                self.run_once(&request).await
            }
            outcome => outcome,
        }
    }

    async fn run_once(&self, request: &MovementRequest) -> Result<MovementOutcome> {
        let kind = &request.kind;
        let endpoint = kind.endpoint();
        let mut tx = self.pool.begin().await?;

        if let Some(key) = request.idempotency_key.as_deref() {
            match self.idempotency.lookup(&mut tx, key, endpoint).await? {
                IdempotencyLookup::Hit(body) => {
                    tx.commit().await?;
                    tracing::info!(
                        endpoint,
                        key = %mask_sensitive(key, 4),
                        "replaying cached idempotent response"
                    );
                    return Ok(MovementOutcome {
                        body,
                        replayed: true,
                    });
                }
                IdempotencyLookup::Conflict => {
                    return Err(AppError::IdempotencyConflict(key.to_string()));
                }
                IdempotencyLookup::Miss => {}
            }
        }

        fetch_active_user_account(&mut tx, request.user_account_id).await?;
        let asset = fetch_active_asset_type(&mut tx, request.asset_type_id).await?;
        let counterparty = fetch_system_account(&mut tx, kind.counterparty()).await?;

        let (source_account_id, destination_account_id) = match kind.direction() {
            Direction::CreditUser => (counterparty.id, request.user_account_id),
            Direction::DebitUser => (request.user_account_id, counterparty.id),
        };

        // Source before destination. Combined with the per-flow direction
        // this ordering is acyclic across all flows, so two requests on the
        // same user wallet cannot deadlock.
        let mut source = lock_wallet(&mut tx, source_account_id, request.asset_type_id).await?;
        let mut destination =
            lock_wallet(&mut tx, destination_account_id, request.asset_type_id).await?;

        if source.balance < request.amount {
            return Err(AppError::InsufficientFunds {
                balance: source.balance,
                requested: request.amount,
                asset_symbol: asset.symbol.clone(),
            });
        }

        let reference_id = Uuid::new_v4();
        let metadata = kind.metadata();
        let debit_description =
            kind.debit_description(request.description.as_deref(), request.amount, &asset.symbol);
        let credit_description =
            kind.credit_description(request.description.as_deref(), request.amount, &asset.symbol);

        let debit = apply_debit(
            &mut tx,
            &mut source,
            request.amount,
            reference_id,
            kind.transaction_type(),
            debit_description,
            request.idempotency_key.as_deref(),
            metadata.as_ref(),
        )
        .await?;
        let credit = apply_credit(
            &mut tx,
            &mut destination,
            request.amount,
            reference_id,
            kind.transaction_type(),
            credit_description,
            request.idempotency_key.as_deref(),
            metadata.as_ref(),
        )
        .await?;

        let user_entry = match kind.direction() {
            Direction::CreditUser => &credit,
            Direction::DebitUser => &debit,
        };

        let receipt = MovementReceipt {
            status: "success".to_string(),
            reference_id,
            transaction_type: kind.transaction_type(),
            amount: request.amount,
            balance_after: user_entry.balance_after,
            message: kind.success_message(request.amount, &asset.symbol),
        };
        let body = serde_json::to_value(&receipt)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

        if let Some(key) = request.idempotency_key.as_deref() {
            self.idempotency.store(&mut tx, key, endpoint, &body).await?;
        }

        tx.commit().await?;

        tracing::info!(
            endpoint,
            %reference_id,
            amount = %request.amount,
            asset = %asset.symbol,
            "movement committed"
        );
        Ok(MovementOutcome {
            body,
            replayed: false,
        })
    }
}

/// The user side of a movement must be an active, non-system account.
/// Requiring non-system keeps the user wallet distinct from the flow's
/// counterparty wallet, so debit and credit never alias one row.
async fn fetch_active_user_account(conn: &mut PgConnection, account_id: Uuid) -> Result<Account> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, username, email, hashed_password, is_system, is_active, created_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .fetch_optional(&mut *conn)
    .await?;

    match account {
        Some(account) if account.is_active && !account.is_system => Ok(account),
        _ => Err(AppError::AccountNotFound(account_id.to_string())),
    }
}

async fn fetch_active_asset_type(conn: &mut PgConnection, asset_type_id: Uuid) -> Result<AssetType> {
    let asset = sqlx::query_as::<_, AssetType>(
        r#"
        SELECT id, name, symbol, description, is_active, created_at
        FROM asset_types
        WHERE id = $1
        "#,
    )
    .bind(asset_type_id)
    .fetch_optional(&mut *conn)
    .await?;

    match asset {
        Some(asset) if asset.is_active => Ok(asset),
        _ => Err(AppError::AssetTypeNotFound(asset_type_id.to_string())),
    }
}

async fn fetch_system_account(conn: &mut PgConnection, username: &str) -> Result<Account> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, username, email, hashed_password, is_system, is_active, created_at
        FROM accounts
        WHERE username = $1 AND is_system = TRUE
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    account.ok_or_else(|| AppError::AccountNotFound(format!("system:{username}")))
}

/// Takes an exclusive row lock on the wallet until transaction end.
async fn lock_wallet(
    conn: &mut PgConnection,
    account_id: Uuid,
    asset_type_id: Uuid,
) -> Result<Wallet> {
    let wallet = sqlx::query_as::<_, Wallet>(
        r#"
        SELECT id, account_id, asset_type_id, balance, version, updated_at
        FROM wallets
        WHERE account_id = $1 AND asset_type_id = $2
        FOR UPDATE
        "#,
    )
    .bind(account_id)
    .bind(asset_type_id)
    .fetch_optional(&mut *conn)
    .await?;

    wallet.ok_or(AppError::WalletNotFound {
        account_id,
        asset_type_id,
    })
}

#[allow(clippy::too_many_arguments)]
async fn apply_debit(
    conn: &mut PgConnection,
    wallet: &mut Wallet,
    amount: Decimal,
    reference_id: Uuid,
    transaction_type: TransactionType,
    description: String,
    idempotency_key: Option<&str>,
    metadata: Option<&serde_json::Value>,
) -> Result<Transaction> {
    let new_balance = wallet.balance - amount;
    if new_balance < Decimal::ZERO {
        return Err(AppError::NegativeBalance {
            wallet_id: wallet.id,
            balance: new_balance,
        });
    }

    let entry = Transaction::debit(
        reference_id,
        transaction_type,
        wallet.id,
        amount,
        new_balance,
        Some(description),
        idempotency_key.map(str::to_string),
        metadata.cloned(),
    );
    persist_movement(conn, wallet, new_balance, entry).await
}

#[allow(clippy::too_many_arguments)]
async fn apply_credit(
    conn: &mut PgConnection,
    wallet: &mut Wallet,
    amount: Decimal,
    reference_id: Uuid,
    transaction_type: TransactionType,
    description: String,
    idempotency_key: Option<&str>,
    metadata: Option<&serde_json::Value>,
) -> Result<Transaction> {
    let new_balance = wallet.balance + amount;
    let entry = Transaction::credit(
        reference_id,
        transaction_type,
        wallet.id,
        amount,
        new_balance,
        Some(description),
        idempotency_key.map(str::to_string),
        metadata.cloned(),
    );
    persist_movement(conn, wallet, new_balance, entry).await
}

/// Applies the balance change to the locked wallet row and appends the
/// ledger entry. A check-constraint violation here means the engine
/// pre-check was bypassed; it surfaces as `NegativeBalance`.
async fn persist_movement(
    conn: &mut PgConnection,
    wallet: &mut Wallet,
    new_balance: Decimal,
    entry: Transaction,
) -> Result<Transaction> {
    let updated = sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET balance = $2,
            version = version + 1,
            updated_at = $3
        WHERE id = $1
        RETURNING id, account_id, asset_type_id, balance, version, updated_at
        "#,
    )
    .bind(wallet.id)
    .bind(new_balance)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_check_violation() => AppError::NegativeBalance {
            wallet_id: wallet.id,
            balance: new_balance,
        },
        _ => AppError::Database(e),
    })?;
    *wallet = updated;

    let row = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (id, reference_id, transaction_type, wallet_id, amount,
                                  balance_after, description, idempotency_key, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, reference_id, transaction_type, wallet_id, amount, balance_after,
                  description, idempotency_key, metadata, created_at
        "#,
    )
    .bind(entry.id)
    .bind(entry.reference_id)
    .bind(entry.transaction_type)
    .bind(entry.wallet_id)
    .bind(entry.amount)
    .bind(entry.balance_after)
    .bind(&entry.description)
    .bind(&entry.idempotency_key)
    .bind(&entry.metadata)
    .bind(entry.created_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_receipt_serializes_amounts_as_decimal_strings() {
        let receipt = MovementReceipt {
            status: "success".to_string(),
            reference_id: Uuid::nil(),
            transaction_type: TransactionType::Topup,
            amount: dec!(100.0001),
            balance_after: dec!(600.0001),
            message: "Successfully credited 100.0001 GC to your wallet.".to_string(),
        };

        let body = serde_json::to_value(&receipt).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["transaction_type"], "TOPUP");
        assert_eq!(body["amount"], "100.0001");
        assert_eq!(body["balance_after"], "600.0001");
    }

    #[test]
    fn test_receipt_round_trips_through_cached_json() {
        let receipt = MovementReceipt {
            status: "success".to_string(),
            reference_id: Uuid::new_v4(),
            transaction_type: TransactionType::Spend,
            amount: dec!(30),
            balance_after: dec!(470),
            message: "Successfully spent 30 GC.".to_string(),
        };

        let body = serde_json::to_value(&receipt).unwrap();
        let cached: serde_json::Value = serde_json::from_str(&body.to_string()).unwrap();
        assert_eq!(body, cached);
    }
}
