use crate::error::Result;
use crate::models::Account;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for account rows. Lock-free: the engine locks wallets, not
/// accounts.
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account: &Account) -> Result<Account> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, hashed_password, is_system, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, hashed_password, is_system, is_active, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.hashed_password)
        .bind(account.is_system)
        .bind(account.is_active)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, hashed_password, is_system, is_active, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, hashed_password, is_system, is_active, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, hashed_password, is_system, is_active, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists active accounts, optionally including the system counterparties.
    pub async fn list_active(&self, include_system: bool) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, hashed_password, is_system, is_active, created_at
            FROM accounts
            WHERE is_active = TRUE AND (is_system = FALSE OR $1)
            ORDER BY created_at
            "#,
        )
        .bind(include_system)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Hard-deletes a user account. System accounts are never deleted.
    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE id = $1 AND is_system = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
