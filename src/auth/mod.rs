//! Registration, login, and bearer-token issuance.
//!
//! The wallet engine never sees tokens; it only needs active account rows.
//! This module is the collaborator that produces tokens whose `sub` claim is
//! the account id.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::Account;
use crate::repositories::AccountRepository;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Account id.
    pub sub: String,
    pub username: String,
    pub exp: i64,
}

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(plain: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Signs and verifies access tokens with the configured secret/algorithm.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    algorithm: Algorithm,
    expire_minutes: i64,
}

impl TokenIssuer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let algorithm = Algorithm::from_str(&settings.jwt_algorithm)
            .map_err(|_| AppError::Internal(anyhow!("unknown JWT algorithm '{}'", settings.jwt_algorithm)))?;
        Ok(Self {
            secret: settings.jwt_secret.clone(),
            algorithm,
            expire_minutes: settings.access_token_expire_minutes,
        })
    }

    pub fn issue(&self, account: &Account) -> Result<String> {
        let claims = AccessTokenClaims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            exp: (Utc::now() + Duration::minutes(self.expire_minutes)).timestamp(),
        };
        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow!("token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims> {
        decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(self.algorithm),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidCredentials)
    }
}

/// The auth facade used by the HTTP layer.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    issuer: TokenIssuer,
}

/// What the API returns after register/login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub account: Account,
}

impl AuthService {
    pub fn new(pool: PgPool, issuer: TokenIssuer) -> Self {
        Self { pool, issuer }
    }

    /// Creates a user account and issues its first token. Does not create
    /// wallets; those are provisioned out-of-band per asset type.
    pub async fn register(
        &self,
        username: String,
        email: Option<String>,
        password: &str,
    ) -> Result<IssuedToken> {
        let accounts = AccountRepository::new(self.pool.clone());

        if accounts.find_by_username(&username).await?.is_some() {
            return Err(AppError::UsernameTaken);
        }
        if let Some(email) = &email {
            if accounts.find_by_email(email).await?.is_some() {
                return Err(AppError::EmailTaken);
            }
        }

        let account = accounts
            .create(&Account::new_user(username, email, hash_password(password)?))
            .await?;

        let access_token = self.issuer.issue(&account)?;
        tracing::info!(username = %account.username, "account registered");
        Ok(IssuedToken {
            access_token,
            account,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let accounts = AccountRepository::new(self.pool.clone());

        let account = accounts
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        let hashed = account
            .hashed_password
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(password, hashed) {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.issuer.issue(&account)?;
        Ok(IssuedToken {
            access_token,
            account,
        })
    }

    /// Hard-deletes a non-system account.
    pub async fn delete_account(&self, account_id: Uuid) -> Result<()> {
        let accounts = AccountRepository::new(self.pool.clone());
        if accounts.delete_user(account_id).await? {
            Ok(())
        } else {
            Err(AppError::AccountNotFound(account_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings::new().expect("defaults should load")
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = TokenIssuer::from_settings(&test_settings()).unwrap();
        let account = Account::new_user("alice".to_string(), None, "hash".to_string());

        let token = issuer.issue(&account).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let issuer = TokenIssuer::from_settings(&test_settings()).unwrap();
        let account = Account::new_user("bob".to_string(), None, "hash".to_string());
        let token = issuer.issue(&account).unwrap();

        let other = TokenIssuer {
            secret: "a-different-secret".to_string(),
            algorithm: Algorithm::HS256,
            expire_minutes: 60,
        };
        assert!(matches!(
            other.verify(&token),
            Err(AppError::InvalidCredentials)
        ));
    }
}
