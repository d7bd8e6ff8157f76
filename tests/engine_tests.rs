mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use uuid::Uuid;

use wallet_service::error::AppError;
use wallet_service::repositories::TransactionRepository;
use wallet_service::services::WalletEngine;

fn body_decimal(body: &serde_json::Value, field: &str) -> Decimal {
    Decimal::from_str(body[field].as_str().expect("decimal field")).expect("parse decimal")
}

#[tokio::test]
async fn test_top_up_credits_user_and_debits_treasury() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let outcome = engine
        .top_up(
            fixture.alice.id,
            fixture.asset.id,
            dec!(100),
            None,
            Some("Test top-up".to_string()),
            None,
        )
        .await
        .expect("top-up");

    assert!(!outcome.replayed);
    assert_eq!(outcome.body["status"], "success");
    assert_eq!(outcome.body["transaction_type"], "TOPUP");
    assert_eq!(body_decimal(&outcome.body, "amount"), dec!(100));
    assert_eq!(body_decimal(&outcome.body, "balance_after"), dec!(600));

    let alice_balance = common::wallet_balance(&pool, fixture.alice_wallet.id).await;
    assert_eq!(alice_balance, dec!(600));
    let treasury_balance = common::wallet_balance(&pool, fixture.treasury_wallet.id).await;
    assert_eq!(treasury_balance, dec!(99_999_899));
}

#[tokio::test]
async fn test_top_up_writes_a_balanced_entry_pair() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let outcome = engine
        .top_up(fixture.alice.id, fixture.asset.id, dec!(50), None, None, None)
        .await
        .expect("top-up");

    let reference_id =
        Uuid::parse_str(outcome.body["reference_id"].as_str().unwrap()).expect("reference id");
    let entries = TransactionRepository::new(pool.clone())
        .find_by_reference(reference_id)
        .await
        .expect("entries");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount + entries[1].amount, Decimal::ZERO);
    assert_ne!(entries[0].wallet_id, entries[1].wallet_id);
    let amounts: Vec<Decimal> = entries.iter().map(|e| e.amount).collect();
    assert!(amounts.contains(&dec!(50)));
    assert!(amounts.contains(&dec!(-50)));

    // balance_after matches the wallet each entry landed on
    for entry in &entries {
        let balance = common::wallet_balance(&pool, entry.wallet_id).await;
        assert_eq!(entry.balance_after, balance);
    }
}

#[tokio::test]
async fn test_idempotent_replay_has_one_side_effect() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);
    let key = format!("idem-topup-{}", Uuid::new_v4());

    let first = engine
        .top_up(
            fixture.alice.id,
            fixture.asset.id,
            dec!(100),
            None,
            None,
            Some(key.clone()),
        )
        .await
        .expect("first top-up");
    assert!(!first.replayed);

    let second = engine
        .top_up(
            fixture.alice.id,
            fixture.asset.id,
            dec!(100),
            None,
            None,
            Some(key.clone()),
        )
        .await
        .expect("replay");
    assert!(second.replayed);

    // Byte-identical body, same reference, no second movement.
    assert_eq!(first.body, second.body);
    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(600)
    );
    assert_eq!(common::ledger_count(&pool, fixture.alice_wallet.id).await, 1);
}

#[tokio::test]
async fn test_spend_decreases_balance_and_credits_revenue() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let outcome = engine
        .spend(
            fixture.alice.id,
            fixture.asset.id,
            dec!(30),
            Some("power-up".to_string()),
            None,
            None,
        )
        .await
        .expect("spend");

    assert_eq!(outcome.body["transaction_type"], "SPEND");
    assert_eq!(body_decimal(&outcome.body, "balance_after"), dec!(470));
    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(470)
    );
    assert_eq!(
        common::wallet_balance(&pool, fixture.revenue_wallet.id).await,
        dec!(30)
    );
}

#[tokio::test]
async fn test_spend_rejects_insufficient_funds_without_side_effects() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let entries_before = common::ledger_count(&pool, fixture.alice_wallet.id).await;

    let err = engine
        .spend(fixture.alice.id, fixture.asset.id, dec!(999999), None, None, None)
        .await
        .expect_err("spend should fail");

    match err {
        AppError::InsufficientFunds {
            balance,
            requested,
            asset_symbol,
        } => {
            assert_eq!(balance, dec!(500));
            assert_eq!(requested, dec!(999999));
            assert_eq!(asset_symbol, fixture.asset.symbol);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(500)
    );
    assert_eq!(
        common::ledger_count(&pool, fixture.alice_wallet.id).await,
        entries_before
    );
}

#[tokio::test]
async fn test_bonus_draws_from_bonus_pool() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let outcome = engine
        .issue_bonus(
            fixture.alice.id,
            fixture.asset.id,
            dec!(25),
            Some("Level-up".to_string()),
            None,
            None,
        )
        .await
        .expect("bonus");

    assert_eq!(outcome.body["transaction_type"], "BONUS");
    assert_eq!(body_decimal(&outcome.body, "balance_after"), dec!(525));
    assert_eq!(
        common::wallet_balance(&pool, fixture.bonus_wallet.id).await,
        Decimal::from(common::SYSTEM_POOL_BALANCE) - dec!(25)
    );
}

#[tokio::test]
async fn test_key_reuse_across_endpoints_conflicts() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);
    let key = format!("k2-{}", Uuid::new_v4());

    engine
        .top_up(
            fixture.alice.id,
            fixture.asset.id,
            dec!(10),
            None,
            None,
            Some(key.clone()),
        )
        .await
        .expect("top-up");

    let err = engine
        .spend(
            fixture.alice.id,
            fixture.asset.id,
            dec!(10),
            None,
            None,
            Some(key.clone()),
        )
        .await
        .expect_err("cross-endpoint reuse must fail");

    assert!(matches!(err, AppError::IdempotencyConflict(k) if k == key));

    // The failed spend left no trace.
    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(510)
    );
}

#[tokio::test]
async fn test_top_up_then_spend_round_trips_exactly() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    engine
        .top_up(fixture.alice.id, fixture.asset.id, dec!(100), None, None, None)
        .await
        .expect("top-up");
    engine
        .spend(fixture.alice.id, fixture.asset.id, dec!(100), None, None, None)
        .await
        .expect("spend");

    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(500)
    );
    // Two entries on the user wallet, summing to zero.
    assert_eq!(common::ledger_count(&pool, fixture.alice_wallet.id).await, 2);
    let sum: (Option<Decimal>,) =
        sqlx::query_as("SELECT SUM(amount) FROM transactions WHERE wallet_id = $1")
            .bind(fixture.alice_wallet.id)
            .fetch_one(&pool)
            .await
            .expect("sum");
    assert_eq!(sum.0.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_fixed_point_amounts_do_not_drift() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    engine
        .top_up(fixture.alice.id, fixture.asset.id, dec!(0.0001), None, None, None)
        .await
        .expect("top-up");
    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(500.0001)
    );

    engine
        .spend(fixture.alice.id, fixture.asset.id, dec!(0.0001), None, None, None)
        .await
        .expect("spend");
    assert_eq!(
        common::wallet_balance(&pool, fixture.alice_wallet.id).await,
        dec!(500)
    );
}

#[tokio::test]
async fn test_unknown_references_fail_typed() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    let err = engine
        .top_up(Uuid::new_v4(), fixture.asset.id, dec!(10), None, None, None)
        .await
        .expect_err("unknown account");
    assert!(matches!(err, AppError::AccountNotFound(_)));

    let err = engine
        .top_up(fixture.alice.id, Uuid::new_v4(), dec!(10), None, None, None)
        .await
        .expect_err("unknown asset");
    assert!(matches!(err, AppError::AssetTypeNotFound(_)));
}

#[tokio::test]
async fn test_missing_wallet_is_not_auto_provisioned() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);

    // Registration creates the account only; wallets are provisioned
    // out-of-band.
    let account = wallet_service::services::bootstrap::ensure_account(
        &pool,
        wallet_service::models::Account::new_user(
            format!("walletless_{}", Uuid::new_v4().simple()),
            None,
            wallet_service::auth::hash_password("password123").unwrap(),
        ),
    )
    .await
    .expect("account");

    let err = engine
        .spend(account.id, fixture.asset.id, dec!(1), None, None, None)
        .await
        .expect_err("no wallet");
    assert!(matches!(err, AppError::WalletNotFound { .. }));
}

#[tokio::test]
async fn test_expired_idempotency_record_is_treated_as_miss() {
    let pool = common::setup_test_db().await;
    let fixture = common::seed_fixture(&pool).await;
    let engine = WalletEngine::new(pool.clone(), 24);
    let key = format!("expired-{}", Uuid::new_v4());

    sqlx::query(
        r#"
        INSERT INTO idempotency_keys (id, key, endpoint, response_body, created_at, expires_at)
        VALUES ($1, $2, 'top_up', '{}', NOW() - INTERVAL '25 hours', NOW() - INTERVAL '1 hour')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&key)
    .execute(&pool)
    .await
    .expect("insert expired record");

    let outcome = engine
        .top_up(
            fixture.alice.id,
            fixture.asset.id,
            dec!(5),
            None,
            None,
            Some(key.clone()),
        )
        .await
        .expect("top-up past expired record");

    assert!(!outcome.replayed);
    assert_eq!(body_decimal(&outcome.body, "balance_after"), dec!(505));
}
