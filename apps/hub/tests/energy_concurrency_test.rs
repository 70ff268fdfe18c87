// [apps/hub/tests/energy_concurrency_test.rs]
//! Ejercita el `BEGIN IMMEDIATE` de `EnergyRepositoryImpl` bajo contención
//! real: dispara consumos concurrentes contra el mismo balance con
//! `tokio::spawn` y confirma que el repositorio serializa la escritura en
//! lugar de dejar que una lectura obsoleta empuje el balance bajo cero.

mod support;

use hub_domain_ledger::errors::RepositoryError;
use hub_domain_ledger::repository::EnergyRepository;
use hub_domain_models::energy::EnergyActionType;
use hub_infra_db::repositories::energy::EnergyRepositoryImpl;
use hub_infra_db::repositories::users::UsersRepository;
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn only_as_many_concurrent_consumes_succeed_as_the_balance_allows() {
    let config = support::memory_config("http://127.0.0.1:1".to_string(), "http://127.0.0.1:1".to_string()).await;
    let db = hub_infra_db::client::HubDbClient::connect(&config.database_url, config.database_auth_token.clone())
        .await
        .expect("in-memory database must connect");

    let users = UsersRepository::new(db.clone());
    let user = users.register("race@example.com", "hash", None).await.unwrap();

    let repo = Arc::new(EnergyRepositoryImpl::new(db));

    // Drain the starting balance (85) down to exactly 10 so three parallel
    // cost-5 consumes can only let two of them through.
    repo.apply_transaction(
        user.user_id,
        EnergyActionType::Consume,
        75.0,
        "setup:drain".to_string(),
        Value::Null,
        None,
        None,
        None,
    )
    .await
    .unwrap();

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let repo = repo.clone();
            let user_id = user.user_id;
            tokio::spawn(async move {
                repo.apply_transaction(
                    user_id,
                    EnergyActionType::Consume,
                    5.0,
                    format!("race:{i}"),
                    Value::Null,
                    None,
                    None,
                    None,
                )
                .await
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("task must not panic") {
            Ok(_) => succeeded += 1,
            Err(RepositoryError::InsufficientBalance { .. }) => rejected += 1,
            Err(other) => panic!("unexpected repository error: {other}"),
        }
    }

    assert_eq!(succeeded, 2, "exactly two of three cost-5 consumes fit in a balance of 10");
    assert_eq!(rejected, 1);

    let final_energy = repo.get_energy(user.user_id).await.unwrap();
    assert_eq!(final_energy.current_energy, 0.0);
}
