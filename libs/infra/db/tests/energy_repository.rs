// [libs/infra/db/tests/energy_repository.rs]
//! Integration coverage against a real in-memory libSQL database: the
//! idempotency unique index and the `BEGIN IMMEDIATE` row lock only mean
//! something once SQL is actually executed.

use hub_domain_ledger::errors::RepositoryError;
use hub_domain_ledger::repository::EnergyRepository;
use hub_domain_models::energy::{EnergyActionType, SubscriptionType};
use hub_infra_db::client::HubDbClient;
use hub_infra_db::repositories::energy::EnergyRepositoryImpl;
use hub_infra_db::repositories::users::UsersRepository;
use serde_json::Value;
use uuid::Uuid;

async fn memory_client() -> HubDbClient {
    HubDbClient::connect(&format!(":memory:?unique={}", Uuid::new_v4()), None).await.unwrap()
}

#[tokio::test]
async fn registration_creates_a_matching_energy_row() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let energy_repo = EnergyRepositoryImpl::new(client);

    let user = users.register("carla@example.com", "hash", None).await.unwrap();
    let energy = energy_repo.get_energy(user.user_id).await.unwrap();

    assert_eq!(energy.current_energy, hub_domain_models::energy::DEFAULT_STARTING_ENERGY);
    assert_eq!(energy.subscription_type, SubscriptionType::Standard);
}

#[tokio::test]
async fn sequential_consumes_accumulate_total_consumed() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let repo = EnergyRepositoryImpl::new(client);

    let user = users.register("sequential@example.com", "hash", None).await.unwrap();
    for _ in 0..3 {
        repo.apply_transaction(
            user.user_id,
            EnergyActionType::Consume,
            12.0,
            "action:optimisation_cv".to_string(),
            Value::Null,
            None,
            Some("optimisation_cv".to_string()),
            None,
        )
        .await
        .unwrap();
    }

    let energy = repo.get_energy(user.user_id).await.unwrap();
    assert_eq!(energy.current_energy, hub_domain_models::energy::DEFAULT_STARTING_ENERGY - 36.0);
    assert_eq!(energy.total_consumed, 36.0);
}

#[tokio::test]
async fn find_by_idempotency_key_returns_the_previously_committed_row() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let repo = EnergyRepositoryImpl::new(client);

    let user = users.register("idem@example.com", "hash", None).await.unwrap();
    let (_, transaction) = repo
        .apply_transaction(
            user.user_id,
            EnergyActionType::Consume,
            12.0,
            "action:optimisation_cv".to_string(),
            Value::Null,
            None,
            Some("optimisation_cv".to_string()),
            Some("idem-key-1".to_string()),
        )
        .await
        .unwrap();

    let found = repo.find_by_idempotency_key(user.user_id, "idem-key-1").await.unwrap().unwrap();
    assert_eq!(found.tx_id, transaction.tx_id);
}

#[tokio::test]
async fn consume_beyond_the_balance_is_rejected_instead_of_clamped() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let repo = EnergyRepositoryImpl::new(client);

    let user = users.register("floor@example.com", "hash", None).await.unwrap();
    let result = repo
        .apply_transaction(
            user.user_id,
            EnergyActionType::Consume,
            1_000.0,
            "drain".to_string(),
            Value::Null,
            None,
            None,
            None,
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::InsufficientBalance { .. })));
    let energy = repo.get_energy(user.user_id).await.unwrap();
    assert_eq!(energy.current_energy, hub_domain_models::energy::DEFAULT_STARTING_ENERGY);
}

#[tokio::test]
async fn unlimited_subscribers_bypass_the_balance_check_on_consume() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let repo = EnergyRepositoryImpl::new(client);

    let user = users.register("unlimited-consume@example.com", "hash", None).await.unwrap();
    repo.set_subscription(user.user_id, SubscriptionType::Unlimited).await.unwrap();

    let (updated, _) = repo
        .apply_transaction(
            user.user_id,
            EnergyActionType::Consume,
            1_000.0,
            "drain".to_string(),
            Value::Null,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(updated.current_energy, 0.0);
}

#[tokio::test]
async fn set_subscription_switches_plan_without_moving_balance() {
    let client = memory_client().await;
    let users = UsersRepository::new(client.clone());
    let repo = EnergyRepositoryImpl::new(client);

    let user = users.register("unlimited@example.com", "hash", None).await.unwrap();
    let before = repo.get_energy(user.user_id).await.unwrap();
    let updated = repo.set_subscription(user.user_id, SubscriptionType::Unlimited).await.unwrap();

    assert_eq!(updated.current_energy, before.current_energy);
    assert_eq!(updated.subscription_type, SubscriptionType::Unlimited);
}
