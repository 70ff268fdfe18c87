// [libs/infra/db/src/schema.rs]
/*!
 * =================================================================
 * APARATO: HUB DATABASE SCHEMA (L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL DE LAS SEIS TABLAS DEL HUB
 *
 * Seis tablas, sin más: `users`, `user_energy`, `energy_transactions`,
 * `events`, `sessions`, `rate_limit_blocks`. El índice único sobre
 * `(user_id, idempotency_key)` en `energy_transactions` es lo que hace que
 * `consume` sea seguro contra reintentos (spec §4.F).
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_USERS", r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT,
            is_unlimited INTEGER NOT NULL DEFAULT 0,
            refresh_token_family TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TEXT
        );
    "#),
    ("TABLE_USER_ENERGY", r#"
        CREATE TABLE IF NOT EXISTS user_energy (
            user_id TEXT PRIMARY KEY,
            current_energy REAL NOT NULL,
            max_energy REAL NOT NULL,
            total_purchased REAL NOT NULL DEFAULT 0.0,
            total_consumed REAL NOT NULL DEFAULT 0.0,
            last_recharge_at TEXT,
            subscription_type TEXT NOT NULL DEFAULT 'standard',
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_ENERGY_TRANSACTIONS", r#"
        CREATE TABLE IF NOT EXISTS energy_transactions (
            tx_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            action_type TEXT NOT NULL,
            amount REAL NOT NULL,
            reason TEXT NOT NULL,
            energy_before REAL NOT NULL,
            energy_after REAL NOT NULL,
            context TEXT NOT NULL DEFAULT '{}',
            app_source TEXT,
            feature_used TEXT,
            idempotency_key TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            event_type TEXT NOT NULL,
            actor_user_id TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT '{}',
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_SESSIONS", r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            refresh_token_hash TEXT NOT NULL UNIQUE,
            device_fingerprint TEXT,
            family_id TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("TABLE_RATE_LIMIT_BLOCKS", r#"
        CREATE TABLE IF NOT EXISTS rate_limit_blocks (
            scope TEXT NOT NULL,
            identifier TEXT NOT NULL,
            blocked_until TEXT NOT NULL,
            reason TEXT,
            PRIMARY KEY(scope, identifier)
        );
    "#),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_ENERGY_TX_IDEMPOTENCY",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_energy_tx_idempotency ON energy_transactions(user_id, idempotency_key) WHERE idempotency_key IS NOT NULL;",
    ),
    (
        "IDX_ENERGY_TX_USER",
        "CREATE INDEX IF NOT EXISTS idx_energy_tx_user ON energy_transactions(user_id, created_at);",
    ),
    (
        "IDX_EVENTS_ACTOR",
        "CREATE INDEX IF NOT EXISTS idx_events_actor ON events(actor_user_id, created_at);",
    ),
    (
        "IDX_SESSIONS_FAMILY",
        "CREATE INDEX IF NOT EXISTS idx_sessions_family ON sessions(family_id);",
    ),
];

#[tracing::instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating Phoenix Hub structural synchronization...");

    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        database_connection
            .execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }

    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        database_connection
            .execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }

    info!("✅ [SCHEMA_ENGINE]: Hub ledger schema level and certified.");
    Ok(())
}
