// [apps/hub/src/config.rs]
/*!
 * APARATO: RUNTIME CONFIGURATION (ESTRATO L3)
 * RESPONSABILIDAD: CARGA Y VALIDACIÓN DE VARIABLES DE ENTORNO
 *
 * `HubConfig::from_env` es la única puerta de entrada a `std::env` del
 * binario; todo lo demás recibe valores ya resueltos. Falta de
 * `DATABASE_URL` o `JWT_SECRET` es un fallo de arranque, no un fallo
 * en caliente: preferimos morir en `main` a servir tráfico sin poder
 * emitir tokens o tocar el ledger.
 */

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub port: u16,
    pub ai_provider_base_url: String,
    pub ai_provider_api_key: String,
    pub payment_provider_base_url: String,
    pub payment_provider_api_key: String,
    pub db_call_timeout: Duration,
    pub db_max_retries: u32,
    pub provider_call_timeout: Duration,
    pub provider_max_retries: u32,
    pub cache_fallback_max_entries: usize,
}

impl HubConfig {
    /// Lee y valida el entorno del proceso. Aborta el arranque (vía
    /// `expect`) si falta cualquier coordenada imprescindible para
    /// emitir tokens o abrir la base de datos; el resto recae en
    /// valores por defecto razonables para desarrollo local.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("CRITICAL_FAULT: DATABASE_URL not defined in runtime environment.");

        let jwt_secret = std::env::var("JWT_SECRET")
            .expect("CRITICAL_FAULT: JWT_SECRET not defined in runtime environment.");

        let database_auth_token = std::env::var("TURSO_AUTH_TOKEN").ok();
        let redis_url = std::env::var("REDIS_URL").ok();

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let ai_provider_base_url =
            std::env::var("AI_PROVIDER_BASE_URL").unwrap_or_else(|_| "http://localhost:4100".to_string());
        let ai_provider_api_key = std::env::var("AI_PROVIDER_API_KEY").unwrap_or_default();

        let payment_provider_base_url =
            std::env::var("PAYMENT_PROVIDER_BASE_URL").unwrap_or_else(|_| "http://localhost:4200".to_string());
        let payment_provider_api_key = std::env::var("PAYMENT_PROVIDER_API_KEY").unwrap_or_default();

        Self {
            database_url,
            database_auth_token,
            redis_url,
            jwt_secret,
            port,
            ai_provider_base_url,
            ai_provider_api_key,
            payment_provider_base_url,
            payment_provider_api_key,
            db_call_timeout: Duration::from_secs(5),
            db_max_retries: 2,
            provider_call_timeout: Duration::from_secs(20),
            provider_max_retries: 1,
            cache_fallback_max_entries: 10_000,
        }
    }
}
