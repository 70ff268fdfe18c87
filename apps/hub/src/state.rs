// [apps/hub/src/state.rs]
/*!
 * =================================================================
 * APARATO: HUB APPLICATION STATE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: COMPOSITION ROOT DE REPOSITORIOS, SERVICIOS Y SUSTRATO
 *
 * Cablea los cinco estratos de dominio (ledger, events, context, billing,
 * ai) sobre sus implementaciones concretas de `hub-infra-*`, y añade el
 * sustrato de confiabilidad (`hub-core-reliability`) alrededor del
 * acceso a base de datos y a los proveedores externos.
 * =================================================================
 */

use crate::config::HubConfig;
use hub_core_reliability::cache::CacheTier;
use hub_core_reliability::keys::KeyManager;
use hub_core_reliability::metrics::{MetricsRegistry, DEFAULT_ALERT_RULES};
use hub_core_reliability::pool::{BreakerConfig, BreakerState, ConnectionPool};
use hub_core_reliability::ratelimit::RateLimiter;
use hub_domain_ai::service::AiOrchestrator;
use hub_domain_billing::service::BillingService;
use hub_domain_events::service::EventService;
use hub_domain_ledger::service::LedgerService;
use hub_infra_auth::sessions::SessionRotator;
use hub_infra_auth::tokens::TokenIssuer;
use hub_infra_db::client::HubDbClient;
use hub_infra_db::repositories::context::ContextSourceRepository;
use hub_infra_db::repositories::energy::EnergyRepositoryImpl;
use hub_infra_db::repositories::events::EventRepositoryImpl;
use hub_infra_db::repositories::sessions::SessionStoreImpl;
use hub_infra_db::repositories::users::UsersRepository;
use hub_infra_providers::ai_client::AiProviderClient;
use hub_infra_providers::payment_client::PaymentProviderClient;
use std::sync::Arc;
use tracing::{debug, info};

type HubContextBuilder = hub_domain_context::builder::ContextBuilder<ContextSourceRepository>;
type HubLedgerService = LedgerService<EnergyRepositoryImpl>;
type HubAiOrchestrator = AiOrchestrator<AiProviderClient, EnergyRepositoryImpl, ContextSourceRepository>;
type HubBillingService = BillingService<PaymentProviderClient, EnergyRepositoryImpl>;
type HubSessionRotator = SessionRotator<SessionStoreImpl>;

/// Composition root del Hub. Barato de clonar: todo campo vive detrás de
/// un `Arc` (o, para `HubDbClient`, ya es internamente un handle clonable).
#[derive(Clone)]
pub struct AppState {
    pub db: HubDbClient,
    pub db_pool: Arc<ConnectionPool>,
    pub users: Arc<UsersRepository>,
    pub ledger: Arc<HubLedgerService>,
    pub events: Arc<EventService<EventRepositoryImpl>>,
    pub ai: Arc<HubAiOrchestrator>,
    pub billing: Arc<HubBillingService>,
    pub tokens: Arc<TokenIssuer>,
    pub sessions: Arc<HubSessionRotator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub keys: Arc<KeyManager>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// Cablea cada estrato sobre el cliente de base de datos ya conectado.
    /// Cada servicio de dominio recibe su propia instancia de repositorio,
    /// ya que `HubDbClient::clone` solo copia un handle barato, no abre
    /// una conexión nueva.
    pub async fn new(config: &HubConfig, db: HubDbClient) -> Self {
        debug!("🧬 [APP_STATE]: Cableando estratos de dominio sobre la conexión soberana...");

        let db_pool = Arc::new(ConnectionPool::new(
            "db",
            BreakerConfig::default(),
            config.db_call_timeout,
            config.db_max_retries,
        ));

        let redis_primary = match &config.redis_url {
            Some(url) => CacheTier::connect_primary(url).await,
            None => None,
        };
        let cache = CacheTier::new(redis_primary.clone(), config.cache_fallback_max_entries);
        let rate_limiter = Arc::new(RateLimiter::new(redis_primary));

        let key_manager = KeyManager::new();
        key_manager.register("jwt", config.jwt_secret.clone());
        key_manager.register("ai_provider", config.ai_provider_api_key.clone());
        key_manager.register("payment_provider", config.payment_provider_api_key.clone());

        let metrics = Arc::new(MetricsRegistry::new(DEFAULT_ALERT_RULES.to_vec()));

        let users = Arc::new(UsersRepository::new(db.clone()));
        let events = Arc::new(EventService::new(EventRepositoryImpl::new(db.clone())));

        let ledger = Arc::new(LedgerService::new(EnergyRepositoryImpl::new(db.clone())));
        let ai_ledger = LedgerService::new(EnergyRepositoryImpl::new(db.clone()));
        let billing_ledger = LedgerService::new(EnergyRepositoryImpl::new(db.clone()));

        let ai_context_source = ContextSourceRepository::new(db.clone());
        let ai_context_builder = HubContextBuilder::new(ai_context_source, cache);

        let ai_provider =
            AiProviderClient::new(config.ai_provider_base_url.clone(), config.ai_provider_api_key.clone());
        let ai = Arc::new(AiOrchestrator::new(ai_provider, ai_ledger, ai_context_builder));

        let payment_provider =
            PaymentProviderClient::new(config.payment_provider_base_url.clone(), config.payment_provider_api_key.clone());
        let billing = Arc::new(BillingService::new(payment_provider, billing_ledger));

        let tokens = Arc::new(TokenIssuer::new(&config.jwt_secret));
        let sessions = Arc::new(SessionRotator::new(SessionStoreImpl::new(db.clone())));

        info!("✅ [APP_STATE]: Estado compartido listo: ledger, eventos, contexto, IA y facturación en línea.");

        Self {
            db,
            db_pool,
            users,
            ledger,
            events,
            ai,
            billing,
            tokens,
            sessions,
            rate_limiter,
            keys: Arc::new(key_manager),
            metrics,
        }
    }

    /// Usado por el guardia de salud perimetral: si el circuito de la base
    /// de datos está abierto, el Hub deja de aceptar tráfico de escritura.
    pub fn is_operational(&self) -> Result<(), String> {
        match self.db_pool.breaker_state() {
            BreakerState::Open => Err("database circuit breaker is open".to_string()),
            _ => Ok(()),
        }
    }
}
