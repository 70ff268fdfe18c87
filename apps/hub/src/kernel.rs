// [apps/hub/src/kernel.rs]
/*!
 * APARATO: HUB SOVEREIGN KERNEL (ESTRATO L1-APP)
 * CLASIFICACIÓN: COMPOSITION ROOT
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN DEL SERVIDOR
 *
 * A diferencia del orquestador de minería, el Hub no levanta daemons de
 * fondo: toda su superficie es solicitud/respuesta HTTP sobre estado
 * compartido. El kernel solo conecta la base de datos, cablea `AppState`
 * y sirve el router.
 */

use crate::config::HubConfig;
use crate::routes::create_sovereign_router;
use crate::state::AppState;
use hub_infra_db::client::HubDbClient;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info, instrument};

pub struct HubKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
}

impl HubKernel {
    /// Conecta la base de datos soberana y cablea el estado compartido
    /// antes de que el servidor acepte su primera petición.
    #[instrument(skip(config))]
    pub async fn ignite(config: &HubConfig) -> Self {
        let database_client = HubDbClient::connect(&config.database_url, config.database_auth_token.clone())
            .await
            .expect("FATAL: Database link collapse. Ignition aborted.");

        let application_shared_state = AppState::new(config, database_client).await;

        Self { server_network_port: config.port, application_shared_state }
    }

    /// Consume el kernel y sirve el router soberano hasta que el proceso
    /// reciba una señal de apagado o el listener TCP colapse.
    pub async fn launch(self) {
        let sovereign_router = create_sovereign_router(self.application_shared_state);

        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.server_network_port);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .expect("CRITICAL_FAULT: Failed to bind network port.");

        info!("🚀 [KERNEL_ONLINE]: Phoenix Hub listening at {}", bind_address);

        if let Err(server_error) = axum::serve(tcp_listener, sovereign_router).await {
            error!("💀 [KERNEL_COLLAPSE]: Runtime failure: {}", server_error);
            std::process::exit(1);
        }
    }
}
