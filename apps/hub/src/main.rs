// [apps/hub/src/main.rs]
/*!
 * APARATO: HUB MAIN ENTRY POINT (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 */

use dotenvy::dotenv;
use hub_shared_telemetry::init_tracing;
use phoenix_hub::prelude::*;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("phoenix_hub");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        info!("🛰️  [COMMAND_CENTER]: Phoenix Hub ignition sequence starting...");

        let config = HubConfig::from_env();
        let kernel = HubKernel::ignite(&config).await;
        kernel.launch().await;
    });

    Ok(())
}
