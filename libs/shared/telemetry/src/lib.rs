// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HUB TELEMETRY (L4)
 * RESPONSABILIDAD: TRAZADO ESTRUCTURADO Y CAPTURA DE PÁNICOS
 *
 * Desarrollo: logs compactos legibles. Producción: JSON plano apto para
 * ingesta por un colector externo. Un panic hook global emite un
 * `tracing::error!` antes del unwind — ningún colapso de tarea debe
 * desaparecer silenciosamente del log.
 * =================================================================
 */

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error",
            service_name,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("no panic payload");

        error!(target: "panic", service = %service, location = %location, "thread panicked: {payload}");
    }));

    info!("telemetry initialized for {service_name}");
}
