use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use intake_core::config::{
    db_path_from_env_value, fallback_medical_id_from_env_value, port_from_env_value,
};
use intake_core::CoreConfig;

/// Main entry point for the intake backend
///
/// Serves the REST API (bot CRUD, call logs, voice-agent webhooks) on `0.0.0.0:<PORT>`.
///
/// # Environment Variables
/// - `PORT`: HTTP port (default: 3000)
/// - `INTAKE_DB_PATH`: JSON file holding bots and call logs (default: "db.json")
/// - `INTAKE_FALLBACK_MEDICAL_ID`: id used by lookups that carry none (default: "MED1001",
///   empty disables)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_run=info".parse()?)
                .add_directive("intake_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = port_from_env_value(std::env::var("PORT").ok())?;
    let cfg = Arc::new(CoreConfig::new(
        db_path_from_env_value(std::env::var("INTAKE_DB_PATH").ok()),
        fallback_medical_id_from_env_value(std::env::var("INTAKE_FALLBACK_MEDICAL_ID").ok()),
    )?);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("++ Starting intake backend on {}", addr);
    tracing::info!("++ Store file: {}", cfg.db_path().display());
    match cfg.fallback_medical_id() {
        Some(id) => tracing::info!("++ Fallback medical id: {}", id),
        None => tracing::info!("++ Fallback medical id disabled"),
    }

    let app = router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
