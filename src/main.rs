use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use patient_core::config::patient_data_file_from_env_value;
use patient_core::{CoreConfig, PatientService};

/// Main entry point for the patient records service
///
/// Resolves configuration once from the environment (and `.env`), then serves the REST
/// API until the process is stopped.
///
/// # Environment Variables
/// - `PATIENT_DATA_FILE`: JSON document holding all patients (default: "patient.json")
/// - `PATIENT_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `RUST_LOG`: tracing filter
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("PATIENT_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".into())
        .parse()?;

    let cfg = CoreConfig::new(patient_data_file_from_env_value(
        std::env::var("PATIENT_DATA_FILE").ok(),
    ))?;

    tracing::info!("++ Patient data file {}", cfg.patient_data_file().display());
    tracing::info!("++ Starting patient REST on {}", rest_addr);

    let app = router(AppState::new(PatientService::from_config(&cfg)));

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
