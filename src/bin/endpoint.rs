use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use report_relay::logging::{self, LogFormat};
use report_relay::metrics::try_init_metrics;
use report_relay::{
    DaprHttpClient, EndpointConfig, EndpointState, SecurityKeys, Server, endpoint_router,
    setup_reporter, shutdown_signal,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load an .env file if present so LOG_FORMAT / RUST_LOG apply too
    let _ = dotenvy::dotenv();

    if let Err(e) = logging::init(LogFormat::from_env()) {
        eprintln!("{e}");
        return ExitCode::from(exitcode::SOFTWARE as u8);
    }

    info!("Starting report endpoint v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the endpoint, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = EndpointConfig::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        reporter = %config.reporter.kind,
        name = %config.reporter.name,
        sidecar = %config.sidecar.http_endpoint,
        "Configuration loaded"
    );

    if let Some(addr) = config.metrics_addr() {
        try_init_metrics(addr);
    }

    let client = DaprHttpClient::new(&config.sidecar).map_err(|e| {
        error!("Failed to create sidecar client: {e}");
        exitcode::CONFIG
    })?;
    let service = setup_reporter(&config.reporter, Arc::new(client));

    let router = endpoint_router(
        EndpointState::new(Arc::new(service)),
        SecurityKeys::from(config.security_keys.clone()),
        config.max_request_body_size,
    );

    let server = Server::bind("endpoint", &config.server_addr(), router)
        .await
        .map_err(|e| {
            error!("Server failed to start: {e}");
            exitcode::UNAVAILABLE
        })?;

    server.run(shutdown_signal()).await.map_err(|_| exitcode::SOFTWARE)?;

    Ok(())
}
