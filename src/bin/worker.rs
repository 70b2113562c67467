use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use report_relay::config::WorkerMode;
use report_relay::logging::{self, LogFormat};
use report_relay::metrics::try_init_metrics;
use report_relay::{
    DaprHttpClient, ReportDispatcher, Server, WorkerConfig, WorkerState, setup_storer,
    shutdown_signal, worker_router,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load an .env file if present so LOG_FORMAT / RUST_LOG apply too
    let _ = dotenvy::dotenv();

    if let Err(e) = logging::init(LogFormat::from_env()) {
        eprintln!("{e}");
        return ExitCode::from(exitcode::SOFTWARE as u8);
    }

    info!("Starting report worker v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the worker, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = WorkerConfig::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        mode = %config.mode,
        name = %config.name,
        queue = %config.queue,
        topic = %config.topic,
        storer = %config.storer.kind,
        storer_name = %config.storer.name,
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
    let service = setup_storer(&config.storer, Arc::new(client));

    let topic = match config.mode {
        WorkerMode::Queue => config.queue.clone(),
        WorkerMode::Pubsub => config.topic.clone(),
    };
    let dispatcher = ReportDispatcher::new(Arc::new(service), config.name.clone(), topic);

    let router = worker_router(
        WorkerState::new(dispatcher),
        config.mode,
        config.max_request_body_size,
    );

    let server = Server::bind("worker", &config.server_addr(), router)
        .await
        .map_err(|e| {
            error!("Server failed to start: {e}");
            exitcode::UNAVAILABLE
        })?;

    server.run(shutdown_signal()).await.map_err(|_| exitcode::SOFTWARE)?;

    Ok(())
}
