//! reqmeter server binary.
//!
//! - Config: defaults, `REQMETER_CONFIG` YAML file, `PORT` override
//! - Routes: `/`, `/health`, `/api/data`, and the metrics endpoint
//! - Graceful shutdown on Ctrl-C / SIGTERM

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqmeter_server::{app_state::AppState, config, error::ServerError, obs, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let cfg = config::load_from_env()?;
    let listen = cfg.server.listen_addr()?;
    let lag_interval = cfg.metrics.lag_sample_interval();

    let state = AppState::new(cfg)?;
    if let Some(process) = state.process() {
        tokio::spawn(obs::run_lag_sampler(process, lag_interval));
    }

    let app = router::build_router(state);

    tracing::info!(%listen, "reqmeter-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
