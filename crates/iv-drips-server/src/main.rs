use anyhow::Context;
use clap::Parser;
use iv_drips_server::{build_router, log, AppState, Args, IvDripsConfig};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match IvDripsConfig::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration Error: {}", err);
            std::process::exit(exitcode::CONFIG);
        }
    };

    log::init(config.log.clone());

    if let Err(err) = run(config).await {
        error!(msg = "IV Drips server failed", error = format!("{err:#}"));
        std::process::exit(exitcode::UNAVAILABLE);
    }
}

async fn run(config: IvDripsConfig) -> anyhow::Result<()> {
    if config.auth.uses_default_secret() {
        warn!(
            target: log::AUTHENTICATION,
            msg = "Using the default token signing secret. Set IVD_AUTH__SECRET in production"
        );
    }
    if config.auth.trust_external_tokens {
        warn!(
            target: log::AUTHENTICATION,
            msg = "External identity tokens are accepted without verification"
        );
    }

    let store = config
        .store
        .open()
        .with_context(|| format!("opening patient store at {}", config.store.path.display()))?;
    info!(
        target: log::PERSISTENCE,
        backend = ?config.store.backend,
        path = %config.store.path.display(),
        msg = "Opened patient store"
    );

    let state = AppState::new(store, config.auth.service());
    let router = build_router(state);

    let address = config.server.to_socket_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(msg = "Server listening", address = %address);

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return finish(result),
        _ = signalled_rx => {}
    }

    match tokio::time::timeout(config.server.shutdown_timeout(), server).await {
        Ok(result) => finish(result),
        Err(_) => {
            warn!(msg = "Shutdown timeout elapsed, dropping in-flight requests");
            Ok(())
        }
    }
}

fn finish(result: Result<std::io::Result<()>, tokio::task::JoinError>) -> anyhow::Result<()> {
    result.context("server task failed")?.context("serving requests")?;
    info!(msg = "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = sigint() => info!(msg = "Received SIGINT"),
        _ = sigterm() => info!(msg = "Received SIGTERM"),
    }
}

async fn sigint() -> std::io::Result<()> {
    signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}

async fn sigterm() -> std::io::Result<()> {
    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}
