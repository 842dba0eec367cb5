// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use dnsportal::{
    api::{build_router, AppState},
    cache::SnapshotCache,
    config::Config,
    resolver::HickoryResolver,
    service::FqdnService,
    source::{KubeRecordSetSource, RecordSetSource},
    sync_check::SyncChecker,
};
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("dnsportal")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<()> {
    // Respects RUST_LOG if set, otherwise defaults to INFO level.
    // RUST_LOG_FORMAT=json switches to JSON output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(listen_addr = %config.listen_addr, "Starting DNS portal");
    config.validate().context("Invalid configuration")?;

    let groups = config.group_mapping()?;
    let nameserver = config.nameserver_addr()?;
    debug!(?groups, %nameserver, "Configuration loaded");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let source: Arc<dyn RecordSetSource> =
        Arc::new(KubeRecordSetSource::new(client, config.watch_namespace.clone()));
    let resolver = Arc::new(HickoryResolver::new(nameserver, config.dns_timeout()));
    let cache = SnapshotCache::new();
    let service = FqdnService::new(
        source.clone(),
        cache.clone(),
        SyncChecker::new(resolver),
        groups,
        config.stream_buffer,
    );

    let shutdown = CancellationToken::new();

    let refresh = {
        let cache = cache.clone();
        let shutdown = shutdown.clone();
        let interval = config.refresh_interval();
        tokio::spawn(async move { cache.run(source, interval, shutdown).await })
    };

    let router = build_router(AppState {
        service,
        shutdown: shutdown.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %config.listen_addr, "HTTP API listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    // The server may also stop on its own; make sure the refresh loop follows
    shutdown.cancel();
    if let Err(e) = refresh.await {
        error!(error = %e, "Snapshot refresh task failed");
    }

    served.context("HTTP server failed")?;
    info!("DNS portal stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM and cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
