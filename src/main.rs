//! Versioned API demo server - CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use versioned_api::dispatch::{DispatchTable, OperationReply, VersionScope};
use versioned_api::registry::VersionRegistry;
use versioned_api::server::build_router;
use versioned_api::service::VersionedService;
use versioned_api::VersioningConfig;

#[derive(Parser, Debug)]
#[command(
    name = "versioned-api",
    about = "Demo web service for URL-segment, query-string, and header API versioning",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "versioned-api.yaml")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print default config if requested
    if args.print_config {
        let default_config = include_str!("../config/route-versioning.yaml");
        println!("{}", default_config);
        return Ok(());
    }

    // Load configuration
    let config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        VersioningConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using built-in route-versioning configuration");
        serde_yaml::from_str(include_str!("../config/route-versioning.yaml"))?
    };

    // Validate and exit if requested
    if args.validate {
        config.validate()?;
        println!("Configuration is valid");
        return Ok(());
    }

    let dispatch = demo_dispatch(&config)?;
    let service = Arc::new(VersionedService::new(config, dispatch)?);

    for (group, _) in service.documents() {
        info!(group = %group, "serving generated document at /openapi/{}.json", group);
    }

    let router = build_router(service);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(listen = %args.listen, "versioned API server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Register the demo operations against the configured version set:
/// "ping" at every declared version, "pong" only at the newest, and
/// "status" for all versions.
fn demo_dispatch(config: &VersioningConfig) -> Result<DispatchTable> {
    let registry = VersionRegistry::from_config(config)?;
    let mut table = DispatchTable::new();

    for declaration in registry.iter() {
        table.register(
            "ping",
            VersionScope::Exact(declaration.version),
            Arc::new(OperationReply::ok),
        )?;
    }

    if let Some(newest) = registry.newest() {
        table.register(
            "pong",
            VersionScope::Exact(newest),
            Arc::new(OperationReply::ok),
        )?;
    }

    table.register("status", VersionScope::AllVersions, Arc::new(OperationReply::ok))?;

    Ok(table)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
    }
}
