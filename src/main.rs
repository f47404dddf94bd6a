//! Queuescope - dashboard metric collector
//!
//! Polls broker and topic throughput from a message-queue cluster and
//! persists merged daily snapshots.

use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use queuescope::config::{merge_config_with_args, ConfigFile};
use queuescope::{Collector, CollectorArgs, CollectorConfig, HttpAdminClient, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Queuescope failed to start: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let mut args = CollectorArgs::parse();

    if args.generate_config {
        println!("{}", ConfigFile::generate_example());
        return Ok(());
    }

    // An explicit --config must load; the default search locations are
    // optional and silently skipped when absent.
    let config_file = match args.config.as_deref() {
        Some(path) => {
            let file = ConfigFile::load(path).map_err(|e| {
                eprintln!("Could not load configuration from {:?}: {}", path, e);
                e
            })?;
            eprintln!("Loaded configuration from {:?}", path);
            Some(file)
        }
        None => ConfigFile::load_default(),
    };
    if let Some(ref file) = config_file {
        args = merge_config_with_args(args, file);
    }

    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter)
        .init();

    if config_file.is_some() {
        info!("Configuration loaded from file");
    }

    let config = CollectorConfig::from_args(args)?;
    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration rejected");
        return Err(e);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_collector(config))
}

/// Spawn the collection loops and wait for shutdown.
async fn run_collector(config: CollectorConfig) -> Result<()> {
    info!(
        enabled = config.enabled,
        endpoint = %config.admin.endpoint,
        data_dir = %config.data_dir.display(),
        "Starting queuescope collector"
    );

    let admin = Arc::new(HttpAdminClient::new(&config.admin)?);
    let collector = Arc::new(Collector::new(config, admin));

    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = collector.clone().spawn_all(shutdown.clone());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutdown signal received, writing final snapshot");
    shutdown.store(true, Ordering::Relaxed);

    if let Err(e) = collector.flush().await {
        error!(error = %e, "Final snapshot flush failed");
    }

    // The poller loops sleep up to a minute between ticks; abort rather
    // than wait out their next wakeup.
    for handle in handles {
        handle.abort();
    }

    info!("Queuescope stopped");
    Ok(())
}
