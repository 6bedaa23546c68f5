use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use v3tov2_proxy::config::{load_config, validate_config, ProxyConfig};
use v3tov2_proxy::lifecycle::{wait_for_signal, Shutdown};
use v3tov2_proxy::observability::{logging, metrics};
use v3tov2_proxy::HttpServer;

/// Serve the legacy v2 schedule API on top of the v3 service.
#[derive(Parser, Debug)]
#[command(name = "v3tov2-proxy", version, about)]
struct Cli {
    /// Dump raw, readable and converted responses to the dump directory.
    #[arg(long)]
    debug: bool,

    /// Listening port (overrides the config file).
    #[arg(long)]
    port: Option<u16>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream v3 base URL (overrides the config file).
    #[arg(long)]
    upstream: Option<String>,
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then flags.
    fn into_config(self) -> Result<ProxyConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if self.debug {
            config.debug.enabled = true;
        }
        if let Some(port) = self.port {
            config.listener.set_port(port);
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }

        if let Err(errors) = validate_config(&config) {
            for e in &errors {
                eprintln!("invalid configuration: {e}");
            }
            return Err(format!("{} configuration error(s)", errors.len()).into());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("v3tov2-proxy: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Proxy terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        debug = config.debug.enabled,
        "Starting proxy"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
