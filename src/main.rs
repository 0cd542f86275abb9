//! API Version Deprecation - CLI Entry Point
//!
//! Loads a YAML configuration of deprecated versions, validates it, prints
//! the headers a given version would receive, and optionally serves
//! Prometheus metrics.

use anyhow::Result;
use api_version_deprecation::{ApiVersionDeprecationHandler, DeprecationConfig, ResponseHeaders};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "api-version-deprecation",
    about = "API version deprecation signaling - Sunset and Deprecation headers",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "api-deprecation.yaml")]
    config: PathBuf,

    /// Print the headers that would be emitted for this version, then exit
    #[arg(short, long, value_name = "VERSION")]
    show: Option<String>,

    /// Print headers as JSON instead of wire format (with --show)
    #[arg(long, requires = "show")]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Serve Prometheus metrics until interrupted
    #[arg(long)]
    metrics: bool,

    /// Metrics server port
    #[arg(long, default_value = "9090")]
    metrics_port: u16,
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
        let default_config = include_str!("../demos/default-config.yaml");
        println!("{}", default_config);
        return Ok(());
    }

    // Load configuration
    let config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        DeprecationConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using default configuration");
        DeprecationConfig::default()
    };

    // Validate and exit if requested
    if args.validate {
        config.validate()?;
        println!("Configuration is valid");
        return Ok(());
    }

    let handler = ApiVersionDeprecationHandler::from_config(&config)?;
    info!(
        versions = handler.version_count(),
        "Version deprecation handler initialized"
    );

    // Show headers for a version and exit
    if let Some(version) = &args.show {
        let mut headers = ResponseHeaders::new();
        handler.handle_version(version, &mut headers);

        if args.json {
            let map: serde_json::Map<String, serde_json::Value> = headers
                .iter()
                .map(|(n, v)| (n.to_string(), serde_json::json!(v)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        } else if headers.is_empty() {
            println!("(no deprecation headers for version {:?})", version);
        } else {
            for (name, value) in headers.iter() {
                println!("{}: {}", name, value);
            }
        }
        return Ok(());
    }

    // Serve metrics until interrupted
    if args.metrics {
        let metrics = handler
            .metrics()
            .ok_or_else(|| anyhow::anyhow!("Metrics are disabled in the configuration"))?
            .clone();

        tokio::select! {
            _ = serve_metrics(metrics, args.metrics_port) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
            }
        }
    }

    Ok(())
}

async fn serve_metrics(
    metrics: std::sync::Arc<api_version_deprecation::metrics::VersionMetrics>,
    port: u16,
) {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    let listener = match TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start metrics server");
            return;
        }
    };

    info!(port = port, "Metrics server started");

    loop {
        match listener.accept().await {
            Ok((mut socket, _)) => {
                let output = metrics.encode();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
                    output.len(),
                    output
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to accept metrics connection");
            }
        }
    }
}
