//! dsync - watch a Protocol D fabric controller
//!
//! Connects, loads the fabric, then prints every add, delete, change and
//! alarm the controller reports until the connection ends.
//!
//! # Usage
//!
//! ```bash
//! # Watch a controller on the default port
//! dsync --host 192.168.10.2
//!
//! # Settings from a file, one value overridden
//! dsync --config /etc/dsync/client.toml --port 23884
//!
//! # Machine-readable events
//! dsync --host 192.168.10.2 --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dsync_client::{Client, ClientConfig};
use dsync_core::{Alarm, ResourceRef, ResourceStore};

/// dsync - Protocol D fabric watcher
#[derive(Parser, Debug)]
#[command(name = "dsync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller host
    #[arg(long, env = "DSYNC_HOST")]
    host: Option<String>,

    /// Controller port
    #[arg(short, long, env = "DSYNC_PORT")]
    port: Option<u16>,

    /// Configuration file path (TOML)
    #[arg(short, long, env = "DSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "dsync_client=debug" (default: RUST_LOG, then info)
    #[arg(long, env = "DSYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

impl Args {
    /// File settings (or defaults) with command-line values on top
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level).context("Invalid log level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = args.client_config()?;
    let mut client = Client::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {}:{}", config.host, config.port))?;

    let json = args.json;
    let engine = client.engine_mut();
    engine.on_ready(move |store| print_ready(json, store));
    engine.on_add(move |_, record| print_record(json, "add", record));
    engine.on_delete(move |_, record| print_record(json, "delete", record));
    engine.on_change(move |_, old, new| print_change(json, old, new));
    engine.on_alarm(move |_, alarm| print_alarm(json, alarm));

    tokio::select! {
        (_, result) = client.run() => result.context("Session with controller ended"),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    }
}

fn print_ready(json: bool, store: &ResourceStore) {
    let stats = store.stats();
    if json {
        println!("{}", json!({ "event": "ready", "stats": stats }));
        return;
    }

    println!(
        "{} {} nodes, {} sources, {} destinations, {} gpis, {} gpos",
        "READY".green().bold(),
        stats.nodes,
        stats.sources,
        stats.destinations,
        stats.gpis,
        stats.gpos
    );
}

fn print_record(json: bool, event: &str, record: ResourceRef<'_>) {
    if json {
        println!("{}", json!({ "event": event, "resource": record }));
        return;
    }

    let label = match event {
        "add" => "ADD".green(),
        _ => "DEL".red(),
    };
    println!("{} {:<12} {}", label, record.kind().to_string().cyan(), record);
}

fn print_change(json: bool, old: ResourceRef<'_>, new: ResourceRef<'_>) {
    if json {
        println!("{}", json!({ "event": "change", "old": old, "new": new }));
        return;
    }

    println!("{} {:<12} {}", "CHG".yellow(), new.kind().to_string().cyan(), old.to_string().dimmed());
    println!("    {:<12} {}", "", new);
}

fn print_alarm(json: bool, alarm: &Alarm) {
    if json {
        println!("{}", json!({ "event": "alarm", "alarm": alarm }));
        return;
    }

    let label = if alarm.is_active() {
        "ALM".red().bold()
    } else {
        "ALM".dimmed()
    };
    println!("{} {}", label, alarm);
}
