//! `tesserad`: the Tessera daemon.
//!
//! Binary entrypoint that opens a node over a data directory and either
//! serves the HTTP API or runs a one-shot ingest/retrieve against it.
//!
//! # Usage
//!
//! ```text
//! tesserad start                            # serve on 0.0.0.0:8080
//! tesserad start -c tessera.toml            # start with a config file
//! tesserad start -d ./node2 -l 127.0.0.1:9090
//! tesserad put ./report.pdf                 # store a local file
//! tesserad get report.pdf -o out.pdf        # reconstruct it
//! ```

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tessera_engine::TesseraNode;
use tessera_http::{HttpServer, HttpServerConfig};
use tracing::info;

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "tesserad",
    version,
    about = "Tessera content-addressed file store with keyword search"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Start {
        /// Override listen address (e.g. "127.0.0.1:9090").
        #[arg(short = 'l', long)]
        listen_addr: Option<String>,

        /// Run fully in-memory (no disk persistence).
        #[arg(short, long)]
        memory: bool,
    },

    /// Ingest a local file into the data directory.
    Put {
        /// File to read.
        path: PathBuf,

        /// Name to store it under (defaults to the file's own name).
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Reconstruct a stored file.
    Get {
        /// Stored filename.
        name: String,

        /// Write to this path instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    if let Some(dir) = cli.data_dir {
        config.node.data_dir = dir;
    }

    match cli.command {
        Commands::Start {
            listen_addr,
            memory,
        } => {
            // CLI args override config file values.
            if let Some(addr) = listen_addr {
                config.node.listen_addr = addr;
            }
            if memory {
                config.storage.backend = "memory".to_string();
            }
            cmd_start(config).await
        }
        Commands::Put { path, name } => cmd_put(&config, &path, name).await,
        Commands::Get { name, output } => cmd_get(&config, &name, output.as_deref()).await,
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so `get` can stream file bytes on stdout.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the node described by `config`.
fn open_node(config: &CliConfig) -> Result<TesseraNode> {
    if config.is_memory() {
        info!("using in-memory storage; nothing will persist");
        return Ok(TesseraNode::in_memory(config.node_config()));
    }

    std::fs::create_dir_all(&config.node.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.node.data_dir.display()
        )
    })?;
    TesseraNode::open(config.node_config(), &config.node.data_dir)
        .context("failed to open data directory")
}

// -----------------------------------------------------------------------
// tesserad start
// -----------------------------------------------------------------------

async fn cmd_start(config: CliConfig) -> Result<()> {
    info!("starting tesserad");
    info!(
        data_dir = %config.node.data_dir.display(),
        listen_addr = %config.node.listen_addr,
        backend = %config.storage.backend,
        block_size = config.storage.block_size,
        max_upload_bytes = config.storage.max_upload_bytes,
        "node configuration"
    );

    let node = Arc::new(open_node(&config)?);
    let stats = node.stats().await.context("failed to read store")?;
    info!(
        blocks = stats.blocks,
        files = stats.files,
        "storage opened (keyword index starts empty)"
    );

    let server = HttpServer::new(HttpServerConfig {
        node,
        max_upload_bytes: config.storage.max_upload_bytes,
    });

    server
        .serve_with_shutdown(&config.node.listen_addr, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("tesserad stopped");
    Ok(())
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

// -----------------------------------------------------------------------
// tesserad put / get
// -----------------------------------------------------------------------

async fn cmd_put(config: &CliConfig, path: &Path, name: Option<String>) -> Result<()> {
    if config.is_memory() {
        bail!("put needs a file backend; an in-memory store would be discarded on exit");
    }

    let name = match name {
        Some(n) => n,
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("cannot derive a name from {}", path.display()))?,
    };

    let node = open_node(config)?;
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let receipt = node
        .ingest(&name, tokio::io::BufReader::new(file))
        .await
        .with_context(|| format!("failed to store {name}"))?;

    println!(
        "stored {} ({} bytes, {} blocks, {} new)",
        receipt.filename, receipt.bytes, receipt.blocks, receipt.new_blocks
    );
    Ok(())
}

async fn cmd_get(config: &CliConfig, name: &str, output: Option<&Path>) -> Result<()> {
    if config.is_memory() {
        bail!("get needs a file backend");
    }

    let node = open_node(config)?;
    match output {
        Some(out) => {
            // Assemble fully first so a damaged file never leaves a partial copy.
            let data = node
                .retrieve(name)
                .await
                .with_context(|| format!("failed to retrieve {name}"))?;
            tokio::fs::write(out, &data)
                .await
                .with_context(|| format!("cannot write {}", out.display()))?;
            info!(filename = name, bytes = data.len(), output = %out.display(), "file written");
        }
        None => {
            node.retrieve_to(name, tokio::io::stdout())
                .await
                .with_context(|| format!("failed to retrieve {name}"))?;
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
