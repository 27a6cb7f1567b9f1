//! Shard topology inspection tool

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use topo_client::{Config, LogConfig, TopoBackend, TopoConfig};
use topo_core::{read_keyspace_in_cell, Keyspace, KeyspaceId, ROLE_MASTER};

/// Inspect keyspace sharding and resolve keyspace ids to shards
#[derive(Parser, Debug)]
#[command(name = "shardctl")]
#[command(about = "Inspect keyspace sharding served by the coordination service")]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coordination service backend (http or file)
    #[arg(long)]
    backend: Option<TopoBackend>,

    /// Coordination service HTTP address
    #[arg(long)]
    addr: Option<String>,

    /// Topology directory for the file backend
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Cell to read keyspaces from
    #[arg(long)]
    cell: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the keyspace snapshot as JSON
    Show {
        keyspace: String,
    },
    /// List the shards of a role class
    Shards {
        keyspace: String,
        /// Role class
        #[arg(short, long, default_value = ROLE_MASTER)]
        role: String,
    },
    /// Print the shard owning a keyspace id
    Resolve {
        keyspace: String,
        /// Keyspace id (decimal or 0x-prefixed hex for uint64, hex for bytes)
        keyspace_id: String,
        /// Role class
        #[arg(short, long, default_value = ROLE_MASTER)]
        role: String,
    },
}

impl Command {
    fn keyspace(&self) -> &str {
        match self {
            Command::Show { keyspace }
            | Command::Shards { keyspace, .. }
            | Command::Resolve { keyspace, .. } => keyspace,
        }
    }
}

/// Configuration file overridden by command line flags
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    config.merge(Config {
        topo: TopoConfig {
            backend: args.backend,
            addr: args.addr.clone().unwrap_or_default(),
            data_dir: args.data_dir.clone().unwrap_or_default(),
            cell: args.cell.clone().unwrap_or_default(),
            request_timeout_secs: 0,
        },
        log: LogConfig {
            level: args.log_level.clone().unwrap_or_default(),
        },
    });

    Ok(config)
}

fn run(command: &Command, ks: &Keyspace) -> anyhow::Result<()> {
    match command {
        Command::Show { .. } => {
            println!("{}", serde_json::to_string_pretty(ks)?);
        }
        Command::Shards { role, .. } => {
            let names = ks.shard_names(role)?;
            let ranges = ks.shard_key_ranges(role)?;
            for (name, range) in names.iter().zip(&ranges) {
                println!("{}\t{}", name, range);
            }
        }
        Command::Resolve {
            keyspace_id, role, ..
        } => {
            let id = KeyspaceId::parse(keyspace_id, ks.sharding_column_type())?;
            println!("{}", ks.keyspace_id_to_shard_name(role, &id)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize logging
    let level = match config.log.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!(
        "Using {:?} topology backend, cell {}",
        config.topo.backend(),
        config.topo.cell
    );

    let server = config.topo.build_server()?;
    let ks = read_keyspace_in_cell(server.as_ref(), &config.topo.cell, args.command.keyspace()).await?;

    run(&args.command, &ks)
}
