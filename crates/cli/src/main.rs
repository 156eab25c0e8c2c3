//! CLI for the PufferPanel database layer.

mod config;

use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use pufferpanel_db::{DbError, Loader, Node};
use pufferpanel_services::NodeService;
use pufferpanel_telemetry::{init_logging, LogFormat};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "pufferpanel")]
#[command(about = "Database tooling for PufferPanel")]
struct Cli {
    /// Path to the panel config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Database dialect (mysql, postgres, sqlite)
    #[arg(long, env = "PUFFERPANEL_DATABASE_DIALECT")]
    dialect: Option<String>,

    /// Database connection URL
    #[arg(long, env = "PUFFERPANEL_DATABASE_URL")]
    url: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (json or pretty)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the panel tables
    Migrate,
    /// Manage nodes
    Nodes {
        #[command(subcommand)]
        command: NodeCommands,
    },
}

#[derive(Subcommand)]
enum NodeCommands {
    /// List every node
    List,
    /// Show one node
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Register a node
    Create {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: NodeFields,
    },
    /// Change fields of an existing node
    Update {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: NodeFields,
    },
    /// Remove a node
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Args)]
struct NodeFields {
    /// Host players and the panel use to reach the daemon
    #[arg(long)]
    public_host: Option<String>,

    /// Host the panel uses on the private network
    #[arg(long)]
    private_host: Option<String>,

    #[arg(long)]
    public_port: Option<i64>,

    #[arg(long)]
    private_port: Option<i64>,

    #[arg(long)]
    sftp_port: Option<i64>,

    /// Shared secret between panel and daemon
    #[arg(long)]
    secret: Option<String>,
}

impl NodeFields {
    fn apply(self, node: &mut Node) {
        if let Some(host) = self.public_host {
            node.public_host = host;
        }
        if let Some(host) = self.private_host {
            node.private_host = host;
        }
        if let Some(port) = self.public_port {
            node.public_port = port;
        }
        if let Some(port) = self.private_port {
            node.private_port = port;
        }
        if let Some(port) = self.sftp_port {
            node.sftp_port = port;
        }
        if let Some(secret) = self.secret {
            node.secret = secret;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut app_config = AppConfig::load(&cli.config)?;
    app_config.override_database(cli.dialect, cli.url);

    let log_level = cli.log_level.or(app_config.log_level.clone());
    init_logging(log_level.as_deref(), cli.log_format)?;
    if !cli.config.exists() {
        debug!("Config file {} not found, using defaults", cli.config.display());
    }

    let loader = Loader::new(app_config.database);
    let result: anyhow::Result<()> = match cli.command {
        Commands::Migrate => loader.load().await.map(|_| ()).map_err(Into::into),
        Commands::Nodes { command } => run_nodes(&loader, command).await,
    };

    let closed = if loader.is_open().await {
        loader.close().await
    } else {
        Ok(())
    };

    command_outcome(result, closed)
}

/// The command's own error wins over a failure to close the connection.
fn command_outcome(
    result: anyhow::Result<()>,
    closed: Result<(), DbError>,
) -> anyhow::Result<()> {
    match (result, closed) {
        (Err(err), Err(close_err)) => {
            error!("Failed to close database connection: {}", close_err);
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), closed) => Ok(closed?),
    }
}

async fn run_nodes(loader: &Loader, command: NodeCommands) -> anyhow::Result<()> {
    let nodes = NodeService::from_provider(loader).await?;

    match command {
        NodeCommands::List => print_json(&nodes.get_all().await?)?,
        NodeCommands::Get { id } => match nodes.get(id).await? {
            Some(node) => print_json(&node)?,
            None => anyhow::bail!("node {} not found", id),
        },
        NodeCommands::Create { name, fields } => {
            let host = fields.public_host.clone().unwrap_or_default();
            let mut node = Node::new(name, host);
            fields.apply(&mut node);
            let node = nodes.create(node).await?;
            info!("Created node {}", node.id);
            print_json(&node)?;
        }
        NodeCommands::Update { id, name, fields } => {
            let Some(mut node) = nodes.get(id).await? else {
                anyhow::bail!("node {} not found", id);
            };
            if let Some(name) = name {
                node.name = name;
            }
            fields.apply(&mut node);
            nodes.update(&node).await?;
            info!("Updated node {}", id);
            print_json(&node)?;
        }
        NodeCommands::Delete { id } => {
            if nodes.get(id).await?.is_none() {
                warn!("Node {} does not exist", id);
            }
            nodes.delete(id).await?;
            info!("Deleted node {}", id);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
