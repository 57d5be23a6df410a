//! doks - command line client for DigitalOcean Kubernetes
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doks::kubernetes::{
    ClusterDeleteSelectiveRequest, GetClusterStatusMessagesRequest, GetClusterlintRequest,
    NodeDeleteRequest, RunClusterlintRequest,
};
use doks::{CancellationToken, ClientConfig, DoClient, KubernetesService, ListOptions};

#[derive(Parser)]
#[command(name = "doks")]
#[command(about = "Manage DigitalOcean Kubernetes clusters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "doks.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example configuration file
    Init,

    /// Show versions, regions and sizes available for new clusters
    Options,

    /// Cluster operations
    Clusters {
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Download the kubeconfig of a cluster
    Kubeconfig {
        cluster_id: String,

        /// Lifetime of the embedded token
        #[arg(long)]
        expiry_seconds: Option<u64>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Node pool operations
    NodePools {
        #[command(subcommand)]
        command: NodePoolCommands,
    },

    /// Node operations
    Nodes {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Clusterlint operations
    Lint {
        #[command(subcommand)]
        command: LintCommands,
    },

    /// Show the status history of a cluster
    StatusMessages {
        cluster_id: String,

        /// Only messages newer than this RFC3339 timestamp
        #[arg(long)]
        since: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// List clusters
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 0)]
        per_page: u32,
    },

    /// Show a cluster
    Get { cluster_id: String },

    /// Show versions a cluster can be upgraded to
    Upgrades { cluster_id: String },

    /// List resources that can be deleted together with a cluster
    Resources { cluster_id: String },

    /// Delete a cluster
    Delete {
        cluster_id: String,

        /// Also delete every associated volume, snapshot and load balancer
        #[arg(long, conflicts_with_all = ["volume", "volume_snapshot", "load_balancer"])]
        dangerous: bool,

        /// Associated volume to delete with the cluster
        #[arg(long)]
        volume: Vec<String>,

        /// Associated volume snapshot to delete with the cluster
        #[arg(long)]
        volume_snapshot: Vec<String>,

        /// Associated load balancer to delete with the cluster
        #[arg(long)]
        load_balancer: Vec<String>,
    },
}

#[derive(Subcommand)]
enum NodePoolCommands {
    /// List node pools of a cluster
    List {
        cluster_id: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 0)]
        per_page: u32,
    },

    /// Show a node pool
    Get { cluster_id: String, pool_id: String },
}

#[derive(Subcommand)]
enum NodeCommands {
    /// Delete a node
    Delete {
        cluster_id: String,
        pool_id: String,
        node_id: String,

        /// Do not drain the node first
        #[arg(long)]
        skip_drain: bool,

        /// Replace the node with a new one
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Subcommand)]
enum LintCommands {
    /// Start a clusterlint run
    Run {
        cluster_id: String,
        #[arg(long)]
        include_group: Vec<String>,
        #[arg(long)]
        exclude_group: Vec<String>,
        #[arg(long)]
        include_check: Vec<String>,
        #[arg(long)]
        exclude_check: Vec<String>,
    },

    /// Show diagnostics of a run (latest when no run ID is given)
    Results {
        cluster_id: String,
        #[arg(long)]
        run_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("doks={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Ctrl-C aborts the in-flight request
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            signal_token.cancel();
        }
    });

    if let Err(e) = run(&cli, &token).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, token: &CancellationToken) -> Result<()> {
    match &cli.command {
        Commands::Init => init_config(&cli.config).await,
        Commands::Options => {
            let (options, _) = connect(&cli.config)?
                .get_options(token)
                .await
                .context("Failed to get Kubernetes options")?;
            print_json(&options)
        }
        Commands::Clusters { command } => {
            run_cluster_command(&connect(&cli.config)?, token, command).await
        }
        Commands::Kubeconfig {
            cluster_id,
            expiry_seconds,
            output,
        } => {
            let (config, _) = connect(&cli.config)?
                .get_kubeconfig(token, cluster_id, *expiry_seconds)
                .await
                .context("Failed to get kubeconfig")?;
            match output {
                Some(path) => {
                    tokio::fs::write(path, &config.kubeconfig_yaml)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Kubeconfig written to {}", path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout()
                        .write_all(&config.kubeconfig_yaml)
                        .context("Failed to write kubeconfig")?;
                }
            }
            Ok(())
        }
        Commands::NodePools { command } => {
            run_node_pool_command(&connect(&cli.config)?, token, command).await
        }
        Commands::Nodes {
            command:
                NodeCommands::Delete {
                    cluster_id,
                    pool_id,
                    node_id,
                    skip_drain,
                    replace,
                },
        } => {
            let request = NodeDeleteRequest {
                skip_drain: *skip_drain,
                replace: *replace,
            };
            connect(&cli.config)?
                .delete_node(token, cluster_id, pool_id, node_id, Some(&request))
                .await
                .context("Failed to delete node")?;
            info!("Node {} deleted", node_id);
            Ok(())
        }
        Commands::Lint { command } => {
            run_lint_command(&connect(&cli.config)?, token, command).await
        }
        Commands::StatusMessages { cluster_id, since } => {
            let request = GetClusterStatusMessagesRequest { since: *since };
            let (messages, _) = connect(&cli.config)?
                .get_cluster_status_messages(token, cluster_id, Some(&request))
                .await
                .context("Failed to get status messages")?;
            print_json(&messages)
        }
    }
}

async fn run_cluster_command(
    kubernetes: &KubernetesService,
    token: &CancellationToken,
    command: &ClusterCommands,
) -> Result<()> {
    match command {
        ClusterCommands::List { page, per_page } => {
            let opts = ListOptions::new(*page, *per_page);
            let (clusters, response) = kubernetes
                .list(token, Some(&opts))
                .await
                .context("Failed to list clusters")?;
            if let Some(meta) = &response.meta {
                info!("Showing {} of {} clusters", clusters.len(), meta.total);
            }
            if let Some(next) = response.links.as_ref().and_then(|l| l.next_page()) {
                info!("More clusters available, use --page {}", next);
            }
            print_json(&clusters)
        }
        ClusterCommands::Get { cluster_id } => {
            let (cluster, _) = kubernetes
                .get(token, cluster_id)
                .await
                .context("Failed to get cluster")?;
            print_json(&cluster)
        }
        ClusterCommands::Upgrades { cluster_id } => {
            let (versions, _) = kubernetes
                .get_upgrades(token, cluster_id)
                .await
                .context("Failed to get available upgrades")?;
            print_json(&versions)
        }
        ClusterCommands::Resources { cluster_id } => {
            let (resources, _) = kubernetes
                .list_associated_resources_for_deletion(token, cluster_id)
                .await
                .context("Failed to list associated resources")?;
            print_json(&resources)
        }
        ClusterCommands::Delete {
            cluster_id,
            dangerous,
            volume,
            volume_snapshot,
            load_balancer,
        } => {
            if *dangerous {
                info!("Deleting cluster {} with all associated resources", cluster_id);
                kubernetes
                    .delete_dangerous(token, cluster_id)
                    .await
                    .context("Failed to delete cluster")?;
            } else if volume.is_empty() && volume_snapshot.is_empty() && load_balancer.is_empty() {
                info!("Deleting cluster {}", cluster_id);
                kubernetes
                    .delete(token, cluster_id)
                    .await
                    .context("Failed to delete cluster")?;
            } else {
                info!("Deleting cluster {} with selected resources", cluster_id);
                let request = ClusterDeleteSelectiveRequest {
                    volumes: volume.clone(),
                    volume_snapshots: volume_snapshot.clone(),
                    load_balancers: load_balancer.clone(),
                };
                kubernetes
                    .delete_selective(token, cluster_id, &request)
                    .await
                    .context("Failed to delete cluster")?;
            }
            info!("Cluster {} deleted", cluster_id);
            Ok(())
        }
    }
}

async fn run_node_pool_command(
    kubernetes: &KubernetesService,
    token: &CancellationToken,
    command: &NodePoolCommands,
) -> Result<()> {
    match command {
        NodePoolCommands::List {
            cluster_id,
            page,
            per_page,
        } => {
            let opts = ListOptions::new(*page, *per_page);
            let (pools, _) = kubernetes
                .list_node_pools(token, cluster_id, Some(&opts))
                .await
                .context("Failed to list node pools")?;
            print_json(&pools)
        }
        NodePoolCommands::Get {
            cluster_id,
            pool_id,
        } => {
            let (pool, _) = kubernetes
                .get_node_pool(token, cluster_id, pool_id)
                .await
                .context("Failed to get node pool")?;
            print_json(&pool)
        }
    }
}

async fn run_lint_command(
    kubernetes: &KubernetesService,
    token: &CancellationToken,
    command: &LintCommands,
) -> Result<()> {
    match command {
        LintCommands::Run {
            cluster_id,
            include_group,
            exclude_group,
            include_check,
            exclude_check,
        } => {
            let request = RunClusterlintRequest {
                include_groups: include_group.clone(),
                exclude_groups: exclude_group.clone(),
                include_checks: include_check.clone(),
                exclude_checks: exclude_check.clone(),
            };
            let (run_id, _) = kubernetes
                .run_clusterlint(token, cluster_id, &request)
                .await
                .context("Failed to start clusterlint run")?;
            info!("Clusterlint run started: {}", run_id);
            println!("{}", run_id);
            Ok(())
        }
        LintCommands::Results { cluster_id, run_id } => {
            let request = GetClusterlintRequest {
                run_id: run_id.clone(),
            };
            let (diagnostics, _) = kubernetes
                .get_clusterlint_results(token, cluster_id, Some(&request))
                .await
                .context("Failed to get clusterlint results")?;
            print_json(&diagnostics)
        }
    }
}

/// Load configuration and build the API client
fn connect(config_path: &Path) -> Result<KubernetesService> {
    let config = if config_path.exists() {
        ClientConfig::from_file(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        ClientConfig::default()
    };

    let api_token = config.api_token()?;
    let client = DoClient::from_config(&config, &api_token).context("Failed to create API client")?;
    Ok(client.kubernetes())
}

/// Generate example configuration file
async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let yaml = serde_yaml::to_string(&ClientConfig::example())?;
    tokio::fs::write(path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Example configuration written to {}", path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
