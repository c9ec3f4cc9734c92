//! ARC command line client.
//!
//! # Usage
//!
//! ```bash
//! arc --server rc.example.com --login admin --password admin123 list pod
//! arc show blueprint 7d4f...
//! arc create edgesite -f edgesite.yaml
//! arc update pod 1c2e... -f pod.yaml --workflow upgrade
//! arc delete pod 1c2e... --force
//! arc events 1c2e...
//! ```

mod commands;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use arc_client::{EventLevel, RcClient};
use arc_core::ResourceType;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command line client for the Akraino Regional Controller.
#[derive(Parser, Debug)]
#[command(name = "arc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Controller host, optionally as host:port
    #[arg(long, env = "ARC_SERVER")]
    server: Option<String>,

    /// Controller port
    #[arg(long, env = "ARC_PORT")]
    port: Option<u16>,

    /// Login name
    #[arg(long, env = "ARC_LOGIN")]
    login: Option<String>,

    /// Password
    #[arg(long, env = "ARC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// YAML configuration file
    #[arg(long, short, env = "ARC_CONFIG")]
    config: Option<PathBuf>,

    /// Ask the controller for YAML responses
    #[arg(long, env = "ARC_YAML")]
    yaml: bool,

    /// Verify the controller's TLS certificate
    #[arg(long, env = "ARC_TLS_VERIFY")]
    tls_verify: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ARC_TIMEOUT")]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all objects of a type
    List {
        /// Resource type (blueprint, edgesite, hardware, node, pod, region, user, login, version)
        resource: ResourceType,
    },
    /// Show one object
    Show {
        /// Resource type
        resource: ResourceType,
        /// Object UUID
        id: String,
    },
    /// Create an object from a YAML or JSON file
    Create {
        /// Resource type
        resource: ResourceType,
        /// Payload file
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Update an object from a YAML or JSON file
    Update {
        /// Resource type
        resource: ResourceType,
        /// Object UUID
        id: String,
        /// Payload file
        #[arg(long, short)]
        file: PathBuf,
        /// Workflow to start after the update (PODs only)
        #[arg(long)]
        workflow: Option<String>,
    },
    /// Delete an object
    Delete {
        /// Resource type
        resource: ResourceType,
        /// Object UUID
        id: String,
        /// Delete even if a workflow is still running (PODs only)
        #[arg(long)]
        force: bool,
    },
    /// List the events recorded against a POD
    Events {
        /// POD UUID
        pod: String,
    },
    /// Record an event against a POD
    Event {
        /// POD UUID
        pod: String,
        /// Event level (INFO, WARN, ERROR, STATUS)
        #[arg(long, default_value = "INFO")]
        level: EventLevel,
        /// Event message
        #[arg(long, short)]
        message: String,
    },
    /// Log in, then end the session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("arc=debug,arc_client=debug,arc_core=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,arc=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = settings::resolve(&cli)?;
    let mut client = RcClient::from_config(config)?;

    commands::run(&mut client, cli.command)
        .await
        .map_err(|err| {
            if let Some(arc_err) = err.downcast_ref::<arc_core::Error>() {
                if arc_err.should_log() {
                    error!(code = arc_err.error_code(), "{arc_err}");
                }
            }
            err
        })
}
