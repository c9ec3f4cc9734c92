//! Subcommand execution.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use arc_client::{OperationOutcome, PodEvent, RcClient};
use arc_core::MediaType;
use tracing::{error, info};

use crate::Commands;

/// Run one subcommand and map the controller's answer to an exit code.
pub async fn run(client: &mut RcClient, command: Commands) -> anyhow::Result<ExitCode> {
    let outcome = match command {
        Commands::List { resource } => client.list(resource).await?,
        Commands::Show { resource, id } => client.show(resource, &id, MediaType::Json).await?,
        Commands::Create { resource, file } => {
            let payload = load_payload(&file)?;
            client.create(resource, &payload, MediaType::Json).await?
        }
        Commands::Update {
            resource,
            id,
            file,
            workflow,
        } => {
            let payload = load_payload(&file)?;
            client
                .update(resource, &id, &payload, MediaType::Json, workflow.as_deref())
                .await?
        }
        Commands::Delete {
            resource,
            id,
            force,
        } => client.delete(resource, &id, MediaType::Json, force).await?,
        Commands::Events { pod } => client.show_pod_events(&pod).await?,
        Commands::Event {
            pod,
            level,
            message,
        } => {
            let event = PodEvent::new(pod, level, message);
            client.create_pod_event(&event).await?
        }
        Commands::Logout => {
            client
                .ensure_authenticated()
                .await
                .context("logging in to controller")?;
            match client.logout().await? {
                Some(outcome) => outcome,
                None => return Ok(ExitCode::SUCCESS),
            }
        }
    };

    Ok(report(&outcome))
}

fn report(outcome: &OperationOutcome) -> ExitCode {
    if !outcome.body.is_empty() {
        println!("{}", outcome.body);
    }

    if outcome.is_success() {
        info!(status = outcome.status.as_u16(), "Request succeeded");
        ExitCode::SUCCESS
    } else {
        error!(
            status = outcome.status.as_u16(),
            reason = %outcome.reason,
            "Controller rejected request"
        );
        ExitCode::FAILURE
    }
}

/// Read a YAML or JSON payload file. JSON parses as YAML, so one parser covers both.
fn load_payload(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading payload file {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing payload file {}", path.display()))
}
