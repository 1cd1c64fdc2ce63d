use crate::commands::handlers::success_text;
use crate::commands::{
    Cli, CommandResult, Commands, SessionContext, handle_command, parse_command,
};
use crate::config::Config;
use crate::error::AlignToolError;
use crate::presentation::LogPresenter;
use crate::session::AlignmentCoordinator;
use crate::structure::{InMemoryWorkspace, StructureId};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Expand a leading `~` in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

/// Load the workspace file and wire a coordinator over it.
async fn open_session(workspace: &Path, config: &Config) -> Result<SessionContext> {
    let workspace = Arc::new(InMemoryWorkspace::load(&expand_path(workspace)).await?);
    let coordinator = Arc::new(AlignmentCoordinator::new(
        workspace.clone(),
        workspace.clone(),
        Arc::new(LogPresenter::new(config.presentation.confirmation())),
        config.session.clone(),
    ));
    coordinator
        .refresh()
        .await
        .map_err(AlignToolError::from)
        .context("Failed to list workspace structures")?;
    Ok(SessionContext::new(
        coordinator,
        workspace,
        config.presentation.confirmation(),
        config.presentation.notify_on_success,
    ))
}

async fn run_align(
    config: &Config,
    workspace: &Path,
    reference: u64,
    targets: Vec<u64>,
) -> Result<()> {
    let ctx = open_session(workspace, config).await?;
    let coordinator = &ctx.coordinator;

    coordinator
        .set_reference(StructureId(reference))
        .map_err(AlignToolError::from)?;
    for target in targets {
        coordinator
            .toggle_target(StructureId(target))
            .map_err(AlignToolError::from)?;
    }

    let report = coordinator.submit().await.map_err(AlignToolError::from)?;
    println!("{}", success_text(&ctx, &report));
    if let Some(tooltip) = &report.summary.tooltip {
        info!(summary = %tooltip, "alignment.summary");
    }
    Ok(())
}

async fn run_session(config: &Config, workspace: &Path) -> Result<()> {
    let ctx = open_session(workspace, config).await?;

    let follower = {
        let coordinator = Arc::clone(&ctx.coordinator);
        let events = ctx.workspace.subscribe();
        tokio::spawn(async move { coordinator.follow_directory(events).await })
    };

    println!("aligntool session. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let CommandResult { text, exit } = match parse_command(&line) {
            Some(command) => handle_command(command, &ctx).await,
            None => CommandResult::visible("Unknown command. Type /help for commands."),
        };
        println!("{text}");
        if exit {
            break;
        }
    }

    follower.abort();
    info!("session.closed");
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Align {
            workspace,
            reference,
            targets,
        } => run_align(&config, &workspace, reference, targets).await,
        Commands::Session { workspace } => run_session(&config, &workspace).await,
    }
}
