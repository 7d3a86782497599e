use crate::config::Skin;
use crate::discord::HttpTransport;
use crate::inputs::{IssueArgs, PullRequestArgs, WebhookArgs, WorkflowArgs};
use crate::notify::Sender;
use anyhow::Result;
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use tracing::info;

mod config;
mod discord;
mod github;
mod inputs;
mod log;
mod notify;
mod payload;

/// Send an enhanced GitHub Actions status embed to a Discord webhook.
#[derive(Parser)]
#[command(name = "github-status-embed")]
struct Cli {
    #[command(flatten)]
    workflow: WorkflowArgs,

    #[command(flatten)]
    webhook: WebhookArgs,

    #[command(flatten)]
    pull_request: PullRequestArgs,

    #[command(flatten)]
    issue: IssueArgs,

    /// Built-in skin name (`default`, `classic`) or path to a JSON5 skin file
    #[arg(long, env = "INPUT_SKIN", default_value = config::DEFAULT_SKIN)]
    skin: String,

    /// Build the payload but do not deliver it
    #[arg(long, env = "INPUT_DRY_RUN")]
    dry_run: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<bool> {
    let workflow = cli.workflow.workflow()?;
    let webhook = cli.webhook.webhook()?;
    let pull_request = cli.pull_request.pull_request()?;
    let issue = cli.issue.issue()?;
    let skin = Skin::load(&cli.skin)?;

    info!(
        "Notifying for `{}` run #{} of {}",
        workflow.name, workflow.run_number, workflow.repository
    );

    let transport = HttpTransport::new()?;
    let sender = Sender {
        skin: &skin,
        transport: &transport,
        dry_run: cli.dry_run,
    };

    sender.send(
        &workflow,
        &webhook,
        pull_request.as_ref(),
        issue.as_ref(),
        &mut std::io::stdout(),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    log::init(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "github-status-embed",
            "--workflow-name",
            "CI",
            "--run-id",
            "1",
            "--pr-number",
            "4",
            "--skin",
            "classic",
            "--dry-run",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.workflow.workflow_name.as_deref(), Some("CI"));
        assert_eq!(cli.pull_request.pr_number.as_deref(), Some("4"));
        assert_eq!(cli.skin, "classic");
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }
}
