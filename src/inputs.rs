//! Action inputs, as handed to us on the command line or through the
//! `INPUT_*` environment variables GitHub sets for an action.
//!
//! Everything arrives as a string; an empty string counts as not supplied.

use crate::discord::WebhookConfig;
use crate::github::{
    parse_event, Issue, IssueEvent, PullRequest, PullRequestEvent, SourceBranch, Workflow,
};
use clap::Args;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error(
        "missing non-null value for argument `{0}`\n\n\
         Hint: incorrect context paths like `github.non_existent` return `null` silently."
    )]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {value}")]
    Invalid { name: &'static str, value: String },
}

fn required<'a>(name: &'static str, value: &'a Option<String>) -> Result<&'a str, ArgumentError> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ArgumentError::Missing(name)),
    }
}

fn parse<T: FromStr>(name: &'static str, value: &Option<String>) -> Result<T, ArgumentError> {
    let value = required(name, value)?;
    value.parse::<T>().map_err(|_| ArgumentError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Clone, Args)]
pub struct WorkflowArgs {
    /// Name of the workflow
    #[arg(long, env = "INPUT_WORKFLOW_NAME")]
    pub workflow_name: Option<String>,

    /// Run id of the workflow run
    #[arg(long, env = "INPUT_RUN_ID")]
    pub run_id: Option<String>,

    /// Run number of the workflow run
    #[arg(long, env = "INPUT_RUN_NUMBER")]
    pub run_number: Option<String>,

    /// Status of the run: success, failure or cancelled
    #[arg(long, env = "INPUT_STATUS")]
    pub status: Option<String>,

    /// Repository in `owner/name` form
    #[arg(long, env = "INPUT_REPOSITORY")]
    pub repository: Option<String>,

    /// Login of the user that triggered the run
    #[arg(long, env = "INPUT_ACTOR")]
    pub actor: Option<String>,

    /// Commit the run was triggered for
    #[arg(long, env = "INPUT_SHA")]
    pub sha: Option<String>,
}

impl WorkflowArgs {
    pub fn workflow(&self) -> Result<Workflow, ArgumentError> {
        Ok(Workflow {
            name: required("workflow_name", &self.workflow_name)?.to_string(),
            run_id: parse("run_id", &self.run_id)?,
            run_number: parse("run_number", &self.run_number)?,
            status: parse("status", &self.status)?,
            repository: required("repository", &self.repository)?.to_string(),
            actor: required("actor", &self.actor)?.to_string(),
            sha: required("sha", &self.sha)?.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Args)]
pub struct WebhookArgs {
    /// Full webhook URL; takes precedence over id and token
    #[arg(long, env = "INPUT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Discord webhook id
    #[arg(long, env = "INPUT_WEBHOOK_ID")]
    pub webhook_id: Option<String>,

    /// Discord webhook token
    #[arg(long, env = "INPUT_WEBHOOK_TOKEN", hide_env_values = true)]
    pub webhook_token: Option<String>,
}

impl WebhookArgs {
    pub fn webhook(&self) -> Result<WebhookConfig, ArgumentError> {
        if let Ok(url) = required("webhook_url", &self.webhook_url) {
            return Ok(WebhookConfig::new(url));
        }

        let id = parse("webhook_id", &self.webhook_id)?;
        let token = required("webhook_token", &self.webhook_token)?;

        Ok(WebhookConfig::from_id_and_token(id, token))
    }
}

#[derive(Debug, Default, Clone, Args)]
pub struct PullRequestArgs {
    /// Login of the pull request author
    #[arg(long, env = "INPUT_PR_AUTHOR_LOGIN")]
    pub pr_author_login: Option<String>,

    /// Pull request number
    #[arg(long, env = "INPUT_PR_NUMBER")]
    pub pr_number: Option<String>,

    /// Pull request title
    #[arg(long, env = "INPUT_PR_TITLE")]
    pub pr_title: Option<String>,

    /// Head label of the pull request, `owner:branch`
    #[arg(long, env = "INPUT_PR_SOURCE")]
    pub pr_source: Option<String>,

    /// JSON of `github.event.pull_request`, used instead of the fields above
    #[arg(long, env = "INPUT_PULL_REQUEST_PAYLOAD")]
    pub pull_request_payload: Option<String>,
}

impl PullRequestArgs {
    fn with_payload(&self) -> Self {
        let mut args = self.clone();

        let Some(raw) = self.pull_request_payload.as_deref().filter(|p| !p.is_empty()) else {
            return args;
        };

        debug!("Attempting to parse pull request payload JSON: {:?}", raw);

        match parse_event::<PullRequestEvent>(raw) {
            Some(event) => {
                args.pr_author_login = non_empty(event.user.login);
                args.pr_number = event.number.map(|n| n.to_string());
                args.pr_title = non_empty(event.title);
                args.pr_source = non_empty(event.head.label);
            }
            None => warn!("Pull request payload could not be parsed, using the pr arguments"),
        }

        args
    }

    /// `None` when no pull request value was supplied at all.
    pub fn pull_request(&self) -> Result<Option<PullRequest>, ArgumentError> {
        let args = self.with_payload();

        if [
            &args.pr_author_login,
            &args.pr_number,
            &args.pr_title,
            &args.pr_source,
        ]
        .into_iter()
        .all(is_blank)
        {
            return Ok(None);
        }

        Ok(Some(PullRequest {
            author_login: required("pr_author_login", &args.pr_author_login)?.to_string(),
            number: parse("pr_number", &args.pr_number)?,
            title: required("pr_title", &args.pr_title)?.to_string(),
            source: SourceBranch::from_label(required("pr_source", &args.pr_source)?),
        }))
    }
}

#[derive(Debug, Default, Clone, Args)]
pub struct IssueArgs {
    /// Login of the issue author
    #[arg(long, env = "INPUT_ISSUE_AUTHOR_LOGIN")]
    pub issue_author_login: Option<String>,

    /// Issue number
    #[arg(long, env = "INPUT_ISSUE_NUMBER")]
    pub issue_number: Option<String>,

    /// Issue title
    #[arg(long, env = "INPUT_ISSUE_TITLE")]
    pub issue_title: Option<String>,

    /// Issue state, open or closed
    #[arg(long, env = "INPUT_ISSUE_STATUS")]
    pub issue_status: Option<String>,

    /// JSON of `github.event.issue`, used instead of the fields above
    #[arg(long, env = "INPUT_ISSUE_PAYLOAD")]
    pub issue_payload: Option<String>,
}

impl IssueArgs {
    fn with_payload(&self) -> Self {
        let mut args = self.clone();

        let Some(raw) = self.issue_payload.as_deref().filter(|p| !p.is_empty()) else {
            return args;
        };

        debug!("Attempting to parse issue payload JSON: {:?}", raw);

        match parse_event::<IssueEvent>(raw) {
            Some(event) => {
                args.issue_author_login = non_empty(event.user.login);
                args.issue_number = event.number.map(|n| n.to_string());
                args.issue_title = non_empty(event.title);
                args.issue_status = non_empty(event.state);
            }
            None => warn!("Issue payload could not be parsed, using the issue arguments"),
        }

        args
    }

    pub fn issue(&self) -> Result<Option<Issue>, ArgumentError> {
        let args = self.with_payload();

        if [
            &args.issue_author_login,
            &args.issue_number,
            &args.issue_title,
            &args.issue_status,
        ]
        .into_iter()
        .all(is_blank)
        {
            return Ok(None);
        }

        Ok(Some(Issue {
            author_login: required("issue_author_login", &args.issue_author_login)?.to_string(),
            number: parse("issue_number", &args.issue_number)?,
            title: required("issue_title", &args.issue_title)?.to_string(),
            state: parse("issue_status", &args.issue_status)?,
        }))
    }
}
