use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Formatter;
use std::str::FromStr;

pub const GITHUB_URL: &str = "https://github.com";

const ELLIPSIS: &str = "...";
const SHORT_SHA_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Cancelled,
}

impl Status {
    pub fn adjective(&self) -> &'static str {
        match self {
            Status::Success => "Successful",
            Status::Failure => "Failed",
            Status::Cancelled => "Cancelled",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Status::Success => "succeeded",
            Status::Failure => "failed",
            Status::Cancelled => "was cancelled",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Status::Success => 38912,
            Status::Failure => 16525609,
            Status::Cancelled => 6702148,
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Status::Success),
            "failure" => Ok(Status::Failure),
            "cancelled" => Ok(Status::Cancelled),
            other => bail!("unknown workflow status `{}`", other),
        }
    }
}

/// A single run of a GitHub Actions workflow.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub name: String,
    pub run_id: u64,
    pub run_number: u64,
    pub status: Status,
    pub repository: String,
    pub actor: String,
    pub sha: String,
}

impl Workflow {
    pub fn url(&self) -> String {
        format!("{}/{}/actions/runs/{}", GITHUB_URL, self.repository, self.run_id)
    }

    pub fn actor_url(&self) -> String {
        format!("{}/{}", GITHUB_URL, self.actor)
    }

    pub fn short_sha(&self) -> String {
        self.sha.chars().take(SHORT_SHA_LENGTH).collect()
    }

    pub fn commit_url(&self) -> String {
        format!("{}/{}/commit/{}", GITHUB_URL, self.repository, self.sha)
    }

    pub fn repository_owner(&self) -> &str {
        split_repository(&self.repository).0
    }

    /// The `<name> #<number>` label used for the run link.
    pub fn run_label(&self) -> String {
        format!("{} #{}", self.name, self.run_number)
    }
}

fn split_repository(repository: &str) -> (&str, &str) {
    repository.split_once('/').unwrap_or((repository, ""))
}

/// The head of a pull request, as GitHub labels it: `owner:branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBranch {
    pub owner: Option<String>,
    pub branch: String,
}

impl SourceBranch {
    pub fn from_label(label: &str) -> Self {
        match label.split_once(':') {
            Some((owner, branch)) => Self {
                owner: Some(owner.to_string()),
                branch: branch.to_string(),
            },
            None => Self {
                owner: None,
                branch: label.to_string(),
            },
        }
    }

    fn fork_owner<'a>(&'a self, base_owner: &str) -> Option<&'a str> {
        self.owner.as_deref().filter(|owner| *owner != base_owner)
    }

    /// Render the branch into at most `budget` characters.
    ///
    /// The owner is only shown for branches on a fork. When the label does not
    /// fit, the owner prefix goes first; after that the branch name itself is
    /// cut and marked with an ellipsis.
    pub fn shortened(&self, budget: usize, base_owner: &str) -> String {
        if let Some(owner) = self.fork_owner(base_owner) {
            let label = format!("{}:{}", owner, self.branch);
            if label.chars().count() <= budget {
                return label;
            }
        }

        truncate(&self.branch, budget)
    }

    pub fn url(&self, repository: &str) -> String {
        let (base_owner, name) = split_repository(repository);
        let owner = self.owner.as_deref().unwrap_or(base_owner);
        format!("{}/{}/{}/tree/{}", GITHUB_URL, owner, name, self.branch)
    }
}

impl std::fmt::Display for SourceBranch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}:{}", owner, self.branch),
            None => write!(f, "{}", self.branch),
        }
    }
}

fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    if budget < ELLIPSIS.len() {
        return text.chars().take(budget).collect();
    }

    let mut shortened: String = text.chars().take(budget - ELLIPSIS.len()).collect();
    shortened.push_str(ELLIPSIS);
    shortened
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub author_login: String,
    pub number: u64,
    pub title: String,
    pub source: SourceBranch,
}

impl PullRequest {
    pub fn author_url(&self) -> String {
        format!("{}/{}", GITHUB_URL, self.author_login)
    }

    pub fn url(&self, repository: &str) -> String {
        format!("{}/{}/pull/{}", GITHUB_URL, repository, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            IssueState::Open => "opened",
            IssueState::Closed => "closed",
        }
    }
}

impl FromStr for IssueState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "opened" | "reopened" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            other => bail!("unknown issue state `{}`", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub author_login: String,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
}

impl Issue {
    pub fn author_url(&self) -> String {
        format!("{}/{}", GITHUB_URL, self.author_login)
    }

    pub fn url(&self, repository: &str) -> String {
        format!("{}/{}/issues/{}", GITHUB_URL, repository, self.number)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventUser {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventHead {
    #[serde(default)]
    pub label: String,
}

/// The subset of a `pull_request` event object that ends up in the embed.
#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub user: EventUser,
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub head: EventHead,
}

#[derive(Debug, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub user: EventUser,
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
}

/// Parse an event object as passed in from `toJSON(github.event.*)`.
///
/// Lists use their first element. Returns `None` for anything that is empty
/// or not the expected shape, so callers can fall back to plain arguments.
pub fn parse_event<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Failed to parse event payload JSON: {}", e);
            return None;
        }
    };

    let value = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };

    match &value {
        Value::Object(fields) if !fields.is_empty() => {}
        _ => return None,
    }

    serde_json::from_value(value)
        .map_err(|e| tracing::debug!("Event payload has an unexpected shape: {}", e))
        .ok()
}
