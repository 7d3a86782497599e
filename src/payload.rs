use crate::config::{RunField, Skin};
use crate::discord::{Embed, EmbedField, WebhookPayload};
use crate::github::{Issue, IssueState, PullRequest, Workflow};

/// Total characters shared by the three inline fields of a pull request embed.
pub const FIELD_CHARACTER_BUDGET: usize = 60;

/// What the workflow ran for. Decides the shape of the embed.
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    Workflow,
    PullRequest(&'a PullRequest),
    Issue(&'a Issue),
}

impl<'a> Context<'a> {
    /// An issue wins over a pull request; with neither the run stands alone.
    pub fn select(pull_request: Option<&'a PullRequest>, issue: Option<&'a Issue>) -> Self {
        match (issue, pull_request) {
            (Some(issue), _) => Context::Issue(issue),
            (None, Some(pull_request)) => Context::PullRequest(pull_request),
            (None, None) => Context::Workflow,
        }
    }
}

pub fn build(skin: &Skin, workflow: &Workflow, context: Context<'_>) -> WebhookPayload {
    let embed = match context {
        Context::Workflow => workflow_embed(skin, workflow),
        Context::PullRequest(pull_request) => pull_request_embed(skin, workflow, pull_request),
        Context::Issue(issue) => issue_embed(skin, workflow, issue),
    };

    WebhookPayload {
        username: skin.username.clone(),
        avatar_url: skin.avatar_url.clone(),
        embeds: vec![embed],
    }
}

/// Room left for the source branch once the author and run label are shown.
pub fn source_branch_budget(workflow: &Workflow, pull_request: &PullRequest) -> usize {
    FIELD_CHARACTER_BUDGET
        .saturating_sub(pull_request.author_login.chars().count())
        .saturating_sub(workflow.run_label().chars().count())
}

fn run_field(skin: &Skin, workflow: &Workflow) -> EmbedField {
    match skin.run_field {
        RunField::WorkflowRun => EmbedField::inline(
            "Workflow Run",
            format!("[{}]({})", workflow.run_label(), workflow.url()),
        ),
        RunField::Repository => EmbedField::inline(
            "Repository",
            format!("[{}]({})", workflow.repository, workflow.url()),
        ),
    }
}

fn description(skin: &Skin, workflow: &Workflow) -> String {
    skin.description(workflow.run_id, &workflow.url(), workflow.status)
}

fn workflow_embed(skin: &Skin, workflow: &Workflow) -> Embed {
    let fields = vec![
        EmbedField::inline(
            "Actor",
            format!("[{}]({})", workflow.actor, workflow.actor_url()),
        ),
        run_field(skin, workflow),
        EmbedField::inline(
            "Commit",
            format!("[{}]({})", workflow.short_sha(), workflow.commit_url()),
        ),
    ];

    Embed {
        title: format!(
            "[{}] {} workflow run by {}",
            workflow.repository,
            workflow.status.adjective(),
            workflow.actor
        ),
        description: description(skin, workflow),
        url: workflow.url(),
        color: skin.palette.workflow.resolve(workflow.status),
        fields,
    }
}

fn pull_request_embed(skin: &Skin, workflow: &Workflow, pull_request: &PullRequest) -> Embed {
    let budget = source_branch_budget(workflow, pull_request);
    let source = pull_request
        .source
        .shortened(budget, workflow.repository_owner());

    tracing::debug!(
        "Source branch `{}` rendered as `{}` (budget {})",
        pull_request.source,
        source,
        budget
    );

    let fields = vec![
        EmbedField::inline(
            "PR Author",
            format!(
                "[{}]({})",
                pull_request.author_login,
                pull_request.author_url()
            ),
        ),
        run_field(skin, workflow),
        EmbedField::inline(
            "Source Branch",
            format!(
                "[{}]({})",
                source,
                pull_request.source.url(&workflow.repository)
            ),
        ),
    ];

    Embed {
        title: format!(
            "[{}] Checks {} on PR: #{} {}",
            workflow.repository,
            workflow.status.adjective().to_lowercase(),
            pull_request.number,
            pull_request.title
        ),
        description: description(skin, workflow),
        url: pull_request.url(&workflow.repository),
        color: skin.palette.pull_request.resolve(workflow.status),
        fields,
    }
}

fn issue_embed(skin: &Skin, workflow: &Workflow, issue: &Issue) -> Embed {
    let color = match issue.state {
        IssueState::Open => skin.palette.issue_open,
        IssueState::Closed => skin.palette.issue_closed,
    };

    let fields = vec![
        EmbedField::inline(
            "Issue Author",
            format!("[{}]({})", issue.author_login, issue.author_url()),
        ),
        run_field(skin, workflow),
        EmbedField::inline(
            "Issue Status",
            format!("[{}]({})", issue.state.as_str(), workflow.url()),
        ),
    ];

    Embed {
        title: format!(
            "[{}] Issue {}: #{} {}",
            workflow.repository,
            issue.state.past_tense(),
            issue.number,
            issue.title
        ),
        description: description(skin, workflow),
        url: issue.url(&workflow.repository),
        color: color.resolve(workflow.status),
        fields,
    }
}
