use crate::config::Skin;
use crate::discord::{Transport, WebhookConfig};
use crate::github::{Issue, PullRequest, Workflow};
use crate::payload::{self, Context};
use anyhow::Result;
use std::io::Write;
use tracing::{debug, info};

pub struct Sender<'a> {
    pub skin: &'a Skin,
    pub transport: &'a dyn Transport,
    pub dry_run: bool,
}

impl Sender<'_> {
    /// Build the embed for this run and deliver it.
    ///
    /// Returns whether the webhook accepted the payload. The outcome line is
    /// written to `out`; failures use the GitHub Actions `::error::` command
    /// so they show up as annotations on the run.
    pub fn send(
        &self,
        workflow: &Workflow,
        webhook: &WebhookConfig,
        pull_request: Option<&PullRequest>,
        issue: Option<&Issue>,
        out: &mut dyn Write,
    ) -> Result<bool> {
        let context = Context::select(pull_request, issue);
        debug!("Creating payload for {:?}", context);

        let payload = payload::build(self.skin, workflow, context);
        debug!(
            "Generated payload:\n{}",
            serde_json::to_string_pretty(&payload)?
        );

        if self.dry_run {
            info!("Dry run, not delivering the payload");
            return Ok(true);
        }

        let response = self.transport.post_json(&webhook.url, &payload)?;
        debug!("Response: [{}] {}", response.status, response.reason);

        if response.is_success() {
            writeln!(
                out,
                "[status: {}] Successfully delivered webhook payload!",
                response.status
            )?;
        } else {
            writeln!(
                out,
                "::error::Discord webhook delivery failed! (status: {}; reason: {})",
                response.status, response.reason
            )?;
        }

        Ok(response.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::{Response, WebhookPayload};
    use crate::github::{IssueState, SourceBranch, Status};
    use anyhow::bail;
    use std::cell::RefCell;

    /// Answers every request with a fixed status and remembers what was sent.
    struct FakeTransport {
        response: Response,
        requests: RefCell<Vec<(String, WebhookPayload)>>,
    }

    impl FakeTransport {
        fn responding(status: u16, reason: &str) -> Self {
            Self {
                response: Response {
                    status,
                    reason: reason.to_string(),
                },
                requests: RefCell::new(vec![]),
            }
        }

        fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Transport for FakeTransport {
        fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<Response> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), payload.clone()));
            Ok(self.response.clone())
        }
    }

    struct BrokenTransport;

    impl Transport for BrokenTransport {
        fn post_json(&self, _url: &str, _payload: &WebhookPayload) -> Result<Response> {
            bail!("connection refused")
        }
    }

    fn workflow() -> Workflow {
        Workflow {
            name: "CI".to_string(),
            run_id: 55,
            run_number: 2,
            status: Status::Success,
            repository: "octo-org/widgets".to_string(),
            actor: "mona".to_string(),
            sha: "abcdef0123456".to_string(),
        }
    }

    fn webhook() -> WebhookConfig {
        WebhookConfig::new("https://discord.example/api/webhooks/1/token")
    }

    fn send(
        transport: &dyn Transport,
        dry_run: bool,
        pull_request: Option<&PullRequest>,
        issue: Option<&Issue>,
    ) -> (Result<bool>, String) {
        let skin = Skin::default();
        let sender = Sender {
            skin: &skin,
            transport,
            dry_run,
        };

        let mut out = Vec::new();
        let result = sender.send(&workflow(), &webhook(), pull_request, issue, &mut out);

        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_dry_run_makes_no_request() {
        let transport = FakeTransport::responding(500, "Internal Server Error");
        let (result, output) = send(&transport, true, None, None);

        assert!(result.unwrap());
        assert_eq!(transport.calls(), 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_successful_delivery() {
        let transport = FakeTransport::responding(200, "OK");
        let (result, output) = send(&transport, false, None, None);

        assert!(result.unwrap());
        assert_eq!(transport.calls(), 1);
        assert_eq!(
            output,
            "[status: 200] Successfully delivered webhook payload!\n"
        );

        let requests = transport.requests.borrow();
        let (url, payload) = &requests[0];
        assert_eq!(url, "https://discord.example/api/webhooks/1/token");
        assert_eq!(payload.embeds[0].fields[0].name, "Actor");
    }

    #[test]
    fn test_failed_delivery_reports_status_and_reason() {
        let transport = FakeTransport::responding(404, "Not Found");
        let (result, output) = send(&transport, false, None, None);

        assert!(!result.unwrap());
        assert!(output.starts_with("::error::"));
        assert!(output.contains("404"));
        assert!(output.contains("Not Found"));
    }

    #[test]
    fn test_issue_takes_priority_when_sending() {
        let transport = FakeTransport::responding(204, "No Content");
        let pr = PullRequest {
            author_login: "mona".to_string(),
            number: 1,
            title: "PR".to_string(),
            source: SourceBranch::from_label("octo-org:topic"),
        };
        let issue = Issue {
            author_login: "hubot".to_string(),
            number: 2,
            title: "Issue".to_string(),
            state: IssueState::Open,
        };

        let (result, _) = send(&transport, false, Some(&pr), Some(&issue));

        assert!(result.unwrap());
        let requests = transport.requests.borrow();
        assert_eq!(requests[0].1.embeds[0].fields[0].name, "Issue Author");
    }

    #[test]
    fn test_transport_errors_propagate() {
        let (result, output) = send(&BrokenTransport, false, None, None);

        assert!(result.is_err());
        assert!(output.is_empty());
    }
}
