use anyhow::Result;
use serde::Serialize;

const DISCORD_WEBHOOK_URL: &str = "https://discord.com/api/webhooks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn inline(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
}

impl WebhookConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    pub fn from_id_and_token(id: u64, token: &str) -> Self {
        Self {
            url: format!("{}/{}/{}", DISCORD_WEBHOOK_URL, id, token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<Response>;
}

/// Delivers payloads with a blocking `reqwest` client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<Response> {
        let response = self.client.post(url).json(payload).send()?;
        let status = response.status();

        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}
