use crate::github::Status;
use anyhow::{Context, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use std::path::Path;

const MAX_COLOR: u32 = 0xFFFFFF;
const GITHUB_ACTIONS_AVATAR_URL: &str = "https://avatars.githubusercontent.com/in/15368?s=128&v=4";

pub const DEFAULT_SKIN: &str = "default";
pub const CLASSIC_SKIN: &str = "classic";

/// Either the colour of the workflow status, or a fixed RGB integer.
///
/// In skin files this is the string `"status"` or a number such as `0x2cbe4e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedColor {
    Status,
    Fixed(u32),
}

impl EmbedColor {
    pub fn resolve(&self, status: Status) -> u32 {
        match self {
            EmbedColor::Status => status.color(),
            EmbedColor::Fixed(color) => *color,
        }
    }
}

struct EmbedColorVisitor;

impl Visitor<'_> for EmbedColorVisitor {
    type Value = EmbedColor;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "\"status\" or a 24-bit RGB integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<EmbedColor, E> {
        match u32::try_from(v) {
            Ok(color) if color <= MAX_COLOR => Ok(EmbedColor::Fixed(color)),
            _ => Err(E::custom(format!("color {} is not a 24-bit RGB value", v))),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<EmbedColor, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!("color {} is negative", v))),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<EmbedColor, E> {
        if v.fract() == 0.0 && v >= 0.0 {
            self.visit_u64(v as u64)
        } else {
            Err(E::custom(format!("color {} is not an integer", v)))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<EmbedColor, E> {
        if v.eq_ignore_ascii_case("status") {
            Ok(EmbedColor::Status)
        } else {
            Err(E::custom(format!("unknown color `{}`", v)))
        }
    }
}

impl<'de> Deserialize<'de> for EmbedColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(EmbedColorVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub workflow: EmbedColor,
    pub pull_request: EmbedColor,
    pub issue_open: EmbedColor,
    pub issue_closed: EmbedColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            workflow: EmbedColor::Status,
            pull_request: EmbedColor::Fixed(0x6f42c1),
            issue_open: EmbedColor::Fixed(0x2cbe4e),
            issue_closed: EmbedColor::Fixed(0xcb2431),
        }
    }
}

impl Palette {
    fn status_only() -> Self {
        Self {
            workflow: EmbedColor::Status,
            pull_request: EmbedColor::Status,
            issue_open: EmbedColor::Status,
            issue_closed: EmbedColor::Status,
        }
    }
}

/// Which link goes into the middle field of every embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunField {
    /// "Workflow Run", linking `<name> #<number>` to the run.
    WorkflowRun,
    /// "Repository", linking `owner/name` to the run.
    Repository,
}

/// The look of the message: who sends it and how it is coloured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Skin {
    pub username: String,
    pub avatar_url: String,
    pub product: String,
    pub run_field: RunField,
    pub palette: Palette,
}

impl Default for Skin {
    fn default() -> Self {
        Self {
            username: "GitHub Actions".to_string(),
            avatar_url: GITHUB_ACTIONS_AVATAR_URL.to_string(),
            product: "GitHub Actions".to_string(),
            run_field: RunField::WorkflowRun,
            palette: Palette::default(),
        }
    }
}

impl Skin {
    pub fn classic() -> Self {
        Self {
            run_field: RunField::Repository,
            palette: Palette::status_only(),
            ..Self::default()
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            DEFAULT_SKIN => Some(Self::default()),
            CLASSIC_SKIN => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn from_json5(contents: &str) -> Result<Self> {
        Ok(serde_json5::from_str::<Skin>(contents)?)
    }

    /// Look up a built-in skin by name, or load one from a JSON5 file.
    pub fn load(name_or_path: &str) -> Result<Self> {
        if let Some(skin) = Self::builtin(name_or_path) {
            return Ok(skin);
        }

        let path = Path::new(name_or_path);
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read skin file {}", path.display()))?;

        Self::from_json5(&contents)
            .with_context(|| format!("Unable to parse skin file {}", path.display()))
    }

    pub fn description(&self, run_id: u64, run_url: &str, status: Status) -> String {
        format!(
            "{} run [{}]({}) {}.",
            self.product,
            run_id,
            run_url,
            status.verb()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_skins() {
        assert_eq!(Skin::builtin("default"), Some(Skin::default()));
        assert_eq!(Skin::builtin("classic"), Some(Skin::classic()));
        assert_eq!(Skin::builtin("fancy"), None);
    }

    #[test]
    fn test_classic_skin_uses_status_colors() {
        let skin = Skin::classic();

        assert_eq!(skin.run_field, RunField::Repository);
        assert_eq!(skin.palette.pull_request.resolve(Status::Failure), 16525609);
        assert_eq!(skin.palette.issue_open.resolve(Status::Success), 38912);
    }

    #[test]
    fn test_skin_from_json5_falls_back_to_defaults() {
        let skin = Skin::from_json5(
            r#"{
                // Only override what differs
                username: "Build Bot",
                palette: { workflow: 65280, issue_closed: "status" },
            }"#,
        )
        .unwrap();

        assert_eq!(skin.username, "Build Bot");
        assert_eq!(skin.product, "GitHub Actions");
        assert_eq!(skin.run_field, RunField::WorkflowRun);
        assert_eq!(skin.palette.workflow, EmbedColor::Fixed(0x00ff00));
        assert_eq!(skin.palette.issue_closed, EmbedColor::Status);
        assert_eq!(skin.palette.pull_request, Palette::default().pull_request);
    }

    #[test]
    fn test_skin_from_json5_reads_run_field() {
        let skin = Skin::from_json5(r#"{ run_field: "repository" }"#).unwrap();
        assert_eq!(skin.run_field, RunField::Repository);
    }

    #[test]
    fn test_skin_rejects_bad_colors_and_unknown_keys() {
        assert!(Skin::from_json5(r#"{ palette: { workflow: "purple" } }"#).is_err());
        assert!(Skin::from_json5(r#"{ palette: { workflow: 16777216 } }"#).is_err());
        assert!(Skin::from_json5(r#"{ colour: 1 }"#).is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(Skin::load("/nonexistent/skin.json5").is_err());
    }

    #[test]
    fn test_description_template() {
        let skin = Skin::default();
        assert_eq!(
            skin.description(99, "https://example.com/run", Status::Cancelled),
            "GitHub Actions run [99](https://example.com/run) was cancelled."
        );
    }
}
