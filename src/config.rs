// === Module Header START ===
// purpose: Load and validate the YAML team definition into an immutable TeamConfig
// role: config/loader
// inputs: Path to the YAML file given on the command line
// outputs: TeamConfig passed by reference through every pipeline stage; no globals
// errors: Missing file, bad YAML, or a missing required field is fatal with the offending name in the message
// === Module Header END ===

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

/// One row of the assignee -> display-name mapping. Declared order in the
/// file is the report order.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineerMapping {
  pub assignee: String,
  pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct TeamConfig {
  pub jira_base_url: String,
  pub jira_email: String,
  pub jira_token: String,
  pub project_key: String,
  pub board_id: i64,
  pub lookback_days: i64,
  pub gitlab_base_url: String,
  pub gitlab_token: Option<String>,
  pub engineers: Vec<EngineerMapping>,
}

// Raw file shape; everything optional so validation can name the field
// instead of surfacing a serde type error.
#[derive(Debug, Deserialize)]
struct RawConfig {
  jira_base_url: Option<String>,
  jira_email: Option<String>,
  jira_token: Option<String>,
  project_key: Option<String>,
  board_id: Option<i64>,
  lookback_days: Option<i64>,
  gitlab_base_url: Option<String>,
  gitlab_token: Option<String>,
  #[serde(default)]
  engineers: Vec<EngineerMapping>,
}

fn required(field: Option<String>, name: &str) -> Result<String> {
  match field {
    Some(v) if !v.trim().is_empty() => Ok(v),
    _ => bail!("config: missing required field `{}`", name),
  }
}

pub fn load(path: &Path) -> Result<TeamConfig> {
  let text = std::fs::read_to_string(path).with_context(|| format!("reading config file {}", path.display()))?;
  let raw: RawConfig =
    serde_yaml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;

  let board_id = match raw.board_id {
    Some(id) => id,
    None => bail!("config: missing required field `board_id`"),
  };

  let lookback_days = raw.lookback_days.unwrap_or(1);
  if lookback_days < 1 {
    bail!("config: `lookback_days` must be at least 1");
  }

  Ok(TeamConfig {
    jira_base_url: required(raw.jira_base_url, "jira_base_url")?.trim_end_matches('/').to_string(),
    jira_email: required(raw.jira_email, "jira_email")?,
    jira_token: required(raw.jira_token, "jira_token")?,
    project_key: required(raw.project_key, "project_key")?,
    board_id,
    lookback_days,
    gitlab_base_url: raw
      .gitlab_base_url
      .unwrap_or_else(|| "https://gitlab.com".to_string())
      .trim_end_matches('/')
      .to_string(),
    gitlab_token: raw.gitlab_token.filter(|t| !t.trim().is_empty()),
    engineers: raw.engineers,
  })
}
