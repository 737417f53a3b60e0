// === Module Header START ===
// purpose: Isolated Jira REST helpers behind a trait seam (blocking HTTP, basic auth, env-backed test backend)
// role: jira/api
// inputs: TeamConfig (base URL, email, API token); SDR_TEST_* env fixtures in tests
// outputs: Raw serde_json::Value payloads for sprints, searches, comments, and issue details
// side_effects: Network calls to the configured Jira instance
// invariants:
// - Every failure is surfaced as an error; primary fetches are fatal for the run, never retried
// - One blocking request at a time; no fan-out
// === Module Header END ===

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::TeamConfig;
use crate::ext::serde_json::JsonFetch;

/// Trait seam for the issue-tracker API. The pipeline only ever sees this,
/// so tests can swap in the env-backed fixture reader.
pub trait JiraApi {
  /// One page of the board's sprints: `{"total": N, "values": [...]}`.
  fn board_sprints_json(&self, board_id: i64, start_at: i64, max_results: i64) -> Result<serde_json::Value>;
  /// JQL search result: `{"issues": [...]}`.
  fn search_issues_json(&self, jql: &str, fields: &str) -> Result<serde_json::Value>;
  /// Comments for one issue: `{"comments": [...]}`.
  fn issue_comments_json(&self, key: &str) -> Result<serde_json::Value>;
  /// Single issue with changelog expanded.
  fn issue_details_json(&self, key: &str) -> Result<serde_json::Value>;
}

struct JiraHttpApi {
  base_url: String,
  auth_header: String,
  agent: ureq::Agent,
}

impl JiraHttpApi {
  fn new(cfg: &TeamConfig) -> Self {
    let credentials = BASE64.encode(format!("{}:{}", cfg.jira_email, cfg.jira_token));
    Self {
      base_url: cfg.jira_base_url.clone(),
      auth_header: format!("Basic {}", credentials),
      agent: ureq::AgentBuilder::new().build(),
    }
  }

  fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
    let mut req = self
      .agent
      .get(url)
      .set("Accept", "application/json")
      .set("Authorization", &self.auth_header);

    for (k, v) in query {
      req = req.query(k, v);
    }

    let resp = req.call().map_err(|e| anyhow!("jira request failed: {}: {}", url, e))?;

    resp
      .into_json::<serde_json::Value>()
      .with_context(|| format!("decoding jira response from {}", url))
  }
}

impl JiraApi for JiraHttpApi {
  fn board_sprints_json(&self, board_id: i64, start_at: i64, max_results: i64) -> Result<serde_json::Value> {
    let url = format!("{}/rest/agile/1.0/board/{}/sprint", self.base_url, board_id);
    self.get_json(
      &url,
      &[
        ("startAt", &start_at.to_string()),
        ("maxResults", &max_results.to_string()),
      ],
    )
  }

  fn search_issues_json(&self, jql: &str, fields: &str) -> Result<serde_json::Value> {
    let url = format!("{}/rest/api/3/search/jql", self.base_url);
    self.get_json(&url, &[("jql", jql), ("fields", fields)])
  }

  fn issue_comments_json(&self, key: &str) -> Result<serde_json::Value> {
    let url = format!("{}/rest/api/3/issue/{}/comment", self.base_url, key);
    self.get_json(&url, &[("orderBy", "created")])
  }

  fn issue_details_json(&self, key: &str) -> Result<serde_json::Value> {
    let url = format!("{}/rest/api/3/issue/{}", self.base_url, key);
    self.get_json(&url, &[("fields", "status,assignee,comment"), ("expand", "changelog")])
  }
}

// Env-backed fixture backend so integration tests can drive the full binary
// without a network. Keyed fixtures are JSON maps indexed by issue key.
struct JiraEnvApi;

fn env_json(var: &str) -> Result<serde_json::Value> {
  let raw = std::env::var(var).map_err(|_| anyhow!("test fixture {} not set", var))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing test fixture {}", var))
}

impl JiraApi for JiraEnvApi {
  fn board_sprints_json(&self, _board_id: i64, _start_at: i64, _max_results: i64) -> Result<serde_json::Value> {
    env_json("SDR_TEST_SPRINTS_JSON")
  }

  fn search_issues_json(&self, _jql: &str, _fields: &str) -> Result<serde_json::Value> {
    env_json("SDR_TEST_SEARCH_JSON")
  }

  fn issue_comments_json(&self, key: &str) -> Result<serde_json::Value> {
    // Absent map or key means "no comments", not an error.
    match env_json("SDR_TEST_COMMENTS_JSON") {
      Ok(map) => Ok(
        map
          .fetch(key)
          .to::<serde_json::Value>()
          .unwrap_or_else(|| serde_json::json!({"comments": []})),
      ),
      Err(_) => Ok(serde_json::json!({"comments": []})),
    }
  }

  fn issue_details_json(&self, key: &str) -> Result<serde_json::Value> {
    let map = env_json("SDR_TEST_ISSUES_JSON")?;
    match map.fetch(key).to::<serde_json::Value>() {
      Some(v) => Ok(v),
      None => bail!("test fixture SDR_TEST_ISSUES_JSON has no entry for {}", key),
    }
  }
}

fn env_wants_mock() -> bool {
  ["SDR_TEST_SPRINTS_JSON", "SDR_TEST_SEARCH_JSON", "SDR_TEST_ISSUES_JSON"]
    .iter()
    .any(|v| std::env::var(v).is_ok())
}

pub fn build_api(cfg: &TeamConfig) -> Box<dyn JiraApi> {
  if env_wants_mock() {
    Box::new(JiraEnvApi)
  } else {
    Box::new(JiraHttpApi::new(cfg))
  }
}
