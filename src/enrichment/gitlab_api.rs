// === Module Header START ===
// purpose: Isolated GitLab REST helpers behind a trait seam (token header, env-backed test backend)
// role: enrichment/gitlab-api
// inputs: TeamConfig (base URL, optional token); SDR_TEST_MRS_JSON / SDR_TEST_MR_CHANGES_JSON fixtures in tests
// outputs: Raw serde_json::Value payloads for merge-request lookups
// side_effects: Network calls to the configured GitLab instance
// invariants:
// - Never panic; return None on failures (best-effort enrichment)
// - No credential configured means no API at all; the annotator keeps basic references
// === Module Header END ===

use crate::config::TeamConfig;
use crate::ext::serde_json::JsonFetch;
use crate::util::encode_project_path;

/// Trait seam for the code-hosting API. All methods are best-effort.
pub trait GitlabApi {
  /// Merge requests with the given source branch, newest first: `[...]`.
  fn merge_requests_by_branch_json(&self, project_path: &str, branch: &str) -> Option<serde_json::Value>;
  /// The `/changes` payload for one merge request (per-file unified diffs).
  fn merge_request_changes_json(&self, project_path: &str, iid: i64) -> Option<serde_json::Value>;
}

struct GitlabHttpApi {
  base_url: String,
  token: String,
  agent: ureq::Agent,
}

impl GitlabHttpApi {
  fn new(base_url: String, token: String) -> Self {
    Self {
      base_url,
      token,
      agent: ureq::AgentBuilder::new().build(),
    }
  }

  fn get_json(&self, url: &str) -> Option<serde_json::Value> {
    let resp = self
      .agent
      .get(url)
      .set("Accept", "application/json")
      .set("PRIVATE-TOKEN", &self.token)
      .call();

    match resp {
      Ok(r) => r.into_json::<serde_json::Value>().ok(),
      Err(_) => None,
    }
  }
}

impl GitlabApi for GitlabHttpApi {
  fn merge_requests_by_branch_json(&self, project_path: &str, branch: &str) -> Option<serde_json::Value> {
    let url = format!(
      "{}/api/v4/projects/{}/merge_requests?source_branch={}&order_by=created_at&sort=desc",
      self.base_url,
      encode_project_path(project_path),
      branch
    );
    self.get_json(&url)
  }

  fn merge_request_changes_json(&self, project_path: &str, iid: i64) -> Option<serde_json::Value> {
    let url = format!(
      "{}/api/v4/projects/{}/merge_requests/{}/changes",
      self.base_url,
      encode_project_path(project_path),
      iid
    );
    self.get_json(&url)
  }
}

// Env-backed fixture backend: SDR_TEST_MRS_JSON maps source branch -> MR
// list; SDR_TEST_MR_CHANGES_JSON maps iid (as string) -> changes payload.
struct GitlabEnvApi;

fn env_json(var: &str) -> Option<serde_json::Value> {
  let raw = std::env::var(var).ok()?;
  serde_json::from_str(&raw).ok()
}

impl GitlabApi for GitlabEnvApi {
  fn merge_requests_by_branch_json(&self, _project_path: &str, branch: &str) -> Option<serde_json::Value> {
    env_json("SDR_TEST_MRS_JSON")?.fetch(branch).to::<serde_json::Value>()
  }

  fn merge_request_changes_json(&self, _project_path: &str, iid: i64) -> Option<serde_json::Value> {
    env_json("SDR_TEST_MR_CHANGES_JSON")?
      .fetch(&iid.to_string())
      .to::<serde_json::Value>()
  }
}

fn env_wants_mock() -> bool {
  std::env::var("SDR_TEST_MRS_JSON").is_ok() || std::env::var("SDR_TEST_MR_CHANGES_JSON").is_ok()
}

/// Build the code-host API, or None when no credential is configured.
/// Without a credential the annotator never attempts a lookup, so the
/// output carries only the basic reference.
pub fn build_api(cfg: &TeamConfig) -> Option<Box<dyn GitlabApi>> {
  let token = cfg.gitlab_token.clone()?;

  if env_wants_mock() {
    return Some(Box::new(GitlabEnvApi));
  }

  Some(Box::new(GitlabHttpApi::new(cfg.gitlab_base_url.clone(), token)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  fn cfg_with_token(token: Option<&str>) -> TeamConfig {
    TeamConfig {
      jira_base_url: "https://x".into(),
      jira_email: "a@b".into(),
      jira_token: "t".into(),
      project_key: "ABC".into(),
      board_id: 1,
      lookback_days: 1,
      gitlab_base_url: "https://gitlab.com".into(),
      gitlab_token: token.map(String::from),
      engineers: vec![],
    }
  }

  #[test]
  #[serial]
  fn no_token_means_no_api() {
    std::env::set_var("SDR_TEST_MRS_JSON", "{}");
    assert!(build_api(&cfg_with_token(None)).is_none());
    std::env::remove_var("SDR_TEST_MRS_JSON");
  }

  #[test]
  #[serial]
  fn env_backend_keys_by_branch_and_iid() {
    std::env::set_var(
      "SDR_TEST_MRS_JSON",
      serde_json::json!({"fix-login": [{"iid": 12, "state": "opened"}]}).to_string(),
    );
    std::env::set_var(
      "SDR_TEST_MR_CHANGES_JSON",
      serde_json::json!({"12": {"changes": []}}).to_string(),
    );

    let api = build_api(&cfg_with_token(Some("glpat"))).unwrap();
    let mrs = api.merge_requests_by_branch_json("group/proj", "fix-login").unwrap();
    assert_eq!(mrs.fetch("").items().len(), 1);
    assert!(api.merge_requests_by_branch_json("group/proj", "other").is_none());
    assert!(api.merge_request_changes_json("group/proj", 12).is_some());
    assert!(api.merge_request_changes_json("group/proj", 99).is_none());

    std::env::remove_var("SDR_TEST_MRS_JSON");
    std::env::remove_var("SDR_TEST_MR_CHANGES_JSON");
  }

  #[test]
  fn http_error_path_is_graceful() {
    let api = GitlabHttpApi::new("http://invalid.localdomain.invalid".into(), "t".into());
    assert!(api.merge_requests_by_branch_json("g/p", "b").is_none());
  }
}
