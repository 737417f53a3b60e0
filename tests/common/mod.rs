use assert_cmd::Command;
use std::io::Write;

/// Write a team config to a temp file and keep the handle alive for the
/// test's duration.
#[allow(dead_code)]
pub fn write_config(body: &str) -> tempfile::NamedTempFile {
  let mut f = tempfile::NamedTempFile::new().unwrap();
  f.write_all(body.as_bytes()).unwrap();
  f
}

#[allow(dead_code)]
pub const BASE_CONFIG: &str = "\
jira_base_url: https://example.atlassian.net
jira_email: bot@example.com
jira_token: secret
project_key: ABC
board_id: 42
lookback_days: 7
engineers:
  - assignee: id-alice
    display_name: Alice
  - assignee: id-bob
    display_name: Bob
";

/// Command for the binary with a pinned timezone so cutoff arithmetic is
/// deterministic regardless of the host. Fixture env vars are passed per
/// child process, never set in the test process itself.
#[allow(dead_code)]
pub fn draft_cmd(config_path: &std::path::Path, now: &str) -> Command {
  let mut cmd = Command::cargo_bin("standup-draft").unwrap();
  cmd.arg(config_path).arg("--now-override").arg(now).env("TZ", "UTC");
  cmd
}

#[allow(dead_code)]
pub fn sprints_fixture() -> String {
  serde_json::json!({
    "total": 2,
    "values": [
      {"id": 2, "name": "Sprint 2", "state": "closed"},
      {"id": 3, "name": "Sprint 3", "state": "active"}
    ]
  })
  .to_string()
}

#[allow(dead_code)]
pub fn search_fixture(issues: serde_json::Value) -> String {
  serde_json::json!({ "issues": issues }).to_string()
}
