// === Module Header START ===
// purpose: Resolve the board's active sprint and fetch/normalize the sprint's recent or active issues
// role: pipeline/issue-fetcher
// inputs: JiraApi seam, TeamConfig (project key, board id, lookback window)
// outputs: Vec<Issue> in API response order, with raw cross-issue links attached
// errors: No active sprint, or any fetch failure, aborts the run
// === Module Header END ===

use anyhow::{Result, bail};

use crate::config::TeamConfig;
use crate::ext::serde_json::JsonFetch;
use crate::jira::JiraApi;
use crate::model::{Issue, LinkRef, Sprint};

const SPRINT_PAGE: i64 = 50;

/// Find the board's active sprint. Boards accumulate hundreds of closed
/// sprints, so probe the total first and read a single page from the tail.
pub fn active_sprint(api: &dyn JiraApi, board_id: i64) -> Result<Sprint> {
  let probe = api.board_sprints_json(board_id, 0, 1)?;
  let total = probe.fetch("total").to::<i64>().unwrap_or(0);

  let start_at = (total - SPRINT_PAGE).max(0);
  let page = api.board_sprints_json(board_id, start_at, SPRINT_PAGE)?;

  for sprint in page.fetch("values").items() {
    if sprint.fetch("state").to_or_default::<String>() == "active" {
      let id = match sprint.fetch("id").to::<i64>() {
        Some(id) => id,
        None => continue,
      };
      return Ok(Sprint {
        id,
        name: sprint.fetch("name").to_or_default::<String>(),
      });
    }
  }

  bail!("no active sprint found on board {}", board_id)
}

/// JQL for "updated within the lookback window OR still in flight", scoped
/// to the team's project and sprint. Assignee is deliberately not part of
/// the query: unmapped assignees must surface in the fallback bucket rather
/// than being filtered away server-side.
pub fn build_jql(cfg: &TeamConfig, sprint_id: i64) -> String {
  format!(
    "project = {} AND sprint = {} AND (status in (\"Blocked\", \"In Progress\", \"In Review\") OR updated >= -{}d)",
    cfg.project_key, sprint_id, cfg.lookback_days
  )
}

const SEARCH_FIELDS: &str = "summary,status,assignee,updated,issuelinks";

pub fn fetch_issues(api: &dyn JiraApi, cfg: &TeamConfig, sprint_id: i64) -> Result<Vec<Issue>> {
  let jql = build_jql(cfg, sprint_id);
  let result = api.search_issues_json(&jql, SEARCH_FIELDS)?;

  let mut out: Vec<Issue> = Vec::new();

  for item in result.fetch("issues").items() {
    let key = item.fetch("key").to_or_default::<String>();
    if key.is_empty() {
      continue;
    }

    let issue = Issue {
      title: item.fetch("fields.summary").to_or_default::<String>(),
      status: item.fetch("fields.status.name").to_or_default::<String>(),
      assignee: assignee_id(item),
      updated: item.fetch("fields.updated").to_or_default::<String>(),
      links: parse_links(item),
      comment: None,
      dependencies: Vec::new(),
      merge_requests: Vec::new(),
      key,
    };

    out.push(issue);
  }

  Ok(out)
}

/// Assignee identifier used for the display-name mapping. Jira Cloud keys
/// assignees by accountId; Server/DC fixtures may only carry name or email.
fn assignee_id(item: &serde_json::Value) -> Option<String> {
  item
    .fetch("fields.assignee.accountId")
    .to::<String>()
    .or_else(|| item.fetch("fields.assignee.emailAddress").to::<String>())
    .or_else(|| item.fetch("fields.assignee.name").to::<String>())
}

/// Pull the linked-issue keys out of `issuelinks`. Direction does not
/// matter for the dependency filter, only the target.
fn parse_links(item: &serde_json::Value) -> Vec<LinkRef> {
  let mut links: Vec<LinkRef> = Vec::new();

  for link in item.fetch("fields.issuelinks").items() {
    let target = link
      .fetch("outwardIssue.key")
      .to::<String>()
      .or_else(|| link.fetch("inwardIssue.key").to::<String>());

    if let Some(key) = target {
      let project = key.split('-').next().unwrap_or("").to_string();
      links.push(LinkRef { project, key });
    }
  }

  links
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jira;
  use serial_test::serial;

  fn test_cfg() -> TeamConfig {
    TeamConfig {
      jira_base_url: "https://example.atlassian.net".into(),
      jira_email: "bot@example.com".into(),
      jira_token: "secret".into(),
      project_key: "ABC".into(),
      board_id: 42,
      lookback_days: 7,
      gitlab_base_url: "https://gitlab.com".into(),
      gitlab_token: None,
      engineers: vec![],
    }
  }

  #[test]
  fn jql_scopes_project_sprint_and_window() {
    let jql = build_jql(&test_cfg(), 314);
    assert!(jql.contains("project = ABC"));
    assert!(jql.contains("sprint = 314"));
    assert!(jql.contains("updated >= -7d"));
    assert!(!jql.contains("assignee"));
  }

  #[test]
  #[serial]
  fn active_sprint_found_on_tail_page() {
    std::env::set_var(
      "SDR_TEST_SPRINTS_JSON",
      serde_json::json!({
        "total": 3,
        "values": [
          {"id": 1, "name": "Sprint 1", "state": "closed"},
          {"id": 2, "name": "Sprint 2", "state": "closed"},
          {"id": 3, "name": "Sprint 3", "state": "active"}
        ]
      })
      .to_string(),
    );

    let api = jira::build_api(&test_cfg());
    let sprint = active_sprint(api.as_ref(), 42).unwrap();
    assert_eq!(sprint.id, 3);
    assert_eq!(sprint.name, "Sprint 3");

    std::env::remove_var("SDR_TEST_SPRINTS_JSON");
  }

  #[test]
  #[serial]
  fn no_active_sprint_is_fatal() {
    std::env::set_var(
      "SDR_TEST_SPRINTS_JSON",
      serde_json::json!({"total": 1, "values": [{"id": 1, "name": "S", "state": "closed"}]}).to_string(),
    );

    let api = jira::build_api(&test_cfg());
    let err = active_sprint(api.as_ref(), 42).unwrap_err();
    assert!(format!("{:#}", err).contains("no active sprint"));

    std::env::remove_var("SDR_TEST_SPRINTS_JSON");
  }

  #[test]
  #[serial]
  fn issues_normalize_in_response_order() {
    std::env::set_var(
      "SDR_TEST_SEARCH_JSON",
      serde_json::json!({
        "issues": [
          {
            "key": "ABC-2",
            "fields": {
              "summary": "Fix login",
              "status": {"name": "In Progress"},
              "assignee": {"accountId": "id-alice"},
              "updated": "2026-08-28T09:00:00.000+0000",
              "issuelinks": [
                {"outwardIssue": {"key": "XYZ-9"}},
                {"inwardIssue": {"key": "ABC-7"}}
              ]
            }
          },
          {
            "key": "ABC-1",
            "fields": {
              "summary": "Ship search",
              "status": {"name": "Blocked"},
              "updated": "2026-08-27T09:00:00.000+0000"
            }
          }
        ]
      })
      .to_string(),
    );

    let cfg = test_cfg();
    let api = jira::build_api(&cfg);
    let issues = fetch_issues(api.as_ref(), &cfg, 3).unwrap();

    assert_eq!(issues.len(), 2);
    // fetch order preserved, no re-sort
    assert_eq!(issues[0].key, "ABC-2");
    assert_eq!(issues[1].key, "ABC-1");

    assert_eq!(issues[0].assignee.as_deref(), Some("id-alice"));
    assert_eq!(
      issues[0].links,
      vec![
        LinkRef { project: "XYZ".into(), key: "XYZ-9".into() },
        LinkRef { project: "ABC".into(), key: "ABC-7".into() },
      ]
    );

    // unassigned issue still normalizes
    assert!(issues[1].assignee.is_none());
    assert!(issues[1].links.is_empty());

    std::env::remove_var("SDR_TEST_SEARCH_JSON");
  }
}
