// === Module Header START ===
// purpose: Run the whole draft pipeline in dependency order: sprint, issues, comments, dependencies, MR annotations, render
// role: pipeline/orchestrator
// inputs: TeamConfig, effective "today"
// outputs: The rendered draft text; nothing is printed until every fatal stage succeeded
// invariants:
// - Sequential, one blocking call at a time; no fan-out, no retries
// - Jira failures abort; GitLab failures only degrade MR annotations
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::comments;
use crate::config::TeamConfig;
use crate::cutoff;
use crate::enrichment::{gitlab_api, merge_requests};
use crate::issues;
use crate::jira;
use crate::links;
use crate::report;

pub fn run(cfg: &TeamConfig, today: DateTime<Local>) -> Result<String> {
  let api = jira::build_api(cfg);

  let sprint = issues::active_sprint(api.as_ref(), cfg.board_id)?;
  let mut list = issues::fetch_issues(api.as_ref(), cfg, sprint.id)?;

  let cutoff = cutoff::cutoff_for(today);

  for issue in list.iter_mut() {
    comments::attach_recent_comment(api.as_ref(), issue, cutoff)?;
    links::resolve_dependencies(api.as_ref(), issue, &cfg.project_key, cutoff)?;
  }

  let code_host = gitlab_api::build_api(cfg);
  for issue in list.iter_mut() {
    merge_requests::annotate_issue(code_host.as_deref(), issue);
  }

  Ok(report::render(cfg, &sprint, &list, today))
}
