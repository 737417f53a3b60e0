// === Module Header START ===
// purpose: Group enriched issues into engineer buckets and render the standup draft text
// role: report/assembler
// inputs: TeamConfig (mapping + declared order), active Sprint, enriched issues, effective "today"
// outputs: The full draft as one String, printed by main only after the whole pipeline succeeded
// invariants:
// - Every issue lands in exactly one bucket; unknown assignees go to the fallback bucket, never dropped
// - Engineers render in declared order; issues render in fetch order
// === Module Header END ===

use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::config::TeamConfig;
use crate::enrichment::merge_requests;
use crate::model::{Issue, Sprint};
use crate::util;

const FALLBACK_BUCKET: &str = "Unassigned / unmapped";

/// Assemble the final draft. Buckets follow the mapping's declared order;
/// the fallback bucket renders last and only when non-empty.
pub fn render(cfg: &TeamConfig, sprint: &Sprint, issues: &[Issue], today: DateTime<Local>) -> String {
  let mut by_engineer: Vec<Vec<&Issue>> = vec![Vec::new(); cfg.engineers.len()];
  let mut unmapped: Vec<&Issue> = Vec::new();

  let index: HashMap<&str, usize> = cfg
    .engineers
    .iter()
    .enumerate()
    .map(|(i, e)| (e.assignee.as_str(), i))
    .collect();

  for issue in issues {
    match issue.assignee.as_deref().and_then(|a| index.get(a)) {
      Some(&i) => by_engineer[i].push(issue),
      None => unmapped.push(issue),
    }
  }

  let mut out = String::new();
  out.push_str(&format!("Standup draft for {}\n", today.format("%Y-%m-%d")));
  out.push_str(&format!("Sprint: {}\n", sprint.name));

  for (engineer, bucket) in cfg.engineers.iter().zip(&by_engineer) {
    out.push('\n');
    out.push_str(&engineer.display_name);
    out.push('\n');
    for issue in bucket {
      push_issue(&mut out, cfg, issue);
    }
  }

  if !unmapped.is_empty() {
    out.push('\n');
    out.push_str(FALLBACK_BUCKET);
    out.push('\n');
    for issue in &unmapped {
      push_issue(&mut out, cfg, issue);
    }
  }

  out
}

fn push_issue(out: &mut String, cfg: &TeamConfig, issue: &Issue) {
  out.push_str(&format!("- {} {} [{}]\n", issue.key, issue.title, issue.status));
  out.push_str(&format!("  {}/browse/{}\n", cfg.jira_base_url, issue.key));

  if let Some(comment) = &issue.comment {
    let date = comment.created.get(..10).unwrap_or(&comment.created);
    out.push_str(&format!(
      "  comment ({}, {}): {}\n",
      comment.author,
      date,
      util::first_line(&comment.body)
    ));
  }

  for dep in &issue.dependencies {
    let mut parts: Vec<String> = Vec::new();
    if let Some(status) = &dep.changes.status {
      parts.push(format!("status -> {}", status));
    }
    if let Some(assignee) = &dep.changes.assignee {
      parts.push(format!("assignee -> {}", assignee));
    }
    if let Some(comment) = &dep.changes.comment {
      parts.push(format!("comment: {}", util::first_line(comment)));
    }
    out.push_str(&format!("  dep {}: {}\n", dep.key, parts.join("; ")));
  }

  for mr in &issue.merge_requests {
    out.push_str(&format!("  {}\n", merge_requests::format_reference(mr)));
  }
}
