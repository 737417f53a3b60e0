// === Module Header START ===
// purpose: Resolve cross-project issue links and keep only those with tracked changes at or after the cutoff
// role: pipeline/dependency-resolver
// inputs: JiraApi seam, one Issue with raw LinkRefs, the team's own project key, the shared cutoff
// outputs: Issue.dependencies populated with links that carry at least one changed field; idle links dropped
// errors: Linked-issue fetch failure is fatal for the run
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::comments;
use crate::ext::serde_json::JsonFetch;
use crate::jira::JiraApi;
use crate::model::{DependencyChanges, DependencyLink, Issue};
use crate::util;

/// Inspect the issue's links to other projects and compute a change delta
/// against `cutoff` for each target. Links whose tracked attributes are all
/// idle are dropped entirely, not shown empty.
pub fn resolve_dependencies(
  api: &dyn JiraApi,
  issue: &mut Issue,
  own_project: &str,
  cutoff: DateTime<Local>,
) -> Result<()> {
  let mut deps: Vec<DependencyLink> = Vec::new();

  for link in issue.links.iter().filter(|l| l.project != own_project) {
    let details = api.issue_details_json(&link.key)?;
    let changes = changes_since(&details, cutoff);

    if !changes.is_empty() {
      deps.push(DependencyLink {
        project: link.project.clone(),
        key: link.key.clone(),
        changes,
      });
    }
  }

  issue.dependencies = deps;

  Ok(())
}

/// Delta of tracked attributes since `cutoff`. Status and assignee count as
/// changed when the changelog records a matching item at or after the
/// cutoff; the reported value is the attribute's current state. Comment
/// counts as changed when the latest comment was created at or after the
/// cutoff.
pub fn changes_since(details: &serde_json::Value, cutoff: DateTime<Local>) -> DependencyChanges {
  let mut changes = DependencyChanges::default();

  for history in details.fetch("changelog.histories").items() {
    let created = history.fetch("created").to_or_default::<String>();
    if !util::at_or_after(&created, cutoff) {
      continue;
    }

    for item in history.fetch("items").items() {
      match item.fetch("field").to_or_default::<String>().as_str() {
        "status" if changes.status.is_none() => {
          changes.status = details
            .fetch("fields.status.name")
            .to::<String>()
            .or_else(|| item.fetch("toString").to::<String>());
        }
        "assignee" if changes.assignee.is_none() => {
          changes.assignee = details
            .fetch("fields.assignee.displayName")
            .to::<String>()
            .or_else(|| item.fetch("toString").to::<String>());
        }
        _ => {}
      }
    }
  }

  if let Some(comment) = comments::latest_comment(&details.fetch("fields.comment").to_or_default()) {
    if util::at_or_after(&comment.created, cutoff) {
      changes.comment = Some(comment.body);
    }
  }

  changes
}
