// === Module Header START ===
// purpose: Detect GitLab merge-request references in comment text and enrich them with live statistics when possible
// role: enrichment/merge-requests
// inputs: Comment bodies (issue comment + dependency comment deltas); optional GitlabApi seam
// outputs: Issue.merge_requests populated; formatted reference lines for the report
// invariants:
// - Without a credential, or on any lookup failure, the basic reference survives untouched
// - Stats render in a fixed order: state, files, +additions/-deletions
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enrichment::gitlab_api::GitlabApi;
use crate::ext::serde_json::JsonFetch;
use crate::model::{Issue, MergeRequestRef, MergeRequestStats};

// GitLab's "create merge request" URL, as pasted from push output. Carries
// both the project path and the source branch; the bracket around
// source_branch may arrive percent-encoded or raw.
static RE_MR_URL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r#"https?://[^/\s]+/([A-Za-z0-9][\w.\-/]*?)/-/merge_requests/new\?[^\s<>)"']*source_branch(?:%5D|\])=([\w.\-/]+)"#,
  )
  .unwrap()
});

/// Extract merge-request references from a block of comment text.
pub fn scan_body(body: &str) -> Vec<MergeRequestRef> {
  let mut out: Vec<MergeRequestRef> = Vec::new();

  for caps in RE_MR_URL.captures_iter(body) {
    let reference = MergeRequestRef {
      project: caps[1].to_string(),
      branch: caps[2].to_string(),
      url: caps[0].to_string(),
      stats: None,
    };
    out.push(reference);
  }

  out
}

/// Scan the issue's comment text for MR references and, when a code-host
/// API is available, attach live statistics. Lookup failures leave the
/// basic reference in place.
pub fn annotate_issue(api: Option<&dyn GitlabApi>, issue: &mut Issue) {
  let mut refs: Vec<MergeRequestRef> = Vec::new();

  if let Some(comment) = &issue.comment {
    refs.extend(scan_body(&comment.body));
  }
  for dep in &issue.dependencies {
    if let Some(comment) = &dep.changes.comment {
      refs.extend(scan_body(comment));
    }
  }

  let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
  refs.retain(|r| seen.insert(r.url.clone()));

  if let Some(api) = api {
    for reference in refs.iter_mut() {
      reference.stats = lookup_stats(api, &reference.project, &reference.branch);
    }
  }

  issue.merge_requests = refs;
}

/// Best-effort statistics for the newest MR on the given source branch.
fn lookup_stats(api: &dyn GitlabApi, project: &str, branch: &str) -> Option<MergeRequestStats> {
  let listing = api.merge_requests_by_branch_json(project, branch)?;
  let mr = listing.fetch("").items().first()?;

  let state = mr.fetch("state").to::<String>()?;
  let iid = mr.fetch("iid").to::<i64>()?;

  let changes = api.merge_request_changes_json(project, iid)?;
  let (files_changed, additions, deletions) = diffstat(&changes);

  Some(MergeRequestStats {
    state,
    files_changed,
    additions,
    deletions,
  })
}

/// Count touched files and added/removed lines from the `/changes` payload's
/// unified diffs. File header lines (`+++`/`---`) do not count.
fn diffstat(changes: &serde_json::Value) -> (i64, i64, i64) {
  let files = changes.fetch("changes").items();
  let mut additions = 0i64;
  let mut deletions = 0i64;

  for file in files {
    let diff = file.fetch("diff").to_or_default::<String>();
    for line in diff.lines() {
      if line.starts_with('+') && !line.starts_with("+++") {
        additions += 1;
      } else if line.starts_with('-') && !line.starts_with("---") {
        deletions += 1;
      }
    }
  }

  (files.len() as i64, additions, deletions)
}

/// Render one reference for the report. Credential-sensitive: the stats
/// parenthetical appears only after a successful lookup.
pub fn format_reference(mr: &MergeRequestRef) -> String {
  match &mr.stats {
    Some(s) => format!(
      "MR: {} (branch: {}) ({}, {} files, +{}/-{}) - {}",
      mr.project, mr.branch, s.state, s.files_changed, s.additions, s.deletions, mr.url
    ),
    None => format!("MR: {} (branch: {}) - {}", mr.project, mr.branch, mr.url),
  }
}
