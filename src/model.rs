// === Module Header START ===
// purpose: Define the data model (issues, comments, dependency links, MR references) shared by the pipeline and rendering
// role: model/types
// outputs: Serializable structs with optional enrichment fields
// invariants: Enrichment fields are tagged presence (Option/Vec), never sentinel values; timestamps stay as the tracker's strings
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// The board's currently active sprint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sprint {
  pub id: i64,
  pub name: String,
}

/// A single issue comment. Timestamps keep the tracker's wire format;
/// parsing happens at comparison sites.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
  pub author: String,
  pub body: String,
  pub created: String,
}

/// Raw cross-issue link as it appears on the fetched issue, before the
/// activity filter runs. `project` is the key prefix of the target.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LinkRef {
  pub project: String,
  pub key: String,
}

/// New values for tracked attributes of a linked issue that changed at or
/// after the cutoff. Empty means the link carries no recent activity.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DependencyChanges {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

impl DependencyChanges {
  pub fn is_empty(&self) -> bool {
    self.status.is_none() && self.assignee.is_none() && self.comment.is_none()
  }
}

/// A cross-project dependency that survived the activity filter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DependencyLink {
  pub project: String,
  pub key: String,
  pub changes: DependencyChanges,
}

/// Live statistics for a merge request, present only when a code-host
/// credential is configured and the lookup succeeded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MergeRequestStats {
  pub state: String,
  pub files_changed: i64,
  pub additions: i64,
  pub deletions: i64,
}

/// A merge-request reference extracted from a comment body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MergeRequestRef {
  pub project: String,
  pub branch: String,
  pub url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stats: Option<MergeRequestStats>,
}

/// One issue flowing through the pipeline, enriched in place.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Issue {
  pub key: String,
  pub title: String,
  pub status: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  pub updated: String,
  pub links: Vec<LinkRef>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<Comment>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub dependencies: Vec<DependencyLink>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub merge_requests: Vec<MergeRequestRef>,
}
