// === Module Header START ===
// purpose: Attach each issue's most recent comment when it lands at or after the standup cutoff
// role: pipeline/comment-enricher
// inputs: JiraApi seam, one Issue, the shared cutoff instant
// outputs: Issue.comment populated in place, or left None when nothing recent exists
// errors: Comment fetch failure is fatal for the run
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::ext::serde_json::JsonFetch;
use crate::jira::JiraApi;
use crate::model::{Comment, Issue};
use crate::util;

/// Fetch the issue's comments, keep the single most recent one, and attach
/// it only when its creation time is at or after `cutoff`.
pub fn attach_recent_comment(api: &dyn JiraApi, issue: &mut Issue, cutoff: DateTime<Local>) -> Result<()> {
  let payload = api.issue_comments_json(&issue.key)?;

  issue.comment = latest_comment(&payload).filter(|c| util::at_or_after(&c.created, cutoff));

  Ok(())
}

/// Most recent comment by creation timestamp. Order in the payload is not
/// trusted; Jira's default is oldest-first but fixtures vary.
pub fn latest_comment(payload: &serde_json::Value) -> Option<Comment> {
  let mut latest: Option<(DateTime<chrono::FixedOffset>, Comment)> = None;

  for item in payload.fetch("comments").items() {
    let created = item.fetch("created").to_or_default::<String>();
    let Some(ts) = util::parse_tracker_ts(&created) else { continue };

    if latest.as_ref().map(|(cur, _)| ts > *cur).unwrap_or(true) {
      let comment = Comment {
        author: item.fetch("author.displayName").to_or_default::<String>(),
        body: body_text(item.fetch("body").to::<serde_json::Value>().as_ref()),
        created,
      };
      latest = Some((ts, comment));
    }
  }

  latest.map(|(_, c)| c)
}

/// Flatten a comment body to plain text. Jira Cloud v3 bodies are Atlassian
/// Document Format trees; Server payloads (and our fixtures) may be plain
/// strings. Paragraph-level nodes become separate lines.
pub fn body_text(body: Option<&serde_json::Value>) -> String {
  let Some(body) = body else { return String::new() };

  if let Some(s) = body.as_str() {
    return s.to_string();
  }

  let mut lines: Vec<String> = Vec::new();
  for node in body.fetch("content").items() {
    let mut line = String::new();
    collect_text(node, &mut line);
    if !line.is_empty() {
      lines.push(line);
    }
  }

  lines.join("\n")
}

fn collect_text(node: &serde_json::Value, out: &mut String) {
  if let Some(text) = node.fetch("text").to::<String>() {
    out.push_str(&text);
  }
  for child in node.fetch("content").items() {
    collect_text(child, out);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn payload(comments: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "comments": comments })
  }

  #[test]
  fn picks_most_recent_regardless_of_order() {
    let p = payload(serde_json::json!([
      {"author": {"displayName": "Bob"}, "body": "newer", "created": "2026-08-28T10:00:00.000+0000"},
      {"author": {"displayName": "Alice"}, "body": "older", "created": "2026-08-27T10:00:00.000+0000"}
    ]));
    let c = latest_comment(&p).unwrap();
    assert_eq!(c.author, "Bob");
    assert_eq!(c.body, "newer");
  }

  #[test]
  fn unparsable_created_is_skipped() {
    let p = payload(serde_json::json!([
      {"author": {"displayName": "A"}, "body": "bad", "created": "???"},
      {"author": {"displayName": "B"}, "body": "good", "created": "2026-08-28T10:00:00.000+0000"}
    ]));
    assert_eq!(latest_comment(&p).unwrap().body, "good");
  }

  #[test]
  fn adf_body_flattens_text_nodes() {
    let body = serde_json::json!({
      "type": "doc",
      "content": [
        {"type": "paragraph", "content": [
          {"type": "text", "text": "Deployed the "},
          {"type": "text", "text": "fix", "marks": [{"type": "strong"}]}
        ]},
        {"type": "paragraph", "content": [{"type": "text", "text": "Waiting on review"}]}
      ]
    });
    assert_eq!(body_text(Some(&body)), "Deployed the fix\nWaiting on review");
  }

  #[test]
  fn string_body_passes_through() {
    let body = serde_json::json!("plain text");
    assert_eq!(body_text(Some(&body)), "plain text");
    assert_eq!(body_text(None), "");
  }

  #[test]
  fn cutoff_filters_stale_comment() {
    // Tuesday run: cutoff is Monday 2026-08-24 00:00 local
    let cutoff = Local.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).single().unwrap();

    let stale = Comment {
      author: "A".into(),
      body: "old".into(),
      created: Local
        .with_ymd_and_hms(2026, 8, 23, 18, 0, 0)
        .single()
        .unwrap()
        .to_rfc3339(),
    };
    let fresh = Comment {
      author: "B".into(),
      body: "new".into(),
      created: Local
        .with_ymd_and_hms(2026, 8, 24, 8, 0, 0)
        .single()
        .unwrap()
        .to_rfc3339(),
    };

    assert!(!util::at_or_after(&stale.created, cutoff));
    assert!(util::at_or_after(&fresh.created, cutoff));
  }
}
