// === Module Header START ===
// purpose: Small helpers for timestamp parsing, URL path encoding, text trimming, and man page rendering
// role: utilities/helpers
// outputs: Parsed DateTimes, percent-encoded project paths, man page text
// invariants: parse_tracker_ts accepts both RFC3339 and Jira's "+0000" offset form; helpers never panic on bad input
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local};
use clap::CommandFactory;

/// Parse a timestamp as emitted by the issue tracker.
///
/// Jira Cloud writes `2026-08-28T09:15:00.000+0000` (no colon in the
/// offset), which strict RFC3339 parsing rejects; try both forms.
pub fn parse_tracker_ts(raw: &str) -> Option<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(raw)
    .ok()
    .or_else(|| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z").ok())
}

/// True when `raw` parses and is at or after `cutoff`. Unparsable
/// timestamps count as stale rather than aborting the run.
pub fn at_or_after(raw: &str, cutoff: DateTime<Local>) -> bool {
  parse_tracker_ts(raw)
    .map(|ts| ts.with_timezone(&Local) >= cutoff)
    .unwrap_or(false)
}

/// Percent-encode a GitLab project path for use as a path segment
/// (`group/sub/proj` -> `group%2Fsub%2Fproj`).
pub fn encode_project_path(path: &str) -> String {
  path.replace('/', "%2F")
}

/// First line of a possibly multi-line body, trimmed.
pub fn first_line(text: &str) -> &str {
  text.lines().next().unwrap_or("").trim()
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise the
/// current local time is used. Centralizes test determinism without
/// sprinkling `Local::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
