use chrono::{DateTime, Datelike, Duration, Local, Weekday};

// Both the comment filter and the dependency filter share this boundary so
// the two never drift apart.

/// Recency boundary for "worth mentioning at standup".
///
/// On a Monday the boundary is the preceding Friday at 00:00 local, so
/// weekend-adjacent activity still shows up after a two-day gap; on any
/// other day it is yesterday at 00:00 local.
pub fn cutoff_for(today: DateTime<Local>) -> DateTime<Local> {
  let days_back = if today.weekday() == Weekday::Mon { 3 } else { 1 };
  let day = (today - Duration::days(days_back)).date_naive();

  // Midnight can be skipped or doubled in zones whose DST shift lands at
  // 00:00 (Santiago, Havana). Take the earliest valid instant of the day,
  // walking forward past any skipped hour.
  for hour in 0..3 {
    let boundary = day
      .and_hms_opt(hour, 0, 0)
      .and_then(|naive| naive.and_local_timezone(Local).earliest());
    if let Some(dt) = boundary {
      return dt;
    }
  }

  today - Duration::days(days_back)
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2026-08-25T09:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
  }

  #[test]
  fn monday_reaches_back_to_friday() {
    // 2026-08-24 is a Monday
    let cutoff = cutoff_for(local(2026, 8, 24, 10));
    assert_eq!(cutoff, local(2026, 8, 21, 0));
    assert_eq!(cutoff.weekday(), Weekday::Fri);
  }

  #[test]
  fn tuesday_reaches_back_to_monday_midnight() {
    let cutoff = cutoff_for(local(2026, 8, 25, 10));
    assert_eq!(cutoff, local(2026, 8, 24, 0));
  }

  #[test]
  fn saturday_comment_survives_a_monday_run() {
    let cutoff = cutoff_for(local(2026, 8, 24, 9));
    let saturday = local(2026, 8, 22, 14);
    assert!(saturday >= cutoff);
  }

  #[test]
  fn two_day_old_comment_misses_a_tuesday_run() {
    let cutoff = cutoff_for(local(2026, 8, 25, 9));
    let sunday = local(2026, 8, 23, 18);
    assert!(sunday < cutoff);
  }

  #[test]
  fn cutoff_is_total_across_a_full_year() {
    // Sweep every day of the year, including DST transition dates; the
    // boundary must always resolve to an earlier instant on the right day.
    let mut day = local(2026, 1, 1, 12);
    for _ in 0..365 {
      let cutoff = cutoff_for(day);
      assert!(cutoff < day);
      let expected_back = if day.weekday() == Weekday::Mon { 3 } else { 1 };
      assert_eq!(cutoff.date_naive(), (day - Duration::days(expected_back)).date_naive());
      day = day + Duration::days(1);
    }
  }

  #[test]
  fn parse_now_override_accepts_both_forms() {
    assert!(parse_now_override(Some("2026-08-25T09:00:00Z")).is_some());
    assert!(parse_now_override(Some("2026-08-25T09:00:00")).is_some());
    assert!(parse_now_override(Some("nope")).is_none());
    assert!(parse_now_override(None).is_none());
  }
}
