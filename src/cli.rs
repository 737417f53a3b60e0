use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "standup-draft",
  version,
  about = "Draft daily standup notes from Jira activity, enriched with GitLab MR stats",
  long_about = None
)]
pub struct Cli {
  /// Path to the team configuration file (YAML)
  #[arg(required_unless_present = "gen_man")]
  pub config: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "today" instant for cutoff computation (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}
