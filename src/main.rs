use anyhow::Result;
use clap::Parser;

mod cli;
mod comments;
mod config;
mod cutoff;
mod enrichment;
mod ext;
mod issues;
mod jira;
mod links;
mod model;
mod pipeline;
mod report;
mod util;

use crate::cli::Cli;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: load the team definition (required positional; clap enforces it)
  let config_path = cli.config.expect("clap requires config unless --gen-man");
  let cfg = config::load(&config_path)?;

  // Phase 2: resolve the effective "today" for cutoff computation
  let now_opt = cutoff::parse_now_override(cli.now_override.as_deref());
  let today = util::effective_now(now_opt);

  // Phase 3: run the pipeline; print only after it fully succeeded
  let draft = pipeline::run(&cfg, today)?;
  print!("{}", draft);

  Ok(())
}
