use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::pipeline::hunter::HuntSummary;
use crate::review::{render, review_queue};
use crate::state::AppState;

const USAGE: &str = "Nothing to do. Run with --search to hunt for new listings, \
or --review to list recorded applications.";

#[derive(Parser, Debug)]
#[command(
    name = "hunter",
    about = "Search job listings, rank the matches and queue cover letters",
    version
)]
pub(crate) struct Cli {
    /// Run one hunt cycle: search, filter, rank and dispatch
    #[arg(long, conflicts_with = "review")]
    pub(crate) search: bool,
    /// List recorded applications, ones needing review first
    #[arg(long)]
    pub(crate) review: bool,
}

/// Runs the requested command. `load_config` runs only after a command flag
/// was given.
pub(crate) async fn run<F>(cli: Cli, load_config: F) -> Result<()>
where
    F: FnOnce() -> Result<Config>,
{
    if !cli.search && !cli.review {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config()?;
    let state = AppState::new(config).await?;

    if cli.review {
        let records = review_queue(state.ledger.as_ref()).await?;
        print!("{}", render(&records));
        return Ok(());
    }

    let hunter = state.job_hunter().await?;
    let summary = hunter.hunt().await?;
    info!("Run {} complete", summary.run_id);
    print!("{}", report(&summary));
    Ok(())
}

fn report(summary: &HuntSummary) -> String {
    let dispatch = &summary.dispatch;
    format!(
        "\nHunt summary\n\
         ------------\n\
         searches:        {} ({} failed)\n\
         listings found:  {}\n\
         discarded:       {}\n\
         duplicates:      {}\n\
         passed filter:   {}\n\
         ranked:          {}\n\
         ready to apply:  {}\n\
         to review:       {}\n\
         letter failures: {}\n\
         ledger failures: {}\n",
        summary.searches,
        summary.failed_searches,
        summary.found,
        summary.discarded,
        summary.duplicates,
        summary.filtered,
        summary.ranked,
        dispatch.ready_to_apply,
        dispatch.to_review,
        dispatch.letter_failures,
        dispatch.ledger_failures,
    )
}
