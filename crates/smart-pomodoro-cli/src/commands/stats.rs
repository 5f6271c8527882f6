use chrono::Utc;
use clap::Subcommand;
use smart_pomodoro_core::{report, today_stats, Config};

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus summary with per-task breakdown
    Today,
    /// All-time totals and the last seven days
    Report,
}

pub fn run(action: StatsAction) -> CliResult {
    let config = Config::load_or_default();
    let store = open_store(&config)?;
    let now = Utc::now();

    match action {
        StatsAction::Today => print_json(&today_stats(store.state(), now))?,
        StatsAction::Report => print_json(&report(store.state(), now))?,
    }
    Ok(())
}
