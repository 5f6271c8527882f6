use clap::{Parser, Subcommand};
use smart_pomodoro_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SMART_POMODORO_LOG";

#[derive(Parser)]
#[command(name = "smart-pomodoro", version, about = "Smart Pomodoro CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Set work, short break and long break lengths in minutes
    Durations {
        #[arg(value_parser = clap::value_parser!(u64).range(1..=60))]
        work: u64,
        #[arg(value_parser = clap::value_parser!(u64).range(1..=60))]
        short_break: u64,
        #[arg(value_parser = clap::value_parser!(u64).range(1..=60))]
        long_break: u64,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let configured = Config::load_or_default().log.filter;
        EnvFilter::try_new(&configured).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Durations {
            work,
            short_break,
            long_break,
        } => commands::timer::set_durations(work, short_break, long_break),
        Commands::Task { action } => commands::task::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
