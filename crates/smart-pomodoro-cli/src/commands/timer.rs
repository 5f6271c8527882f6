use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use smart_pomodoro_core::{Command, Config, Mode, TimerDriver, TimerHandle};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{open_store, print_json, CliResult, Store};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Switch to work, short-break or long-break
    Mode { mode: Mode },
    /// Refill the current countdown and stop
    Reset,
    /// Run the timer in the foreground, reading commands from stdin
    ///
    /// Accepted lines: start, pause, reset, mode <m>, task <id>, status, quit.
    Run {
        /// Stop after this many tick intervals
        #[arg(long)]
        ticks: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load_or_default();
    let mut store = open_store(&config)?;

    match action {
        TimerAction::Status => {
            let engine = store.state();
            let status = serde_json::json!({
                "timer": store.snapshot(),
                "active_task": engine.tasks().active().map(|t| t.name.as_str()),
                "saved_at": store.backend().kv_updated_at(store.key())?,
            });
            print_json(&status)?;
        }
        TimerAction::Mode { mode } => {
            let events = store.dispatch(Command::SetMode { mode })?;
            print_json(&events)?;
        }
        TimerAction::Reset => {
            let events = store.dispatch(Command::Reset)?;
            print_json(&events)?;
        }
        TimerAction::Run { ticks } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_session(store, config.tick_interval(), ticks))?;
        }
    }
    Ok(())
}

pub fn set_durations(work: u64, short_break: u64, long_break: u64) -> CliResult {
    let config = Config::load_or_default();
    let mut store = open_store(&config)?;
    let events = store.dispatch(Command::SetDurations {
        work,
        short_break,
        long_break,
    })?;
    print_json(&events)
}

/// One line of foreground input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Status,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let input = match (word, arg) {
        ("start", None) => Input::Command(Command::Start),
        ("pause", None) => Input::Command(Command::Pause),
        ("reset", None) => Input::Command(Command::Reset),
        ("status", None) => Input::Status,
        ("quit" | "exit", None) => Input::Quit,
        ("mode", Some(m)) => Input::Command(Command::SetMode {
            mode: m.parse().map_err(|e| format!("{e}"))?,
        }),
        ("task", Some(id)) => Input::Command(Command::SetActiveTask { id: id.to_string() }),
        _ => return Err(format!("unrecognised input: {line}")),
    };
    Ok(Some(input))
}

async fn handle_input(handle: &TimerHandle, input: Input) -> CliResult<bool> {
    match input {
        Input::Command(command) => {
            if let Err(e) = handle.send(command).await {
                eprintln!("error: {e}");
            }
        }
        Input::Status => {
            let engine = handle.snapshot().await?;
            println!("{}", serde_json::to_string(&engine.snapshot(Utc::now()))?);
        }
        Input::Quit => return Ok(false),
    }
    Ok(true)
}

async fn run_session(mut store: Store, tick_interval: Duration, ticks: Option<u64>) -> CliResult {
    store.subscribe(|_, events| {
        for event in events {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
        }
    });

    let (handle, join) = TimerDriver::spawn(store, tick_interval);
    let deadline = ticks.map(|n| tick_interval.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX)));
    let stop = async move {
        match deadline {
            Some(after) => tokio::time::sleep(after).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(stop);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = &mut stop => break,
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match parse_line(&line) {
                    Ok(Some(input)) => {
                        if !handle_input(&handle, input).await? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => eprintln!("error: {msg}"),
                },
                None if ticks.is_some() => stdin_open = false,
                None => break,
            },
        }
    }

    handle.shutdown().await?;
    join.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_foreground_commands() {
        assert_eq!(
            parse_line("start").unwrap(),
            Some(Input::Command(Command::Start))
        );
        assert_eq!(
            parse_line("  mode long-break ").unwrap(),
            Some(Input::Command(Command::SetMode {
                mode: Mode::LongBreak
            }))
        );
        assert_eq!(
            parse_line("task abc").unwrap(),
            Some(Input::Command(Command::SetActiveTask { id: "abc".into() }))
        );
        assert_eq!(parse_line("quit").unwrap(), Some(Input::Quit));
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn rejects_unknown_or_malformed_lines() {
        assert!(parse_line("launch").is_err());
        assert!(parse_line("mode").is_err());
        assert!(parse_line("mode nap").is_err());
        assert!(parse_line("start now").is_err());
    }
}
