mod command;
mod engine;
mod ledger;
mod mode;

pub use command::{reduce, Command};
pub use engine::TimerEngine;
pub use ledger::{BreakSlot, Slot, TaskLedger, TaskTimers};
pub use mode::{Durations, Mode, LONG_BREAK_EVERY, MIN_DURATION_SECS};
