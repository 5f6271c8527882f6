use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest interval the engine accepts, in seconds.
pub const MIN_DURATION_SECS: u64 = 60;

/// Every n-th completed work interval is followed by a long break.
pub const LONG_BREAK_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }

    /// Mode that follows the `completed`-th finished work interval.
    pub fn break_after(completed: u32) -> Mode {
        if completed > 0 && completed % LONG_BREAK_EVERY == 0 {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short_break" | "short" => Ok(Mode::ShortBreak),
            "long_break" | "long" => Ok(Mode::LongBreak),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

/// Configured interval lengths, stored in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15)
    }
}

impl Durations {
    /// Converts minutes to seconds, raising anything below one minute to
    /// [`MIN_DURATION_SECS`].
    pub fn from_minutes(work: u64, short_break: u64, long_break: u64) -> Self {
        let secs = |min: u64| min.saturating_mul(60).max(MIN_DURATION_SECS);
        Self {
            work_secs: secs(work),
            short_break_secs: secs(short_break),
            long_break_secs: secs(long_break),
        }
    }

    pub fn for_mode(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => self.work_secs,
            Mode::ShortBreak => self.short_break_secs,
            Mode::LongBreak => self.long_break_secs,
        }
    }

    /// Configured length of `mode` in whole minutes, rounded half up.
    pub fn minutes_for(&self, mode: Mode) -> u64 {
        self.for_mode(mode).saturating_add(30) / 60
    }

    /// Floors every value at [`MIN_DURATION_SECS`]. Used on data coming
    /// back from storage.
    pub fn sanitized(self) -> Self {
        Self {
            work_secs: self.work_secs.max(MIN_DURATION_SECS),
            short_break_secs: self.short_break_secs.max(MIN_DURATION_SECS),
            long_break_secs: self.long_break_secs.max(MIN_DURATION_SECS),
        }
    }
}
