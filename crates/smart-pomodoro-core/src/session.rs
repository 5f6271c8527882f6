//! Completed-interval history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;
use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Work,
    Break,
}

impl From<Mode> for SessionType {
    fn from(mode: Mode) -> Self {
        if mode.is_break() {
            SessionType::Break
        } else {
            SessionType::Work
        }
    }
}

/// One finished interval. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub task_id: Option<TaskId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Configured length of the interval in whole minutes.
    pub duration: u64,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

impl Session {
    pub fn is_work(&self) -> bool {
        self.session_type == SessionType::Work
    }
}

/// Append-only session log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHistory {
    sessions: Vec<Session>,
}

impl SessionHistory {
    pub fn all(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn last(&self) -> Option<&Session> {
        self.sessions.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub(crate) fn push(&mut self, session: Session) {
        self.sessions.push(session);
    }
}

impl<'a> IntoIterator for &'a SessionHistory {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
