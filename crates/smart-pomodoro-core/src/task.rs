//! Task registry.
//!
//! Tasks are immutable once created; the registry only ever adds or
//! removes them. New tasks go to the front of the list, which is also the
//! order used when a replacement active task has to be picked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub type TaskId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task with a fresh id. Blank categories are dropped.
    ///
    /// # Errors
    /// Returns an error if `name` is empty after trimming.
    pub fn new(
        name: &str,
        category: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "task name must not be empty".into(),
            });
        }
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRegistry {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    active: Option<TaskId>,
}

impl TaskRegistry {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The active task id, if it still refers to a registered task.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref().filter(|id| self.contains(id))
    }

    pub fn active(&self) -> Option<&Task> {
        self.active_id().and_then(|id| self.get(id))
    }

    pub(crate) fn insert(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Points the active task at `id`. Unknown ids are ignored.
    pub(crate) fn set_active(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.contains(id) => false,
            _ => {
                self.active = id.map(str::to_string);
                true
            }
        }
    }

    /// Removes a task. If it was active, the first remaining task becomes
    /// active (or none if the registry is now empty).
    pub(crate) fn remove(&mut self, id: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        if self.active.as_deref() == Some(id) {
            self.active = self.tasks.first().map(|t| t.id.clone());
        }
        Some(removed)
    }

    /// Forgets an active id that points at a missing task.
    pub(crate) fn revalidate(&mut self) {
        if self.active.as_deref().is_some_and(|id| !self.contains(id)) {
            self.active = self.tasks.first().map(|t| t.id.clone());
        }
    }
}
