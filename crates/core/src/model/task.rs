use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TaskId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task name cannot be empty")]
    EmptyName,

    #[error("task {0} is already in the list")]
    Duplicate(TaskId),

    #[error("task {0} not found")]
    NotFound(TaskId),
}

/// A single checkable exercise picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    name: String,
    duration_label: String,
    image_ref: String,
    #[serde(default)]
    completed: bool,
}

impl Task {
    /// Creates a not-yet-completed task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyName` if `name` is blank.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        duration_label: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Result<Self, TaskError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            duration_label: duration_label.into(),
            image_ref: image_ref.into(),
            completed: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    /// Image reference, or the placeholder asset when none was given.
    #[must_use]
    pub fn image_ref(&self) -> &str {
        if self.image_ref.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.image_ref
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// The session's in-memory list of selected tasks. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Duplicate` if a task with the same id is present.
    pub fn add(&mut self, task: Task) -> Result<(), TaskError> {
        if self.get(task.id()).is_some() {
            return Err(TaskError::Duplicate(task.id().clone()));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Flip the completed flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` if no task has this id.
    pub fn toggle(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        task.toggle();
        Ok(task.is_completed())
    }

    /// # Errors
    ///
    /// Returns `TaskError::NotFound` if no task has this id.
    pub fn remove(&mut self, id: &TaskId) -> Result<Task, TaskError> {
        let idx = self
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        Ok(self.tasks.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed()).count()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task::new(TaskId::new(id), "Butterfly stretch", "10 min", "").unwrap()
    }

    #[test]
    fn rejects_blank_name() {
        let err = Task::new(TaskId::new("1"), "  ", "5 min", "").unwrap_err();
        assert_eq!(err, TaskError::EmptyName);
    }

    #[test]
    fn empty_image_falls_back_to_placeholder() {
        assert_eq!(task("1").image_ref(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut list = TaskList::new();
        list.add(task("1")).unwrap();
        let err = list.add(task("1")).unwrap_err();
        assert_eq!(err, TaskError::Duplicate(TaskId::new("1")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn toggle_flips_and_reports_state() {
        let mut list = TaskList::new();
        list.add(task("1")).unwrap();
        assert!(list.toggle(&TaskId::new("1")).unwrap());
        assert_eq!(list.completed_count(), 1);
        assert!(!list.toggle(&TaskId::new("1")).unwrap());
        assert_eq!(list.completed_count(), 0);
    }

    #[test]
    fn toggle_unknown_task_fails() {
        let mut list = TaskList::new();
        assert!(matches!(
            list.toggle(&TaskId::new("missing")),
            Err(TaskError::NotFound(_))
        ));
    }
}
