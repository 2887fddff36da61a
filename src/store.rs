//! Task store
//!
//! [`TaskStore`] owns the in-memory task list and mirrors it to storage after
//! every mutation. There is no batching: each mutating call performs exactly
//! one full-list write before returning.

use crate::models::{parse_subtasks, Priority, Task, MAX_TASK_ID};
use crate::repo::TaskRepo;
use chrono::NaiveDate;
use rusqlite::Connection;
use anyhow::Result;

/// Domain errors raised by store operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task {0} not found")]
    TaskNotFound(i64),
    #[error("Task {id} has no subtask {}", .index + 1)]
    SubtaskNotFound { id: i64, index: usize },
    #[error("No task ids left; the largest allowed id ({}) is already in use", MAX_TASK_ID)]
    IdsExhausted,
}

/// Input values for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    /// Comma-separated subtask list
    pub subtasks: String,
    pub date: Option<NaiveDate>,
    pub priority: Priority,
    pub category: String,
}

/// Completion progress over the whole list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            completed: tasks.iter().filter(|t| t.completed).count(),
            total: tasks.len(),
        }
    }

    /// Rounded percentage, 0 for an empty list
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.completed as f64 / self.total as f64 * 100.0).round() as u32
    }
}

pub struct TaskStore {
    conn: Connection,
    tasks: Vec<Task>,
    last_id: i64,
}

impl TaskStore {
    /// Load the persisted list from `conn`
    pub fn open(conn: Connection) -> Result<Self> {
        let tasks = TaskRepo::load(&conn)?;
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        log::debug!("Loaded {} tasks", tasks.len());
        Ok(Self { conn, tasks, last_id })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.tasks)
    }

    /// Allocate a task id from the millisecond clock.
    ///
    /// Ids are strictly increasing for the lifetime of the store, so two tasks
    /// created within the same millisecond still get distinct ids.
    fn next_id(&self, now_ms: i64) -> Result<i64, StoreError> {
        self.last_id
            .checked_add(1)
            .map(|next| next.max(now_ms))
            .filter(|id| *id <= MAX_TASK_ID)
            .ok_or(StoreError::IdsExhausted)
    }

    /// Add a task. Returns `None` without touching storage when the text is blank.
    pub fn add(&mut self, input: NewTask) -> Result<Option<&Task>> {
        self.add_at(input, chrono::Utc::now().timestamp_millis())
    }

    fn add_at(&mut self, input: NewTask, now_ms: i64) -> Result<Option<&Task>> {
        let text = input.text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let id = self.next_id(now_ms)?;
        let mut task = Task::new(id, text.to_string());
        task.date = input.date;
        task.priority = input.priority;
        task.category = input.category;
        task.subtasks = parse_subtasks(&input.subtasks);

        log::info!("Adding task {}: {}", task.id, task.text);
        self.commit(|tasks| {
            tasks.push(task);
            Ok(())
        })?;
        self.last_id = id;
        Ok(self.tasks.last())
    }

    /// Remove every task
    pub fn clear(&mut self) -> Result<()> {
        log::info!("Clearing {} tasks", self.tasks.len());
        self.commit(|tasks| {
            tasks.clear();
            Ok(())
        })
    }

    /// Flip a task's completion flag, returning the new value
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let completed = self.commit(|tasks| {
            let task = find_mut(tasks, id)?;
            task.completed = !task.completed;
            Ok(task.completed)
        })?;
        log::info!("Task {} completed={}", id, completed);
        Ok(completed)
    }

    /// Replace a task's text.
    ///
    /// `None` means the edit was cancelled. Replacement text that trims to
    /// nothing is rejected the same way. Returns whether the task changed.
    pub fn edit(&mut self, id: i64, replacement: Option<&str>) -> Result<bool> {
        if self.get(id).is_none() {
            return Err(StoreError::TaskNotFound(id).into());
        }
        let Some(text) = replacement.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        self.commit(|tasks| {
            find_mut(tasks, id)?.text = text.to_string();
            Ok(())
        })?;
        log::info!("Edited task {}", id);
        Ok(true)
    }

    /// Delete the task with `id`
    pub fn delete(&mut self, id: i64) -> Result<Task> {
        let removed = self.commit(|tasks| {
            let pos = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or(StoreError::TaskNotFound(id))?;
            Ok(tasks.remove(pos))
        })?;
        log::info!("Deleted task {}", id);
        Ok(removed)
    }

    /// Flip the subtask at zero-based `index`, returning the new value
    pub fn toggle_subtask(&mut self, id: i64, index: usize) -> Result<bool> {
        let completed = self.commit(|tasks| {
            let subtask = find_mut(tasks, id)?
                .subtasks
                .get_mut(index)
                .ok_or(StoreError::SubtaskNotFound { id, index })?;
            subtask.completed = !subtask.completed;
            Ok(subtask.completed)
        })?;
        log::info!("Task {} subtask {} completed={}", id, index, completed);
        Ok(completed)
    }

    /// Swap in a whole new list (import)
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        log::info!("Replacing task list with {} imported tasks", tasks.len());
        let imported_max = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.commit(|current| {
            *current = tasks;
            Ok(())
        })?;
        self.last_id = self.last_id.max(imported_max);
        Ok(())
    }

    /// Apply `change` to a copy of the list, write the copy, and only then
    /// make it the current list. A failed change or write leaves both the
    /// in-memory list and storage as they were.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Vec<Task>) -> Result<T, StoreError>) -> Result<T> {
        let mut next = self.tasks.clone();
        let out = change(&mut next)?;
        TaskRepo::save(&self.conn, &next)?;
        self.tasks = next;
        Ok(out)
    }
}

fn find_mut(tasks: &mut [Task], id: i64) -> Result<&mut Task, StoreError> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(StoreError::TaskNotFound(id))
}
