use rusqlite::Connection;
use crate::models::Task;
use crate::repo::StorageRepo;
use anyhow::{Context, Result};

/// Storage key holding the serialized task list
pub const TASKS_KEY: &str = "tasks";

/// Task list repository
///
/// The whole list is a single JSON document under [`TASKS_KEY`].
pub struct TaskRepo;

impl TaskRepo {
    /// Load the task list; a missing document is an empty list
    pub fn load(conn: &Connection) -> Result<Vec<Task>> {
        match StorageRepo::get(conn, TASKS_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse stored task list (storage key '{}')", TASKS_KEY)),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the stored task list
    pub fn save(conn: &Connection, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)
            .context("Failed to serialize task list")?;
        StorageRepo::set(conn, TASKS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::parse_subtasks;

    #[test]
    fn test_load_empty() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(TaskRepo::load(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut task = Task::new(42, "Write report".to_string());
        task.subtasks = parse_subtasks("outline, draft");

        TaskRepo::save(&conn, &[task.clone()]).unwrap();
        assert_eq!(TaskRepo::load(&conn).unwrap(), vec![task]);
    }

    #[test]
    fn test_load_malformed_document() {
        let conn = DbConnection::connect_in_memory().unwrap();
        StorageRepo::set(&conn, TASKS_KEY, "{not json").unwrap();

        let err = TaskRepo::load(&conn).unwrap_err();
        assert!(err.to_string().contains("Failed to parse stored task list"));
    }
}
