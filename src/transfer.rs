//! JSON export and import
//!
//! Exports always contain the full list, independent of any search or
//! filter. Imports are validated before they are allowed to replace the
//! current list.

use crate::models::{Task, MAX_TASK_ID};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default export file name
pub const EXPORT_FILE_NAME: &str = "tasks.json";

/// Reasons an import file is rejected
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read import file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Import file is not a valid task list: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("Imported task {id} has empty text")]
    EmptyText { id: i64 },
    #[error("Imported task {id} has an empty subtask at position {position}")]
    EmptySubtask { id: i64, position: usize },
    #[error("Imported task id {0} appears more than once")]
    DuplicateId(i64),
    #[error("Imported task id {0} is out of range (expected 1 to {max})", max = MAX_TASK_ID)]
    InvalidId(i64),
}

/// Serialize the task list as pretty-printed JSON (2-space indent)
pub fn export_json(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).context("Failed to serialize task list")
}

/// Write an export file
pub fn write_export(tasks: &[Task], path: &Path) -> Result<()> {
    let json = export_json(tasks)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    log::info!("Exported {} tasks to {}", tasks.len(), path.display());
    Ok(())
}

/// Parse and validate an exported task list
pub fn parse_import(content: &str) -> Result<Vec<Task>, ImportError> {
    let tasks: Vec<Task> = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for task in &tasks {
        if !(1..=MAX_TASK_ID).contains(&task.id) {
            return Err(ImportError::InvalidId(task.id));
        }
        if !seen.insert(task.id) {
            return Err(ImportError::DuplicateId(task.id));
        }
        if task.text.trim().is_empty() {
            return Err(ImportError::EmptyText { id: task.id });
        }
        if let Some(pos) = task.subtasks.iter().position(|s| s.text.trim().is_empty()) {
            return Err(ImportError::EmptySubtask {
                id: task.id,
                position: pos + 1,
            });
        }
    }

    Ok(tasks)
}

/// Read and validate an import file
pub fn read_import(path: &Path) -> Result<Vec<Task>, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_import(&content)
}
