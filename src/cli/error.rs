// Error classification and argument validation for the command line

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::transfer::ImportError;

/// Invalid input from the user (exit code 1)
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// User errors are for invalid input, missing tasks, rejected imports, etc.
/// Everything else (storage failures, corrupt data) is internal.
pub fn is_user_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<UserError>().is_some()
        || err.downcast_ref::<StoreError>().is_some()
        || err.downcast_ref::<ImportError>().is_some()
        || err.downcast_ref::<ConfigError>().is_some()
}

/// Validate that a task ID is valid (positive integer)
pub fn validate_task_id(id_str: &str) -> Result<i64, UserError> {
    id_str.trim().parse::<i64>()
        .map_err(|_| UserError(format!("Invalid task ID: '{}'. Task ID must be a number.", id_str)))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(UserError(format!("Invalid task ID: {}. Task ID must be positive.", id)))
            }
        })
}

/// Validate a 1-based subtask number, returning the zero-based index
pub fn validate_subtask_number(num_str: &str) -> Result<usize, UserError> {
    num_str.trim().parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .map(|n| n - 1)
        .ok_or_else(|| UserError(format!("Invalid subtask number: '{}'. Subtasks are numbered from 1.", num_str)))
}
