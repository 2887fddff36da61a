//! View filtering
//!
//! Derives the visible task list from the full list plus the session's
//! status filter and search term. Both are combined with logical AND and the
//! original list order is kept.

use crate::models::Task;

/// Completion-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "completed" | "done" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Status filter plus search term
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: StatusFilter,
    pub search: String,
}

impl TaskQuery {
    pub fn new(filter: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            filter,
            search: search.into(),
        }
    }

    /// Case-insensitive substring match on the task text only
    pub fn matches_search(&self, task: &Task) -> bool {
        task.text.to_lowercase().contains(&self.search.to_lowercase())
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.filter.matches(task) && self.matches_search(task)
    }
}

/// Tasks passing `query`, in list order
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &TaskQuery) -> Vec<&'a Task> {
    tasks.iter().filter(|task| query.matches(task)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_subtasks;

    fn task(id: i64, text: &str, completed: bool) -> Task {
        let mut task = Task::new(id, text.to_string());
        task.completed = completed;
        task
    }

    fn ids(tasks: Vec<&Task>) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "Buy Milk", false),
            task(2, "Pay rent", true),
            task(3, "Buy stamps", true),
            task(4, "Call mom", false),
        ]
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(StatusFilter::from_str("Active"), Some(StatusFilter::Active));
        assert_eq!(StatusFilter::from_str("completed"), Some(StatusFilter::Completed));
        assert_eq!(StatusFilter::from_str("all"), Some(StatusFilter::All));
        assert_eq!(StatusFilter::from_str("open"), None);
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }

    #[test]
    fn test_filter_by_status() {
        let tasks = sample();
        assert_eq!(ids(filter_tasks(&tasks, &TaskQuery::new(StatusFilter::Active, ""))), vec![1, 4]);
        assert_eq!(ids(filter_tasks(&tasks, &TaskQuery::new(StatusFilter::Completed, ""))), vec![2, 3]);
        assert_eq!(ids(filter_tasks(&tasks, &TaskQuery::new(StatusFilter::All, ""))), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_case_insensitive() {
        let tasks = sample();
        for term in ["milk", "MILK", "buy m"] {
            assert_eq!(ids(filter_tasks(&tasks, &TaskQuery::new(StatusFilter::All, term))), vec![1]);
        }
        assert_eq!(ids(filter_tasks(&tasks, &TaskQuery::new(StatusFilter::All, "buy"))), vec![1, 3]);
    }

    #[test]
    fn test_search_and_filter_combined() {
        let tasks = sample();
        let query = TaskQuery::new(StatusFilter::Completed, "buy");
        assert_eq!(ids(filter_tasks(&tasks, &query)), vec![3]);
    }

    #[test]
    fn test_search_ignores_subtasks_and_category() {
        let mut tasks = sample();
        tasks[3].subtasks = parse_subtasks("milk");
        tasks[3].category = "Milk".to_string();
        let query = TaskQuery::new(StatusFilter::All, "milk");
        assert_eq!(ids(filter_tasks(&tasks, &query)), vec![1]);
    }
}
