//! Application state
//!
//! [`App`] owns everything a session needs: the task store, the session-only
//! view state (search, filter, dark mode) and the reminder log. Front ends
//! mutate through it and call [`App::render`] afterwards.

use crate::config::{Config, ReminderPolicy};
use crate::db::DbConnection;
use crate::filter::{filter_tasks, StatusFilter, TaskQuery};
use crate::models::Task;
use crate::reminder::{check_reminders, Notifier, Permission, ReminderLog};
use crate::store::{Progress, TaskStore};
use crate::transfer;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

/// Session-only presentation state; reset on every start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub query: TaskQuery,
    pub dark: bool,
}

/// Everything needed to draw one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tasks: Vec<Task>,
    pub progress: Progress,
    pub query: TaskQuery,
    pub dark: bool,
}

pub struct App {
    config: Config,
    store: TaskStore,
    view: ViewState,
    reminders: ReminderLog,
}

impl App {
    /// Open the configured database and load the persisted list
    pub fn open(config: Config) -> Result<Self> {
        let conn = DbConnection::connect(&config)?;
        Self::with_connection(config, conn)
    }

    pub fn with_connection(config: Config, conn: Connection) -> Result<Self> {
        let store = TaskStore::open(conn)?;
        let reminders = ReminderLog::load(store.conn())?;
        Ok(Self {
            config,
            store,
            view: ViewState::default(),
            reminders,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.view.query.search = term.into();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.view.query.filter = filter;
    }

    /// Flip dark mode, returning the new value
    pub fn toggle_dark(&mut self) -> bool {
        self.view.dark = !self.view.dark;
        self.view.dark
    }

    /// Stored notification permission
    pub fn permission(&self) -> Result<Permission> {
        Permission::load(self.store.conn())
    }

    /// Validate an import file and replace the whole list with it
    pub fn import(&mut self, path: &Path) -> Result<usize> {
        let tasks = transfer::read_import(path)?;
        let count = tasks.len();
        self.store.replace_all(tasks)?;
        Ok(count)
    }

    /// Export the full list, ignoring search and filter
    pub fn export(&self, path: &Path) -> Result<()> {
        transfer::write_export(self.store.tasks(), path)
    }

    /// Tasks visible under the current search and filter
    pub fn visible(&self) -> Vec<&Task> {
        filter_tasks(self.store.tasks(), &self.view.query)
    }

    /// Derive the view from current state and run the reminder check
    pub fn render<N: Notifier + ?Sized>(&mut self, notifier: &mut N) -> Result<Frame> {
        self.render_on(crate::utils::today(), notifier)
    }

    pub fn render_on<N: Notifier + ?Sized>(&mut self, today: NaiveDate, notifier: &mut N) -> Result<Frame> {
        let frame = Frame {
            tasks: self.visible().into_iter().cloned().collect(),
            progress: self.store.progress(),
            query: self.view.query.clone(),
            dark: self.view.dark,
        };
        log::debug!("Rendered {} of {} tasks", frame.tasks.len(), frame.progress.total);
        self.remind(today, notifier)?;
        Ok(frame)
    }

    fn remind<N: Notifier + ?Sized>(&mut self, today: NaiveDate, notifier: &mut N) -> Result<()> {
        let policy = self.config.reminders;
        if policy == ReminderPolicy::Off {
            return Ok(());
        }

        let before = notifier.permission();
        let sent = check_reminders(self.store.tasks(), today, policy, &mut self.reminders, notifier);
        log::debug!("Reminder check sent {} notifications", sent);

        let after = notifier.settle();
        if after != before {
            log::info!("Notification permission is now {}", after.as_str());
            after.save(self.store.conn())?;
        }
        if policy == ReminderPolicy::Daily {
            self.reminders.save(self.store.conn(), today)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::TerminalNotifier;
    use crate::store::NewTask;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn app(policy: ReminderPolicy) -> App {
        let mut config = Config::with_base(&PathBuf::from("/unused"));
        config.reminders = policy;
        App::with_connection(config, DbConnection::connect_in_memory().unwrap()).unwrap()
    }

    fn add(app: &mut App, text: &str, date: Option<NaiveDate>) -> i64 {
        let input = NewTask {
            text: text.to_string(),
            date,
            category: "General".to_string(),
            ..NewTask::default()
        };
        app.store_mut().add(input).unwrap().unwrap().id
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_render_applies_query() {
        let mut app = app(ReminderPolicy::Off);
        let milk = add(&mut app, "Buy Milk", None);
        let rent = add(&mut app, "Pay rent", None);
        app.store_mut().toggle(rent).unwrap();

        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Granted, false);
        app.set_filter(StatusFilter::Active);
        let frame = app.render_on(today(), &mut notifier).unwrap();
        assert_eq!(frame.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk]);
        assert_eq!(frame.progress, Progress { completed: 1, total: 2 });

        app.set_filter(StatusFilter::All);
        app.set_search("RENT");
        let frame = app.render_on(today(), &mut notifier).unwrap();
        assert_eq!(frame.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![rent]);
    }

    #[test]
    fn test_dark_mode_is_session_state() {
        let mut app = app(ReminderPolicy::Off);
        assert!(!app.view().dark);
        assert!(app.toggle_dark());
        assert!(!app.toggle_dark());
    }

    #[test]
    fn test_render_persists_granted_permission() {
        let mut app = app(ReminderPolicy::Every);
        add(&mut app, "Dentist", Some(today()));

        let mut notifier = TerminalNotifier::new(Vec::new(), app.permission().unwrap(), false);
        app.render_on(today(), &mut notifier).unwrap();
        assert_eq!(app.permission().unwrap(), Permission::Granted);

        // The first pass only asked; the second one delivers
        app.render_on(today(), &mut notifier).unwrap();
        assert_eq!(String::from_utf8(notifier.into_inner()).unwrap(), "Reminder: Dentist\n");
    }

    #[test]
    fn test_daily_reminders_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::with_base(temp_dir.path());
        config.reminders = ReminderPolicy::Daily;

        let mut app = App::open(config.clone()).unwrap();
        add(&mut app, "Dentist", Some(today()));
        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Granted, false);
        app.render_on(today(), &mut notifier).unwrap();
        drop(app);

        let mut app = App::open(config).unwrap();
        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Granted, false);
        app.render_on(today(), &mut notifier).unwrap();
        assert_eq!(String::from_utf8(notifier.into_inner()).unwrap(), "");
    }

    #[test]
    fn test_export_import_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let mut app = app(ReminderPolicy::Off);
        add(&mut app, "one", Some(today()));
        add(&mut app, "two", None);
        app.set_search("one");
        let before = app.store().tasks().to_vec();

        app.export(&path).unwrap();
        app.store_mut().clear().unwrap();
        assert_eq!(app.import(&path).unwrap(), 2);
        assert_eq!(app.store().tasks(), before.as_slice());
    }

    #[test]
    fn test_invalid_import_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"id": 1}]"#).unwrap();

        let mut app = app(ReminderPolicy::Off);
        add(&mut app, "keep me", None);
        let err = app.import(&path).unwrap_err();
        assert!(err.downcast_ref::<transfer::ImportError>().is_some());
        assert_eq!(app.store().tasks().len(), 1);
    }
}
