//! Same-day reminders
//!
//! Every render pass runs [`check_reminders`]: each incomplete task whose due
//! date is today produces one notification. Under [`ReminderPolicy::Every`]
//! this repeats on every pass; [`ReminderPolicy::Daily`] keeps a
//! [`ReminderLog`] so a task is announced at most once per day.

use crate::config::ReminderPolicy;
use crate::models::Task;
use crate::repo::StorageRepo;
use crate::utils::printable;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::io::{IsTerminal, Write};

/// Storage key for the notification permission
pub const PERMISSION_KEY: &str = "notification.permission";
/// Storage key for the daily reminder log
pub const SENT_KEY: &str = "reminders.sent";

pub const REMINDER_TITLE: &str = "Reminder";

/// Notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Permission::Default),
            "granted" => Some(Permission::Granted),
            "denied" => Some(Permission::Denied),
            _ => None,
        }
    }

    /// Load the stored permission; anything unrecognised counts as `Default`
    pub fn load(conn: &Connection) -> Result<Self> {
        let stored = StorageRepo::get(conn, PERMISSION_KEY)?;
        Ok(stored.as_deref().and_then(Self::from_str).unwrap_or_default())
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        StorageRepo::set(conn, PERMISSION_KEY, self.as_str())
    }
}

/// User-notification surface
pub trait Notifier {
    /// Permission as of the current render
    fn permission(&self) -> Permission;

    /// Ask for permission. The answer is not awaited; it becomes visible
    /// through [`Notifier::permission`] only after [`Notifier::settle`].
    fn request_permission(&mut self);

    /// Show a notification. Dropped unless permission is granted.
    fn notify(&mut self, title: &str, body: &str);

    /// Apply any answered permission request and return the resulting state
    fn settle(&mut self) -> Permission {
        self.permission()
    }
}

/// Notifier writing reminders to a terminal stream
pub struct TerminalNotifier<W: Write> {
    out: W,
    permission: Permission,
    answer: Option<Permission>,
    bell: bool,
}

impl TerminalNotifier<std::io::Stderr> {
    pub fn stderr(permission: Permission) -> Self {
        let bell = std::io::stderr().is_terminal();
        Self::new(std::io::stderr(), permission, bell)
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W, permission: Permission, bell: bool) -> Self {
        Self {
            out,
            permission,
            answer: None,
            bell,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) {
        // A terminal has nobody to ask; an undecided permission is granted,
        // an explicit denial stands.
        if self.permission == Permission::Default {
            self.answer = Some(Permission::Granted);
        }
    }

    fn notify(&mut self, title: &str, body: &str) {
        if self.permission != Permission::Granted {
            log::debug!("Dropped notification without permission: {}", body);
            return;
        }
        let bell = if self.bell { "\x07" } else { "" };
        if let Err(e) = writeln!(self.out, "{}{}: {}", bell, title, printable(body)) {
            log::warn!("Failed to write notification: {}", e);
        }
    }

    fn settle(&mut self) -> Permission {
        if let Some(answer) = self.answer.take() {
            self.permission = answer;
        }
        self.permission
    }
}

/// Record of which tasks were already reminded about, and on which day
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReminderLog {
    sent: BTreeMap<i64, NaiveDate>,
}

impl ReminderLog {
    pub fn load(conn: &Connection) -> Result<Self> {
        match StorageRepo::get(conn, SENT_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse reminder log (storage key '{}')", SENT_KEY)),
            None => Ok(Self::default()),
        }
    }

    /// Persist entries for `today`; older entries can never suppress anything again
    pub fn save(&mut self, conn: &Connection, today: NaiveDate) -> Result<()> {
        self.sent.retain(|_, day| *day == today);
        let json = serde_json::to_string(self).context("Failed to serialize reminder log")?;
        StorageRepo::set(conn, SENT_KEY, &json)
    }

    pub fn was_sent(&self, id: i64, today: NaiveDate) -> bool {
        self.sent.get(&id) == Some(&today)
    }

    pub fn mark_sent(&mut self, id: i64, today: NaiveDate) {
        self.sent.insert(id, today);
    }
}

/// Run the reminder check for one render pass. Returns the number of
/// notifications handed to the notifier.
pub fn check_reminders<N: Notifier + ?Sized>(
    tasks: &[Task],
    today: NaiveDate,
    policy: ReminderPolicy,
    log: &mut ReminderLog,
    notifier: &mut N,
) -> usize {
    if policy == ReminderPolicy::Off {
        return 0;
    }

    let granted = notifier.permission() == Permission::Granted;
    if !granted {
        notifier.request_permission();
    }

    let mut sent = 0;
    for task in tasks.iter().filter(|t| t.is_due_on(today)) {
        if policy == ReminderPolicy::Daily {
            if log.was_sent(task.id, today) {
                continue;
            }
            // Only a delivered reminder counts
            if granted {
                log.mark_sent(task.id, today);
            }
        }
        notifier.notify(REMINDER_TITLE, &task.text);
        sent += 1;
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn tasks() -> Vec<Task> {
        let mut due = Task::new(1, "Dentist".to_string());
        due.date = Some(today());
        let mut done = Task::new(2, "Pay bill".to_string());
        done.date = Some(today());
        done.completed = true;
        let mut later = Task::new(3, "Renew passport".to_string());
        later.date = today().succ_opt();
        vec![due, done, later, Task::new(4, "Someday".to_string())]
    }

    fn granted() -> TerminalNotifier<Vec<u8>> {
        TerminalNotifier::new(Vec::new(), Permission::Granted, false)
    }

    fn output(notifier: TerminalNotifier<Vec<u8>>) -> String {
        String::from_utf8(notifier.into_inner()).unwrap()
    }

    #[test]
    fn test_only_incomplete_tasks_due_today() {
        let mut notifier = granted();
        let sent = check_reminders(&tasks(), today(), ReminderPolicy::Every, &mut ReminderLog::default(), &mut notifier);
        assert_eq!(sent, 1);
        assert_eq!(output(notifier), "Reminder: Dentist\n");
    }

    #[test]
    fn test_notification_text_is_printable() {
        let mut notifier = granted();
        notifier.notify(REMINDER_TITLE, "Dentist\x1b[2J\r");
        assert_eq!(output(notifier), "Reminder: Dentist[2J\n");
    }

    #[test]
    fn test_every_policy_repeats_each_pass() {
        let mut notifier = granted();
        let mut log = ReminderLog::default();
        for _ in 0..3 {
            check_reminders(&tasks(), today(), ReminderPolicy::Every, &mut log, &mut notifier);
        }
        assert_eq!(output(notifier).lines().count(), 3);
    }

    #[test]
    fn test_daily_policy_reminds_once() {
        let mut notifier = granted();
        let mut log = ReminderLog::default();
        assert_eq!(check_reminders(&tasks(), today(), ReminderPolicy::Daily, &mut log, &mut notifier), 1);
        assert_eq!(check_reminders(&tasks(), today(), ReminderPolicy::Daily, &mut log, &mut notifier), 0);
        assert!(log.was_sent(1, today()));
    }

    #[test]
    fn test_off_policy_is_noop() {
        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Default, false);
        let sent = check_reminders(&tasks(), today(), ReminderPolicy::Off, &mut ReminderLog::default(), &mut notifier);
        assert_eq!(sent, 0);
        assert_eq!(notifier.settle(), Permission::Default);
    }

    #[test]
    fn test_first_request_is_not_awaited() {
        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Default, false);
        let mut log = ReminderLog::default();

        // The pass that asks for permission drops its reminders
        check_reminders(&tasks(), today(), ReminderPolicy::Daily, &mut log, &mut notifier);
        assert_eq!(notifier.settle(), Permission::Granted);
        assert!(!log.was_sent(1, today()));

        check_reminders(&tasks(), today(), ReminderPolicy::Daily, &mut log, &mut notifier);
        assert_eq!(output(notifier), "Reminder: Dentist\n");
    }

    #[test]
    fn test_denied_stays_denied() {
        let mut notifier = TerminalNotifier::new(Vec::new(), Permission::Denied, false);
        check_reminders(&tasks(), today(), ReminderPolicy::Every, &mut ReminderLog::default(), &mut notifier);
        assert_eq!(notifier.settle(), Permission::Denied);
        assert_eq!(output(notifier), "");
    }

    #[test]
    fn test_permission_and_log_persistence() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert_eq!(Permission::load(&conn).unwrap(), Permission::Default);
        Permission::Granted.save(&conn).unwrap();
        assert_eq!(Permission::load(&conn).unwrap(), Permission::Granted);

        let mut log = ReminderLog::default();
        log.mark_sent(1, today());
        log.mark_sent(2, today().pred_opt().unwrap());
        log.save(&conn, today()).unwrap();

        let loaded = ReminderLog::load(&conn).unwrap();
        assert!(loaded.was_sent(1, today()));
        assert!(!loaded.was_sent(2, today().pred_opt().unwrap()));
    }
}
