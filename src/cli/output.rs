// Output formatting utilities

use crate::app::Frame;
use crate::config::ColorMode;
use crate::filter::StatusFilter;
use crate::models::{Priority, Task};
use crate::store::Progress;
use crate::utils::printable;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_STRIKE: &str = "\x1b[9m";
const ANSI_RESET: &str = "\x1b[0m";

// ANSI foreground colors (standard 16-color palette)
const ANSI_FG_BLACK: &str = "\x1b[30m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_WHITE: &str = "\x1b[37m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";
const ANSI_FG_BRIGHT_RED: &str = "\x1b[91m";
const ANSI_FG_BRIGHT_GREEN: &str = "\x1b[92m";
const ANSI_FG_BRIGHT_YELLOW: &str = "\x1b[93m";

// ANSI background colors
const ANSI_BG_RED: &str = "\x1b[41m";
const ANSI_BG_GREEN: &str = "\x1b[42m";
const ANSI_BG_YELLOW: &str = "\x1b[43m";
const ANSI_BG_BLUE: &str = "\x1b[44m";
const ANSI_BG_MAGENTA: &str = "\x1b[45m";
const ANSI_BG_CYAN: &str = "\x1b[46m";
const ANSI_BG_BRIGHT_BLACK: &str = "\x1b[100m";
const ANSI_BG_BRIGHT_RED: &str = "\x1b[101m";
const ANSI_BG_BRIGHT_GREEN: &str = "\x1b[102m";
const ANSI_BG_BRIGHT_YELLOW: &str = "\x1b[103m";
const ANSI_BG_BRIGHT_BLUE: &str = "\x1b[104m";
const ANSI_BG_BRIGHT_MAGENTA: &str = "\x1b[105m";
const ANSI_BG_BRIGHT_CYAN: &str = "\x1b[106m";

// Category badges pick from these by hash so a category keeps its colour
const CATEGORY_BG_PALETTE: &[&str] = &[ANSI_BG_BLUE, ANSI_BG_MAGENTA, ANSI_BG_CYAN, ANSI_BG_GREEN];
const CATEGORY_BG_PALETTE_DARK: &[&str] = &[
    ANSI_BG_BRIGHT_BLUE,
    ANSI_BG_BRIGHT_MAGENTA,
    ANSI_BG_BRIGHT_CYAN,
    ANSI_BG_BRIGHT_GREEN,
];

const PROGRESS_BAR_MAX: usize = 40;

/// Colour palette selected by dark mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    fn row_fg(&self, priority: Priority) -> &'static str {
        match (self, priority) {
            (Theme::Light, Priority::High) => ANSI_FG_RED,
            (Theme::Light, Priority::Medium) => ANSI_FG_YELLOW,
            (Theme::Light, Priority::Low) => ANSI_FG_GREEN,
            (Theme::Dark, Priority::High) => ANSI_FG_BRIGHT_RED,
            (Theme::Dark, Priority::Medium) => ANSI_FG_BRIGHT_YELLOW,
            (Theme::Dark, Priority::Low) => ANSI_FG_BRIGHT_GREEN,
        }
    }

    /// Priority badge colours as (background, foreground)
    fn priority_badge(&self, priority: Priority) -> (&'static str, &'static str) {
        match (self, priority) {
            (Theme::Light, Priority::High) => (ANSI_BG_RED, ANSI_FG_WHITE),
            (Theme::Light, Priority::Medium) => (ANSI_BG_YELLOW, ANSI_FG_BLACK),
            (Theme::Light, Priority::Low) => (ANSI_BG_GREEN, ANSI_FG_BLACK),
            (Theme::Dark, Priority::High) => (ANSI_BG_BRIGHT_RED, ANSI_FG_BLACK),
            (Theme::Dark, Priority::Medium) => (ANSI_BG_BRIGHT_YELLOW, ANSI_FG_BLACK),
            (Theme::Dark, Priority::Low) => (ANSI_BG_BRIGHT_GREEN, ANSI_FG_BLACK),
        }
    }

    fn category_badge(&self, category: &str) -> (&'static str, &'static str) {
        if category.is_empty() {
            return (ANSI_BG_BRIGHT_BLACK, ANSI_FG_WHITE);
        }
        let hash = category.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize).wrapping_mul(31));
        match self {
            Theme::Light => (CATEGORY_BG_PALETTE[hash % CATEGORY_BG_PALETTE.len()], ANSI_FG_WHITE),
            Theme::Dark => (CATEGORY_BG_PALETTE_DARK[hash % CATEGORY_BG_PALETTE_DARK.len()], ANSI_FG_BLACK),
        }
    }

    fn done_style(&self) -> &'static str {
        match self {
            Theme::Light => ANSI_FG_BRIGHT_BLACK,
            Theme::Dark => ANSI_DIM,
        }
    }

    fn progress_fill(&self) -> &'static str {
        match self {
            Theme::Light => ANSI_FG_GREEN,
            Theme::Dark => ANSI_FG_BRIGHT_GREEN,
        }
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub color: bool,
    pub width: usize,
}

impl OutputOptions {
    /// Options for the current stdout
    pub fn detect(mode: ColorMode) -> Self {
        Self {
            color: use_color(mode),
            width: get_terminal_width(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false, width: 80 }
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

pub fn use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => is_tty() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    80
}

fn paint(text: &str, codes: &[&str], color: bool) -> String {
    if color {
        format!("{}{}{}", codes.concat(), text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn badge(label: &str, colors: (&str, &str), color: bool) -> String {
    if color {
        format!("{}{} {} {}", colors.0, colors.1, label, ANSI_RESET)
    } else {
        format!("[{}]", label)
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Format one task with its subtask checklist
pub fn format_task_row(task: &Task, theme: Theme, color: bool) -> String {
    let mut output = String::new();

    let text_style: Vec<&str> = if task.completed {
        vec![ANSI_STRIKE, theme.done_style()]
    } else {
        vec![ANSI_BOLD, theme.row_fg(task.priority)]
    };

    output.push_str(&format!(
        "{} {}  {}",
        checkbox(task.completed),
        task.id,
        paint(&printable(&task.text), &text_style, color)
    ));
    if let Some(date) = task.date {
        output.push_str(&format!(" ({})", date.format("%Y-%m-%d")));
    }
    output.push_str(&format!(
        "  {} {}\n",
        badge(task.priority.as_str(), theme.priority_badge(task.priority), color),
        badge(&printable(&task.category), theme.category_badge(&task.category), color),
    ));

    for (i, subtask) in task.subtasks.iter().enumerate() {
        let text = printable(&subtask.text);
        let text = if subtask.completed {
            paint(&text, &[ANSI_STRIKE, theme.done_style()], color)
        } else {
            text.into_owned()
        };
        output.push_str(&format!("      {}. {} {}\n", i + 1, checkbox(subtask.completed), text));
    }

    output
}

/// Format the progress bar and label
pub fn format_progress(progress: Progress, theme: Theme, opts: &OutputOptions) -> String {
    let percent = progress.percent() as usize;
    let bar_width = opts.width.saturating_sub(20).clamp(10, PROGRESS_BAR_MAX);
    let filled = bar_width * percent / 100;
    let bar = format!(
        "{}{}",
        paint(&"#".repeat(filled), &[theme.progress_fill()], opts.color && filled > 0),
        "-".repeat(bar_width - filled),
    );
    format!("[{}] {}% completed\n", bar, percent)
}

/// Format a full render pass
pub fn format_frame(frame: &Frame, opts: &OutputOptions) -> String {
    let theme = Theme::from_dark(frame.dark);
    let mut output = String::new();

    let mut scope = Vec::new();
    if frame.query.filter != StatusFilter::All {
        scope.push(format!("filter: {}", frame.query.filter.as_str()));
    }
    if !frame.query.search.is_empty() {
        scope.push(format!("search: \"{}\"", frame.query.search));
    }
    if !scope.is_empty() {
        output.push_str(&paint(&format!("({})", scope.join(", ")), &[ANSI_DIM], opts.color));
        output.push('\n');
    }

    if frame.tasks.is_empty() {
        output.push_str("No tasks.\n");
    } else {
        for task in &frame.tasks {
            output.push_str(&format_task_row(task, theme, opts.color));
        }
    }

    output.push('\n');
    output.push_str(&format_progress(frame.progress, theme, opts));
    output
}

/// Short confirmation line for a newly created task
pub fn format_created(task: &Task) -> String {
    let mut line = format!("Created task {}: {}", task.id, printable(&task.text));
    if !task.subtasks.is_empty() {
        line.push_str(&format!(" ({} subtasks)", task.subtasks.len()));
    }
    line
}
