use clap::{Args, Parser, Subcommand};
use crate::app::App;
use crate::cli::error::{validate_subtask_number, validate_task_id, UserError};
use crate::cli::output::{format_created, format_frame, OutputOptions};
use crate::cli::prompt::{confirm, prompt_text};
use crate::cli::shell::Shell;
use crate::config::Config;
use crate::filter::StatusFilter;
use crate::models::Priority;
use crate::reminder::TerminalNotifier;
use crate::store::NewTask;
use crate::transfer::{export_json, EXPORT_FILE_NAME};
use crate::utils::{parse_due_date, printable, today};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "Taskpad - A personal task list with subtasks, reminders and JSON export/import")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Values for a new task
#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    /// Task text
    pub text: Vec<String>,
    /// Comma-separated subtasks (e.g. "milk, eggs, bread")
    #[arg(short = 's', long)]
    pub subtasks: Option<String>,
    /// Due date (YYYY-MM-DD, today, tomorrow, +Nd)
    #[arg(short = 'd', long)]
    pub due: Option<String>,
    /// Priority: low, medium or high
    #[arg(short = 'p', long)]
    pub priority: Option<String>,
    /// Category (one of the configured categories)
    #[arg(short = 'c', long)]
    pub category: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    Add(AddArgs),
    /// List tasks with progress
    List {
        /// Show only all, active or completed tasks
        #[arg(short = 'f', long, default_value = "all")]
        filter: String,
        /// Case-insensitive text search
        #[arg(short = 's', long, default_value = "")]
        search: String,
        /// Use the dark colour palette
        #[arg(long)]
        dark: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task between open and completed
    #[command(visible_alias = "toggle")]
    Done {
        /// Task ID
        id: String,
    },
    /// Replace a task's text (prompts when no text is given)
    Edit {
        /// Task ID
        id: String,
        /// New text
        text: Vec<String>,
    },
    /// Permanently delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Toggle a subtask
    Subtask {
        /// Task ID
        id: String,
        /// Subtask number (starting at 1)
        number: String,
    },
    /// Delete all tasks
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Export all tasks as JSON
    Export {
        /// Output file ("-" for stdout)
        #[arg(short = 'o', long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Replace all tasks with the contents of an exported file
    Import {
        /// JSON file produced by export
        file: PathBuf,
    },
    /// Start an interactive session
    Shell,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut app = App::open(config)?;

    match cli.command {
        Commands::Add(args) => handle_task_add(&mut app, args),
        Commands::List { filter, search, dark, json } => handle_task_list(&mut app, &filter, search, dark, json),
        Commands::Done { id } => handle_task_toggle(&mut app, &id),
        Commands::Edit { id, text } => handle_task_edit(&mut app, &id, text),
        Commands::Delete { id } => handle_task_delete(&mut app, &id),
        Commands::Subtask { id, number } => handle_subtask_toggle(&mut app, &id, &number),
        Commands::Clear { yes } => handle_clear(&mut app, yes),
        Commands::Export { output } => handle_export(&app, &output),
        Commands::Import { file } => handle_import(&mut app, &file),
        Commands::Shell => {
            let stdin = std::io::stdin();
            let mut shell = Shell::new(app, stdin.lock(), std::io::stdout())?;
            shell.run()
        }
    }
}

/// Turn add arguments into store input, applying configured defaults
pub fn build_new_task(config: &Config, args: AddArgs) -> Result<NewTask, UserError> {
    let priority = match args.priority.as_deref() {
        Some(p) => Priority::from_str(p)
            .ok_or_else(|| UserError(format!("Invalid priority: '{}'. Use low, medium or high.", p)))?,
        None => config.default_priority,
    };

    let category = match args.category.as_deref() {
        Some(c) => config
            .resolve_category(c)
            .ok_or_else(|| {
                UserError(format!(
                    "Unknown category: '{}'. Available: {}",
                    c,
                    config.categories.join(", ")
                ))
            })?
            .to_string(),
        None => config.default_category.clone(),
    };

    let date = match args.due.as_deref() {
        Some(expr) => Some(parse_due_date(expr, today()).map_err(|e| UserError(e.to_string()))?),
        None => None,
    };

    Ok(NewTask {
        text: args.text.join(" "),
        subtasks: args.subtasks.unwrap_or_default(),
        date,
        priority,
        category,
    })
}

pub fn parse_status_filter(name: &str) -> Result<StatusFilter, UserError> {
    StatusFilter::from_str(name)
        .ok_or_else(|| UserError(format!("Invalid filter: '{}'. Use all, active or completed.", name)))
}

fn handle_task_add(app: &mut App, args: AddArgs) -> Result<()> {
    let input = build_new_task(app.config(), args)?;
    // Blank text is silently ignored
    if let Some(task) = app.store_mut().add(input)? {
        println!("{}", format_created(task));
    }
    Ok(())
}

fn handle_task_list(app: &mut App, filter: &str, search: String, dark: bool, json: bool) -> Result<()> {
    app.set_filter(parse_status_filter(filter)?);
    app.set_search(search);
    if dark {
        app.toggle_dark();
    }

    if json {
        let visible: Vec<_> = app.visible().into_iter().cloned().collect();
        println!("{}", export_json(&visible)?);
        return Ok(());
    }

    let mut notifier = TerminalNotifier::stderr(app.permission()?);
    let frame = app.render(&mut notifier)?;
    print!("{}", format_frame(&frame, &OutputOptions::detect(app.config().color)));
    Ok(())
}

fn handle_task_toggle(app: &mut App, id: &str) -> Result<()> {
    let id = validate_task_id(id)?;
    if app.store_mut().toggle(id)? {
        println!("Completed task {}.", id);
    } else {
        println!("Reopened task {}.", id);
    }
    Ok(())
}

fn handle_task_edit(app: &mut App, id: &str, text: Vec<String>) -> Result<()> {
    let id = validate_task_id(id)?;
    let current = app
        .store()
        .get(id)
        .map(|t| t.text.clone())
        .ok_or(crate::store::StoreError::TaskNotFound(id))?;

    let replacement = if text.is_empty() {
        let stdin = std::io::stdin();
        prompt_text(&mut stdin.lock(), &mut std::io::stderr(), "Edit task", &current)?
    } else {
        Some(text.join(" "))
    };

    if app.store_mut().edit(id, replacement.as_deref())? {
        println!("Modified task {}.", id);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

fn handle_task_delete(app: &mut App, id: &str) -> Result<()> {
    let id = validate_task_id(id)?;
    let task = app.store_mut().delete(id)?;
    println!("Deleted task {}: {}", id, printable(&task.text));
    Ok(())
}

fn handle_subtask_toggle(app: &mut App, id: &str, number: &str) -> Result<()> {
    let id = validate_task_id(id)?;
    let index = validate_subtask_number(number)?;
    let state = if app.store_mut().toggle_subtask(id, index)? { "done" } else { "open" };
    println!("Subtask {} of task {} is {}.", index + 1, id, state);
    Ok(())
}

fn handle_clear(app: &mut App, yes: bool) -> Result<()> {
    if !yes {
        let stdin = std::io::stdin();
        if !confirm(&mut stdin.lock(), &mut std::io::stderr(), "Clear all tasks?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }
    let count = app.store().tasks().len();
    app.store_mut().clear()?;
    println!("Cleared {} tasks.", count);
    Ok(())
}

fn handle_export(app: &App, output: &Path) -> Result<()> {
    if output.as_os_str() == "-" {
        println!("{}", export_json(app.store().tasks())?);
        return Ok(());
    }
    app.export(output)?;
    println!("Exported {} tasks to {}", app.store().tasks().len(), output.display());
    Ok(())
}

fn handle_import(app: &mut App, file: &Path) -> Result<()> {
    let count = app
        .import(file)
        .with_context(|| format!("Import of {} failed", file.display()))?;
    println!("Imported {} tasks from {}", count, file.display());
    Ok(())
}
