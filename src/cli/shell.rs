//! Interactive session
//!
//! The shell keeps one [`App`] alive for the whole session: search, filter
//! and dark mode only live here and reset on the next start. Every command
//! that changes the task list or the view is followed by a full render.

use crate::app::App;
use crate::cli::commands::{build_new_task, parse_status_filter, AddArgs};
use crate::cli::error::{is_user_error, validate_subtask_number, validate_task_id, UserError};
use crate::cli::output::{format_created, format_frame, OutputOptions};
use crate::cli::prompt::{confirm, prompt_text};
use crate::reminder::{Notifier, TerminalNotifier};
use crate::store::StoreError;
use crate::transfer::EXPORT_FILE_NAME;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "taskpad> ";

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Add a new task
    Add(AddArgs),
    /// Search task text (no term clears the search)
    Search { term: Vec<String> },
    /// Show all, active or completed tasks
    Filter { name: String },
    /// Toggle dark mode
    Dark,
    /// Toggle a task between open and completed
    #[command(visible_alias = "toggle")]
    Done { id: String },
    /// Replace a task's text (prompts when no text is given)
    Edit { id: String, text: Vec<String> },
    /// Delete a task
    Delete { id: String },
    /// Toggle a subtask
    Sub { id: String, number: String },
    /// Delete all tasks
    Clear {
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Export all tasks as JSON
    Export {
        #[arg(default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Replace all tasks with an exported file
    Import { file: PathBuf },
    /// Show the task list again
    List,
    /// Leave the shell
    #[command(visible_alias = "exit")]
    Quit,
}

enum Flow {
    Render,
    Stay,
    Quit,
}

pub struct Shell<R: BufRead, W: Write> {
    app: App,
    input: R,
    out: W,
    notifier: Box<dyn Notifier>,
    opts: OutputOptions,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Shell writing reminders to stderr
    pub fn new(app: App, input: R, out: W) -> Result<Self> {
        let permission = app.permission()?;
        let opts = OutputOptions::detect(app.config().color);
        Ok(Self::with_notifier(app, input, out, Box::new(TerminalNotifier::stderr(permission)), opts))
    }

    pub fn with_notifier(app: App, input: R, out: W, notifier: Box<dyn Notifier>, opts: OutputOptions) -> Self {
        Self {
            app,
            input,
            out,
            notifier,
            opts,
        }
    }

    pub fn into_app(self) -> App {
        self.app
    }

    /// Read commands until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        self.render()?;

        loop {
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                return Ok(());
            }

            let words = match split_words(&line) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(e) => {
                    writeln!(self.out, "Error: {}", e)?;
                    continue;
                }
            };

            let command = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    write!(self.out, "{}", e.render())?;
                    continue;
                }
            };

            match self.dispatch(command) {
                Ok(Flow::Render) => self.render()?,
                Ok(Flow::Stay) => {}
                Ok(Flow::Quit) => return Ok(()),
                Err(e) if is_user_error(&e) => writeln!(self.out, "Error: {:#}", e)?,
                Err(e) => return Err(e),
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let frame = self.app.render(self.notifier.as_mut())?;
        write!(self.out, "{}", format_frame(&frame, &self.opts))?;
        Ok(())
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Add(args) => {
                let input = build_new_task(self.app.config(), args)?;
                match self.app.store_mut().add(input)? {
                    Some(task) => {
                        let line = format_created(task);
                        writeln!(self.out, "{}", line)?;
                        Ok(Flow::Render)
                    }
                    None => Ok(Flow::Stay),
                }
            }
            ShellCommand::Search { term } => {
                self.app.set_search(term.join(" "));
                Ok(Flow::Render)
            }
            ShellCommand::Filter { name } => {
                self.app.set_filter(parse_status_filter(&name)?);
                Ok(Flow::Render)
            }
            ShellCommand::Dark => {
                let dark = self.app.toggle_dark();
                writeln!(self.out, "Dark mode {}.", if dark { "on" } else { "off" })?;
                Ok(Flow::Render)
            }
            ShellCommand::Done { id } => {
                self.app.store_mut().toggle(validate_task_id(&id)?)?;
                Ok(Flow::Render)
            }
            ShellCommand::Edit { id, text } => {
                let id = validate_task_id(&id)?;
                let current = self
                    .app
                    .store()
                    .get(id)
                    .map(|t| t.text.clone())
                    .ok_or(StoreError::TaskNotFound(id))?;
                let replacement = if text.is_empty() {
                    prompt_text(&mut self.input, &mut self.out, "Edit task", &current)?
                } else {
                    Some(text.join(" "))
                };
                if self.app.store_mut().edit(id, replacement.as_deref())? {
                    Ok(Flow::Render)
                } else {
                    Ok(Flow::Stay)
                }
            }
            ShellCommand::Delete { id } => {
                self.app.store_mut().delete(validate_task_id(&id)?)?;
                Ok(Flow::Render)
            }
            ShellCommand::Sub { id, number } => {
                let id = validate_task_id(&id)?;
                let index = validate_subtask_number(&number)?;
                self.app.store_mut().toggle_subtask(id, index)?;
                Ok(Flow::Render)
            }
            ShellCommand::Clear { yes } => {
                if !yes && !confirm(&mut self.input, &mut self.out, "Clear all tasks?")? {
                    return Ok(Flow::Stay);
                }
                self.app.store_mut().clear()?;
                Ok(Flow::Render)
            }
            ShellCommand::Export { output } => {
                self.app.export(&output)?;
                writeln!(self.out, "Exported {} tasks to {}", self.app.store().tasks().len(), output.display())?;
                Ok(Flow::Stay)
            }
            ShellCommand::Import { file } => {
                let count = self.app.import(&file)?;
                writeln!(self.out, "Imported {} tasks from {}", count, file.display())?;
                Ok(Flow::Render)
            }
            ShellCommand::List => Ok(Flow::Render),
            ShellCommand::Quit => Ok(Flow::Quit),
        }
    }
}

/// Split a command line into words, honouring single and double quotes
fn split_words(line: &str) -> Result<Vec<String>, UserError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(UserError::new("Unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
