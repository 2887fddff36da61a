//! Taskpad - A personal task list manager
//!
//! This library provides the core functionality for Taskpad, including:
//! - Local storage (SQLite key/value table) and schema migrations
//! - The task model and the store that persists every mutation
//! - Search and completion filtering
//! - JSON export and validated import
//! - Same-day reminders
//! - The command line and interactive shell front ends
//!
//! # Example
//!
//! ```no_run
//! use taskpad::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod filter;
pub mod models;
pub mod reminder;
pub mod repo;
pub mod store;
pub mod transfer;
pub mod utils;
