// Core data models for Taskpad

pub mod task;

pub use task::*;
