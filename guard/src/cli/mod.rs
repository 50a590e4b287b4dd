//! CLI module for signin-guard.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
