//! Command-line tools for interval-tree traces.
//!
//! This crate provides the CLI interface on top of `tl-core` and `tl-render`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
