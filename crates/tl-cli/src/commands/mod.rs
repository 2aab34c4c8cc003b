//! CLI subcommand implementations.

pub mod clusters;
pub mod replay;
pub mod stats;
