//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect large interval-tree traces.
///
/// Loads a trace forest, clusters it the way the chart would at a given zoom,
/// and replays scripted pointer input against the frame scheduler.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize a trace: node count, depth, range and cluster counts.
    Stats {
        /// Trace file (JSON, optionally gzip-compressed).
        trace: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the clusters drawn for a zoom level and time window.
    Clusters {
        /// Trace file (JSON, optionally gzip-compressed).
        trace: PathBuf,

        /// Pixels per time unit. Defaults to fitting the whole trace.
        #[arg(long)]
        zoom: Option<f64>,

        /// Window start time. Defaults to the start of the trace.
        #[arg(long)]
        from: Option<f64>,

        /// Window end time. Defaults to the end of the trace.
        #[arg(long)]
        to: Option<f64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Drive the chart with scripted input and report every committed frame.
    Replay {
        /// Trace file (JSON, optionally gzip-compressed).
        trace: PathBuf,

        /// JSON array of input events.
        script: PathBuf,
    },
}
