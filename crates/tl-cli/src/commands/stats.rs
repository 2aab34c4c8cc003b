//! Stats command for summarizing a trace file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tl_core::{ClusterCache, TraceStats, load_trace};

use crate::Config;

pub fn run<W: Write>(writer: &mut W, trace: &Path, config: &Config, json: bool) -> Result<()> {
    let roots =
        load_trace(trace).with_context(|| format!("failed to load {}", trace.display()))?;
    let cache = ClusterCache::build(&roots, config.cluster_settings(), config.width);
    let stats = cache.stats();
    tracing::debug!(?stats, "computed trace stats");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&stats)?)?;
    } else {
        write_stats(writer, &stats)?;
    }
    Ok(())
}

/// Writes the human-readable summary.
pub fn write_stats<W: Write>(writer: &mut W, stats: &TraceStats) -> Result<()> {
    writeln!(writer, "Nodes:           {}", stats.nodes)?;
    writeln!(writer, "Levels:          {}", stats.levels)?;
    writeln!(writer, "Range:           {} .. {}", stats.min, stats.max)?;
    writeln!(writer, "Meta-clusters:   {}", stats.meta_clusters)?;
    writeln!(writer, "Coarse clusters: {}", stats.coarse_clusters)?;
    if stats.sanitized > 0 {
        writeln!(writer, "Sanitized:       {}", stats.sanitized)?;
    }
    Ok(())
}
