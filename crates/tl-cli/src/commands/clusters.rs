//! Clusters command for listing what the chart draws at a given zoom.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Serialize;
use tl_core::{Cluster, ClusterCache, Window, full_view_zoom, load_trace};

use crate::Config;

/// Zoom and window overrides; `None` means "fit the whole trace".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterQuery {
    pub zoom: Option<f64>,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

/// One cluster as printed by the command.
#[derive(Debug, Serialize)]
pub struct ClusterRow {
    pub name: String,
    pub level: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub nodes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl ClusterRow {
    fn new(cluster: &Cluster, cache: &ClusterCache) -> Self {
        let name = cache
            .tree()
            .get(cluster.head())
            .map(|n| n.source.name.clone())
            .unwrap_or_default();
        Self {
            name,
            level: cluster.level,
            start: cluster.start,
            end: cluster.end,
            duration: cluster.duration,
            nodes: cluster.len(),
            color: cluster.color.clone(),
            kind: cluster.kind.clone(),
            badge: cluster.badge.clone(),
        }
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    trace: &Path,
    config: &Config,
    query: ClusterQuery,
    json: bool,
) -> Result<()> {
    let roots =
        load_trace(trace).with_context(|| format!("failed to load {}", trace.display()))?;
    let cache = ClusterCache::build(&roots, config.cluster_settings(), config.width);
    let rows = query_clusters(&cache, config, query)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write_rows(writer, &rows)?;
    }
    Ok(())
}

/// Reclusters `cache` for the query, filling unset values from the trace.
pub fn query_clusters(
    cache: &ClusterCache,
    config: &Config,
    query: ClusterQuery,
) -> Result<Vec<ClusterRow>> {
    let Some(bounds) = cache.bounds() else {
        return Ok(Vec::new());
    };
    let zoom = query
        .zoom
        .unwrap_or_else(|| full_view_zoom(bounds, config.width));
    ensure!(
        zoom.is_finite() && zoom > 0.0,
        "zoom must be a positive number, got {zoom}"
    );
    let window = Window::new(
        query.from.unwrap_or(bounds.min),
        query.to.unwrap_or(bounds.max),
    );
    ensure!(
        window.start <= window.end,
        "window start {} is after its end {}",
        window.start,
        window.end
    );

    let clusters = cache.visible(zoom, window);
    tracing::debug!(zoom, clusters = clusters.len(), "clustered window");
    Ok(clusters.iter().map(|c| ClusterRow::new(c, cache)).collect())
}

/// Writes a fixed-width table of clusters.
pub fn write_rows<W: Write>(writer: &mut W, rows: &[ClusterRow]) -> Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No clusters in window.")?;
        return Ok(());
    }
    writeln!(writer, "{:<6} {:>10} {:>10} {:>6}  name", "level", "start", "end", "nodes")?;
    for row in rows {
        writeln!(
            writer,
            "{:<6} {:>10.3} {:>10.3} {:>6}  {}",
            row.level, row.start, row.end, row.nodes, row.name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    const TRACE: &str = r#"{
        "name": "frame", "start": 0, "duration": 16, "type": "frame",
        "children": [
            {"name": "layout", "start": 0, "duration": 4, "type": "layout"},
            {"name": "paint", "start": 4, "duration": 0.001, "type": "paint"},
            {"name": "paint", "start": 4.001, "duration": 0.001, "type": "paint"},
            {"name": "composite", "start": 10, "duration": 6, "type": "composite", "badge": "red"}
        ]
    }"#;

    fn trace_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("trace.json");
        std::fs::write(&path, TRACE).unwrap();
        (temp, path)
    }

    #[test]
    fn clusters_command_fits_whole_trace_by_default() {
        let (_temp, path) = trace_file();
        let mut output = Vec::new();

        run(&mut output, &path, &Config::default(), ClusterQuery::default(), false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        level       start        end  nodes  name
        0           0.000     16.000      1  frame
        1           0.000      4.000      1  layout
        1           4.000      4.002      2  paint
        1          10.000     16.000      1  composite
        ");
    }

    #[test]
    fn zooming_in_splits_merged_slices() {
        let (_temp, path) = trace_file();
        let query = ClusterQuery {
            zoom: Some(100_000.0),
            ..ClusterQuery::default()
        };
        let mut output = Vec::new();

        run(&mut output, &path, &Config::default(), query, true).unwrap();

        let rows: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["frame", "layout", "paint", "paint", "composite"]);
        assert_eq!(rows[4]["badge"], "red");
        assert_eq!(rows[4]["type"], "composite");
    }

    #[test]
    fn window_drops_clusters_outside_it() {
        let (_temp, path) = trace_file();
        let query = ClusterQuery {
            zoom: None,
            from: Some(11.0),
            to: Some(12.0),
        };
        let mut output = Vec::new();

        run(&mut output, &path, &Config::default(), query, false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("frame"));
        assert!(output.contains("composite"));
        assert!(!output.contains("layout"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let (_temp, path) = trace_file();
        let query = ClusterQuery {
            zoom: None,
            from: Some(12.0),
            to: Some(11.0),
        };
        let mut output = Vec::new();

        let err = run(&mut output, &path, &Config::default(), query, false).unwrap_err();

        assert_eq!(err.to_string(), "window start 12 is after its end 11");
    }
}
