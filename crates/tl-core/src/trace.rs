//! Loading trace forests from JSON, optionally gzip-compressed.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::node::Node;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while loading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid trace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("trace contains no nodes")]
    Empty,
}

/// A trace file holds either a list of roots or a single root.
enum TraceDocument {
    Forest(Vec<Arc<Node>>),
    Root(Arc<Node>),
}

// Dispatches on the first token instead of buffering the whole document, so
// nesting depth is bounded only by the stack guard in `parse`.
impl<'de> Deserialize<'de> for TraceDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = TraceDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a node or a list of nodes")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut roots = Vec::new();
        while let Some(root) = seq.next_element()? {
            roots.push(root);
        }
        Ok(TraceDocument::Forest(roots))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        Node::deserialize(MapAccessDeserializer::new(map))
            .map(|root| TraceDocument::Root(Arc::new(root)))
    }
}

/// Parses one document without serde_json's nesting limit, growing the stack
/// on demand for deep trees.
fn parse<R: Read>(reader: R) -> Result<TraceDocument, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    de.disable_recursion_limit();
    let document = TraceDocument::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(document)
}

/// Reads a forest from `reader`, transparently inflating gzip input.
pub fn read_trace<R: Read>(reader: R) -> Result<Vec<Arc<Node>>, TraceError> {
    let mut reader = BufReader::new(reader);
    let compressed = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    let document = if compressed {
        parse(BufReader::new(GzDecoder::new(reader)))?
    } else {
        parse(reader)?
    };

    let roots = match document {
        TraceDocument::Forest(roots) => roots,
        TraceDocument::Root(root) => vec![root],
    };
    if roots.is_empty() {
        return Err(TraceError::Empty);
    }

    tracing::debug!(roots = roots.len(), compressed, "loaded trace");
    Ok(roots)
}

/// Opens and reads a trace file.
pub fn load_trace(path: &Path) -> Result<Vec<Arc<Node>>, TraceError> {
    read_trace(File::open(path)?)
}
