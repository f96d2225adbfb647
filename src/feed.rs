//! Blob feed loading
//!
//! The classification pipeline hands over spawn requests as JSON, either a
//! bare array or the transport's `{ "blobs": [...] }` envelope.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::sim::SpawnRequest;

/// Errors that can occur when loading a feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// Records stay raw until the outer shape is known, so one malformed
// record can't sink the rest of the feed.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedShape {
    Bare(Vec<Value>),
    Envelope { blobs: Vec<Value> },
}

/// Parse spawn requests from a JSON string.
///
/// Only the outer shape can fail. Records that aren't objects are skipped.
pub fn parse_feed(json: &str) -> Result<Vec<SpawnRequest>, FeedError> {
    let shape: FeedShape = serde_json::from_str(json)?;
    let records = match shape {
        FeedShape::Bare(records) => records,
        FeedShape::Envelope { blobs } => blobs,
    };

    let mut reqs = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<SpawnRequest>(record) {
            Ok(req) => reqs.push(req),
            Err(e) => log::warn!("Skipping feed record {}: {}", index, e),
        }
    }
    Ok(reqs)
}

/// Load spawn requests from a JSON file on disk
pub fn load_feed(path: &Path) -> Result<Vec<SpawnRequest>, FeedError> {
    let content = std::fs::read_to_string(path)?;
    let reqs = parse_feed(&content)?;
    log::info!("Loaded {} spawn requests from {}", reqs.len(), path.display());
    Ok(reqs)
}
