//! Where candidate items come from.
//!
//! The feed boundary asks a [`ContentSource`] for the already-fetched
//! catalog. Production wires this to the document store; the CLI and tests
//! use a JSON file or an in-memory list.

use std::path::{Path, PathBuf};

use crate::content::ContentItem;
use crate::error::{FeedSmithError, Result};

pub trait ContentSource {
    fn fetch(&self) -> Result<Vec<ContentItem>>;
}

/// A fixed list of items.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    items: Vec<ContentItem>,
}

impl InMemorySource {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }
}

impl ContentSource for InMemorySource {
    fn fetch(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.clone())
    }
}

/// A JSON array of items on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<ContentItem>> {
        load_items(&self.path)
    }
}

/// Read a JSON array of content items.
///
/// The file must hold an array. Entries that are not item objects are
/// logged and skipped.
pub fn load_items(path: &Path) -> Result<Vec<ContentItem>> {
    if !path.exists() {
        return Err(FeedSmithError::invalid_path(
            path.display().to_string(),
            "file does not exist",
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FeedSmithError::io(format!("reading items from '{}'", path.display()), e))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| FeedSmithError::parse(path.display().to_string(), e.to_string()))?;

    let total = records.len();
    let items: Vec<ContentItem> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    error = %e,
                    "skipping unreadable item"
                );
                None
            }
        })
        .collect();
    tracing::debug!(
        path = %path.display(),
        count = items.len(),
        skipped = total - items.len(),
        "loaded items"
    );
    Ok(items)
}
