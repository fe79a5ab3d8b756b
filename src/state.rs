use crate::types::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Persisted record of entry guids already processed in earlier runs.
///
/// Insertion order is the recency order: `save` keeps the tail of the list,
/// so the oldest guids are the ones dropped when the bound is exceeded.
#[derive(Debug, Default)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

#[derive(Serialize, Deserialize)]
struct StateFile {
    seen: Vec<String>,
}

impl SeenSet {
    /// Load the persisted set. A missing file yields an empty set; a file
    /// that exists but does not parse is fatal, never silently reset.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No state file at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let file: StateFile =
            serde_json::from_str(&text).map_err(|source| PipelineError::CorruptState {
                path: path.to_path_buf(),
                source,
            })?;
        let mut set = Self::default();
        for guid in file.seen {
            set.add(&guid);
        }
        info!("Loaded {} seen guids from {}", set.len(), path.display());
        Ok(set)
    }

    /// Persist the set, truncated to the most recent `max_seen` guids.
    /// Written via a temp file + rename so a crash never leaves a torn file.
    pub fn save(&self, path: &Path, max_seen: usize) -> Result<()> {
        let start = self.order.len().saturating_sub(max_seen);
        let file = StateFile {
            seen: self.order[start..].to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        info!("Saved {} seen guids to {}", file.seen.len(), path.display());
        Ok(())
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.index.contains(guid)
    }

    /// Record a guid as seen. Returns false if it was already present.
    pub fn add(&mut self, guid: &str) -> bool {
        if !self.index.insert(guid.to_string()) {
            return false;
        }
        self.order.push(guid.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
