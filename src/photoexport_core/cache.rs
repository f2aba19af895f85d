use crate::photoexport_core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache document living next to the configuration in the target.
pub const CACHE_FILE_NAME: &str = "photoexport.json";

/// Superseded newline-delimited batch list; still read for migration.
pub const LEGACY_LIST_NAME: &str = "photoexport.lst";

/// State that persists across runs: which import batches were already
/// exported, and the accumulated content-id index of live photo
/// videos. Rewritten atomically, and only after a confirmed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportCache {
    #[serde(default)]
    pub processed_batch_ids: Vec<String>,
    #[serde(default)]
    pub live_video_index: HashMap<String, PathBuf>,
}

impl ExportCache {
    /// Load the cache from the target directory. Batch ids from the
    /// legacy list file are merged in, so upgrading never re-exports
    /// old batches.
    pub fn load(target: &Path) -> Result<Self> {
        let cache_path = target.join(CACHE_FILE_NAME);
        let mut cache: ExportCache = if cache_path.is_file() {
            serde_json::from_str(&fs::read_to_string(&cache_path)?)?
        } else {
            log::debug!("No cache at {}, starting fresh", cache_path.display());
            ExportCache::default()
        };

        let legacy_path = target.join(LEGACY_LIST_NAME);
        if legacy_path.is_file() {
            log::info!("Merging legacy batch list {}", legacy_path.display());
            for line in fs::read_to_string(&legacy_path)?.lines() {
                let batch = line.trim();
                if !batch.is_empty() {
                    cache.record_batch(batch);
                }
            }
        }

        Ok(cache)
    }

    pub fn is_processed(&self, batch: &str) -> bool {
        self.processed_batch_ids.iter().any(|b| b == batch)
    }

    /// Append a batch id unless it is already recorded.
    pub fn record_batch(&mut self, batch: &str) {
        if !self.is_processed(batch) {
            self.processed_batch_ids.push(batch.to_string());
        }
    }

    pub fn record_batches<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, batches: I) {
        for batch in batches {
            self.record_batch(batch.as_ref());
        }
    }

    /// Write the cache atomically: serialize to a temp file in the
    /// same directory, then rename over the old document.
    pub fn save(&self, target: &Path) -> Result<()> {
        let cache_path = target.join(CACHE_FILE_NAME);
        let tmp_path = target.join(format!("{CACHE_FILE_NAME}.tmp"));

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &cache_path)?;

        log::debug!("Wrote cache to {}", cache_path.display());
        Ok(())
    }
}
