use crate::photoexport_core::catalog::AssetRecord;
use crate::photoexport_core::timestamp::apple_to_unix;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolves companion files for primary assets. Lookup failures are
/// never fatal; they are recorded here (one warning per unmatched
/// asset) and the asset proceeds without its companion.
pub struct Matcher {
    warnings: Vec<String>,
}

impl Matcher {
    pub fn new() -> Self {
        Matcher { warnings: Vec::new() }
    }

    /// Warnings accumulated so far, in match order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Resolve the live photo video for a still asset. The grouping id
    /// is the content identifier of the pair.
    pub fn match_live_video(
        &mut self,
        record: &AssetRecord,
        index: &HashMap<String, PathBuf>,
        source_path: &Path,
    ) -> Option<PathBuf> {
        let Some(content_id) = record.grouping_id.as_deref() else {
            log::debug!("Asset {} has no content identifier, no video lookup", record.id);
            return None;
        };

        match index.get(content_id) {
            Some(path) => Some(path.clone()),
            None => {
                let message = format!(
                    "Couldn't find live photo video for {}, will keep it without a video",
                    source_path.display()
                );
                log::warn!("{message}");
                self.warnings.push(message);
                None
            }
        }
    }

    /// Resolve the rendered slomo video for a movie asset. The join
    /// key is the attachment's corrected modification timestamp; a
    /// missing attachment means no rendered variant is expected.
    pub fn match_rendered_slomo(
        &mut self,
        record: &AssetRecord,
        index: &HashMap<i64, PathBuf>,
        source_path: &Path,
    ) -> Option<PathBuf> {
        let Some(attachment_ts) = record.attachment_timestamp else {
            log::debug!("Asset {} has no attachment, no rendered slomo expected", record.id);
            return None;
        };

        match index.get(&apple_to_unix(attachment_ts)) {
            Some(path) => Some(path.clone()),
            None => {
                let message = format!(
                    "Couldn't find rendered slomo video for {}, will keep it without one",
                    source_path.display()
                );
                if record.has_companion == Some(true) {
                    log::error!("{message}");
                } else {
                    log::warn!("{message}");
                }
                self.warnings.push(message);
                None
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}
