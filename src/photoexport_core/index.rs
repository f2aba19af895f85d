use crate::photoexport_core::error::{ExportError, Result};
use crate::photoexport_core::extract::{
    MetadataExtractor, SOURCE_FILE_KEY, record_name, record_str,
};
use globset::GlobBuilder;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;
use walkdir::WalkDir;

/// Correlation key linking a live photo to its companion video.
pub const CONTENT_ID_KEY: &str = "QuickTime:ContentIdentifier";

/// Capture date of a rendered slow-motion video, with offset.
pub const DATE_TIME_ORIGINAL_KEY: &str = "QuickTime:DateTimeOriginal";

const QUICKTIME_DATE_FORMAT: &[FormatItem] = format_description!(
    "[year]:[month]:[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

/// Collect companion candidate files under `root` matching `pattern`.
/// A missing root yields an empty candidate set.
pub fn scan_candidates(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        log::debug!("Companion root {} does not exist, skipping scan", root.display());
        return Ok(Vec::new());
    }

    let matcher = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()?
        .compile_matcher();

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            candidates.push(entry.into_path());
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Build the content-identifier index for live photo videos.
///
/// Files already present as values of `cached` are not re-extracted;
/// fresh results merge into the cached index under first-writer-wins,
/// so a key discovered in an earlier run keeps its original path. An
/// empty fresh set short-circuits without touching the extractor.
pub fn build_content_id_index(
    candidates: &[PathBuf],
    extractor: &mut dyn MetadataExtractor,
    cached: &HashMap<String, PathBuf>,
) -> Result<HashMap<String, PathBuf>> {
    let mut index = cached.clone();

    let known: HashSet<&Path> = cached.values().map(PathBuf::as_path).collect();
    let fresh: Vec<PathBuf> = candidates
        .iter()
        .filter(|p| !known.contains(p.as_path()))
        .cloned()
        .collect();

    if fresh.is_empty() {
        log::info!("No new live photo videos to index");
        return Ok(index);
    }

    log::info!("Batch-extracting metadata for {} live photo videos", fresh.len());
    for record in extractor.extract_batch(&fresh)? {
        let Some(source) = record_str(&record, SOURCE_FILE_KEY) else {
            log::warn!("Metadata record without a source path, ignoring");
            continue;
        };
        match record_str(&record, CONTENT_ID_KEY) {
            Some(content_id) => {
                index
                    .entry(content_id.to_string())
                    .or_insert_with(|| PathBuf::from(source));
            }
            None => log::warn!(
                "Couldn't find {} field for {}, will ignore",
                CONTENT_ID_KEY,
                record_name(&record)
            ),
        }
    }

    Ok(index)
}

/// Build the corrected-timestamp index for rendered slomo videos.
/// Rebuilt fresh every run; first-writer-wins within the scan.
pub fn build_timestamp_index(
    candidates: &[PathBuf],
    extractor: &mut dyn MetadataExtractor,
) -> Result<HashMap<i64, PathBuf>> {
    let mut index = HashMap::new();

    if candidates.is_empty() {
        log::info!("No rendered slomo videos to index");
        return Ok(index);
    }

    log::info!("Batch-extracting metadata for {} rendered videos", candidates.len());
    for record in extractor.extract_batch(candidates)? {
        let Some(source) = record_str(&record, SOURCE_FILE_KEY) else {
            log::warn!("Metadata record without a source path, ignoring");
            continue;
        };
        match record_str(&record, DATE_TIME_ORIGINAL_KEY) {
            Some(date) => match parse_quicktime_date(date) {
                Ok(ts) => {
                    index.entry(ts).or_insert_with(|| PathBuf::from(source));
                }
                Err(e) => log::warn!(
                    "Couldn't parse {} '{}' for {}: {}",
                    DATE_TIME_ORIGINAL_KEY,
                    date,
                    record_name(&record),
                    e
                ),
            },
            None => log::warn!(
                "Couldn't find {} field for {}, will ignore",
                DATE_TIME_ORIGINAL_KEY,
                record_name(&record)
            ),
        }
    }

    Ok(index)
}

/// Parse a QuickTime date like `2019:03:30 18:30:14+02:00` to a Unix
/// timestamp.
pub fn parse_quicktime_date(date: &str) -> Result<i64> {
    OffsetDateTime::parse(date, QUICKTIME_DATE_FORMAT)
        .map(OffsetDateTime::unix_timestamp)
        .map_err(|e| ExportError::InvalidDateFormat(e.to_string()))
}
