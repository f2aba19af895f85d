use crate::photoexport_core::error::{ExportError, Result};
use exiftool::ExifTool;
use serde_json::Value;
use std::path::PathBuf;

/// One flat key/value metadata record, keyed as `Group:Tag`.
pub type MetadataRecord = serde_json::Map<String, Value>;

pub const SOURCE_FILE_KEY: &str = "SourceFile";
pub const FILE_NAME_KEY: &str = "System:FileName";

/// Batched metadata extraction over a set of files.
///
/// Implementations may omit records for files they cannot parse, and
/// individual records may lack keys. Callers must not invoke this on
/// an empty candidate set; the batch has a fixed startup cost.
pub trait MetadataExtractor {
    fn extract_batch(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>>;
}

/// Extractor backed by a single stay-open exiftool process. The
/// process is started on the first batch, so constructing this is
/// free when no candidates turn up.
pub struct ExifToolExtractor {
    tool: Option<ExifTool>,
}

impl ExifToolExtractor {
    pub fn new() -> Self {
        ExifToolExtractor { tool: None }
    }

    fn tool(&mut self) -> Result<&mut ExifTool> {
        match &mut self.tool {
            Some(tool) => Ok(tool),
            slot => {
                let tool = ExifTool::new().map_err(|e| ExportError::Exiftool(e.to_string()))?;
                Ok(slot.insert(tool))
            }
        }
    }
}

impl Default for ExifToolExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor for ExifToolExtractor {
    fn extract_batch(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        let tool = self.tool()?;
        let mut records = Vec::with_capacity(files.len());

        for path in files {
            // Group-prefixed keys (-G) keep QuickTime fields apart from
            // file-system fields of the same name.
            let value: Value = match tool.read_metadata(path, &["-G"]) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Failed to read metadata for {}: {}", path.display(), e);
                    continue;
                }
            };

            match value {
                Value::Object(mut record) => {
                    record
                        .entry(SOURCE_FILE_KEY)
                        .or_insert_with(|| Value::String(path.display().to_string()));
                    records.push(record);
                }
                other => {
                    log::warn!(
                        "Unexpected metadata shape for {}: {}",
                        path.display(),
                        other
                    );
                }
            }
        }

        Ok(records)
    }
}

/// Fetch a string field from a metadata record.
pub fn record_str<'a>(record: &'a MetadataRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Best-effort display name for a record, for warnings.
pub fn record_name(record: &MetadataRecord) -> &str {
    record_str(record, FILE_NAME_KEY)
        .or_else(|| record_str(record, SOURCE_FILE_KEY))
        .unwrap_or("<unknown file>")
}
