use crate::photoexport_core::error::{ExportError, Result};
use crate::photoexport_core::predicate::{Expr, Field};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::fs;
use std::path::{Path, PathBuf};

/// One master-asset row, left-joined against the version table
/// (selfie flag) and the attachments table (companion hint).
#[derive(Debug, Clone)]
pub struct AssetRecord {
    /// Stable unique id, used to build deterministic output filenames.
    pub id: i64,
    pub filename: String,
    /// Path relative to the library's Masters root.
    pub relative_path: String,
    /// Creation timestamp in the catalog's native epoch.
    pub creation_timestamp: i64,
    /// Content identifier linking the asset to a same-moment set.
    pub grouping_id: Option<String>,
    pub burst_id: Option<String>,
    /// UTI encoding tag, e.g. public.heic or com.apple.quicktime-movie.
    pub type_tag: String,
    pub import_batch_id: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Hint that a rendered companion exists (hasAttachments).
    pub has_companion: Option<bool>,
    pub is_selfie: Option<bool>,
    /// Attachment file modification date, catalog epoch. Join key for
    /// the rendered-slomo index.
    pub attachment_timestamp: Option<i64>,
}

impl AssetRecord {
    pub fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Filename => Some(&self.filename),
            Field::TypeTag => Some(&self.type_tag),
            Field::GroupingId => self.grouping_id.as_deref(),
            Field::BurstId => self.burst_id.as_deref(),
            Field::ImportBatchId => self.import_batch_id.as_deref(),
            Field::Width | Field::Height => None,
        }
    }

    pub fn int_field(&self, field: Field) -> Option<i64> {
        match field {
            Field::Width => self.width,
            Field::Height => self.height,
            _ => None,
        }
    }

    pub fn field_is_null(&self, field: Field) -> bool {
        match field {
            Field::Filename | Field::TypeTag => false,
            Field::GroupingId => self.grouping_id.is_none(),
            Field::BurstId => self.burst_id.is_none(),
            Field::ImportBatchId => self.import_batch_id.is_none(),
            Field::Width => self.width.is_none(),
            Field::Height => self.height.is_none(),
        }
    }
}

/// Read-only view of the photos catalog.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Copy the catalog database into the staging directory and return
    /// the path of the working copy. The live database is never opened.
    pub fn create_working_copy(catalog_path: &Path, staging_root: &Path) -> Result<PathBuf> {
        if !catalog_path.is_file() {
            return Err(ExportError::CatalogNotFound(catalog_path.to_path_buf()));
        }
        fs::create_dir_all(staging_root)?;
        let working_copy = staging_root.join("photos.db");
        fs::copy(catalog_path, &working_copy)?;
        log::debug!(
            "Copied catalog {} to working copy {}",
            catalog_path.display(),
            working_copy.display()
        );
        Ok(working_copy)
    }

    /// Open a catalog database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ExportError::CatalogNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Catalog { conn })
    }

    /// Fetch all asset records matching the given predicate, ordered by id.
    pub fn query_assets(&self, expr: &Expr) -> Result<Vec<AssetRecord>> {
        let mut params = Vec::new();
        let where_sql = expr.to_sql(&mut params);
        let sql = format!(
            "SELECT m.modelId, m.fileName, m.imagePath, m.fileCreationDate,
                    m.mediaGroupId, m.burstUuid, m.UTI, m.importGroupUuid,
                    m.width, m.height, m.hasAttachments,
                    v.selfPortrait, a.fileModificationDate
             FROM RKMaster m
             LEFT JOIN RKVersion v ON m.uuid = v.masterUuid
             LEFT JOIN RKAttachment a ON m.uuid = a.attachedToUuid
             WHERE {where_sql}
             ORDER BY m.modelId"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(AssetRecord {
                id: row.get(0)?,
                filename: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                relative_path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                creation_timestamp: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0) as i64,
                grouping_id: row.get(4)?,
                burst_id: row.get(5)?,
                type_tag: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                import_batch_id: row.get(7)?,
                width: row.get(8)?,
                height: row.get(9)?,
                has_companion: row.get::<_, Option<i64>>(10)?.map(|v| v != 0),
                is_selfie: row.get::<_, Option<i64>>(11)?.map(|v| v != 0),
                attachment_timestamp: row.get::<_, Option<f64>>(12)?.map(|v| v as i64),
            })
        })?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row?);
        }
        Ok(assets)
    }

    /// Count assets matching the given predicate.
    pub fn count_assets(&self, expr: &Expr) -> Result<i64> {
        let mut params = Vec::new();
        let where_sql = expr.to_sql(&mut params);
        let sql = format!("SELECT COUNT(*) FROM RKMaster m WHERE {where_sql}");
        let mut stmt = self.conn.prepare(&sql)?;
        let count = stmt.query_row(params_from_iter(params), |row| row.get(0))?;
        Ok(count)
    }

    /// All distinct import batch ids present in the master table. Rows
    /// without a batch id are skipped; they never pass the batch filter.
    pub fn distinct_import_batches(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT m.importGroupUuid FROM RKMaster m")?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut batches = Vec::new();
        for row in rows {
            match row? {
                Some(batch) => batches.push(batch),
                None => log::warn!("Found assets without an import batch id, ignoring them"),
            }
        }
        Ok(batches)
    }
}
