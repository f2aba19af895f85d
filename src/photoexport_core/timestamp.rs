use crate::photoexport_core::error::{ExportError, Result};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Seconds between the catalog's reference epoch (2001-01-01) and the
/// Unix epoch: 31 years plus 8 leap days.
pub const APPLE_EPOCH_OFFSET: i64 = 977_616_000 + 691_200;

/// Filename timestamp format, UTC: 2019-03-30_18-30-14
pub const PREFIX_DATE_FORMAT: &[FormatItem] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// Directory grouping format, UTC: 2019/03_March
pub const GROUP_DIR_FORMAT: &[FormatItem] =
    format_description!("[year]/[month]_[month repr:long]");

/// Convert a catalog timestamp to a Unix timestamp.
pub fn apple_to_unix(ts: i64) -> i64 {
    ts + APPLE_EPOCH_OFFSET
}

fn datetime_from_unix(ts: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| ExportError::InvalidDateFormat(e.to_string()))
}

/// Format the corrected timestamp for use in an exported filename.
pub fn format_prefix_date(unix_ts: i64) -> Result<String> {
    datetime_from_unix(unix_ts)?
        .format(PREFIX_DATE_FORMAT)
        .map_err(|e| ExportError::InvalidDateFormat(e.to_string()))
}

/// Format the corrected timestamp as the year/month grouping directory.
pub fn format_group_dir(unix_ts: i64) -> Result<String> {
    datetime_from_unix(unix_ts)?
        .format(GROUP_DIR_FORMAT)
        .map_err(|e| ExportError::InvalidDateFormat(e.to_string()))
}

/// Assemble the relative filename prefix for an asset: the grouping
/// directory plus `<timestamp>_<id>_`. The asset id keeps prefixes
/// unique even when two assets share a creation second.
pub fn filename_prefix(catalog_ts: i64, id: i64) -> Result<String> {
    let unix_ts = apple_to_unix(catalog_ts);
    Ok(format!(
        "{}/{}_{}_",
        format_group_dir(unix_ts)?,
        format_prefix_date(unix_ts)?,
        id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_offset_lands_on_reference_date() {
        // Catalog timestamp 0 is the vendor reference epoch.
        assert_eq!(format_prefix_date(apple_to_unix(0)).unwrap(), "2001-01-01_00-00-00");
    }

    #[test]
    fn test_format_prefix_date() {
        // 546805814 seconds past the reference epoch.
        let unix_ts = apple_to_unix(546_805_814);
        assert_eq!(format_prefix_date(unix_ts).unwrap(), "2018-04-30_18-30-14");
    }

    #[test]
    fn test_group_dir_has_month_name() {
        let unix_ts = apple_to_unix(546_805_814);
        assert_eq!(format_group_dir(unix_ts).unwrap(), "2018/04_April");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let unix_ts = apple_to_unix(546_805_814);
        let first = format_prefix_date(unix_ts).unwrap();
        let second = format_prefix_date(unix_ts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filename_prefix() {
        let prefix = filename_prefix(546_805_814, 42).unwrap();
        assert_eq!(prefix, "2018/04_April/2018-04-30_18-30-14_42_");
    }
}
