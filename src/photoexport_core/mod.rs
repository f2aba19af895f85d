pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod pipeline;
pub mod predicate;
pub mod taxonomy;
pub mod timestamp;

pub use cache::ExportCache;
pub use catalog::{AssetRecord, Catalog};
pub use cli::Cli;
pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use extract::{ExifToolExtractor, MetadataExtractor, MetadataRecord};
pub use pipeline::{ExportTally, RunReport};
pub use taxonomy::Category;
