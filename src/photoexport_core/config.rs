use crate::photoexport_core::error::{ExportError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file expected inside the target directory.
pub const CONFIG_FILE_NAME: &str = "photoexport.ini";

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Absolute path to the .photoslibrary package.
    pub library: PathBuf,
    /// Scratch directory for the working database copy and staged files.
    pub staging: PathBuf,
}

impl ExportConfig {
    /// Load the configuration from `<target>/photoexport.ini` and verify
    /// that the library it points at exists.
    pub fn load(target: &Path) -> Result<Self> {
        let config_path = target.join(CONFIG_FILE_NAME);
        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).format(config::FileFormat::Ini))
            .build()?;
        let cfg: ExportConfig = settings.try_deserialize()?;

        if !cfg.paths.library.is_dir() {
            return Err(ExportError::LibraryNotFound(cfg.paths.library));
        }

        Ok(cfg)
    }

    /// Path to the catalog database inside the library package.
    pub fn catalog_path(&self) -> PathBuf {
        self.paths.library.join("database/photos.db")
    }

    /// Root of the raw master images and videos.
    pub fn masters_root(&self) -> PathBuf {
        self.paths.library.join("Masters")
    }

    /// Directory holding live photo companion videos.
    pub fn live_video_root(&self) -> PathBuf {
        self.paths.library.join("resources/media/master")
    }

    /// Directory holding rendered variants, including rendered slomos.
    pub fn version_root(&self) -> PathBuf {
        self.paths.library.join("resources/media/version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_valid_config() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let library = temp_dir.path().join("Photos.photoslibrary");
        fs::create_dir_all(&library).unwrap();

        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            format!(
                "[paths]\nlibrary = {}\nstaging = {}\n",
                library.display(),
                temp_dir.path().join("tmp").display()
            ),
        )
        .unwrap();

        let cfg = ExportConfig::load(temp_dir.path()).unwrap();
        assert_eq!(cfg.paths.library, library);
        assert!(cfg.catalog_path().ends_with("database/photos.db"));
        assert!(cfg.masters_root().ends_with("Masters"));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        assert!(ExportConfig::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_load_missing_library() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[paths]\nlibrary = /nonexistent/Photos.photoslibrary\nstaging = /tmp/pe\n",
        )
        .unwrap();

        let err = ExportConfig::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::LibraryNotFound(_)));
    }
}
