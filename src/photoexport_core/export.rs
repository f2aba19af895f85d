use crate::photoexport_core::error::{ExportError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Shared progress bar template.
pub fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap()
}

/// Quality passed to sips for JPEG previews.
const PREVIEW_QUALITY: u32 = 80;

/// Scratch directory where exported files accumulate before the
/// operator confirms the run. Nothing under the final target is
/// touched until `persist_to`.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    staged: Vec<PathBuf>,
}

impl StagingArea {
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(StagingArea {
            root: root.to_path_buf(),
            staged: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Copy `source` into the staging area under `rel_prefix` plus the
    /// source's file stem, with the extension lowercased. HEIC
    /// originals additionally get a JPEG preview next to the copy.
    pub fn stage_file(&mut self, source: &Path, rel_prefix: &str) -> Result<()> {
        let stem = source
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let extension = source
            .extension()
            .unwrap_or_default()
            .to_string_lossy()
            .to_lowercase();

        let destination = if extension.is_empty() {
            self.root.join(format!("{rel_prefix}{stem}"))
        } else {
            self.root.join(format!("{rel_prefix}{stem}.{extension}"))
        };
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &destination)?;
        log::debug!("Staged {} as {}", source.display(), destination.display());
        self.staged.push(destination);

        if extension == "heic" {
            let preview = self.root.join(format!("{rel_prefix}{stem}.jpg"));
            convert_heic_to_jpeg(source, &preview)?;
            self.staged.push(preview);
        }

        Ok(())
    }

    /// Copy every staged file to the target, preserving the relative
    /// layout built during staging.
    pub fn persist_to(&self, target: &Path) -> Result<u64> {
        log::info!("Persisting {} exported files to target", self.staged.len());
        let bar = ProgressBar::new(self.staged.len() as u64).with_style(progress_style());
        bar.set_message("Persisting files");

        let mut persisted = 0;
        for staged_path in &self.staged {
            let relative = staged_path
                .strip_prefix(&self.root)
                .unwrap_or(staged_path.as_path());
            let target_path = target.join(relative);
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent)?;
            }
            if target_path.exists() {
                log::warn!("Overwriting {}", target_path.display());
            }
            fs::copy(staged_path, &target_path)?;
            persisted += 1;
            bar.inc(1);
        }

        bar.finish_with_message("Persist complete");
        Ok(persisted)
    }

    /// Remove the staging directory and everything in it.
    pub fn cleanup(&self) {
        discard_staging(&self.root);
    }
}

/// Best-effort removal of a staging directory.
pub fn discard_staging(root: &Path) {
    if root.is_dir() {
        log::info!("Removing staging directory {}", root.display());
        if let Err(e) = fs::remove_dir_all(root) {
            log::warn!("Failed to remove {}: {}", root.display(), e);
        }
    }
}

/// Produce a JPEG preview of a HEIC image via sips. A failed
/// invocation is fatal.
pub fn convert_heic_to_jpeg(source: &Path, destination: &Path) -> Result<()> {
    let output = Command::new("sips")
        .args(["-s", "format", "jpeg", "-s", "formatOptions"])
        .arg(PREVIEW_QUALITY.to_string())
        .arg(source)
        .arg("--out")
        .arg(destination)
        .output()
        .map_err(|e| ExportError::Conversion {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ExportError::Conversion {
            path: source.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Interactive yes/no gate. Anything but an explicit `y` declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} (y/N)? ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_persist() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        let source = source_dir.join("IMG_0042.JPG");
        fs::write(&source, b"fake image data").unwrap();

        let staging_root = temp_dir.path().join("staging");
        let mut staging = StagingArea::new(&staging_root).unwrap();
        staging
            .stage_file(&source, "2018/04_April/2018-04-30_18-30-14_42_burst_B1_")
            .unwrap();

        let staged =
            staging_root.join("2018/04_April/2018-04-30_18-30-14_42_burst_B1_IMG_0042.jpg");
        assert!(staged.is_file());
        assert_eq!(staging.staged_count(), 1);

        let target = temp_dir.path().join("target");
        fs::create_dir_all(&target).unwrap();
        let persisted = staging.persist_to(&target).unwrap();
        assert_eq!(persisted, 1);
        assert!(
            target
                .join("2018/04_April/2018-04-30_18-30-14_42_burst_B1_IMG_0042.jpg")
                .is_file()
        );

        staging.cleanup();
        assert!(!staging_root.exists());
    }

    #[test]
    fn test_stage_lowercases_extension_only() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let source = temp_dir.path().join("IMG_0001.PNG");
        fs::write(&source, b"png").unwrap();

        let staging_root = temp_dir.path().join("staging");
        let mut staging = StagingArea::new(&staging_root).unwrap();
        staging.stage_file(&source, "2018/04_April/p_").unwrap();

        assert!(staging_root.join("2018/04_April/p_IMG_0001.png").is_file());
    }

    #[test]
    fn test_discard_missing_staging_is_quiet() {
        discard_staging(Path::new("/nonexistent/photoexport-staging"));
    }
}
