use crate::photoexport_core::cache::ExportCache;
use crate::photoexport_core::catalog::{AssetRecord, Catalog};
use crate::photoexport_core::config::ExportConfig;
use crate::photoexport_core::error::Result;
use crate::photoexport_core::export::{StagingArea, progress_style};
use crate::photoexport_core::extract::{ExifToolExtractor, MetadataExtractor};
use crate::photoexport_core::index::{
    build_content_id_index, build_timestamp_index, scan_candidates,
};
use crate::photoexport_core::matcher::Matcher;
use crate::photoexport_core::predicate::{Expr, Field};
use crate::photoexport_core::taxonomy::{
    CATEGORIES, Category, CategoryAction, CategorySpec, CompanionKind, precedence_expr,
    residue_expr,
};
use crate::photoexport_core::timestamp::filename_prefix;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Glob for live photo companion videos under resources/media/master.
const LIVE_VIDEO_GLOB: &str = "**/*.mov";

/// Glob for rendered slomo videos under resources/media/version.
const RENDERED_SLOMO_GLOB: &str = "**/fullsizeoutput_*.mov";

/// Per-category counters, in processing order.
#[derive(Debug, Default)]
pub struct ExportTally {
    entries: Vec<(String, u64)>,
    total: u64,
}

impl ExportTally {
    pub fn add(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
        self.total += 1;
    }

    pub fn count(&self, key: &str) -> u64 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Everything a run produced, handed back for the confirm gate.
#[derive(Debug)]
pub struct RunReport {
    pub tally: ExportTally,
    pub staging: StagingArea,
    pub cache: ExportCache,
    pub new_batches: Vec<String>,
    pub match_warnings: Vec<String>,
    pub residue: Vec<String>,
    /// Number of catalog rows covered by this run's batch filter.
    pub catalog_items: i64,
}

/// Run the classification and staging pipeline. Nothing outside the
/// staging area is written; persisting and cache updates happen after
/// the caller's confirmation.
pub fn run(config: &ExportConfig, target: &Path) -> Result<RunReport> {
    let mut extractor = ExifToolExtractor::new();
    run_with_extractor(config, target, &mut extractor)
}

pub fn run_with_extractor(
    config: &ExportConfig,
    target: &Path,
    extractor: &mut dyn MetadataExtractor,
) -> Result<RunReport> {
    log::info!("Creating working copy of the catalog...");
    let mut staging = StagingArea::new(&config.paths.staging)?;
    let working_copy = Catalog::create_working_copy(&config.catalog_path(), staging.root())?;
    let catalog = Catalog::open(&working_copy)?;

    log::info!("Processing list of already-exported import batches...");
    let mut cache = ExportCache::load(target)?;
    let new_batches: Vec<String> = catalog
        .distinct_import_batches()?
        .into_iter()
        .filter(|batch| !cache.is_processed(batch))
        .collect();
    log::info!("{} import batches not yet exported", new_batches.len());
    let batch_filter = Expr::InList(Field::ImportBatchId, new_batches.clone());

    log::info!("Building index of live photo videos...");
    let live_candidates = scan_candidates(&config.live_video_root(), LIVE_VIDEO_GLOB)?;
    let live_index = build_content_id_index(&live_candidates, extractor, &cache.live_video_index)?;
    cache.live_video_index = live_index.clone();

    log::info!("Building index of rendered slomo videos...");
    let slomo_candidates = scan_candidates(&config.version_root(), RENDERED_SLOMO_GLOB)?;
    let slomo_index = build_timestamp_index(&slomo_candidates, extractor)?;

    let masters_root = config.masters_root();
    let mut matcher = Matcher::new();
    let mut tally = ExportTally::default();

    for (position, spec) in CATEGORIES.iter().enumerate() {
        log::info!("Collecting {} assets...", spec.category);
        let expr = Expr::All(vec![precedence_expr(position), batch_filter.clone()]);
        let assets = catalog.query_assets(&expr)?;

        let bar = ProgressBar::new(assets.len() as u64).with_style(progress_style());
        bar.set_message(spec.category.as_str());

        for asset in &assets {
            process_asset(
                spec,
                asset,
                &masters_root,
                &live_index,
                &slomo_index,
                &mut matcher,
                &mut staging,
                &mut tally,
            )?;
            bar.inc(1);
        }
        bar.finish_with_message(format!("{} done", spec.category));
    }

    log::info!("Auditing assets that match no category...");
    let residue_filter = Expr::All(vec![residue_expr(), batch_filter.clone()]);
    let mut residue = Vec::new();
    for asset in catalog.query_assets(&residue_filter)? {
        let path = masters_root.join(&asset.relative_path);
        log::warn!("Could not categorize {}, copy it manually if needed", path.display());
        residue.push(path.display().to_string());
        tally.add(Category::Unknown.as_str());
    }

    cache.record_batches(&new_batches);
    let catalog_items = catalog.count_assets(&batch_filter)?;

    Ok(RunReport {
        tally,
        staging,
        cache,
        new_batches,
        match_warnings: matcher.warnings().to_vec(),
        residue,
        catalog_items,
    })
}

/// The one parameterized per-asset routine: resolve the companion,
/// derive the filename prefix, stage, tally.
#[allow(clippy::too_many_arguments)]
fn process_asset(
    spec: &CategorySpec,
    asset: &AssetRecord,
    masters_root: &Path,
    live_index: &HashMap<String, PathBuf>,
    slomo_index: &HashMap<i64, PathBuf>,
    matcher: &mut Matcher,
    staging: &mut StagingArea,
    tally: &mut ExportTally,
) -> Result<()> {
    let source = masters_root.join(&asset.relative_path);

    let companion = match spec.companion {
        CompanionKind::None => None,
        CompanionKind::LiveVideo => matcher.match_live_video(asset, live_index, &source),
        CompanionKind::RenderedSlomo => matcher.match_rendered_slomo(asset, slomo_index, &source),
    };

    if spec.action == CategoryAction::Export {
        let tag = category_tag(spec.category, asset, companion.is_some());
        let prefix = format!(
            "{}{}",
            filename_prefix(asset.creation_timestamp, asset.id)?,
            tag
        );

        staging.stage_file(&source, &prefix)?;
        if source
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("heic"))
        {
            tally.add("jpeg_preview");
        }

        if let Some(companion_path) = &companion {
            match spec.companion {
                CompanionKind::LiveVideo => {
                    staging.stage_file(companion_path, &prefix)?;
                    tally.add("live_photo_video");
                }
                CompanionKind::RenderedSlomo => {
                    staging.stage_file(companion_path, &format!("{prefix}rendered_"))?;
                    tally.add("rendered_slomo_video");
                }
                CompanionKind::None => {}
            }
        }
    }

    tally.add(spec.category.as_str());
    Ok(())
}

/// Category-specific token appended to the filename prefix.
fn category_tag(category: Category, asset: &AssetRecord, has_companion: bool) -> String {
    match category {
        Category::Photo if asset.is_selfie == Some(true) => "selfie_".to_string(),
        Category::Video if has_companion => "slomo_".to_string(),
        Category::Burst => match &asset.burst_id {
            Some(burst_id) => format!("burst_{burst_id}_"),
            None => "burst_".to_string(),
        },
        other => other.tag_token().to_string(),
    }
}
