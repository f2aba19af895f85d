use anyhow::Result;
use clap::Parser;
use photoexport::photoexport_core::error::ExportError;
use photoexport::photoexport_core::{Cli, ExportConfig, export, pipeline};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let terminal_level = if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("photoexport.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let config = ExportConfig::load(&cli.target)?;

    let report = match pipeline::run(&config, &cli.target) {
        Ok(report) => report,
        Err(e) => {
            export::discard_staging(&config.paths.staging);
            return Err(e.into());
        }
    };

    println!("\nSummary:");
    for (category, count) in report.tally.entries() {
        println!("  {category}: {count}");
    }
    println!("  total: {}", report.tally.total());
    println!(
        "The selected import batches contain {} catalog items.",
        report.catalog_items
    );
    if !report.match_warnings.is_empty() {
        println!(
            "{} assets are missing an expected companion, see the warnings above.",
            report.match_warnings.len()
        );
    }
    if !report.residue.is_empty() {
        println!(
            "{} assets could not be categorized, copy them manually if you need them.",
            report.residue.len()
        );
    }

    if !export::confirm("All good")? {
        report.staging.cleanup();
        return Err(ExportError::Cancelled.into());
    }

    let persist_result = (|| {
        let persisted = report.staging.persist_to(&cli.target)?;
        report.cache.save(&cli.target)?;
        Ok::<u64, ExportError>(persisted)
    })();
    report.staging.cleanup();
    let persisted = persist_result?;

    println!("\nExport complete!");
    println!("  {} files persisted to {}", persisted, cli.target.display());
    println!(
        "  {} import batches recorded as processed",
        report.new_batches.len()
    );

    Ok(())
}
