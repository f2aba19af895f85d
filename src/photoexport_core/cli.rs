use clap::Parser;
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Export and classify media from an Apple Photos library")]
pub struct Cli {
    /// Target directory (must contain photoexport.ini)
    #[arg(required = true)]
    pub target: PathBuf,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable file logging to photoexport.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}
