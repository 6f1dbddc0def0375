use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Stop after this many seconds instead of running until the feed closes.
    #[arg(long)]
    pub duration: Option<u64>,

    #[arg(short, long, default_value_t = log::LevelFilter::Info)]
    pub logging_level: log::LevelFilter,

    #[arg(long)]
    pub config_file: std::path::PathBuf,

    /// Write the destination heatmap to this file and exit.
    #[arg(long)]
    pub heatmap: Option<std::path::PathBuf>,
}
