use clap::Parser;
use parley::core::config::{self, CliOverrides, ParleyConfig};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parley", about = "Terminal chat composer with image attachments")]
struct Args {
    /// Directory the library browser lists images from
    #[arg(long)]
    library_dir: Option<PathBuf>,

    /// Maximum images per picker session
    #[arg(long)]
    selection_limit: Option<usize>,

    /// Disable the local bot replies
    #[arg(long)]
    no_bot: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to parley.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("parley.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        ParleyConfig::default()
    });
    let cli = CliOverrides {
        library_dir: args.library_dir,
        selection_limit: args.selection_limit,
        no_bot: args.no_bot,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "Parley starting up (selection limit {}, library {})",
        resolved.selection_limit,
        resolved.library_dir.display()
    );

    parley::tui::run(resolved)
}
