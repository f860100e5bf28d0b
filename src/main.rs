use clap::Parser;
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

use terra::core::config::{self, TerraConfig};
use terra::{Directory, Region};

#[derive(Parser)]
#[command(name = "terra", about = "Browse the countries of the world from a terminal")]
struct Args {
    /// Catalog service base URL (overrides config and TERRA_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Region to show first instead of the startup default
    #[arg(short, long, value_enum)]
    region: Option<Region>,

    /// Where to write the debug log
    #[arg(long, default_value = "terra.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Falling back to default config: {}", e);
        eprintln!("warning: {e}; using defaults");
        TerraConfig::default()
    });
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    info!("Terra starting up against {}", resolved.base_url);

    let directory = match Directory::from_config(&resolved) {
        Ok(directory) => directory,
        Err(e) => {
            error!("Could not build catalog client: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    terra::console::run(directory, args.region).await
}
