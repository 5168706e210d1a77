use clap::Parser;
use drone_agl::config::{AGL_OFFSET_FEET, LATITUDE_OFFSET, LONGITUDE_OFFSET};
use drone_agl::features::elevation::GOOGLE_ELEVATION_ENDPOINT;
use drone_agl::{AglAnalyzer, Calibration, GoogleElevation};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compute above-ground-level altitude for every geotagged drone photo under the given folders.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Folders to scan recursively.
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Elevation API key.
    #[arg(long, env = "GMAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Elevation endpoint answering in the Google Elevation API JSON format.
    #[arg(long, default_value = GOOGLE_ELEVATION_ENDPOINT)]
    elevation_url: String,

    /// Subtracted from every latitude, in decimal degrees.
    #[arg(long, default_value_t = LATITUDE_OFFSET, allow_hyphen_values = true)]
    latitude_offset: f64,

    /// Subtracted from every longitude, in decimal degrees.
    #[arg(long, default_value_t = LONGITUDE_OFFSET, allow_hyphen_values = true)]
    longitude_offset: f64,

    /// Added to every AGL value in feet.
    #[arg(long, default_value_t = AGL_OFFSET_FEET, allow_hyphen_values = true)]
    agl_offset_feet: f64,

    /// Images processed concurrently.
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Seconds to wait for a single elevation lookup.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Also scan hidden files and folders.
    #[arg(long)]
    include_hidden: bool,

    /// Write the JSON to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let timeout = Duration::from_secs(args.timeout_secs);

    let elevation = GoogleElevation::builder()
        .maybe_api_key(args.api_key)
        .endpoint(args.elevation_url)
        .timeout(timeout)
        .build()?;
    let analyzer = AglAnalyzer::builder()
        .elevation(Arc::new(elevation))
        .calibration(Calibration {
            latitude_offset: args.latitude_offset,
            longitude_offset: args.longitude_offset,
            agl_offset_feet: args.agl_offset_feet,
        })
        .max_concurrent_lookups(args.concurrency)
        .lookup_timeout(timeout)
        .include_hidden(args.include_hidden)
        .build();

    let json = analyzer.scan_to_json(&args.roots).await?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json).await?;
            info!(path = %path.display(), "Wrote results");
        }
        None => println!("{json}"),
    }

    Ok(())
}
