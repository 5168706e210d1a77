//! # Drone AGL
//!
//! Derive the above-ground-level (AGL) flight altitude of geotagged drone photos.
//!
//! For every image the crate reads the EXIF GPS tags, decodes them into signed decimal
//! degrees, applies a fixed differential correction, looks up the ground elevation at the
//! corrected position and subtracts it from the recorded mean-sea-level altitude.
//!
//! ## Key Features
//!
//! - **Exact EXIF decoding**: GPS values stay numerator/denominator pairs until the final division.
//! - **Explicit sentinels**: an unknown heading or an undefined AGL is never confused with zero.
//! - **Pluggable elevation**: any [`ElevationService`] works; [`GoogleElevation`] talks to the
//!   Google Maps Elevation API or a compatible service.
//! - **Batch scans**: whole directory trees are scanned with a bounded number of concurrent
//!   lookups. One failing image never aborts the batch.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use drone_agl::{AglAnalyzer, GoogleElevation};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let elevation = GoogleElevation::builder()
//!         .api_key(std::env::var("GMAPS_API_KEY")?)
//!         .build()?;
//!     let analyzer = AglAnalyzer::builder().elevation(Arc::new(elevation)).build();
//!
//!     for record in analyzer.scan(&[PathBuf::from("images")]).await {
//!         println!("{}: {:?} m AGL", record.filename, record.agl_m());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agl_analyzer;
pub mod config;
mod error;
pub mod features;
pub mod structs;
pub mod utils;

pub use agl_analyzer::AglAnalyzer;
pub use config::Calibration;
pub use error::AglAnalyzerError;
pub use features::agl::{AglEstimator, AglValue, AltitudeReading};
pub use features::coordinates::{GpsFix, Heading};
pub use features::elevation::{ElevationService, GoogleElevation};
pub use features::error::{ElevationError, MetadataError};
pub use features::exif_tags::{ExifTags, GpsTag, KamadakReader, MetadataReader, Rational, TagValue};
pub use structs::ImageRecord;
