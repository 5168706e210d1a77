use crate::AglAnalyzerError;
use crate::config::Calibration;
use crate::features::agl::AglEstimator;
use crate::features::coordinates::decode_gps_fix;
use crate::features::elevation::ElevationService;
use crate::features::exif_tags::{KamadakReader, MetadataReader};
use crate::structs::ImageRecord;
use crate::utils::{has_extension, list_files_walkdir_filtered};
use bon::bon;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// The main entry point for the AGL pipeline.
///
/// Holds the metadata reader, the elevation service and the calibration. Create it once and
/// reuse it for any number of scans; nothing is shared between images.
///
/// ```rust,no_run
/// # use std::path::PathBuf;
/// # use std::sync::Arc;
/// # use drone_agl::{AglAnalyzer, GoogleElevation};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let elevation = GoogleElevation::builder().api_key("my-key").build()?;
/// let analyzer = AglAnalyzer::builder()
///     .elevation(Arc::new(elevation))
///     .max_concurrent_lookups(4)
///     .build();
/// let records = analyzer.scan(&[PathBuf::from("images")]).await;
/// # Ok(())
/// # }
/// ```
pub struct AglAnalyzer {
    reader: Arc<dyn MetadataReader>,
    estimator: AglEstimator,
    extensions: Vec<String>,
    max_concurrent_lookups: usize,
    include_hidden: bool,
}

#[bon]
impl AglAnalyzer {
    /// Constructs an `AglAnalyzer` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `elevation: Arc<dyn ElevationService>` - Ground elevation lookup. Required.
    /// * `reader: Option<Arc<dyn MetadataReader>>` - EXIF reader. Defaults to [`KamadakReader`].
    /// * `calibration: Calibration` - (Default: [`Calibration::default`]) Differential offsets.
    /// * `extensions: Vec<String>` - (Default: `["jpg", "jpeg"]`) Image extensions to scan, case-insensitive.
    /// * `max_concurrent_lookups: usize` - (Default: `8`) Images processed at the same time. At least 1.
    /// * `lookup_timeout: Duration` - (Default: 15 seconds) A lookup taking longer counts as failed.
    /// * `include_hidden: bool` - (Default: `false`) Also scan dot-files and dot-directories.
    #[builder]
    pub fn new(
        elevation: Arc<dyn ElevationService>,
        reader: Option<Arc<dyn MetadataReader>>,
        #[builder(default)] calibration: Calibration,
        #[builder(default = vec!["jpg".to_string(), "jpeg".to_string()])] extensions: Vec<String>,
        #[builder(default = 8)] max_concurrent_lookups: usize,
        #[builder(default = Duration::from_secs(15))] lookup_timeout: Duration,
        #[builder(default)] include_hidden: bool,
    ) -> Self {
        Self {
            reader: reader.unwrap_or_else(|| Arc::new(KamadakReader)),
            estimator: AglEstimator::new(elevation, calibration, lookup_timeout),
            extensions,
            max_concurrent_lookups: max_concurrent_lookups.clamp(1, Semaphore::MAX_PERMITS),
            include_hidden,
        }
    }

    pub const fn calibration(&self) -> &Calibration {
        self.estimator.calibration()
    }

    /// Analyzes a single image.
    ///
    /// Returns `Ok(None)` when the image is not geotagged.
    ///
    /// # Errors
    ///
    /// * [`AglAnalyzerError::Io`]: the file could not be read.
    /// * [`AglAnalyzerError::Metadata`]: the EXIF block or one of the GPS values is malformed.
    ///
    /// A failed elevation lookup is not an error; the record's AGL is undefined instead.
    pub async fn analyze_image(&self, path: &Path) -> Result<Option<ImageRecord>, AglAnalyzerError> {
        process_image(self.reader.as_ref(), &self.estimator, path).await
    }

    /// Scans every root recursively and returns one record per geotagged image.
    ///
    /// Never fails as a whole: unreadable or malformed images are logged and left out, images
    /// without GPS tags are left out silently. Output order is unspecified.
    pub async fn scan(&self, roots: &[PathBuf]) -> Vec<ImageRecord> {
        let candidates = self.find_candidates(roots).await;
        info!(candidates = candidates.len(), "Scanning images");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_lookups));
        let mut tasks = JoinSet::new();
        for path in candidates {
            let semaphore = Arc::clone(&semaphore);
            let reader = Arc::clone(&self.reader);
            let estimator = self.estimator.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only fails if that changes.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                match process_image(reader.as_ref(), &estimator, &path).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping image");
                        None
                    }
                }
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => error!(error = %e, "Image task failed"),
            }
        }

        info!(records = records.len(), "Scan finished");
        records
    }

    /// [`AglAnalyzer::scan`], serialized as a pretty-printed JSON array.
    pub async fn scan_to_json(&self, roots: &[PathBuf]) -> Result<String, AglAnalyzerError> {
        let records = self.scan(roots).await;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Lists files with an accepted extension under every root, each file at most once.
    async fn find_candidates(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        let roots = roots.to_vec();
        let extensions = self.extensions.clone();
        let include_hidden = self.include_hidden;

        let walk = tokio::task::spawn_blocking(move || {
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            for root in &roots {
                if !root.is_dir() {
                    warn!(root = %root.display(), "Image root is not a directory, skipping");
                    continue;
                }
                let (files, errors) = list_files_walkdir_filtered(root, include_hidden);
                for e in errors {
                    warn!(root = %root.display(), error = %e, "Could not read directory entry");
                }
                for file in files {
                    if !has_extension(&file, &extensions) {
                        continue;
                    }
                    // Roots may nest; identify files by their canonical path.
                    let key = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
                    if seen.insert(key) {
                        candidates.push(file);
                    }
                }
            }
            candidates
        });

        walk.await.unwrap_or_else(|e| {
            error!(error = %e, "Directory scan failed");
            Vec::new()
        })
    }
}

async fn process_image(
    reader: &dyn MetadataReader,
    estimator: &AglEstimator,
    path: &Path,
) -> Result<Option<ImageRecord>, AglAnalyzerError> {
    let bytes = tokio::fs::read(path).await?;
    let tags = reader.read_tags(&bytes)?;

    let Some(raw_fix) = decode_gps_fix(&tags)? else {
        debug!(path = %path.display(), "Image is not geotagged");
        return Ok(None);
    };

    let (fix, altitude) = estimator.estimate(&raw_fix, &tags).await?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();

    Ok(Some(ImageRecord {
        filename,
        path: path.to_path_buf(),
        fix,
        altitude,
    }))
}
