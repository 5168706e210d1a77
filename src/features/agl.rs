use crate::config::Calibration;
use crate::features::coordinates::GpsFix;
use crate::features::elevation::ElevationService;
use crate::features::error::{ElevationError, MetadataError};
use crate::features::exif_tags::{ExifTags, GpsTag};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const FEET_PER_METER: f64 = 3.28084;

/// An AGL value that is either computed or explicitly undefined. Never defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AglValue {
    Defined(f64),
    Undefined,
}

impl AglValue {
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Defined(value) => Some(value),
            Self::Undefined => None,
        }
    }

    pub const fn is_defined(self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl Serialize for AglValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Defined(value) => serializer.serialize_f64(*value),
            Self::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeReading {
    pub msl_altitude_m: Option<f64>,
    pub ground_elevation_m: Option<f64>,
    pub agl_m: AglValue,
    pub agl_ft: AglValue,
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Combines MSL altitude and ground elevation. Both AGL fields are undefined unless both
/// inputs are present.
pub fn compute_agl(
    msl_altitude_m: Option<f64>,
    ground_elevation_m: Option<f64>,
    agl_offset_feet: f64,
) -> AltitudeReading {
    let (agl_m, agl_ft) = match (msl_altitude_m, ground_elevation_m) {
        (Some(msl), Some(ground)) => {
            let agl = msl - ground;
            let feet = round_to_hundredths(agl.mul_add(FEET_PER_METER, agl_offset_feet));
            (AglValue::Defined(agl), AglValue::Defined(feet))
        }
        _ => (AglValue::Undefined, AglValue::Undefined),
    };

    AltitudeReading {
        msl_altitude_m,
        ground_elevation_m,
        agl_m,
        agl_ft,
    }
}

/// Reads `GPSAltitude` in meters. `Ok(None)` when the tag is absent.
pub fn decode_msl_altitude(tags: &ExifTags) -> Result<Option<f64>, MetadataError> {
    let Some(values) = tags.rationals(GpsTag::Altitude)? else {
        return Ok(None);
    };
    let Some(first) = values.first() else {
        return Err(MetadataError::MalformedField {
            tag: GpsTag::Altitude.key(),
            reason: "no values".to_string(),
        });
    };
    first.to_f64(GpsTag::Altitude).map(Some)
}

/// Derives above-ground-level altitude from a decoded fix.
#[derive(Clone)]
pub struct AglEstimator {
    elevation: Arc<dyn ElevationService>,
    calibration: Calibration,
    lookup_timeout: Duration,
}

impl AglEstimator {
    pub fn new(
        elevation: Arc<dyn ElevationService>,
        calibration: Calibration,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            elevation,
            calibration,
            lookup_timeout,
        }
    }

    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Ground elevation at a position, or `None` if the lookup failed for any reason.
    pub async fn ground_elevation(&self, latitude: f64, longitude: f64) -> Option<f64> {
        let lookup = self.elevation.elevation(latitude, longitude);
        let result = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(ElevationError::Timeout),
        };

        match result {
            Ok(elevation) => Some(elevation),
            Err(e) => {
                error!(latitude, longitude, error = %e, "Ground elevation lookup failed");
                None
            }
        }
    }

    /// Corrects the raw fix, then computes AGL at the corrected position.
    ///
    /// Returns the corrected fix alongside the reading. Only a malformed `GPSAltitude` is an
    /// error; elevation failures degrade the reading to undefined AGL.
    pub async fn estimate(
        &self,
        raw_fix: &GpsFix,
        tags: &ExifTags,
    ) -> Result<(GpsFix, AltitudeReading), MetadataError> {
        let fix = self.calibration.correct(raw_fix);
        let msl_altitude_m = decode_msl_altitude(tags)?;
        let ground_elevation_m = self.ground_elevation(fix.latitude, fix.longitude).await;

        let reading = compute_agl(
            msl_altitude_m,
            ground_elevation_m,
            self.calibration.agl_offset_feet,
        );
        debug!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            ?msl_altitude_m,
            ?ground_elevation_m,
            agl_m = ?reading.agl_m,
            agl_ft = ?reading.agl_ft,
            "Estimated AGL"
        );
        Ok((fix, reading))
    }
}
