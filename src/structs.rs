use crate::features::agl::{AglValue, AltitudeReading};
use crate::features::coordinates::GpsFix;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// Result of analyzing one geotagged image.
///
/// Serializes to a flat record with the keys `filename`, `lat`, `lon`, `yaw`, `msl_alt`,
/// `agl` and `agl_feet`. `yaw` is `"Unknown"` and the AGL fields are `"undefined"` when
/// they could not be determined; `msl_alt` is `null` when the altitude tag is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub filename: String,
    pub path: PathBuf,
    /// Position after calibration, the one used for the elevation lookup.
    pub fix: GpsFix,
    pub altitude: AltitudeReading,
}

impl ImageRecord {
    pub const fn agl_m(&self) -> AglValue {
        self.altitude.agl_m
    }

    pub const fn agl_ft(&self) -> AglValue {
        self.altitude.agl_ft
    }
}

impl Serialize for ImageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("ImageRecord", 7)?;
        record.serialize_field("filename", &self.filename)?;
        record.serialize_field("lat", &self.fix.latitude)?;
        record.serialize_field("lon", &self.fix.longitude)?;
        record.serialize_field("yaw", &self.fix.heading)?;
        record.serialize_field("msl_alt", &self.altitude.msl_altitude_m)?;
        record.serialize_field("agl", &self.altitude.agl_m)?;
        record.serialize_field("agl_feet", &self.altitude.agl_ft)?;
        record.end()
    }
}
