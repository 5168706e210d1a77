//! Fixed calibration values applied to every image.

use crate::features::coordinates::GpsFix;
use serde::{Deserialize, Serialize};

/// Differential GPS correction subtracted from every decoded latitude, in decimal degrees.
pub const LATITUDE_OFFSET: f64 = 0.00004;
/// Differential GPS correction subtracted from every decoded longitude, in decimal degrees.
pub const LONGITUDE_OFFSET: f64 = 0.0;
/// Added to the AGL in feet to compensate for the altimeter's systematic bias.
pub const AGL_OFFSET_FEET: f64 = -10.0;

/// Sensor-specific calibration.
///
/// Latitude and longitude offsets are independent; a non-zero latitude correction with a zero
/// longitude correction is the calibrated default, not an omission.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Calibration {
    pub latitude_offset: f64,
    pub longitude_offset: f64,
    pub agl_offset_feet: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            latitude_offset: LATITUDE_OFFSET,
            longitude_offset: LONGITUDE_OFFSET,
            agl_offset_feet: AGL_OFFSET_FEET,
        }
    }
}

impl Calibration {
    /// Applies the differential offsets. Heading is left untouched.
    pub fn correct(&self, fix: &GpsFix) -> GpsFix {
        GpsFix {
            latitude: fix.latitude - self.latitude_offset,
            longitude: fix.longitude - self.longitude_offset,
            heading: fix.heading,
        }
    }

    /// Inverse of [`Calibration::correct`].
    pub fn restore(&self, fix: &GpsFix) -> GpsFix {
        GpsFix {
            latitude: fix.latitude + self.latitude_offset,
            longitude: fix.longitude + self.longitude_offset,
            heading: fix.heading,
        }
    }
}
