use crate::features::error::MetadataError;
use crate::features::exif_tags::{ExifTags, GpsTag, Rational};
use serde::{Serialize, Serializer};

pub const LATITUDE_MAX: f64 = 90.0;
pub const LONGITUDE_MAX: f64 = 180.0;

/// Degree, minute and second components of one coordinate, as stored in EXIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalTriple {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
}

impl RationalTriple {
    pub const fn new(degrees: Rational, minutes: Rational, seconds: Rational) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    pub fn from_rationals(values: &[Rational], tag: GpsTag) -> Result<Self, MetadataError> {
        match values {
            [degrees, minutes, seconds, ..] => Ok(Self::new(*degrees, *minutes, *seconds)),
            _ => Err(MetadataError::MalformedField {
                tag: tag.key(),
                reason: format!("expected 3 rationals, found {}", values.len()),
            }),
        }
    }

    /// Unsigned decimal degrees: `d + m/60 + s/3600`.
    pub fn to_degrees(self, tag: GpsTag) -> Result<f64, MetadataError> {
        let degrees = self.degrees.to_f64(tag)?;
        let minutes = self.minutes.to_f64(tag)?;
        let seconds = self.seconds.to_f64(tag)?;
        Ok(degrees + minutes / 60.0 + seconds / 3600.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parses an EXIF reference tag. Only the first meaningful character counts.
    pub fn parse(reference: &str, tag: GpsTag) -> Result<Self, MetadataError> {
        let letter = reference
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase());
        match letter {
            Some('N') => Ok(Self::North),
            Some('S') => Ok(Self::South),
            Some('E') => Ok(Self::East),
            Some('W') => Ok(Self::West),
            _ => Err(MetadataError::MalformedField {
                tag: tag.key(),
                reason: format!("unknown hemisphere reference {reference:?}"),
            }),
        }
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

/// Converts a DMS triple and its hemisphere into signed decimal degrees.
pub fn decode_coordinate(
    triple: RationalTriple,
    hemisphere: Hemisphere,
    tag: GpsTag,
) -> Result<f64, MetadataError> {
    let value = triple.to_degrees(tag)?;
    Ok(if hemisphere.is_negative() { -value } else { value })
}

/// Image direction in decimal degrees, or unknown when the tag is missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Heading {
    Known(f64),
    #[default]
    Unknown,
}

impl Heading {
    pub const fn degrees(self) -> Option<f64> {
        match self {
            Self::Known(degrees) => Some(degrees),
            Self::Unknown => None,
        }
    }
}

impl Serialize for Heading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(degrees) => serializer.serialize_f64(*degrees),
            Self::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

/// Reads `GPSImgDirection`. A present but malformed value is an error, not `Unknown`.
pub fn decode_heading(tags: &ExifTags) -> Result<Heading, MetadataError> {
    let Some(values) = tags.rationals(GpsTag::ImgDirection)? else {
        return Ok(Heading::Unknown);
    };
    let Some(first) = values.first() else {
        return Err(MetadataError::MalformedField {
            tag: GpsTag::ImgDirection.key(),
            reason: "no values".to_string(),
        });
    };
    first.to_f64(GpsTag::ImgDirection).map(Heading::Known)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Heading,
}

/// Decodes the position and heading of an image.
///
/// Returns `Ok(None)` when the image is not geotagged, i.e. when latitude, longitude or
/// either hemisphere reference is missing. Present but unusable values are errors.
pub fn decode_gps_fix(tags: &ExifTags) -> Result<Option<GpsFix>, MetadataError> {
    let (Some(latitude), Some(latitude_ref), Some(longitude), Some(longitude_ref)) = (
        tags.rationals(GpsTag::Latitude)?,
        tags.ascii(GpsTag::LatitudeRef)?,
        tags.rationals(GpsTag::Longitude)?,
        tags.ascii(GpsTag::LongitudeRef)?,
    ) else {
        return Ok(None);
    };

    let latitude = decode_coordinate(
        RationalTriple::from_rationals(latitude, GpsTag::Latitude)?,
        Hemisphere::parse(latitude_ref, GpsTag::LatitudeRef)?,
        GpsTag::Latitude,
    )?;
    let longitude = decode_coordinate(
        RationalTriple::from_rationals(longitude, GpsTag::Longitude)?,
        Hemisphere::parse(longitude_ref, GpsTag::LongitudeRef)?,
        GpsTag::Longitude,
    )?;

    if latitude.abs() > LATITUDE_MAX {
        return Err(MetadataError::MalformedField {
            tag: GpsTag::Latitude.key(),
            reason: format!("{latitude} is out of range"),
        });
    }
    if longitude.abs() > LONGITUDE_MAX {
        return Err(MetadataError::MalformedField {
            tag: GpsTag::Longitude.key(),
            reason: format!("{longitude} is out of range"),
        });
    }

    Ok(Some(GpsFix {
        latitude,
        longitude,
        heading: decode_heading(tags)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::exif_tags::TagValue;

    fn r(num: u32, denom: u32) -> Rational {
        Rational::new(num, denom)
    }

    fn triple(d: u32, m: u32, s: u32) -> RationalTriple {
        RationalTriple::new(r(d, 1), r(m, 1), r(s, 1))
    }

    fn full_tags() -> ExifTags {
        let mut tags = ExifTags::new();
        tags.insert(
            GpsTag::Latitude,
            TagValue::Rationals(vec![r(40, 1), r(30, 1), r(0, 1)]),
        )
        .insert(GpsTag::LatitudeRef, TagValue::Ascii("N".to_string()))
        .insert(
            GpsTag::Longitude,
            TagValue::Rationals(vec![r(74, 1), r(0, 1), r(3600, 100)]),
        )
        .insert(GpsTag::LongitudeRef, TagValue::Ascii("W".to_string()));
        tags
    }

    #[test]
    fn test_decode_latitude_example() {
        let value = decode_coordinate(triple(40, 30, 0), Hemisphere::North, GpsTag::Latitude);
        assert_eq!(value.unwrap(), 40.5);
    }

    #[test]
    fn test_sign_follows_hemisphere() {
        let cases = [
            (Hemisphere::North, 1.0),
            (Hemisphere::East, 1.0),
            (Hemisphere::South, -1.0),
            (Hemisphere::West, -1.0),
        ];
        for (degrees, minutes, seconds) in [(0, 0, 1), (12, 34, 56), (89, 59, 59), (179, 0, 30)] {
            let expected = f64::from(degrees) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0;
            for (hemisphere, sign) in cases {
                let value = decode_coordinate(
                    triple(degrees, minutes, seconds),
                    hemisphere,
                    GpsTag::Latitude,
                )
                .unwrap();
                assert_eq!(value.signum(), sign, "{hemisphere:?}");
                assert!((value.abs() - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_fractional_seconds() {
        let t = RationalTriple::new(r(52, 1), r(22, 1), r(4512, 100));
        let value = decode_coordinate(t, Hemisphere::North, GpsTag::Latitude).unwrap();
        assert!((value - (52.0 + 22.0 / 60.0 + 45.12 / 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominator_in_triple() {
        let t = RationalTriple::new(r(40, 1), r(30, 0), r(0, 1));
        let result = decode_coordinate(t, Hemisphere::North, GpsTag::Latitude);
        assert!(matches!(result, Err(MetadataError::MalformedRational { .. })));
    }

    #[test]
    fn test_hemisphere_parsing() {
        assert_eq!(Hemisphere::parse("N", GpsTag::LatitudeRef).unwrap(), Hemisphere::North);
        assert_eq!(Hemisphere::parse("s\0", GpsTag::LatitudeRef).unwrap(), Hemisphere::South);
        assert_eq!(Hemisphere::parse(" W ", GpsTag::LongitudeRef).unwrap(), Hemisphere::West);
        assert!(Hemisphere::parse("", GpsTag::LongitudeRef).is_err());
        assert!(Hemisphere::parse("X", GpsTag::LongitudeRef).is_err());
    }

    #[test]
    fn test_decode_gps_fix_full() {
        let mut tags = full_tags();
        tags.insert(GpsTag::ImgDirection, TagValue::Rationals(vec![r(18050, 100)]));

        let fix = decode_gps_fix(&tags).unwrap().expect("should be geotagged");
        assert_eq!(fix.latitude, 40.5);
        assert!((fix.longitude + 74.01).abs() < 1e-12);
        assert_eq!(fix.heading, Heading::Known(180.5));
    }

    #[test]
    fn test_missing_heading_is_unknown() {
        let fix = decode_gps_fix(&full_tags()).unwrap().unwrap();
        assert_eq!(fix.heading, Heading::Unknown);
        assert_eq!(fix.heading.degrees(), None);
    }

    #[test]
    fn test_missing_reference_means_not_geotagged() {
        for missing in [
            GpsTag::Latitude,
            GpsTag::LatitudeRef,
            GpsTag::Longitude,
            GpsTag::LongitudeRef,
        ] {
            let mut tags = ExifTags::new();
            for (tag, value) in [
                (GpsTag::Latitude, TagValue::Rationals(vec![r(40, 1), r(30, 1), r(0, 1)])),
                (GpsTag::LatitudeRef, TagValue::Ascii("N".to_string())),
                (GpsTag::Longitude, TagValue::Rationals(vec![r(74, 1), r(0, 1), r(0, 1)])),
                (GpsTag::LongitudeRef, TagValue::Ascii("W".to_string())),
            ] {
                if tag != missing {
                    tags.insert(tag, value);
                }
            }
            assert!(
                decode_gps_fix(&tags).unwrap().is_none(),
                "missing {} should exclude the image",
                missing.key()
            );
        }
    }

    #[test]
    fn test_short_triple_is_malformed() {
        let mut tags = full_tags();
        tags.insert(GpsTag::Latitude, TagValue::Rationals(vec![r(40, 1)]));
        assert!(decode_gps_fix(&tags).is_err());
    }

    #[test]
    fn test_out_of_range_latitude_is_malformed() {
        let mut tags = full_tags();
        tags.insert(
            GpsTag::Latitude,
            TagValue::Rationals(vec![r(91, 1), r(0, 1), r(0, 1)]),
        );
        assert!(decode_gps_fix(&tags).is_err());
    }

    #[test]
    fn test_heading_zero_denominator_is_malformed() {
        let mut tags = full_tags();
        tags.insert(GpsTag::ImgDirection, TagValue::Rationals(vec![r(5, 0)]));
        assert!(matches!(
            decode_gps_fix(&tags),
            Err(MetadataError::MalformedRational { tag: "GPS GPSImgDirection", .. })
        ));
    }

    #[test]
    fn test_heading_serialization() {
        assert_eq!(serde_json::to_string(&Heading::Known(12.5)).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&Heading::Unknown).unwrap(), "\"Unknown\"");
    }
}
