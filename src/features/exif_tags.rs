//! Raw GPS tag access on top of `kamadak-exif`.
//!
//! Values are kept as exact numerator/denominator pairs so that no precision is lost before
//! the coordinate decoder and the AGL estimator do their own arithmetic.

use crate::features::error::MetadataError;
use exif::{In, Reader, Tag, Value};
use std::collections::HashMap;
use std::io::Cursor;

/// An unsigned EXIF rational, stored exactly as it appears in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    pub const fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// Evaluates `num / denom`, refusing to divide by zero.
    pub fn to_f64(self, tag: GpsTag) -> Result<f64, MetadataError> {
        if self.denom == 0 {
            return Err(MetadataError::MalformedRational {
                tag: tag.key(),
                num: self.num,
                denom: self.denom,
            });
        }
        Ok(f64::from(self.num) / f64::from(self.denom))
    }
}

/// The GPS tags the AGL pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpsTag {
    Latitude,
    LatitudeRef,
    Longitude,
    LongitudeRef,
    Altitude,
    ImgDirection,
}

impl GpsTag {
    pub const ALL: [Self; 6] = [
        Self::Latitude,
        Self::LatitudeRef,
        Self::Longitude,
        Self::LongitudeRef,
        Self::Altitude,
        Self::ImgDirection,
    ];

    /// The conventional `"<IFD> <TagName>"` identifier.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Latitude => "GPS GPSLatitude",
            Self::LatitudeRef => "GPS GPSLatitudeRef",
            Self::Longitude => "GPS GPSLongitude",
            Self::LongitudeRef => "GPS GPSLongitudeRef",
            Self::Altitude => "GPS GPSAltitude",
            Self::ImgDirection => "GPS GPSImgDirection",
        }
    }

    const fn exif_tag(self) -> Tag {
        match self {
            Self::Latitude => Tag::GPSLatitude,
            Self::LatitudeRef => Tag::GPSLatitudeRef,
            Self::Longitude => Tag::GPSLongitude,
            Self::LongitudeRef => Tag::GPSLongitudeRef,
            Self::Altitude => Tag::GPSAltitude,
            Self::ImgDirection => Tag::GPSImgDirection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Rationals(Vec<Rational>),
    Ascii(String),
    /// Any other EXIF type. Never a valid value for the tags above.
    Other,
}

impl From<&Value> for TagValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Rational(rationals) => {
                Self::Rationals(rationals.iter().map(|r| Rational::new(r.num, r.denom)).collect())
            }
            Value::Ascii(chunks) => Self::Ascii(
                chunks
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<Vec<_>>()
                    .join(""),
            ),
            _ => Self::Other,
        }
    }
}

/// The GPS tags found in one image. Absent tags are simply not in the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifTags {
    tags: HashMap<GpsTag, TagValue>,
}

impl ExifTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: GpsTag, value: TagValue) -> &mut Self {
        self.tags.insert(tag, value);
        self
    }

    pub fn get(&self, tag: GpsTag) -> Option<&TagValue> {
        self.tags.get(&tag)
    }

    pub fn contains(&self, tag: GpsTag) -> bool {
        self.tags.contains_key(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The rational sequence of `tag`. `Ok(None)` if absent, an error if it is not rational.
    pub fn rationals(&self, tag: GpsTag) -> Result<Option<&[Rational]>, MetadataError> {
        match self.tags.get(&tag) {
            None => Ok(None),
            Some(TagValue::Rationals(values)) => Ok(Some(values)),
            Some(_) => Err(MetadataError::MalformedField {
                tag: tag.key(),
                reason: "expected rational values".to_string(),
            }),
        }
    }

    /// The text content of `tag`. `Ok(None)` if absent, an error if it is not ASCII.
    pub fn ascii(&self, tag: GpsTag) -> Result<Option<&str>, MetadataError> {
        match self.tags.get(&tag) {
            None => Ok(None),
            Some(TagValue::Ascii(text)) => Ok(Some(text)),
            Some(_) => Err(MetadataError::MalformedField {
                tag: tag.key(),
                reason: "expected ASCII text".to_string(),
            }),
        }
    }
}

/// Reads GPS tags out of raw image bytes.
pub trait MetadataReader: Send + Sync {
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags, MetadataError>;
}

/// [`MetadataReader`] backed by `kamadak-exif`. Supports every container the crate
/// understands (JPEG, TIFF, HEIF, PNG, WebP).
#[derive(Debug, Clone, Copy, Default)]
pub struct KamadakReader;

impl MetadataReader for KamadakReader {
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags, MetadataError> {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            // A valid image without an EXIF block is simply not geotagged.
            Err(exif::Error::NotFound(_)) => return Ok(ExifTags::new()),
            Err(e) => return Err(e.into()),
        };

        let mut tags = ExifTags::new();
        for tag in GpsTag::ALL {
            if let Some(field) = exif.get_field(tag.exif_tag(), In::PRIMARY) {
                tags.insert(tag, TagValue::from(&field.value));
            }
        }
        Ok(tags)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use exif::Field;
    use exif::experimental::Writer;

    fn rational_field(tag: Tag, values: &[(u32, u32)]) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(
                values
                    .iter()
                    .map(|&(num, denom)| exif::Rational { num, denom })
                    .collect(),
            ),
        }
    }

    fn ascii_field(tag: Tag, text: &str) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        }
    }

    /// Builds a little-endian TIFF blob carrying the given GPS fields.
    pub(crate) fn tiff_with_fields(fields: &[Field]) -> Vec<u8> {
        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer
            .write(&mut buf, true)
            .expect("writing an in-memory TIFF should not fail");
        buf.into_inner()
    }

    pub(crate) fn geotagged_tiff() -> Vec<u8> {
        tiff_with_fields(&[
            rational_field(Tag::GPSLatitude, &[(40, 1), (30, 1), (0, 1)]),
            ascii_field(Tag::GPSLatitudeRef, "N"),
            rational_field(Tag::GPSLongitude, &[(74, 1), (0, 1), (36, 1)]),
            ascii_field(Tag::GPSLongitudeRef, "W"),
            rational_field(Tag::GPSAltitude, &[(1005, 10)]),
            rational_field(Tag::GPSImgDirection, &[(9050, 100)]),
        ])
    }

    #[test]
    fn test_rational_division() {
        assert_eq!(Rational::new(1, 2).to_f64(GpsTag::Altitude).unwrap(), 0.5);
        assert_eq!(Rational::new(100, 1).to_f64(GpsTag::Altitude).unwrap(), 100.0);
    }

    #[test]
    fn test_zero_denominator_is_malformed() {
        let result = Rational::new(1, 0).to_f64(GpsTag::Altitude);
        assert!(matches!(
            result,
            Err(MetadataError::MalformedRational { tag: "GPS GPSAltitude", num: 1, denom: 0 })
        ));
    }

    #[test]
    fn test_accessors_check_value_type() {
        let mut tags = ExifTags::new();
        tags.insert(GpsTag::LatitudeRef, TagValue::Rationals(vec![Rational::new(1, 1)]))
            .insert(GpsTag::Latitude, TagValue::Ascii("40".to_string()));

        assert!(tags.ascii(GpsTag::LatitudeRef).is_err());
        assert!(tags.rationals(GpsTag::Latitude).is_err());
        assert!(tags.rationals(GpsTag::Altitude).unwrap().is_none());
        assert!(tags.ascii(GpsTag::LongitudeRef).unwrap().is_none());
    }

    #[test]
    fn test_kamadak_reader_extracts_gps_fields() {
        let tags = KamadakReader.read_tags(&geotagged_tiff()).unwrap();

        assert_eq!(
            tags.rationals(GpsTag::Latitude).unwrap(),
            Some(&[Rational::new(40, 1), Rational::new(30, 1), Rational::new(0, 1)][..])
        );
        assert_eq!(tags.ascii(GpsTag::LatitudeRef).unwrap(), Some("N"));
        assert_eq!(tags.ascii(GpsTag::LongitudeRef).unwrap(), Some("W"));
        assert_eq!(
            tags.rationals(GpsTag::Altitude).unwrap(),
            Some(&[Rational::new(1005, 10)][..])
        );
        assert!(tags.contains(GpsTag::ImgDirection));
    }

    #[test]
    fn test_kamadak_reader_without_gps_fields() {
        let bytes = tiff_with_fields(&[Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![1]),
        }]);
        let tags = KamadakReader.read_tags(&bytes).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_kamadak_reader_rejects_garbage() {
        let result = KamadakReader.read_tags(b"definitely not an image");
        assert!(matches!(result, Err(MetadataError::Exif(_))));
    }
}
