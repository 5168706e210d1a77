//! The individual analysis steps, leaves first: raw tag access, coordinate decoding,
//! elevation lookup and AGL estimation.
pub mod agl;
pub mod coordinates;
pub mod elevation;
pub mod error;
pub mod exif_tags;
