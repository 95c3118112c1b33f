//! This library is the foundation for the `gsf-in` crate. It can be built either
//! with serialization support, or in a slightly more lightweight manner without it (see features).
#![allow(clippy::derive_partial_eq_without_eq)]
extern crate num;

#[cfg(any(feature = "to_json", feature = "serde"))]
extern crate serde;
#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod bitconverter;
pub mod enums;
pub mod errors;
pub mod records;
pub mod settings;

pub use enums::*;
pub use errors::GsfError;
pub use records::*;
pub use settings::GsfSettings;

/// Length in bytes of a record header: `u32` datasize followed by `u32` id word.
pub const RECORD_HEADER_LEN: usize = 8;
/// Length in bytes of the fixed portion of a swath-bathymetry ping header.
pub const PING_HEADER_LEN: usize = 56;
/// Length in bytes of a sub-record header within a ping payload.
pub const SUB_RECORD_HEADER_LEN: usize = 4;

/// Scale applied to geographic coordinates (longitude/latitude), in degrees.
pub const SCALE1: f64 = 1.0e7;
/// Scale applied to attitude, course, speed, tide and depth-corrector fields.
pub const SCALE2: f64 = 1.0e2;
/// Scale applied to height and separation fields.
pub const SCALE3: f64 = 1.0e3;
/// Scale applied to the attitude sub-measurement time offset, interpreted as milliseconds.
pub const SCALE4: f64 = 1.0e6;

/// Record ID signifying the scale-factors sub-record within a ping.
pub const SCALE_FACTORS_SUB_RECORD_ID: u32 = 100;
