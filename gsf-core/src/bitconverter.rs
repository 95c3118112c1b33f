//! This submodule deals with turning big-endian byte slices into the scalar types used
//! throughout the wire format, and with applying resolved scale factors to raw integers.
use crate::enums::{BeamWidth, SubRecordId};
use crate::errors::GsfError;
use crate::records::ScaleFactor;
use std::convert::TryInto;

/// Reads a big-endian `u32` from the first 4 bytes of `input`.
/// ```
/// # use gsf_core::bitconverter::read_u32;
/// let bytes = 42u32.to_be_bytes();
/// assert_eq!(read_u32(&bytes).unwrap(), 42);
/// ```
pub fn read_u32(input: &[u8]) -> Result<u32, GsfError> {
    Ok(u32::from_be_bytes(input[..4].try_into()?))
}

/// Reads a big-endian `i32` from the first 4 bytes of `input`.
pub fn read_i32(input: &[u8]) -> Result<i32, GsfError> {
    Ok(i32::from_be_bytes(input[..4].try_into()?))
}

/// Reads a big-endian `u16` from the first 2 bytes of `input`.
pub fn read_u16(input: &[u8]) -> Result<u16, GsfError> {
    Ok(u16::from_be_bytes(input[..2].try_into()?))
}

/// Reads a big-endian `i16` from the first 2 bytes of `input`.
pub fn read_i16(input: &[u8]) -> Result<i16, GsfError> {
    Ok(i16::from_be_bytes(input[..2].try_into()?))
}

/// Trims a byte slice at its first NUL byte and decodes the remainder as (lossy) UTF-8.
/// ```
/// # use gsf_core::bitconverter::ascii_bytes_to_string;
/// let input = b"hello\0world";
/// assert_eq!(&ascii_bytes_to_string(input), "hello");
/// ```
pub fn ascii_bytes_to_string(bytes: &[u8]) -> String {
    let i = bytes.iter().position(|x| *x == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..i]).to_string()
}

/// Applies a resolved scale factor to a raw beam sample: `raw / scale - offset`.
/// ```
/// # use gsf_core::bitconverter::apply_scale;
/// # use gsf_core::records::ScaleFactor;
/// let sf = ScaleFactor { scale: 100.0, offset: 0.0, compression_flag: false };
/// assert_eq!(apply_scale(1050, sf), 10.5);
/// ```
pub fn apply_scale(raw: i64, sf: ScaleFactor) -> f32 {
    (raw as f32) / sf.scale - sf.offset
}

/// A reader of one raw beam sample for a given [`BeamWidth`], returning the sample as an
/// `i64` so narrower unsigned and signed widths share a common representation.
pub type BeamReader = fn(&[u8]) -> Result<i64, GsfError>;

/// Chooses the raw-sample reader for a beam sub-record id.
///
/// The reader should be chosen once per sub-record (or once per file, since widths are
/// fixed per sub-record id) for efficiency.
/// ```
/// # use gsf_core::bitconverter::beam_reader_for;
/// # use gsf_core::enums::SubRecordId;
/// let reader = beam_reader_for(SubRecordId::Depth);
/// let bytes = 1234u16.to_be_bytes();
/// assert_eq!(reader(&bytes).unwrap(), 1234);
/// ```
pub fn beam_reader_for(id: SubRecordId) -> BeamReader {
    match id.beam_width() {
        BeamWidth::U8 => |input: &[u8]| Ok(input[0] as i64),
        BeamWidth::I8 => |input: &[u8]| Ok(input[0] as i8 as i64),
        BeamWidth::U16 => |input: &[u8]| Ok(read_u16(input)? as i64),
        BeamWidth::I16 => |input: &[u8]| Ok(read_i16(input)? as i64),
        BeamWidth::I32 => |input: &[u8]| Ok(read_i32(input)? as i64),
    }
}

/// The byte width on the wire of one raw beam sample for a [`BeamWidth`].
pub fn beam_byte_width(width: BeamWidth) -> usize {
    match width {
        BeamWidth::U8 | BeamWidth::I8 => 1,
        BeamWidth::U16 | BeamWidth::I16 => 2,
        BeamWidth::I32 => 4,
    }
}

/// Conservative default `(scale, offset)` pairs, consulted only when
/// `GsfSettings::allow_default_scale_factors` is set and a ping has no carry-forward
/// predecessor to inherit from. Covers the sub-records for which a reasonable file-format
/// default is well known; anything else still yields `MissingScaleFactors`.
pub fn default_scale_factor(id: SubRecordId) -> Option<ScaleFactor> {
    use SubRecordId::*;
    let (scale, offset) = match id {
        Depth | NominalDepth => (100.0, 0.0),
        AcrossTrack | AlongTrack => (100.0, 0.0),
        TravelTime => (10000.0, 0.0),
        BeamAngle | BeamAngleForward => (100.0, 0.0),
        MeanCalAmplitude | MeanRelAmplitude => (1.0, 0.0),
        EchoWidth => (1.0, 0.0),
        ReceiveHeave => (100.0, 0.0),
        VerticalError | HorizontalError | DepthError | AcrossTrackError | AlongTrackError => {
            (1000.0, 0.0)
        }
        _ => return None,
    };
    Some(ScaleFactor {
        scale,
        offset,
        compression_flag: false,
    })
}
