//! Decodes the 8-byte record framing shared by every top-level GSF record.
use crate::stream::Stream;
use gsf_core::bitconverter::read_u32;
use gsf_core::{GsfError, Record, RecordId, RECORD_HEADER_LEN};

/// Reads one record header from the current stream position and returns the decoded
/// [`Record`]. On return, the stream sits at the start of the record's payload
/// (`record.byte_offset`).
pub fn read_record_header<S: Stream>(stream: &mut S) -> Result<Record, GsfError> {
    let bytes = stream.read(RECORD_HEADER_LEN)?;
    let datasize = read_u32(&bytes[0..4])?;
    let id_word = read_u32(&bytes[4..8])?;
    let checksum_flag = (id_word & 0x8000_0000) != 0;
    let raw_id = id_word & 0x00FF_FFFF;
    let id = RecordId::new(raw_id);
    let byte_offset = stream.tell()? as i64;
    Ok(Record {
        id,
        raw_id,
        datasize,
        byte_offset,
        checksum_flag,
    })
}
