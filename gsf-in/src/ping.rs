//! Decodes a swath-bathymetry ping: the 56-byte fixed header, then the variable run of
//! sub-record frames (beam arrays, the scale-factors table, or opaque sensor payloads).
use gsf_core::bitconverter::{read_i16, read_i32, read_u16, read_u32};
use gsf_core::records::ScaleFactorTable;
use gsf_core::{GsfError, SubRecordId, PING_HEADER_LEN, SUB_RECORD_HEADER_LEN};
use gsf_core::{ScaleFactor, SCALE1, SCALE2, SCALE3};
use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

/// The fixed 56-byte portion of a swath-bathymetry ping payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingHeader {
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub number_beams: u16,
    pub centre_beam: u16,
    pub ping_flags: i16,
    pub tide_corrector: f32,
    pub depth_corrector: f32,
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
    pub heave: f32,
    pub course: f32,
    pub speed: f32,
    pub height: f32,
    pub separation: f32,
    pub gps_tide_corrector: f32,
}

/// One sub-record frame as found while walking a ping's payload: its decoded id, the raw
/// id word, and the byte range of its data within the ping payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubRecordFrame {
    pub id: SubRecordId,
    pub raw_id: u32,
    pub offset: usize,
    pub datasize: usize,
}

/// The result of fully decoding one ping payload: its header, the ordered sub-record
/// frames found, and the scale-factor table if this ping carried one.
#[derive(Debug, Clone)]
pub struct DecodedPing {
    pub header: PingHeader,
    pub sub_records: Vec<SubRecordFrame>,
    pub scale_factors: Option<ScaleFactorTable>,
}

fn timestamp(sec: i32, nsec: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(sec as i64, nsec.max(0) as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

/// Decodes the fixed 56-byte ping header.
pub fn decode_ping_header(payload: &[u8]) -> Result<PingHeader, GsfError> {
    if payload.len() < PING_HEADER_LEN {
        return Err(GsfError::UnexpectedEof {
            wanted: PING_HEADER_LEN,
            available: payload.len(),
        });
    }
    let sec = read_i32(&payload[0..4])?;
    let nsec = read_i32(&payload[4..8])?;
    let lon = read_i32(&payload[8..12])? as f64 / SCALE1;
    let lat = read_i32(&payload[12..16])? as f64 / SCALE1;
    let number_beams = read_u16(&payload[16..18])?;
    let centre_beam = read_u16(&payload[18..20])?;
    let ping_flags = read_i16(&payload[20..22])?;
    // payload[22..24] is reserved.
    let tide_corrector = read_i16(&payload[24..26])? as f32 / SCALE2 as f32;
    let depth_corrector = read_i32(&payload[26..30])? as f32 / SCALE2 as f32;
    let heading = read_u16(&payload[30..32])? as f32 / SCALE2 as f32;
    let pitch = read_i16(&payload[32..34])? as f32 / SCALE2 as f32;
    let roll = read_i16(&payload[34..36])? as f32 / SCALE2 as f32;
    let heave = read_i16(&payload[36..38])? as f32 / SCALE2 as f32;
    let course = read_u16(&payload[38..40])? as f32 / SCALE2 as f32;
    let speed = read_u16(&payload[40..42])? as f32 / SCALE2 as f32;
    let height = read_i32(&payload[42..46])? as f32 / SCALE3 as f32;
    let separation = read_i32(&payload[46..50])? as f32 / SCALE3 as f32;
    let gps_tide_corrector = read_i32(&payload[50..54])? as f32 / SCALE3 as f32;
    // payload[54..56] is spare.

    Ok(PingHeader {
        timestamp: timestamp(sec, nsec),
        longitude: lon,
        latitude: lat,
        number_beams,
        centre_beam,
        ping_flags,
        tide_corrector,
        depth_corrector,
        heading,
        pitch,
        roll,
        heave,
        course,
        speed,
        height,
        separation,
        gps_tide_corrector,
    })
}

/// Walks the sub-record frames following the fixed ping header, stopping once fewer than
/// [`SUB_RECORD_HEADER_LEN`] bytes remain.
pub fn walk_sub_records(payload: &[u8]) -> Result<Vec<SubRecordFrame>, GsfError> {
    let mut frames = Vec::new();
    let mut cursor = PING_HEADER_LEN;
    while payload.len().saturating_sub(cursor) >= SUB_RECORD_HEADER_LEN {
        let hdr = read_u32(&payload[cursor..cursor + 4])?;
        let raw_id = (hdr >> 24) & 0xFF;
        let datasize = (hdr & 0x00FF_FFFF) as usize;
        cursor += SUB_RECORD_HEADER_LEN;
        if cursor + datasize > payload.len() {
            return Err(GsfError::UnexpectedEof {
                wanted: datasize,
                available: payload.len() - cursor,
            });
        }
        frames.push(SubRecordFrame {
            id: SubRecordId::new(raw_id),
            raw_id,
            offset: cursor,
            datasize,
        });
        cursor += datasize;
    }
    Ok(frames)
}

/// Decodes the scale-factors sub-record payload into a table keyed by sub-record id.
pub fn decode_scale_factors(data: &[u8]) -> Result<ScaleFactorTable, GsfError> {
    let n = read_i32(&data[0..4])? as usize;
    let mut table = BTreeMap::new();
    let mut cursor = 4;
    for _ in 0..n {
        let id_word = read_i32(&data[cursor..cursor + 4])?;
        let scale = read_i32(&data[cursor + 4..cursor + 8])?;
        let offset = read_i32(&data[cursor + 8..cursor + 12])?;
        cursor += 12;
        let raw_id = ((id_word >> 24) & 0xFF) as u32;
        let compression_flag = ((id_word & 0x00FF_0000) >> 16) == 1;
        table.insert(
            SubRecordId::new(raw_id),
            ScaleFactor {
                scale: scale as f32,
                offset: offset as f32,
                compression_flag,
            },
        );
    }
    Ok(table)
}

/// Decodes a whole ping payload: the header, every sub-record frame, and (if present) the
/// scale-factor table.
pub fn decode_ping(payload: &[u8]) -> Result<DecodedPing, GsfError> {
    let header = decode_ping_header(payload)?;
    let sub_records = walk_sub_records(payload)?;
    let mut scale_factors = None;
    for frame in &sub_records {
        if frame.id == SubRecordId::ScaleFactors {
            scale_factors = Some(decode_scale_factors(
                &payload[frame.offset..frame.offset + frame.datasize],
            )?);
        }
    }
    Ok(DecodedPing {
        header,
        sub_records,
        scale_factors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping_header_bytes() -> Vec<u8> {
        let mut buf = vec![];
        buf.extend_from_slice(&0i32.to_be_bytes()); // sec
        buf.extend_from_slice(&0i32.to_be_bytes()); // nsec
        buf.extend_from_slice(&0i32.to_be_bytes()); // lon
        buf.extend_from_slice(&0i32.to_be_bytes()); // lat
        buf.extend_from_slice(&2u16.to_be_bytes()); // number_beams
        buf.extend_from_slice(&1u16.to_be_bytes()); // centre_beam
        buf.extend_from_slice(&0i16.to_be_bytes()); // ping_flags
        buf.extend_from_slice(&0i16.to_be_bytes()); // reserved
        buf.extend_from_slice(&0i16.to_be_bytes()); // tide_corrector
        buf.extend_from_slice(&0i32.to_be_bytes()); // depth_corrector
        buf.extend_from_slice(&0u16.to_be_bytes()); // heading
        buf.extend_from_slice(&0i16.to_be_bytes()); // pitch
        buf.extend_from_slice(&0i16.to_be_bytes()); // roll
        buf.extend_from_slice(&0i16.to_be_bytes()); // heave
        buf.extend_from_slice(&0u16.to_be_bytes()); // course
        buf.extend_from_slice(&0u16.to_be_bytes()); // speed
        buf.extend_from_slice(&0i32.to_be_bytes()); // height
        buf.extend_from_slice(&0i32.to_be_bytes()); // separation
        buf.extend_from_slice(&0i32.to_be_bytes()); // gps_tide
        buf.extend_from_slice(&0i16.to_be_bytes()); // spare
        assert_eq!(buf.len(), PING_HEADER_LEN);
        buf
    }

    #[test]
    fn decode_ping_with_only_scale_factors_sub_record() {
        let mut payload = ping_header_bytes();
        // one scale-factor entry for Depth (id 1), scale 100, offset 0, no compression.
        let mut sf_payload = vec![];
        sf_payload.extend_from_slice(&1i32.to_be_bytes());
        let id_word: i32 = 1 << 24;
        sf_payload.extend_from_slice(&id_word.to_be_bytes());
        sf_payload.extend_from_slice(&100i32.to_be_bytes());
        sf_payload.extend_from_slice(&0i32.to_be_bytes());

        let hdr: u32 = (100u32 << 24) | (sf_payload.len() as u32);
        payload.extend_from_slice(&hdr.to_be_bytes());
        payload.extend_from_slice(&sf_payload);

        let decoded = decode_ping(&payload).unwrap();
        assert_eq!(decoded.header.number_beams, 2);
        assert_eq!(decoded.sub_records.len(), 1);
        assert_eq!(decoded.sub_records[0].id, SubRecordId::ScaleFactors);
        let table = decoded.scale_factors.unwrap();
        assert_eq!(
            table.get(&SubRecordId::Depth).unwrap().scale,
            100.0
        );
    }

    #[test]
    fn ping_with_no_sub_records_stops_cleanly() {
        let payload = ping_header_bytes();
        let decoded = decode_ping(&payload).unwrap();
        assert!(decoded.sub_records.is_empty());
        assert!(decoded.scale_factors.is_none());
    }

    #[test]
    fn sensor_specific_sub_record_is_tagged_opaque() {
        let mut payload = ping_header_bytes();
        let hdr: u32 = (120u32 << 24) | 4;
        payload.extend_from_slice(&hdr.to_be_bytes());
        payload.extend_from_slice(&[1, 2, 3, 4]);

        let decoded = decode_ping(&payload).unwrap();
        assert_eq!(decoded.sub_records[0].id, SubRecordId::SensorSpecific);
        assert_eq!(decoded.sub_records[0].raw_id, 120);
    }
}
