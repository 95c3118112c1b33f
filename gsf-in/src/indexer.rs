//! The first pass over a GSF file: walks every record, decodes the scalar records fully,
//! decodes pings down to their metadata and resolved scale factors, and assembles the
//! result into a [`FileInfo`].
use crate::ping::decode_ping;
use crate::record_header::read_record_header;
use crate::scalars::{
    decode_comment, decode_header, decode_processing_parameters, decode_swath_summary,
};
use crate::stream::{Stream, Whence};
use chrono::{DateTime, Utc};
use gsf_core::records::ScaleFactorTable;
use gsf_core::{
    sensor_name, sub_record_name, Crs, FileInfo, GsfError, GsfSettings, PingGroup, PingInfo,
    QualityInfo, Record, RecordId, SubRecordId,
};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Indexes a whole GSF stream, returning its [`FileInfo`]. On return, the stream position
/// is unspecified; callers that need the original position should re-seek to `0`.
pub fn index<S: Stream>(stream: &mut S, uri: &str, settings: &GsfSettings) -> Result<FileInfo, GsfError> {
    let size = stream.size();
    stream.seek(0, Whence::Start)?;

    let mut record_counts: BTreeMap<RecordId, usize> = BTreeMap::new();
    let mut sub_record_counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut record_index: BTreeMap<RecordId, Vec<Record>> = BTreeMap::new();
    let mut ping_info: Vec<PingInfo> = Vec::new();
    let mut version = None;
    let mut swath_summary = None;
    let mut processing_parameters = None;
    let mut comments = Vec::new();
    let mut history = Vec::new();
    let mut sensor_id: Option<u32> = None;

    let mut current_factors: ScaleFactorTable = BTreeMap::new();
    let mut current_snapshot: Option<Rc<ScaleFactorTable>> = None;

    let mut pos = stream.tell()?;
    while pos < size {
        let record = read_record_header(stream)?;

        if record.id == RecordId::Invalid {
            if settings.get_strict() {
                return Err(GsfError::BadRecordId { id: record.raw_id });
            }
            warn!(raw_id = record.raw_id, "skipping unrecognized record id");
            stream.seek(record.datasize as i64, Whence::Current)?;
            pos = stream.tell()?;
            continue;
        }

        *record_counts.entry(record.id).or_insert(0) += 1;
        record_index.entry(record.id).or_default().push(record);
        debug!(record_id = ?record.id, datasize = record.datasize, "indexed record");

        match record.id {
            RecordId::SwathBathymetryPing => {
                let payload = stream.read(record.datasize as usize)?;
                let decoded = decode_ping(&payload)?;

                for frame in &decoded.sub_records {
                    *sub_record_counts.entry(frame.raw_id).or_insert(0) += 1;
                    if frame.id == SubRecordId::SensorSpecific {
                        sensor_id = Some(frame.raw_id);
                    }
                }

                let has_scale_factors = decoded.scale_factors.is_some();
                if let Some(table) = decoded.scale_factors {
                    for (k, v) in table {
                        current_factors.insert(k, v);
                    }
                    current_snapshot = Some(Rc::new(current_factors.clone()));
                }

                let scale_factors = current_snapshot.clone();

                let sub_records: Vec<SubRecordId> =
                    decoded.sub_records.iter().map(|f| f.id).collect();

                ping_info.push(PingInfo {
                    timestamp: decoded.header.timestamp,
                    byte_offset: record.byte_offset,
                    datasize: record.datasize,
                    number_beams: decoded.header.number_beams,
                    sub_records,
                    has_scale_factors,
                    scale_factors,
                });
            }
            RecordId::Header => {
                let payload = stream.read(record.datasize as usize)?;
                version = Some(decode_header(&payload)?.version);
            }
            RecordId::ProcessingParameters => {
                let payload = stream.read(record.datasize as usize)?;
                processing_parameters = Some(decode_processing_parameters(&payload)?);
            }
            RecordId::SwathBathySummary => {
                let payload = stream.read(record.datasize as usize)?;
                swath_summary = Some(decode_swath_summary(&payload)?);
            }
            RecordId::Comment => {
                let payload = stream.read(record.datasize as usize)?;
                comments.push(decode_comment(&payload)?);
            }
            RecordId::History => {
                let payload = stream.read(record.datasize as usize)?;
                history.push(crate::scalars::decode_history(&payload)?);
            }
            _ => {
                stream.seek(record.datasize as i64, Whence::Current)?;
            }
        }
        pos = stream.tell()?;
    }

    let ping_groups = derive_ping_groups(&ping_info);
    let quality_info = derive_quality_info(&ping_info, &ping_groups);

    let sub_record_schema: Vec<String> = sub_record_counts
        .keys()
        .filter_map(|&raw| {
            let id = SubRecordId::new(raw);
            if id.is_beam_array() {
                Some(sub_record_name(id).to_string())
            } else {
                None
            }
        })
        .collect();

    let crs = Crs {
        horizontal_datum: processing_parameters
            .as_ref()
            .and_then(|p| match p.values.get("geoid") {
                Some(gsf_core::ParameterValue::Text(s)) => Some(s.clone()),
                _ => None,
            }),
        vertical_datum: processing_parameters
            .as_ref()
            .and_then(|p| match p.values.get("tidal_datum") {
                Some(gsf_core::ParameterValue::Text(s)) => Some(s.clone()),
                _ => None,
            }),
    };

    info!(
        record_count = record_counts.values().sum::<usize>(),
        ping_count = ping_info.len(),
        "finished indexing file"
    );

    Ok(FileInfo {
        uri: uri.to_string(),
        version,
        size,
        sensor_id,
        sensor_name: sensor_id.and_then(sensor_name).map(|s| s.to_string()),
        crs,
        sub_record_schema,
        quality_info,
        record_counts,
        sub_record_counts,
        ping_groups,
        record_index,
        ping_info,
        swath_summary,
        processing_parameters,
        comments,
        history,
    })
}

fn derive_ping_groups(pings: &[PingInfo]) -> Vec<PingGroup> {
    let mut groups = Vec::new();
    let mut start: Option<usize> = None;
    let mut current: Option<Rc<ScaleFactorTable>> = None;

    for (i, ping) in pings.iter().enumerate() {
        if ping.has_scale_factors {
            if let (Some(s), Some(table)) = (start, current.take()) {
                groups.push(PingGroup {
                    start: s,
                    stop: i,
                    scale_factors: table,
                });
            }
            start = Some(i);
            current = ping.scale_factors.clone();
        }
    }
    if let (Some(s), Some(table)) = (start, current) {
        groups.push(PingGroup {
            start: s,
            stop: pings.len(),
            scale_factors: table,
        });
    }
    groups
}

fn derive_quality_info(pings: &[PingInfo], ping_groups: &[PingGroup]) -> QualityInfo {
    if pings.is_empty() {
        return QualityInfo::default();
    }

    let min_beams = pings.iter().map(|p| p.number_beams).min().unwrap();
    let max_beams = pings.iter().map(|p| p.number_beams).max().unwrap();

    let mut timestamps: Vec<DateTime<Utc>> = pings.iter().map(|p| p.timestamp).collect();
    timestamps.sort();
    let duplicate_ping_count = timestamps.windows(2).filter(|w| w[0] == w[1]).count();

    let schemas: Vec<Vec<SubRecordId>> = pings
        .iter()
        .map(|p| {
            let mut s: Vec<SubRecordId> = p
                .sub_records
                .iter()
                .copied()
                .filter(|id| id.is_beam_array())
                .collect();
            s.sort();
            s.dedup();
            s
        })
        .collect();

    // Schema consistency is checked within each ping group, not file-wide: a new ping
    // group is allowed to legitimately shift schema along with its scale factors. Any
    // leading pings that precede the first group (no scale factors seen yet) form their
    // own implicit range, checked against their own first member.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut cursor = 0;
    for group in ping_groups {
        if group.start > cursor {
            ranges.push((cursor, group.start));
        }
        ranges.push((group.start, group.stop));
        cursor = group.stop;
    }
    if cursor < pings.len() {
        ranges.push((cursor, pings.len()));
    }

    let mut schema_inconsistent_ping_indices = Vec::new();
    for (start, stop) in ranges {
        if start >= stop {
            continue;
        }
        let reference = &schemas[start];
        for i in start..stop {
            if &schemas[i] != reference {
                schema_inconsistent_ping_indices.push(i);
            }
        }
    }

    if !schema_inconsistent_ping_indices.is_empty() {
        warn!(
            offending = schema_inconsistent_ping_indices.len(),
            "ping sub-record schema is inconsistent within a ping group"
        );
    }

    QualityInfo {
        min_beams,
        max_beams,
        beam_count_consistent: min_beams == max_beams,
        duplicate_pings: duplicate_ping_count > 0,
        duplicate_ping_count,
        schema_inconsistent: !schema_inconsistent_ping_indices.is_empty(),
        schema_inconsistent_ping_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn record_header(datasize: u32, id: u32) -> Vec<u8> {
        let mut buf = datasize.to_be_bytes().to_vec();
        buf.extend_from_slice(&id.to_be_bytes());
        buf
    }

    fn ping_header_bytes(sec: i32, n_beams: u16) -> Vec<u8> {
        let mut buf = vec![];
        buf.extend_from_slice(&sec.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&n_beams.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf
    }

    fn scale_factors_sub_record(entries: &[(u32, i32, i32)]) -> Vec<u8> {
        let mut sf = vec![];
        sf.extend_from_slice(&(entries.len() as i32).to_be_bytes());
        for (id, scale, offset) in entries {
            let id_word: i32 = (*id as i32) << 24;
            sf.extend_from_slice(&id_word.to_be_bytes());
            sf.extend_from_slice(&scale.to_be_bytes());
            sf.extend_from_slice(&offset.to_be_bytes());
        }
        let hdr: u32 = (100u32 << 24) | (sf.len() as u32);
        let mut out = hdr.to_be_bytes().to_vec();
        out.extend_from_slice(&sf);
        out
    }

    fn header_record() -> Vec<u8> {
        let mut buf = record_header(4, 1);
        buf.extend_from_slice(b"GSF3");
        buf
    }

    fn ping_record(sec: i32, n_beams: u16, with_scale_factors: bool) -> Vec<u8> {
        let mut payload = ping_header_bytes(sec, n_beams);
        if with_scale_factors {
            payload.extend_from_slice(&scale_factors_sub_record(&[(1, 1000, 0)]));
        }
        let mut buf = record_header(payload.len() as u32, 2);
        buf.extend_from_slice(&payload);
        buf
    }

    fn beam_sub_record(id: u32, values: &[u16]) -> Vec<u8> {
        let mut data = vec![];
        for v in values {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let hdr: u32 = (id << 24) | (data.len() as u32);
        let mut out = hdr.to_be_bytes().to_vec();
        out.extend_from_slice(&data);
        out
    }

    fn ping_record_with_beam(
        sec: i32,
        n_beams: u16,
        scale_factor_id: Option<u32>,
        beam_sub_record_id: u32,
    ) -> Vec<u8> {
        let mut payload = ping_header_bytes(sec, n_beams);
        if let Some(id) = scale_factor_id {
            payload.extend_from_slice(&scale_factors_sub_record(&[(id, 1000, 0)]));
        }
        payload.extend_from_slice(&beam_sub_record(
            beam_sub_record_id,
            &vec![1000u16; n_beams as usize],
        ));
        let mut buf = record_header(payload.len() as u32, 2);
        buf.extend_from_slice(&payload);
        buf
    }

    #[test]
    fn indexes_header_and_ping_counts() {
        let mut bytes = header_record();
        bytes.extend_from_slice(&ping_record(0, 5, true));
        bytes.extend_from_slice(&ping_record(1, 5, false));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert_eq!(info.version.as_deref(), Some("GSF3"));
        assert_eq!(info.ping_info.len(), 2);
        assert_eq!(*info.record_counts.get(&RecordId::Header).unwrap(), 1);
        assert_eq!(
            *info.record_counts.get(&RecordId::SwathBathymetryPing).unwrap(),
            2
        );
    }

    #[test]
    fn carry_forward_assigns_second_ping_the_first_pings_scale_factors() {
        let mut bytes = header_record();
        bytes.extend_from_slice(&ping_record(0, 5, true));
        bytes.extend_from_slice(&ping_record(1, 5, false));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert!(info.ping_info[0].has_scale_factors);
        assert!(!info.ping_info[1].has_scale_factors);
        let first = info.ping_info[0].scale_factors.as_ref().unwrap();
        let second = info.ping_info[1].scale_factors.as_ref().unwrap();
        assert_eq!(first.get(&SubRecordId::Depth), second.get(&SubRecordId::Depth));
    }

    #[test]
    fn ping_groups_tile_the_ping_index_space() {
        let mut bytes = header_record();
        bytes.extend_from_slice(&ping_record(0, 5, true));
        bytes.extend_from_slice(&ping_record(1, 5, false));
        bytes.extend_from_slice(&ping_record(2, 5, true));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert_eq!(info.ping_groups.len(), 2);
        assert_eq!(info.ping_groups[0].start, 0);
        assert_eq!(info.ping_groups[0].stop, 2);
        assert_eq!(info.ping_groups[1].start, 2);
        assert_eq!(info.ping_groups[1].stop, 3);
    }

    #[test]
    fn first_ping_without_scale_factors_has_none_resolved() {
        let mut bytes = header_record();
        bytes.extend_from_slice(&ping_record(0, 5, false));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert!(info.ping_info[0].scale_factors.is_none());
        assert!(info.ping_groups.is_empty());
    }

    #[test]
    fn duplicate_ping_timestamps_are_flagged_in_quality_info() {
        let mut bytes = header_record();
        bytes.extend_from_slice(&ping_record(0, 5, true));
        bytes.extend_from_slice(&ping_record(0, 5, false));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert!(info.quality_info.duplicate_pings);
        assert_eq!(info.quality_info.duplicate_ping_count, 1);
    }

    #[test]
    fn schema_shift_at_a_new_ping_group_is_not_flagged_inconsistent() {
        let mut bytes = header_record();
        // Group 1: depth array, carried forward across two pings.
        bytes.extend_from_slice(&ping_record_with_beam(0, 3, Some(1), 1));
        bytes.extend_from_slice(&ping_record_with_beam(1, 3, None, 1));
        // Group 2: a legitimately different beam array, with its own scale factors.
        bytes.extend_from_slice(&ping_record_with_beam(2, 3, Some(2), 2));

        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert_eq!(info.ping_groups.len(), 2);
        assert!(!info.quality_info.schema_inconsistent);
        assert!(info.quality_info.schema_inconsistent_ping_indices.is_empty());
    }

    #[test]
    fn zero_ping_file_indexes_cleanly() {
        let bytes = header_record();
        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let info = index(&mut stream, "test://file", &settings).unwrap();

        assert!(info.ping_info.is_empty());
        assert!(info.ping_groups.is_empty());
    }

    #[test]
    fn strict_mode_rejects_unknown_record_id() {
        let bytes = record_header(0, 999);
        let mut stream = MemoryStream::from_vec(bytes);
        let settings = GsfSettings::default();
        let err = index(&mut stream, "test://file", &settings).unwrap_err();
        assert!(matches!(err, GsfError::BadRecordId { id: 999 }));
    }

    #[test]
    fn non_strict_mode_skips_unknown_record_id() {
        let mut bytes = record_header(4, 999);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&header_record());

        let mut stream = MemoryStream::from_vec(bytes);
        let mut settings = GsfSettings::default();
        settings.set_strict(false);
        let info = index(&mut stream, "test://file", &settings).unwrap();
        assert_eq!(info.version.as_deref(), Some("GSF3"));
    }
}
