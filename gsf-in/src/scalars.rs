//! Decoders for the non-ping record kinds: header, comment, history, attitude, sound
//! velocity profile, swath-bathymetry summary and processing parameters.
use chrono::{DateTime, TimeZone, Utc};
use gsf_core::bitconverter::{ascii_bytes_to_string, read_i16, read_i32, read_u16};
use gsf_core::{Comment, GsfError, GsfHeader, HistoryEntry, ParameterValue, ProcessingParameters};
use gsf_core::{Attitude, SoundVelocityProfile, SwathBathySummary};
use gsf_core::{SCALE1, SCALE2};
use std::collections::BTreeMap;

fn timestamp(sec: i32, nsec: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(sec as i64, nsec.max(0) as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

/// Decodes record id 1: the ASCII GSF version string, NUL-padded to `datasize`.
pub fn decode_header(payload: &[u8]) -> Result<GsfHeader, GsfError> {
    Ok(GsfHeader {
        version: ascii_bytes_to_string(payload),
    })
}

/// Decodes record id 6: a creation timestamp followed by a length-prefixed comment string.
pub fn decode_comment(payload: &[u8]) -> Result<Comment, GsfError> {
    let sec = read_i32(&payload[0..4])?;
    let nsec = read_i32(&payload[4..8])?;
    let length = read_i32(&payload[8..12])? as usize;
    let text = ascii_bytes_to_string(&payload[12..12 + length]);
    Ok(Comment {
        timestamp: timestamp(sec, nsec),
        text,
    })
}

fn read_length_prefixed_string(payload: &[u8], cursor: &mut usize) -> Result<String, GsfError> {
    let len = read_u16(&payload[*cursor..*cursor + 2])? as usize;
    *cursor += 2;
    let s = ascii_bytes_to_string(&payload[*cursor..*cursor + len]);
    *cursor += len;
    Ok(s)
}

/// Decodes record id 7: a timestamp followed by four length-prefixed strings.
pub fn decode_history(payload: &[u8]) -> Result<HistoryEntry, GsfError> {
    let sec = read_i32(&payload[0..4])?;
    let nsec = read_i32(&payload[4..8])?;
    let mut cursor = 8;
    let machine_name = read_length_prefixed_string(payload, &mut cursor)?;
    let operator_name = read_length_prefixed_string(payload, &mut cursor)?;
    let command = read_length_prefixed_string(payload, &mut cursor)?;
    let comment = read_length_prefixed_string(payload, &mut cursor)?;
    Ok(HistoryEntry {
        timestamp: timestamp(sec, nsec),
        machine_name,
        operator_name,
        command,
        comment,
    })
}

/// Decodes record id 12: a base timestamp plus a run of attitude sub-measurements, each
/// with its own millisecond offset from the base.
pub fn decode_attitude(payload: &[u8]) -> Result<Attitude, GsfError> {
    let sec = read_i32(&payload[0..4])?;
    let nsec = read_i32(&payload[4..8])?;
    let base = timestamp(sec, nsec);
    let n = read_i16(&payload[8..10])? as usize;

    let mut attitude = Attitude {
        timestamp: Vec::with_capacity(n),
        pitch: Vec::with_capacity(n),
        roll: Vec::with_capacity(n),
        heave: Vec::with_capacity(n),
        heading: Vec::with_capacity(n),
    };

    let mut cursor = 10;
    for _ in 0..n {
        let offset_ms = read_i16(&payload[cursor..cursor + 2])?;
        let pitch = read_i16(&payload[cursor + 2..cursor + 4])?;
        let roll = read_i16(&payload[cursor + 4..cursor + 6])?;
        let heave = read_i16(&payload[cursor + 6..cursor + 8])?;
        let heading = read_i16(&payload[cursor + 8..cursor + 10])?;
        cursor += 10;

        attitude.timestamp.push(base + chrono::Duration::milliseconds(offset_ms as i64));
        attitude.pitch.push(pitch as f32 / SCALE2 as f32);
        attitude.roll.push(roll as f32 / SCALE2 as f32);
        attitude.heave.push(heave as f32 / SCALE2 as f32);
        attitude.heading.push(heading as f32 / SCALE2 as f32);
    }
    Ok(attitude)
}

/// Decodes record id 3: a sound-velocity profile.
pub fn decode_svp(payload: &[u8]) -> Result<SoundVelocityProfile, GsfError> {
    let obs_sec = read_i32(&payload[0..4])?;
    let obs_nsec = read_i32(&payload[4..8])?;
    let app_sec = read_i32(&payload[8..12])?;
    let app_nsec = read_i32(&payload[12..16])?;
    let lon = read_i32(&payload[16..20])? as f64 / SCALE1;
    let lat = read_i32(&payload[20..24])? as f64 / SCALE1;
    let n_points = read_i32(&payload[24..28])? as usize;

    let mut depth = Vec::with_capacity(n_points);
    let mut sound_velocity = Vec::with_capacity(n_points);
    let mut cursor = 28;
    for _ in 0..n_points {
        let d = read_i32(&payload[cursor..cursor + 4])?;
        let v = read_i32(&payload[cursor + 4..cursor + 8])?;
        cursor += 8;
        depth.push(d as f32 / SCALE1 as f32);
        sound_velocity.push(v as f32 / SCALE1 as f32);
    }

    Ok(SoundVelocityProfile {
        observation_time: timestamp(obs_sec, obs_nsec),
        applied_time: timestamp(app_sec, app_nsec),
        longitude: lon,
        latitude: lat,
        depth,
        sound_velocity,
    })
}

/// Decodes record id 9: the file-wide swath-bathymetry summary.
pub fn decode_swath_summary(payload: &[u8]) -> Result<SwathBathySummary, GsfError> {
    let first_sec = read_i32(&payload[0..4])?;
    let first_nsec = read_i32(&payload[4..8])?;
    let last_sec = read_i32(&payload[8..12])?;
    let last_nsec = read_i32(&payload[12..16])?;
    let min_lat = read_i32(&payload[16..20])? as f64 / SCALE1;
    let max_lat = read_i32(&payload[20..24])? as f64 / SCALE1;
    let min_lon = read_i32(&payload[24..28])? as f64 / SCALE1;
    let max_lon = read_i32(&payload[28..32])? as f64 / SCALE1;
    let min_depth = read_i32(&payload[32..36])? as f32 / SCALE2 as f32;
    let max_depth = read_i32(&payload[36..40])? as f32 / SCALE2 as f32;

    Ok(SwathBathySummary {
        first_ping_time: timestamp(first_sec, first_nsec),
        last_ping_time: timestamp(last_sec, last_nsec),
        min_latitude: min_lat,
        max_latitude: max_lat,
        min_longitude: min_lon,
        max_longitude: max_lon,
        min_depth,
        max_depth,
    })
}

fn unknown_variant(value: &str) -> bool {
    matches!(value, "unknwn" | "unknown")
}

fn boolean_variant(value: &str) -> Option<bool> {
    match value {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

fn coerce_value(key: &str, raw: &str) -> ParameterValue {
    let value = raw.trim().to_ascii_lowercase();

    if key == "reference_time" {
        if let Ok(dt) = DateTime::parse_from_str(&format!("{} +0000", value), "%Y/%j %H:%M:%S %z")
        {
            return ParameterValue::Timestamp(dt.with_timezone(&Utc));
        }
        return ParameterValue::Text(value);
    }

    if unknown_variant(&value) {
        return ParameterValue::Text("unknown".to_string());
    }

    if let Some(b) = boolean_variant(&value) {
        return ParameterValue::Bool(b);
    }

    let has_comma = value.contains(',');
    let has_dot = value.contains('.');

    if has_comma && has_dot {
        let floats: Vec<f32> = value
            .split(',')
            .filter_map(|s| s.trim().parse::<f32>().ok())
            .collect();
        return ParameterValue::FloatArray(floats);
    }
    if has_comma {
        let items: Vec<String> = value
            .split(',')
            .map(|s| {
                let s = s.trim();
                if unknown_variant(s) {
                    "unknown".to_string()
                } else {
                    s.to_string()
                }
            })
            .collect();
        return ParameterValue::TextArray(items);
    }
    if has_dot {
        if let Ok(f) = value.parse::<f32>() {
            return ParameterValue::Float(f);
        }
    }
    if let Ok(i) = value.parse::<i64>() {
        return ParameterValue::Integer(i);
    }
    ParameterValue::Text(value)
}

fn canonicalize_key(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(' ', "_")
        .replace(char::from(0), "")
}

/// Decodes record id 4: processing-parameter `KEY=VALUE` pairs, canonicalized and coerced
/// to typed values.
pub fn decode_processing_parameters(payload: &[u8]) -> Result<ProcessingParameters, GsfError> {
    let sec = read_i32(&payload[0..4])?;
    let nsec = read_i32(&payload[4..8])?;
    let n_params = read_i16(&payload[8..10])? as usize;

    let mut values = BTreeMap::new();
    let mut cursor = 10;
    for _ in 0..n_params {
        let size = read_u16(&payload[cursor..cursor + 2])? as usize;
        cursor += 2;
        let raw = ascii_bytes_to_string(&payload[cursor..cursor + size]);
        cursor += size;

        if let Some((key, value)) = raw.split_once('=') {
            let key = canonicalize_key(key);
            values.insert(key.clone(), coerce_value(&key, value));
        }
    }

    Ok(ProcessingParameters {
        processed_time: Some(timestamp(sec, nsec)),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_trims_nul_padding() {
        let mut bytes = b"GSF3".to_vec();
        bytes.extend_from_slice(&[0u8; 4]);
        let header = decode_header(&bytes).unwrap();
        assert_eq!(header.version, "GSF3");
    }

    #[test]
    fn attitude_decodes_measurements_with_millisecond_offsets() {
        let mut payload = vec![];
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&2i16.to_be_bytes());
        for _ in 0..2 {
            payload.extend_from_slice(&500i16.to_be_bytes());
            payload.extend_from_slice(&100i16.to_be_bytes());
            payload.extend_from_slice(&(-100i16).to_be_bytes());
            payload.extend_from_slice(&0i16.to_be_bytes());
            payload.extend_from_slice(&18000i16.to_be_bytes());
        }
        let attitude = decode_attitude(&payload).unwrap();
        assert_eq!(attitude.pitch, vec![1.0, 1.0]);
        assert_eq!(attitude.heading, vec![180.0, 180.0]);
        assert_eq!(
            attitude.timestamp[0],
            Utc.timestamp_opt(0, 500_000_000).unwrap()
        );
    }

    #[test]
    fn processing_parameter_applied_roll_bias_parses_as_float() {
        let raw = "APPLIED_ROLL_BIAS=0.03";
        let value = coerce_value("applied_roll_bias", raw.split_once('=').unwrap().1);
        assert_eq!(value, ParameterValue::Float(0.03));
    }

    #[test]
    fn processing_parameter_reference_time_parses_as_timestamp() {
        let value = coerce_value("reference_time", "1970/001 00:00:00");
        match value {
            ParameterValue::Timestamp(ts) => {
                assert_eq!(ts, Utc.timestamp_opt(0, 0).unwrap());
            }
            other => panic!("expected Timestamp, got {:?}", other),
        }
    }

    #[test]
    fn swath_summary_applies_scale1_and_scale2() {
        let mut payload = vec![];
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&450_000_000i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&1000i32.to_be_bytes());
        payload.extend_from_slice(&50000i32.to_be_bytes());
        let summary = decode_swath_summary(&payload).unwrap();
        assert_eq!(summary.max_latitude, 45.0);
        assert_eq!(summary.min_depth, 10.0);
        assert_eq!(summary.max_depth, 500.0);
    }
}
