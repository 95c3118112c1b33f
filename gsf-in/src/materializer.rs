//! The second pass: given a [`FileInfo`] produced by the indexer, re-reads each ping's
//! payload from its recorded byte offset and decodes full beam arrays using the ping's
//! resolved scale factors, emitting them to a [`Sink`].
use crate::ping::{decode_ping_header, walk_sub_records};
use crate::sink::{AttitudeBatch, OpaqueSensorBatch, PingBeamBatch, PingPositionBatch, Sink, SvpBatch};
use crate::stream::{Stream, Whence};
use gsf_core::bitconverter::{apply_scale, beam_byte_width, beam_reader_for, default_scale_factor};
use gsf_core::{sub_record_name, FileInfo, GsfError, GsfSettings, SubRecordId};

const WGS84_A: f64 = 111_132.92;
const WGS84_B: f64 = 559.82;
const WGS84_C: f64 = 1.175;
const WGS84_D: f64 = 0.0023;
const WGS84_E: f64 = 111_412.84;
const WGS84_F: f64 = 93.5;
const WGS84_G: f64 = 0.118;

/// Per-beam longitude/latitude offsets in meters-per-degree coefficients, following the
/// WGS84 ellipsoid approximation described in the component design.
fn lat_lon_scale_factors(latitude_deg: f64) -> (f64, f64) {
    let phi = latitude_deg.to_radians();
    let lat_sf = WGS84_A - WGS84_B * (2.0 * phi).cos() + WGS84_C * (4.0 * phi).cos()
        - WGS84_D * (6.0 * phi).cos();
    let lon_sf =
        WGS84_E * phi.cos() - WGS84_F * (3.0 * phi).cos() + WGS84_G * (5.0 * phi).cos();
    (lat_sf, lon_sf)
}

/// Decodes every ping's beam arrays and writes them to `sink`. Stops early once
/// `GsfSettings::max_ping_count` pings have been materialized, if set.
pub fn materialize<S: Stream, K: Sink>(
    stream: &mut S,
    info: &FileInfo,
    settings: &GsfSettings,
    sink: &mut K,
) -> Result<(), GsfError> {
    let limit = settings.get_max_ping_count().unwrap_or(usize::MAX);

    for (ping_index, ping) in info.ping_info.iter().enumerate().take(limit) {
        stream.seek(ping.byte_offset, Whence::Start)?;
        let payload = stream.read(ping.datasize as usize)?;

        let header = decode_ping_header(&payload)?;
        let frames = walk_sub_records(&payload)?;

        let table = ping.scale_factors.as_deref();

        let mut across_track: Option<Vec<f32>> = None;
        let mut along_track: Option<Vec<f32>> = None;
        let mut beam_batches: Vec<(SubRecordId, PingBeamBatch)> = Vec::new();

        for frame in &frames {
            if !frame.id.is_beam_array() {
                if frame.id == SubRecordId::SensorSpecific {
                    sink.write_opaque_sensor(OpaqueSensorBatch {
                        ping_index,
                        raw_sensor_id: frame.raw_id,
                        bytes: payload[frame.offset..frame.offset + frame.datasize].to_vec(),
                    });
                }
                continue;
            }

            let scale_factor = match table.and_then(|t| t.get(&frame.id)) {
                Some(sf) => *sf,
                None => {
                    if settings.get_allow_default_scale_factors() {
                        match default_scale_factor(frame.id) {
                            Some(sf) => {
                                tracing::warn!(
                                    ping_index,
                                    sub_record = sub_record_name(frame.id),
                                    "substituting default scale factor"
                                );
                                sf
                            }
                            None => {
                                return Err(GsfError::MissingScaleFactors { ping_index });
                            }
                        }
                    } else {
                        tracing::error!(ping_index, "ping has no resolvable scale-factor table");
                        return Err(GsfError::MissingScaleFactors { ping_index });
                    }
                }
            };

            let width = beam_byte_width(frame.id.beam_width());
            let reader = beam_reader_for(frame.id);
            let n_beams = frame.datasize / width;
            let mut values = Vec::with_capacity(n_beams);
            for b in 0..n_beams {
                let start = frame.offset + b * width;
                let raw = reader(&payload[start..start + width])?;
                values.push(apply_scale(raw, scale_factor));
            }

            if frame.id == SubRecordId::AcrossTrack {
                across_track = Some(values.clone());
            }
            if frame.id == SubRecordId::AlongTrack {
                along_track = Some(values.clone());
            }

            beam_batches.push((
                frame.id,
                PingBeamBatch {
                    ping_index,
                    sub_record_name: sub_record_name(frame.id).to_string(),
                    values,
                },
            ));
        }

        // Preserve `sub_record_schema`'s file-wide id order rather than this ping's
        // physical frame order, per the ordering guarantee.
        beam_batches.sort_by_key(|(id, _)| *id);
        for (_, batch) in beam_batches {
            sink.write_ping_beams(batch);
        }

        if settings.get_materialize_geographic_projection() {
            if let (Some(across), Some(along)) = (&across_track, &along_track) {
                let (lat_sf, lon_sf) = lat_lon_scale_factors(header.latitude);
                let heading_rad = (header.heading as f64).to_radians();
                let dx = heading_rad.sin();
                let dy = heading_rad.cos();

                let mut longitude = Vec::with_capacity(across.len());
                let mut latitude = Vec::with_capacity(across.len());
                for (a, l) in across.iter().zip(along.iter()) {
                    let a = *a as f64;
                    let l = *l as f64;
                    longitude.push(header.longitude + (dy * a + dx * l) / lon_sf);
                    latitude.push(header.latitude + (-dx * a + dy * l) / lat_sf);
                }
                sink.write_ping_position(PingPositionBatch {
                    ping_index,
                    longitude,
                    latitude,
                });
            }
        }
    }

    Ok(())
}

/// Decodes every attitude record in the stream and writes one aggregated batch to `sink`.
pub fn materialize_attitude<S: Stream, K: Sink>(
    stream: &mut S,
    info: &FileInfo,
    sink: &mut K,
) -> Result<(), GsfError> {
    use crate::scalars::decode_attitude;
    use gsf_core::RecordId;

    let mut batch = AttitudeBatch::default();
    if let Some(records) = info.record_index.get(&RecordId::Attitude) {
        for record in records {
            stream.seek(record.byte_offset, Whence::Start)?;
            let payload = stream.read(record.datasize as usize)?;
            let attitude = decode_attitude(&payload)?;
            batch.timestamp.extend(attitude.timestamp);
            batch.pitch.extend(attitude.pitch);
            batch.roll.extend(attitude.roll);
            batch.heave.extend(attitude.heave);
            batch.heading.extend(attitude.heading);
        }
    }
    sink.write_attitude(batch);
    Ok(())
}

/// Decodes every sound-velocity-profile record in the stream and writes one aggregated
/// batch per profile to `sink`.
pub fn materialize_svp<S: Stream, K: Sink>(
    stream: &mut S,
    info: &FileInfo,
    sink: &mut K,
) -> Result<(), GsfError> {
    use crate::scalars::decode_svp;
    use gsf_core::RecordId;

    if let Some(records) = info.record_index.get(&RecordId::SoundVelocityProfile) {
        for record in records {
            stream.seek(record.byte_offset, Whence::Start)?;
            let payload = stream.read(record.datasize as usize)?;
            let svp = decode_svp(&payload)?;
            sink.write_svp(SvpBatch {
                depth: svp.depth,
                sound_velocity: svp.sound_velocity,
            });
        }
    }
    Ok(())
}
