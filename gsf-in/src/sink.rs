//! The [`Sink`] seam: the materializer hands decoded column batches to a sink and knows
//! nothing about how (or whether) they are persisted. Two trivial sinks are provided;
//! actual on-disk persistence is left to the consuming application.
use chrono::{DateTime, Utc};

/// One decoded beam-array column for one ping or ping group.
#[derive(Debug, Clone, PartialEq)]
pub struct PingBeamBatch {
    pub ping_index: usize,
    pub sub_record_name: String,
    pub values: Vec<f32>,
}

/// A decoded beam's projected position, emitted alongside beam-array batches when
/// geographic projection is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct PingPositionBatch {
    pub ping_index: usize,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
}

/// Aligned attitude columns for the whole file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttitudeBatch {
    pub timestamp: Vec<DateTime<Utc>>,
    pub pitch: Vec<f32>,
    pub roll: Vec<f32>,
    pub heave: Vec<f32>,
    pub heading: Vec<f32>,
}

/// Aligned sound-velocity-profile columns for the whole file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvpBatch {
    pub depth: Vec<f32>,
    pub sound_velocity: Vec<f32>,
}

/// An opaque sensor-specific payload, tagged with its raw sensor id.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueSensorBatch {
    pub ping_index: usize,
    pub raw_sensor_id: u32,
    pub bytes: Vec<u8>,
}

/// Receives typed column batches produced by the ping-array materializer. Implementations
/// decide how (or whether) to persist them; this crate ships only [`NullSink`] and
/// [`VecSink`].
pub trait Sink {
    fn write_ping_beams(&mut self, batch: PingBeamBatch);
    fn write_ping_position(&mut self, batch: PingPositionBatch);
    fn write_attitude(&mut self, batch: AttitudeBatch);
    fn write_svp(&mut self, batch: SvpBatch);
    fn write_opaque_sensor(&mut self, batch: OpaqueSensorBatch);
}

/// A sink that discards everything written to it.
#[derive(Debug, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn write_ping_beams(&mut self, _batch: PingBeamBatch) {}
    fn write_ping_position(&mut self, _batch: PingPositionBatch) {}
    fn write_attitude(&mut self, _batch: AttitudeBatch) {}
    fn write_svp(&mut self, _batch: SvpBatch) {}
    fn write_opaque_sensor(&mut self, _batch: OpaqueSensorBatch) {}
}

/// A sink that collects every batch written to it into memory, for tests and small files.
#[derive(Debug, Default)]
pub struct VecSink {
    pub ping_beams: Vec<PingBeamBatch>,
    pub ping_positions: Vec<PingPositionBatch>,
    pub attitude: Vec<AttitudeBatch>,
    pub svp: Vec<SvpBatch>,
    pub opaque_sensor: Vec<OpaqueSensorBatch>,
}

impl Sink for VecSink {
    fn write_ping_beams(&mut self, batch: PingBeamBatch) {
        self.ping_beams.push(batch);
    }
    fn write_ping_position(&mut self, batch: PingPositionBatch) {
        self.ping_positions.push(batch);
    }
    fn write_attitude(&mut self, batch: AttitudeBatch) {
        self.attitude.push(batch);
    }
    fn write_svp(&mut self, batch: SvpBatch) {
        self.svp.push(batch);
    }
    fn write_opaque_sensor(&mut self, batch: OpaqueSensorBatch) {
        self.opaque_sensor.push(batch);
    }
}
