//! The data model shared by the indexer and the ping-array materializer: records, scale
//! factors, per-ping metadata and the aggregate per-file summary.
use crate::enums::{RecordId, SubRecordId};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One top-level record as seen by the indexer: its kind, declared size and position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub id: RecordId,
    pub raw_id: u32,
    pub datasize: u32,
    pub byte_offset: i64,
    pub checksum_flag: bool,
}

/// A resolved `(scale, offset)` pair for one beam sub-record, used to turn a raw integer
/// into `raw / scale - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleFactor {
    pub scale: f32,
    pub offset: f32,
    pub compression_flag: bool,
}

/// A table of resolved scale factors keyed by sub-record id, shared by reference across
/// every ping in a [`PingGroup`].
pub type ScaleFactorTable = BTreeMap<SubRecordId, ScaleFactor>;

/// Per-ping metadata gathered by the indexer. Does not itself hold beam arrays: those are
/// decoded lazily by the materializer from `byte_offset`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PingInfo {
    pub timestamp: DateTime<Utc>,
    pub byte_offset: i64,
    pub datasize: u32,
    pub number_beams: u16,
    pub sub_records: Vec<SubRecordId>,
    pub has_scale_factors: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub scale_factors: Option<Rc<ScaleFactorTable>>,
}

/// A maximal contiguous run of pings sharing one scale-factor table, `[start, stop)` over
/// ping index.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PingGroup {
    pub start: usize,
    pub stop: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub scale_factors: Rc<ScaleFactorTable>,
}

/// Aligned vessel-attitude samples.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attitude {
    pub timestamp: Vec<DateTime<Utc>>,
    pub pitch: Vec<f32>,
    pub roll: Vec<f32>,
    pub heave: Vec<f32>,
    pub heading: Vec<f32>,
}

/// One sound-velocity profile observation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoundVelocityProfile {
    pub observation_time: DateTime<Utc>,
    pub applied_time: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub depth: Vec<f32>,
    pub sound_velocity: Vec<f32>,
}

/// File-wide swath-bathymetry summary (record id 9).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwathBathySummary {
    pub first_ping_time: DateTime<Utc>,
    pub last_ping_time: DateTime<Utc>,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// A single coerced processing-parameter value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterValue {
    Float(f32),
    Integer(i64),
    Bool(bool),
    Text(String),
    FloatArray(Vec<f32>),
    TextArray(Vec<String>),
    Timestamp(DateTime<Utc>),
}

/// Processing-parameter key/value pairs (record id 4), canonicalized and coerced per the
/// rules in the component design.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessingParameters {
    pub processed_time: Option<DateTime<Utc>>,
    pub values: BTreeMap<String, ParameterValue>,
}

/// A free-text comment (record id 6).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comment {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// One processing-history entry (record id 7).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub machine_name: String,
    pub operator_name: String,
    pub command: String,
    pub comment: String,
}

/// The ASCII version string carried by the Header record (record id 1).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GsfHeader {
    pub version: String,
}

/// Horizontal/vertical datum identifiers derived from processing parameters, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Crs {
    pub horizontal_datum: Option<String>,
    pub vertical_datum: Option<String>,
}

/// Advisory consistency analysis computed by the indexer. None of these conditions abort
/// decoding; they are surfaced for the caller to act on.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityInfo {
    pub min_beams: u16,
    pub max_beams: u16,
    pub beam_count_consistent: bool,
    pub duplicate_pings: bool,
    pub duplicate_ping_count: usize,
    pub schema_inconsistent: bool,
    pub schema_inconsistent_ping_indices: Vec<usize>,
}

/// The complete result of indexing one GSF file: everything the materializer and an
/// external sink need, short of the decoded beam arrays themselves.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileInfo {
    pub uri: String,
    pub version: Option<String>,
    pub size: u64,
    pub sensor_id: Option<u32>,
    pub sensor_name: Option<String>,
    pub crs: Crs,
    pub sub_record_schema: Vec<String>,
    pub quality_info: QualityInfo,
    pub record_counts: BTreeMap<RecordId, usize>,
    pub sub_record_counts: BTreeMap<u32, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub ping_groups: Vec<PingGroup>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub record_index: BTreeMap<RecordId, Vec<Record>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub ping_info: Vec<PingInfo>,
    pub swath_summary: Option<SwathBathySummary>,
    pub processing_parameters: Option<ProcessingParameters>,
    pub comments: Vec<Comment>,
    pub history: Vec<HistoryEntry>,
}

impl FileInfo {
    /// Total number of indexed records, across all kinds.
    pub fn total_record_count(&self) -> usize {
        self.record_counts.values().sum()
    }
}
