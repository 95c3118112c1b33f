//! Enumerations describing the closed sets of identifiers used throughout the GSF wire format.
use num_derive::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The top-level record kind, taken from the low 24 bits of a record's id word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordId {
    /// Record id 1: the ASCII GSF version string.
    Header = 1,
    /// Record id 2: a swath-bathymetry ping.
    SwathBathymetryPing = 2,
    /// Record id 3: a sound-velocity profile.
    SoundVelocityProfile = 3,
    /// Record id 4: processing-parameter key/value pairs.
    ProcessingParameters = 4,
    /// Record id 5: static sensor parameters.
    SensorParameters = 5,
    /// Record id 6: a free-text comment.
    Comment = 6,
    /// Record id 7: a processing-history entry.
    History = 7,
    /// Record id 8: obsolete navigation-error record, retained for id-space completeness.
    NavigationError = 8,
    /// Record id 9: file-wide swath-bathymetry summary.
    SwathBathySummary = 9,
    /// Record id 10: a single-beam ping.
    SingleBeamPing = 10,
    /// Record id 11: high/low-variance navigation error.
    HvNavigationError = 11,
    /// Record id 12: vessel attitude samples.
    Attitude = 12,
    /// Any id outside of the known range.
    Invalid,
}

impl RecordId {
    /// Construct a [`RecordId`] from its wire value, falling back to [`RecordId::Invalid`].
    pub fn new(source: u32) -> Self {
        num_traits::FromPrimitive::from_u32(source).unwrap_or(RecordId::Invalid)
    }
}

/// The sub-record kind found within a swath-bathymetry ping payload.
///
/// Ids below 100 identify beam arrays; id 100 identifies the scale-factors table;
/// ids from 102 upward are sensor-specific and carried as opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SubRecordId {
    Depth = 1,
    AcrossTrack = 2,
    AlongTrack = 3,
    TravelTime = 4,
    BeamAngle = 5,
    MeanCalAmplitude = 6,
    MeanRelAmplitude = 7,
    EchoWidth = 8,
    QualityFactor = 9,
    ReceiveHeave = 10,
    /// Obsolete, superseded by [`SubRecordId::VerticalError`].
    DepthError = 11,
    /// Obsolete, superseded by [`SubRecordId::HorizontalError`].
    AcrossTrackError = 12,
    /// Obsolete, superseded by [`SubRecordId::HorizontalError`].
    AlongTrackError = 13,
    NominalDepth = 14,
    QualityFlags = 15,
    BeamFlags = 16,
    SignalToNoise = 17,
    BeamAngleForward = 18,
    VerticalError = 19,
    HorizontalError = 20,
    IntensitySeries = 21,
    SectorNumber = 22,
    DetectionInfo = 23,
    IncidentBeamAdj = 24,
    SystemCleaning = 25,
    DopplerCorrection = 26,
    SonarVerticalUncertainty = 27,
    SonarHorizontalUncertainty = 28,
    DetectionWindow = 29,
    MeanAbsorption = 30,
    /// Id 100: the scale-factors table for this and any following ping lacking its own.
    ScaleFactors = 100,
    /// Any id outside of the known beam/scale-factor ranges; the sensor id itself is
    /// carried alongside, not encoded in this enum.
    SensorSpecific,
}

impl SubRecordId {
    /// Construct a [`SubRecordId`] from its wire value. Values in `102..=156` (and any
    /// other unrecognized value above 30) resolve to [`SubRecordId::SensorSpecific`].
    pub fn new(source: u32) -> Self {
        num_traits::FromPrimitive::from_u32(source).unwrap_or(SubRecordId::SensorSpecific)
    }

    /// True for beam-array sub-records (ids below 100).
    pub fn is_beam_array(self) -> bool {
        !matches!(self, SubRecordId::ScaleFactors | SubRecordId::SensorSpecific)
    }
}

/// The integer wire width and signedness of a beam sub-record's raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamWidth {
    U8,
    I8,
    U16,
    I16,
    I32,
}

impl SubRecordId {
    /// The wire width used to encode one beam's raw value for this sub-record.
    ///
    /// Follows the convention that flag- and index-like fields are narrow (a single byte)
    /// while angle, distance and time fields are 16-bit, with depth alone carried unsigned.
    pub fn beam_width(self) -> BeamWidth {
        use SubRecordId::*;
        match self {
            Depth => BeamWidth::U16,
            BeamFlags | QualityFactor | SignalToNoise | SectorNumber | DetectionInfo
            | SystemCleaning => BeamWidth::U8,
            IncidentBeamAdj => BeamWidth::I8,
            DopplerCorrection => BeamWidth::I16,
            VerticalError | HorizontalError | DepthError | AcrossTrackError | AlongTrackError => {
                BeamWidth::I16
            }
            _ => BeamWidth::I16,
        }
    }
}

/// A whitespace-agnostic, lower-cased name used for sub-record id ↔ name lookups in
/// file-level metadata (`FileInfo::sub_record_schema`).
pub fn sub_record_name(id: SubRecordId) -> &'static str {
    use SubRecordId::*;
    match id {
        Depth => "depth",
        AcrossTrack => "across_track",
        AlongTrack => "along_track",
        TravelTime => "travel_time",
        BeamAngle => "beam_angle",
        MeanCalAmplitude => "mean_cal_amplitude",
        MeanRelAmplitude => "mean_rel_amplitude",
        EchoWidth => "echo_width",
        QualityFactor => "quality_factor",
        ReceiveHeave => "receive_heave",
        DepthError => "depth_error",
        AcrossTrackError => "across_track_error",
        AlongTrackError => "along_track_error",
        NominalDepth => "nominal_depth",
        QualityFlags => "quality_flags",
        BeamFlags => "beam_flags",
        SignalToNoise => "signal_to_noise",
        BeamAngleForward => "beam_angle_forward",
        VerticalError => "vertical_error",
        HorizontalError => "horizontal_error",
        IntensitySeries => "intensity_series",
        SectorNumber => "sector_number",
        DetectionInfo => "detection_info",
        IncidentBeamAdj => "incident_beam_adj",
        SystemCleaning => "system_cleaning",
        DopplerCorrection => "doppler_correction",
        SonarVerticalUncertainty => "sonar_vertical_uncertainty",
        SonarHorizontalUncertainty => "sonar_horizontal_uncertainty",
        DetectionWindow => "detection_window",
        MeanAbsorption => "mean_absorption",
        ScaleFactors => "scale_factors",
        SensorSpecific => "sensor_specific",
    }
}

/// A name for a handful of well-known sensor-specific sub-record ids (102..156). Sensor
/// payloads themselves are never decoded by this crate; this registry only gives a human
/// readable label for file metadata. Unknown ids resolve to `None`.
pub fn sensor_name(raw_id: u32) -> Option<&'static str> {
    match raw_id {
        102 => Some("seabat"),
        104 => Some("em950"),
        105 => Some("em121a"),
        106 => Some("em1000"),
        108 => Some("em12_dual"),
        109 => Some("em1002"),
        110 => Some("em300"),
        111 => Some("em120"),
        112 => Some("em3000"),
        117 => Some("em710"),
        118 => Some("em302"),
        119 => Some("em122"),
        120 => Some("em2040"),
        123 => Some("reson7125"),
        124 => Some("reson8101"),
        _ => None,
    }
}
