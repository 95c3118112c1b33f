//! This module contains the [`GsfSettings`] structure which can be used to customize the GSF
//! parsing.
//!
//! NB: Most of these knobs trade strictness for tolerance of files that deviate from the
//! wire format, or trade completeness for speed on files where only a subset of the content
//! is of interest. Using them carelessly can hide genuine inconsistencies in a survey file.
use crate::errors::GsfError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
/// A list of settings controlling how a GSF file is opened and decoded.
///
/// This structure does not allow direct manipulation of fields, since some settings
/// interact with others (for example, allowing default scale factors only matters once
/// a ping is found to have none to carry forward). Use the setter and getter functions.
pub struct GsfSettings {
    /// Selects the in-memory `Stream` backend instead of the file-backed one.
    pub(crate) in_memory: bool,
    /// Whether `BadRecordId`/`BadSubRecordId` abort the file (true) or are skipped and logged.
    pub(crate) strict: bool,
    /// Whether the default scale-factor registry may stand in for a genuinely absent
    /// carry-forward predecessor instead of raising `MissingScaleFactors`.
    pub(crate) allow_default_scale_factors: bool,
    /// Whether the ping-array materializer computes per-beam longitude/latitude from
    /// across/along-track offsets and heading.
    pub(crate) materialize_geographic_projection: bool,
    /// An optional cap on the number of pings materialized, for bounded previews.
    pub(crate) max_ping_count: Option<usize>,
}

impl Default for GsfSettings {
    /// Creates the default instance: file-backed streaming, strict record-id checking,
    /// no default scale factors, geographic projection enabled, and no ping cap.
    fn default() -> Self {
        GsfSettings {
            in_memory: false,
            strict: true,
            allow_default_scale_factors: false,
            materialize_geographic_projection: true,
            max_ping_count: None,
        }
    }
}

impl GsfSettings {
    #[cfg(feature = "to_json")]
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self).map_err(|e| e.to_string())
    }

    /// Selects the in-memory stream backend. The whole file is read into an owned buffer
    /// once, rather than paged lazily through the filesystem.
    /// ```
    /// # use gsf_core::settings::GsfSettings;
    /// let mut settings = GsfSettings::default();
    /// assert!(!settings.get_in_memory());
    /// settings.set_in_memory(true);
    /// assert!(settings.get_in_memory());
    /// ```
    pub fn set_in_memory(&mut self, in_memory: bool) {
        self.in_memory = in_memory;
    }

    /// Sets whether unrecognized record/sub-record ids abort the file (`true`) or are
    /// skipped by declared size and logged (`false`).
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Sets whether the default scale-factor registry may substitute for a genuinely
    /// absent carry-forward predecessor.
    /// ```
    /// # use gsf_core::settings::GsfSettings;
    /// let mut settings = GsfSettings::default();
    /// assert!(!settings.get_allow_default_scale_factors());
    /// settings.set_allow_default_scale_factors(true);
    /// assert!(settings.get_allow_default_scale_factors());
    /// ```
    pub fn set_allow_default_scale_factors(&mut self, allow: bool) {
        self.allow_default_scale_factors = allow;
    }

    /// Sets whether per-beam longitude/latitude is computed during materialization.
    pub fn set_materialize_geographic_projection(&mut self, materialize: bool) {
        self.materialize_geographic_projection = materialize;
    }

    /// Caps the number of pings the materializer will decode.
    ///
    /// Passing zero is rejected, since it can never produce useful output.
    /// ```
    /// # use gsf_core::settings::GsfSettings;
    /// let mut settings = GsfSettings::default();
    /// assert!(settings.set_max_ping_count(0).is_err());
    /// settings.set_max_ping_count(10).unwrap();
    /// assert_eq!(settings.get_max_ping_count(), Some(10));
    /// ```
    pub fn set_max_ping_count(&mut self, count: usize) -> Result<(), GsfError> {
        if count == 0 {
            return Err(GsfError::SettingsError {
                msg: "max_ping_count must be greater than zero".to_string(),
            });
        }
        self.max_ping_count = Some(count);
        Ok(())
    }

    /// Clears a previously set ping-count cap.
    pub fn clear_max_ping_count(&mut self) {
        self.max_ping_count = None;
    }

    /// Gets whether the in-memory stream backend is selected.
    pub fn get_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Gets whether unrecognized ids abort the file.
    pub fn get_strict(&self) -> bool {
        self.strict
    }

    /// Gets whether default scale factors may be substituted.
    pub fn get_allow_default_scale_factors(&self) -> bool {
        self.allow_default_scale_factors
    }

    /// Gets whether geographic beam projection is computed.
    pub fn get_materialize_geographic_projection(&self) -> bool {
        self.materialize_geographic_projection
    }

    /// Gets the ping-count cap, if any.
    pub fn get_max_ping_count(&self) -> Option<usize> {
        self.max_ping_count
    }
}
