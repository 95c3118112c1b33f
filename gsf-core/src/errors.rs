//! Error types shared by the GSF decoding crates.

/// The error type returned by GSF decoding operations.
#[derive(Debug)]
pub enum GsfError {
    /// `TryFromSliceError` from the std library.
    TryFromSlice(std::array::TryFromSliceError),
    /// `FromUtf8Error` from the std library.
    TryFromUtf8(std::string::FromUtf8Error),
    /// `IoError` from the std library.
    StdIoError(std::io::Error),
    /// The stream ended before the declared amount of data could be read.
    UnexpectedEof { wanted: usize, available: usize },
    /// A record id outside of the known range (1..12).
    BadRecordId { id: u32 },
    /// A ping sub-record id outside of the known ranges.
    BadSubRecordId { id: u32 },
    /// A ping references beam sub-records but no scale-factor table could be resolved
    /// for it, and no default was permitted to stand in.
    MissingScaleFactors { ping_index: usize },
    /// A processing-parameter value could not be coerced to its expected type.
    ParseError { key: String, value: String },
    /// An error in the settings used to customize GSF parsing.
    SettingsError { msg: String },
    /// The stream is too short to contain even a single record header.
    FileTooShort,
    /// Enum creation error.
    ParseEnum { f: String, code: u32 },
}

impl From<std::array::TryFromSliceError> for GsfError {
    fn from(e: std::array::TryFromSliceError) -> Self {
        Self::TryFromSlice(e)
    }
}

impl From<std::string::FromUtf8Error> for GsfError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::TryFromUtf8(e)
    }
}

impl From<std::io::Error> for GsfError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl std::fmt::Display for GsfError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::GsfError::*;
        match self {
            StdIoError(x) => write!(fmt, "{}", x),
            TryFromSlice(x) => write!(fmt, "{}", x),
            TryFromUtf8(x) => write!(fmt, "{}", x),
            UnexpectedEof { wanted, available } => write!(
                fmt,
                "Unexpected end of stream: wanted {} bytes, {} available",
                wanted, available
            ),
            BadRecordId { id } => write!(fmt, "Unknown record id: {}", id),
            BadSubRecordId { id } => write!(fmt, "Unknown sub-record id: {}", id),
            MissingScaleFactors { ping_index } => write!(
                fmt,
                "Ping {} has no resolvable scale-factor table",
                ping_index
            ),
            ParseError { key, value } => {
                write!(fmt, "Could not parse processing parameter {}={}", key, value)
            }
            SettingsError { msg } => write!(fmt, "Error in settings: {}", msg),
            FileTooShort => write!(fmt, "File is too short to contain a GSF record"),
            ParseEnum { f, code } => write!(fmt, "Could not parse source ({}) to {}", code, f),
        }
    }
}

impl From<GsfError> for String {
    fn from(e: GsfError) -> String {
        e.to_string()
    }
}

impl std::error::Error for GsfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::GsfError::*;
        match self {
            StdIoError(x) => x.source(),
            TryFromSlice(x) => x.source(),
            TryFromUtf8(x) => x.source(),
            _ => None,
        }
    }
}
