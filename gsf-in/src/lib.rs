//! Reads Generic Sensor Format (GSF) files: a two-pass decoder that first indexes every
//! record into a [`FileInfo`], then materializes ping beam arrays against their resolved
//! scale factors into a caller-supplied [`Sink`].
//!
//! Opening a file chooses between a lazy, file-backed [`Stream`] and an in-memory one
//! according to [`GsfSettings::get_in_memory`]; both are driven through the same trait so
//! the rest of the crate is oblivious to which backend is in play.
extern crate gsf_core;

pub mod indexer;
pub mod materializer;
pub mod ping;
pub mod record_header;
pub mod scalars;
pub mod sink;
pub mod stream;

pub use gsf_core::{FileInfo, GsfError, GsfSettings};
pub use sink::{Sink, VecSink};
pub use stream::{FileStream, MemoryStream, Stream, Whence};

use std::path::Path;

/// An opened, fully indexed GSF file. Holds its own stream and [`FileInfo`]; beam arrays
/// are decoded on demand via [`GsfFile::materialize`], not eagerly at open time.
pub struct GsfFile<S: Stream> {
    stream: S,
    info: FileInfo,
    settings: GsfSettings,
}

impl GsfFile<FileStream> {
    /// Opens `path` using a lazy, file-backed stream and indexes it immediately.
    pub fn open<P: AsRef<Path>>(path: P, settings: GsfSettings) -> Result<Self, GsfError> {
        let mut stream = FileStream::open(&path)?;
        let info = indexer::index(&mut stream, &path.as_ref().to_string_lossy(), &settings)?;
        Ok(GsfFile {
            stream,
            info,
            settings,
        })
    }
}

impl GsfFile<MemoryStream> {
    /// Opens `path` by reading the whole file into memory up front, then indexes it.
    pub fn open_in_memory<P: AsRef<Path>>(path: P, settings: GsfSettings) -> Result<Self, GsfError> {
        let mut stream = MemoryStream::open(&path)?;
        let info = indexer::index(&mut stream, &path.as_ref().to_string_lossy(), &settings)?;
        Ok(GsfFile {
            stream,
            info,
            settings,
        })
    }

    /// Indexes an already-owned buffer, for callers that read the bytes themselves (for
    /// instance from an object store).
    pub fn open_from_bytes(uri: &str, bytes: Vec<u8>, settings: GsfSettings) -> Result<Self, GsfError> {
        let mut stream = MemoryStream::from_vec(bytes);
        let info = indexer::index(&mut stream, uri, &settings)?;
        Ok(GsfFile {
            stream,
            info,
            settings,
        })
    }
}

impl<S: Stream> GsfFile<S> {
    /// Opens a file given an already-constructed `settings`-selected stream.
    ///
    /// Chooses between [`FileStream`] and [`MemoryStream`] itself based on
    /// [`GsfSettings::get_in_memory`] when the concrete backend doesn't matter to the
    /// caller; see [`open_auto`] for that convenience constructor.
    pub fn from_stream(mut stream: S, uri: &str, settings: GsfSettings) -> Result<Self, GsfError> {
        let info = indexer::index(&mut stream, uri, &settings)?;
        Ok(GsfFile {
            stream,
            info,
            settings,
        })
    }

    /// Gets the file-level index produced by the first pass.
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Gets the settings this file was opened with.
    pub fn settings(&self) -> &GsfSettings {
        &self.settings
    }

    /// Decodes beam arrays for every ping (up to `GsfSettings::max_ping_count`) and writes
    /// them to `sink`.
    pub fn materialize<K: Sink>(&mut self, sink: &mut K) -> Result<(), GsfError> {
        materializer::materialize(&mut self.stream, &self.info, &self.settings, sink)
    }

    /// Decodes every attitude record and writes one aggregated batch to `sink`.
    pub fn materialize_attitude<K: Sink>(&mut self, sink: &mut K) -> Result<(), GsfError> {
        materializer::materialize_attitude(&mut self.stream, &self.info, sink)
    }

    /// Decodes every sound-velocity-profile record and writes one batch per profile to `sink`.
    pub fn materialize_svp<K: Sink>(&mut self, sink: &mut K) -> Result<(), GsfError> {
        materializer::materialize_svp(&mut self.stream, &self.info, sink)
    }

    /// Consumes the file, returning its stream and index separately.
    pub fn deconstruct(self) -> (S, FileInfo) {
        (self.stream, self.info)
    }
}

/// Opens `path` choosing the stream backend according to `settings.get_in_memory()`.
pub fn open_auto<P: AsRef<Path>>(
    path: P,
    settings: GsfSettings,
) -> Result<GsfFileHandle, GsfError> {
    if settings.get_in_memory() {
        Ok(GsfFileHandle::Memory(GsfFile::open_in_memory(path, settings)?))
    } else {
        Ok(GsfFileHandle::File(GsfFile::open(path, settings)?))
    }
}

/// Either backend of an opened [`GsfFile`], returned by [`open_auto`] so callers that
/// don't care which backend was chosen can still hold a single value.
pub enum GsfFileHandle {
    File(GsfFile<FileStream>),
    Memory(GsfFile<MemoryStream>),
}

impl GsfFileHandle {
    /// Gets the file-level index, regardless of which backend underlies this handle.
    pub fn info(&self) -> &FileInfo {
        match self {
            GsfFileHandle::File(f) => f.info(),
            GsfFileHandle::Memory(f) => f.info(),
        }
    }

    /// Decodes beam arrays for every ping and writes them to `sink`.
    pub fn materialize<K: Sink>(&mut self, sink: &mut K) -> Result<(), GsfError> {
        match self {
            GsfFileHandle::File(f) => f.materialize(sink),
            GsfFileHandle::Memory(f) => f.materialize(sink),
        }
    }
}
