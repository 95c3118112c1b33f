//! The [`Stream`] abstraction: a seekable byte source, implemented either lazily over a
//! file on disk or eagerly over a buffer already held in memory. Every decoder in this
//! crate is written against the trait, not against either concrete backend.
use gsf_core::GsfError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// The reference point for a [`Stream::seek`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

/// A seekable byte source. No method takes `&self`: a single `Stream` is never used
/// concurrently, since scale-factor carry-forward is inherently sequential.
pub trait Stream {
    /// Reads exactly `n` bytes, advancing the stream position. Fails with
    /// [`GsfError::UnexpectedEof`] if fewer than `n` bytes remain.
    fn read(&mut self, n: usize) -> Result<Vec<u8>, GsfError>;

    /// Moves the stream position relative to `whence`, returning the new absolute position.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, GsfError>;

    /// Returns the current absolute stream position.
    fn tell(&mut self) -> Result<u64, GsfError> {
        self.seek(0, Whence::Current)
    }

    /// Returns the total size of the underlying data, in bytes.
    fn size(&self) -> u64;
}

/// A file-backed [`Stream`]: reads are paged lazily through the filesystem.
pub struct FileStream {
    file: File,
    size: u64,
}

impl FileStream {
    /// Opens the file at `path` for lazy, file-backed reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GsfError> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(FileStream { file, size })
    }
}

impl Stream for FileStream {
    fn read(&mut self, n: usize) -> Result<Vec<u8>, GsfError> {
        let mut buf = vec![0u8; n];
        if let Err(e) = self.file.read_exact(&mut buf) {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                return Err(GsfError::UnexpectedEof {
                    wanted: n,
                    available: 0,
                });
            }
            return Err(e.into());
        }
        Ok(buf)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, GsfError> {
        let from = match whence {
            Whence::Start => SeekFrom::Start(offset as u64),
            Whence::Current => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        Ok(self.file.seek(from)?)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// An in-memory [`Stream`]: the whole file is read once into an owned buffer, and all
/// subsequent reads/seeks operate on a cursor into that buffer.
pub struct MemoryStream {
    data: Vec<u8>,
    position: usize,
}

impl MemoryStream {
    /// Reads the whole file at `path` into memory up front.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GsfError> {
        let data = std::fs::read(path)?;
        Ok(MemoryStream { data, position: 0 })
    }

    /// Wraps an already-owned buffer, e.g. one handed in by a caller that read it from an
    /// object store.
    pub fn from_vec(data: Vec<u8>) -> Self {
        MemoryStream { data, position: 0 }
    }
}

impl Stream for MemoryStream {
    fn read(&mut self, n: usize) -> Result<Vec<u8>, GsfError> {
        let available = self.data.len().saturating_sub(self.position);
        if available < n {
            return Err(GsfError::UnexpectedEof {
                wanted: n,
                available,
            });
        }
        let slice = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(slice.to_vec())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, GsfError> {
        let base: i64 = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i64,
            Whence::End => self.data.len() as i64,
        };
        let target = base + offset;
        if target < 0 || target as usize > self.data.len() {
            return Err(GsfError::SettingsError {
                msg: format!("seek to {} is out of bounds (len {})", target, self.data.len()),
            });
        }
        self.position = target as usize;
        Ok(self.position as u64)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memory_stream_reads_and_seeks() {
        let mut s = MemoryStream::from_vec(vec![1, 2, 3, 4, 5]);
        assert_eq!(s.size(), 5);
        assert_eq!(s.read(2).unwrap(), vec![1, 2]);
        assert_eq!(s.tell().unwrap(), 2);
        s.seek(0, Whence::Start).unwrap();
        assert_eq!(s.read(5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(s.read(1).is_err());
    }

    #[test]
    fn memory_stream_seek_end_and_current() {
        let mut s = MemoryStream::from_vec(vec![0; 10]);
        assert_eq!(s.seek(-3, Whence::End).unwrap(), 7);
        assert_eq!(s.seek(1, Whence::Current).unwrap(), 8);
        assert!(s.seek(-100, Whence::Current).is_err());
    }

    #[test]
    fn file_stream_reads_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[10, 20, 30, 40]).unwrap();
        let mut s = FileStream::open(file.path()).unwrap();
        assert_eq!(s.size(), 4);
        assert_eq!(s.read(2).unwrap(), vec![10, 20]);
        s.seek(0, Whence::Start).unwrap();
        assert_eq!(s.read(4).unwrap(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn file_stream_read_past_end_of_file_is_unexpected_eof() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        let mut s = FileStream::open(file.path()).unwrap();
        let err = s.read(4).unwrap_err();
        assert!(matches!(err, GsfError::UnexpectedEof { wanted: 4, .. }));
    }
}
