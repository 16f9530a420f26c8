//! In-memory file standing in for a filesystem object during an upload.
//!
//! [`MemFile`] is the write-then-read artifact for exactly one in-flight
//! upload: the request body is drained into it once, the storage client
//! reads it back (seeking as needed), and [`MemFile::close`] discards the
//! buffer when the request handler is done. Ownership is exclusive to the
//! request; the type is deliberately not shareable.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::SystemTime;

/// A named, growable, seekable in-memory byte buffer.
///
/// Writes always append; reads drain from an independent cursor, so the
/// whole buffer can be re-read after a rewind. No size bound is enforced at
/// this layer — the transport's body-size limit bounds it upstream.
#[derive(Debug)]
pub struct MemFile {
    name: String,
    buf: Vec<u8>,
    pos: u64,
}

/// Point-in-time metadata for a [`MemFile`].
///
/// `size` reflects buffer occupancy at call time and `modified` is the wall
/// clock at call time; neither is a stable snapshot.
#[derive(Debug, Clone)]
pub struct MemFileStat {
    /// The logical file name.
    pub name: String,
    /// Current buffer occupancy in bytes.
    pub size: u64,
    /// Unix permission bits reported for the pseudo-file.
    pub mode: u32,
    /// Wall-clock time at the moment of the stat call.
    pub modified: SystemTime,
}

impl MemFileStat {
    /// A memory file is never a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        false
    }
}

impl MemFile {
    /// Create an empty memory file with the given logical name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// The logical file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current buffer occupancy in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    /// Whether the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Report the file's metadata at call time.
    #[must_use]
    pub fn stat(&self) -> MemFileStat {
        MemFileStat {
            name: self.name.clone(),
            size: self.len(),
            mode: 0o666,
            modified: SystemTime::now(),
        }
    }

    /// Discard all buffered bytes and reset the read cursor.
    ///
    /// Idempotent; the file can be written again afterwards, though the
    /// upload pipeline never does.
    pub fn close(&mut self) {
        self.buf = Vec::new();
        self.pos = 0;
    }
}

impl Write for MemFile {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MemFile {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(self.pos)
            .unwrap_or(usize::MAX)
            .min(self.buf.len());
        let remaining = self.buf.len() - start;
        let n = remaining.min(out.len());
        out[..n].copy_from_slice(&self.buf[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(offset) => i128::from(self.len()) + i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.pos) + i128::from(offset),
        };
        let target = u64::try_from(target).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of file")
        })?;
        self.pos = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_write_then_read_back() {
        let mut file = MemFile::new("w3s-proxy.txt");
        file.write_all(b"hello").unwrap();
        assert_eq!(file.len(), 5);

        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_should_signal_end_of_data_when_exhausted() {
        let mut file = MemFile::new("f");
        file.write_all(b"abc").unwrap();
        let mut out = [0u8; 8];
        assert_eq!(file.read(&mut out).unwrap(), 3);
        assert_eq!(file.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_should_reread_after_rewind() {
        let mut file = MemFile::new("f");
        file.write_all(b"payload").unwrap();

        let mut first = String::new();
        file.read_to_string(&mut first).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut second = String::new();
        file.read_to_string(&mut second).unwrap();

        assert_eq!(first, "payload");
        assert_eq!(second, "payload");
    }

    #[test]
    fn test_should_append_on_write_regardless_of_cursor() {
        let mut file = MemFile::new("f");
        file.write_all(b"one").unwrap();
        let mut out = [0u8; 3];
        file.read_exact(&mut out).unwrap();
        file.write_all(b"two").unwrap();
        assert_eq!(file.len(), 6);
    }

    #[test]
    fn test_should_reject_seek_before_start() {
        let mut file = MemFile::new("f");
        file.write_all(b"abc").unwrap();
        assert!(file.seek(SeekFrom::Current(-1)).is_err());
    }

    #[test]
    fn test_should_report_stat_at_call_time() {
        let mut file = MemFile::new("w3s-proxy.b");
        file.write_all(b"1234").unwrap();

        let stat = file.stat();
        assert_eq!(stat.name, "w3s-proxy.b");
        assert_eq!(stat.size, 4);
        assert_eq!(stat.mode, 0o666);
        assert!(!stat.is_dir());

        file.write_all(b"5").unwrap();
        assert_eq!(file.stat().size, 5);
    }

    #[test]
    fn test_should_discard_contents_on_close() {
        let mut file = MemFile::new("f");
        file.write_all(b"sensitive").unwrap();
        file.close();
        assert!(file.is_empty());

        let mut out = [0u8; 8];
        assert_eq!(file.read(&mut out).unwrap(), 0);

        // Idempotent.
        file.close();
        assert!(file.is_empty());
    }
}
