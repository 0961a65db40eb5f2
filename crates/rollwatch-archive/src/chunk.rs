use std::collections::HashSet;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// In-memory archive sink that publishes its length after every write,
/// so the open archive's size can be read while the writer owns it.
struct Spool {
    buf: Cursor<Vec<u8>>,
    len: Arc<AtomicU64>,
}

impl Write for Spool {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.buf.write(data)?;
        self.len
            .store(self.buf.get_ref().len() as u64, Ordering::Relaxed);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Spool {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buf.seek(pos)
    }
}

/// The archive currently being filled.
pub(crate) struct OpenChunk {
    index: usize,
    zip: ZipWriter<Spool>,
    len: Arc<AtomicU64>,
    names: HashSet<String>,
}

impl OpenChunk {
    pub(crate) fn new(index: usize) -> Self {
        let len = Arc::new(AtomicU64::new(0));
        let spool = Spool {
            buf: Cursor::new(Vec::new()),
            len: Arc::clone(&len),
        };
        Self {
            index,
            zip: ZipWriter::new(spool),
            len,
            names: HashSet::new(),
        }
    }

    /// Append one deflated entry and flush the compressor so [`OpenChunk::size`]
    /// reflects it.
    ///
    /// A name already present in this archive gets a `_2`, `_3`, ... suffix
    /// before its extension. Returns the name actually written.
    pub(crate) fn add(&mut self, name: &str, data: &[u8]) -> Result<String, ArchiveError> {
        let name = self.free_name(name);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name.as_str(), options)?;
        self.zip.write_all(data)?;
        self.zip.flush()?;
        self.names.insert(name.clone());
        Ok(name)
    }

    fn free_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) => name.split_at(dot),
            None => (name, ""),
        };
        (2..)
            .map(|n| format!("{stem}_{n}{ext}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Bytes written so far, central directory excluded.
    pub(crate) fn size(&self) -> u64 {
        self.len.load(Ordering::Relaxed)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(crate) fn seal(self) -> Result<SealedChunk, ArchiveError> {
        let spool = self.zip.finish()?;
        Ok(SealedChunk {
            index: self.index,
            entries: self.names.len(),
            bytes: spool.buf.into_inner(),
        })
    }
}

/// A finished archive, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedChunk {
    pub index: usize,
    pub entries: usize,
    pub bytes: Vec<u8>,
}

impl SealedChunk {
    pub fn file_name(&self) -> String {
        format!("Results_Part{}.zip", self.index)
    }

    pub fn size_mib(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn size_tracks_flushed_entries() {
        let mut chunk = OpenChunk::new(1);
        assert!(chunk.is_empty());
        assert_eq!(chunk.size(), 0);

        chunk.add("Result_1.pdf", &[b'a'; 4096]).unwrap();
        let after_one = chunk.size();
        assert!(after_one > 0);

        chunk.add("Result_2.pdf", &[b'b'; 4096]).unwrap();
        assert!(chunk.size() > after_one);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn repeated_names_get_suffixes() {
        let mut chunk = OpenChunk::new(1);
        assert_eq!(chunk.add("Result_9.pdf", b"one").unwrap(), "Result_9.pdf");
        assert_eq!(chunk.add("Result_9.pdf", b"two").unwrap(), "Result_9_2.pdf");
        assert_eq!(chunk.add("Result_9.pdf", b"three").unwrap(), "Result_9_3.pdf");
        assert_eq!(chunk.add("README", b"x").unwrap(), "README");
        assert_eq!(chunk.add("README", b"y").unwrap(), "README_2");

        let sealed = chunk.seal().unwrap();
        assert_eq!(sealed.entries, 5);
        let archive = zip::ZipArchive::new(Cursor::new(sealed.bytes)).unwrap();
        assert_eq!(archive.len(), 5);
    }

    #[test]
    fn sealed_chunk_is_a_readable_zip() {
        let mut chunk = OpenChunk::new(3);
        chunk.add("Result_7.pdf", b"%PDF-1.4 seven").unwrap();
        let sealed = chunk.seal().unwrap();

        assert_eq!(sealed.file_name(), "Results_Part3.zip");
        assert_eq!(sealed.entries, 1);

        let mut archive = zip::ZipArchive::new(Cursor::new(sealed.bytes)).unwrap();
        let mut entry = archive.by_name("Result_7.pdf").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "%PDF-1.4 seven");
    }
}
