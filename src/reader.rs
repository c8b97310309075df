use crate::error::{AnnotError, Result};
use crate::parser::FastqParser;
use flate2::read::MultiGzDecoder;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A fully loaded sequence file: memory-mapped when plain, inflated into
/// memory when gzip-compressed. The pipeline is batch-oriented and each
/// artifact is parsed exactly once, so borrowing records out of a single
/// buffer is sufficient.
pub enum ReadsFile {
    Mmap(Mmap),
    Buf(Vec<u8>),
}

impl ReadsFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            let file = File::open(path)?;
            let mut decoder = MultiGzDecoder::new(BufReader::new(file));
            let mut buf = Vec::new();
            decoder.read_to_end(&mut buf)?;
            Ok(ReadsFile::Buf(buf))
        } else {
            let file = File::open(path)?;
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            Ok(ReadsFile::Mmap(mmap))
        }
    }

    /// Like `open`, but an absent or empty file is a missing collaborator
    /// artifact rather than a bare IO error.
    pub fn open_artifact<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let missing = || AnnotError::MissingArtifact {
            path: path.to_path_buf(),
        };
        let meta = std::fs::metadata(path).map_err(|_| missing())?;
        if meta.len() == 0 {
            return Err(missing());
        }
        Self::open(path)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        match self {
            ReadsFile::Mmap(m) => m,
            ReadsFile::Buf(b) => b,
        }
    }

    pub fn records(&self) -> FastqParser<'_> {
        FastqParser::new(self.bytes())
    }
}
