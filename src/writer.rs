use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct FastqWriter<W: Write> {
    writer: BufWriter<W>,
}

impl FastqWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(FastqWriter::new(File::create(path)?))
    }
}

impl<W: Write> FastqWriter<W> {
    pub fn new(writer: W) -> Self {
        FastqWriter {
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_record(&mut self, head: &str, seq: &[u8], qual: &[u8]) -> Result<()> {
        self.writer.write_all(b"@")?;
        self.writer.write_all(head.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.write_all(seq)?;
        self.writer.write_all(b"\n+\n")?;
        self.writer.write_all(qual)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for FastqWriter<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

pub struct FastaWriter<W: Write> {
    writer: BufWriter<W>,
}

impl FastaWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(FastaWriter::new(File::create(path)?))
    }
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> Self {
        FastaWriter {
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_record(&mut self, head: &str, seq: &[u8]) -> Result<()> {
        self.writer.write_all(b">")?;
        self.writer.write_all(head.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.write_all(seq)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for FastaWriter<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
