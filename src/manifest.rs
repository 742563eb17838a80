//! On-disk manifest encoding.
//!
//! A manifest is a zstd stream whose decompressed payload is UTF-8 text with
//! one `relative/path:hexdigest\n` line per record. Digests are fixed length
//! hex and never contain `:`, so a path containing `:` is recovered by taking
//! everything before the last `:` on the line.

use std::io::{BufRead, BufReader, Read, Write};

/// zstd level used for new manifests.
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt manifest, line {line}: {content:?}")]
    CorruptLine { line: u64, content: String },
    #[error("Path cannot be stored in a manifest: {0:?}")]
    UnencodablePath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Relative to the root, `/` separated.
    pub path: String,
    /// Lowercase hex.
    pub digest: String,
}

impl Record {
    pub fn new(path: impl Into<String>, digest: impl Into<String>) -> Self {
        Record {
            path: path.into(),
            digest: digest.into(),
        }
    }

    /// Parses a single decoded line (without its trailing newline).
    ///
    /// `line_number` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_number: u64) -> Result<Self, CodecError> {
        match line.rsplit_once(':') {
            Some((path, digest)) => Ok(Record::new(path, digest)),
            None => Err(CodecError::CorruptLine {
                line: line_number,
                content: line.to_string(),
            }),
        }
    }
}

/// Streams records into a compressed manifest.
///
/// Call [`ManifestWriter::finish`] to write the compression epilogue; a writer
/// that is dropped without finishing leaves a truncated stream behind.
pub struct ManifestWriter<W: Write> {
    encoder: zstd::Encoder<'static, W>,
    records_written: u64,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(inner: W) -> Result<Self, CodecError> {
        Ok(ManifestWriter {
            encoder: zstd::Encoder::new(inner, COMPRESSION_LEVEL)?,
            records_written: 0,
        })
    }

    pub fn write_record(&mut self, record: &Record) -> Result<(), CodecError> {
        if record.path.contains('\n') || record.path.contains('\r') {
            return Err(CodecError::UnencodablePath(record.path.clone()));
        }

        writeln!(self.encoder, "{}:{}", record.path, record.digest)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flushes the compressed stream and hands back the underlying writer.
    pub fn finish(self) -> Result<W, CodecError> {
        let mut inner = self.encoder.finish()?;
        inner.flush()?;
        Ok(inner)
    }
}

/// Streams records back out of a compressed manifest, in stored order.
///
/// Each item carries the 1-based line number it was decoded from.
pub struct ManifestReader<R: Read> {
    lines: BufReader<zstd::Decoder<'static, BufReader<R>>>,
    line_number: u64,
    buffer: String,
}

impl<R: Read> ManifestReader<R> {
    pub fn new(inner: R) -> Result<Self, CodecError> {
        Ok(ManifestReader {
            lines: BufReader::new(zstd::Decoder::new(inner)?),
            line_number: 0,
            buffer: String::new(),
        })
    }

    /// Reads the next raw line, without its newline. `None` at end of stream.
    fn next_line(&mut self) -> Result<Option<&str>, CodecError> {
        self.buffer.clear();
        if self.lines.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buffer.ends_with('\n') {
            self.buffer.pop();
        }
        Ok(Some(&self.buffer))
    }
}

impl<R: Read> Iterator for ManifestReader<R> {
    type Item = Result<(u64, Record), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line_number = self.line_number + 1;
        match self.next_line() {
            Ok(Some(line)) => Some(Record::parse_line(line, line_number).map(|r| (line_number, r))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Counts the records in a compressed manifest without keeping them.
pub fn count_records<R: Read>(inner: R) -> Result<u64, CodecError> {
    let mut reader = ManifestReader::new(inner)?;
    while reader.next_line()?.is_some() {}
    Ok(reader.line_number)
}
