//! Record Writer
//!
//! Encodes records as tab-separated lines onto any `Write`.

use std::io::{self, Write};

use super::{encode_field, Record, RecordSink, FIELD_SEPARATOR};

/// Writes one line per record
pub struct RecordWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Create a new record writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Encode and write one record
    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let mut line = String::with_capacity(256);
        for (i, value) in record.fields().iter().enumerate() {
            if i > 0 {
                line.push(FIELD_SEPARATOR);
            }
            line.push_str(&encode_field(value));
        }
        line.push('\n');

        self.writer.write_all(line.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Give back the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for RecordWriter<W> {
    fn record(&mut self, record: &Record) -> io::Result<()> {
        self.write_record(record)
    }
}
