//! Record Reader
//!
//! Splits tab-separated lines back into decoded field arrays.

use std::io::{self, BufRead};

use super::{decode_field, Record, FIELD_SEPARATOR};

/// Split one line into exactly `arity` decoded fields
///
/// Missing trailing fields are empty; fields past `arity` are discarded.
/// A trailing `\n` (or `\r\n`) is ignored.
pub fn parse_line(line: &str, arity: usize) -> Record {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields: Vec<String> = line
        .split(FIELD_SEPARATOR)
        .take(arity)
        .map(|field| decode_field(field).into_owned())
        .collect();
    fields.resize(arity, String::new());
    Record::from_fields(fields)
}

/// Iterator of records over a buffered reader
pub struct RecordReader<R: BufRead> {
    reader: R,
    arity: usize,
    line: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Read records of `arity` fields
    pub fn new(reader: R, arity: usize) -> Self {
        Self {
            reader,
            arity,
            line: String::with_capacity(1024),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(parse_line(&self.line, self.arity))),
            Err(e) => Some(Err(e)),
        }
    }
}
