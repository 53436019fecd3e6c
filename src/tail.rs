//! Tail Filter
//!
//! Follows a growing TSV file and passes on only records not seen before:
//! - records are keyed by (id, title, link)
//! - records older than `now - max_age` are skipped
//! - the history is bounded; the least recently seen keys are dropped first
//!
//! One filter per input. Two files may legitimately share keys.

use std::io::BufRead;

use log::debug;
use lru::LruCache;

use crate::error::Result;
use crate::options::TailOptions;
use crate::record::{Field, Record, RecordReader, RecordSink, ITEM_FIELDS};

type Key = (String, String, String);

fn key(record: &Record) -> Key {
    (
        record.get(Field::Id).to_string(),
        record.get(Field::Title).to_string(),
        record.get(Field::Link).to_string(),
    )
}

/// Dedup and age filter over records
pub struct TailFilter {
    max_age: i64,
    arity: usize,
    /// Key to record timestamp
    seen: LruCache<Key, i64>,
}

impl TailFilter {
    /// Create a filter reading 9-field records
    pub fn new(options: &TailOptions) -> Self {
        Self {
            max_age: options.max_age,
            arity: ITEM_FIELDS,
            seen: LruCache::new(options.history),
        }
    }

    /// Read records of `arity` fields instead
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Number of remembered keys
    #[inline]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[inline]
    fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.max_age)
    }

    /// Whether `record` is new and recent enough; remembers it if so
    pub fn filter(&mut self, record: &Record, now: i64) -> bool {
        let Some(timestamp) = record.timestamp() else {
            return false;
        };
        if timestamp < self.cutoff(now) {
            return false;
        }

        let key = key(record);
        if self.seen.get(&key).is_some() {
            return false;
        }
        self.seen.put(key, timestamp);
        true
    }

    /// Run every line of `reader` through the filter
    ///
    /// With `emit` set, new records go to `sink`; otherwise they only prime
    /// the history. Returns the number of new records.
    pub fn process<R: BufRead, K: RecordSink>(
        &mut self,
        reader: R,
        mut sink: K,
        now: i64,
        emit: bool,
    ) -> Result<usize> {
        let mut count = 0;
        for record in RecordReader::new(reader, self.arity) {
            let record = record?;
            if !self.filter(&record, now) {
                continue;
            }
            count += 1;
            if emit {
                sink.record(&record)?;
            }
        }
        Ok(count)
    }

    /// Forget keys whose records have aged out
    pub fn gc(&mut self, now: i64) -> usize {
        let cutoff = self.cutoff(now);
        let stale: Vec<Key> = self
            .seen
            .iter()
            .filter(|&(_, &timestamp)| timestamp < cutoff)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.seen.pop(key);
        }
        if !stale.is_empty() {
            debug!("tail gc: dropped {} entries", stale.len());
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordWriter;
    use std::io::Cursor;
    use std::num::NonZeroUsize;

    const NOW: i64 = 1_700_000_000;

    fn record(timestamp: i64, id: &str, title: &str) -> Record {
        let mut record = Record::new();
        record.set(Field::UnixTimestamp, timestamp.to_string());
        record.set(Field::Title, title);
        record.set(Field::Id, id);
        record
    }

    fn tsv(records: &[Record]) -> Vec<u8> {
        let mut writer = RecordWriter::new(Vec::new());
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn test_filter_dedup_and_age() {
        let mut filter = TailFilter::new(&TailOptions::default());
        assert!(filter.filter(&record(NOW - 10, "1", "a"), NOW));
        assert!(!filter.filter(&record(NOW - 5, "1", "a"), NOW));
        assert!(filter.filter(&record(NOW - 5, "1", "b"), NOW));
        assert!(!filter.filter(&record(NOW - 86_401, "2", "old"), NOW));
        assert!(!filter.filter(&record(0, "3", "x"), NOW));

        let mut undated = Record::new();
        undated.set(Field::Title, "no time");
        assert!(!filter.filter(&undated, NOW));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_process_first_pass_primes_only() {
        let old = tsv(&[record(NOW - 1, "1", "a"), record(NOW - 1, "2", "b")]);
        let grown = tsv(&[
            record(NOW - 1, "1", "a"),
            record(NOW - 1, "2", "b"),
            record(NOW, "3", "c"),
        ]);

        let mut filter = TailFilter::new(&TailOptions::default());
        let mut out = Vec::new();
        assert_eq!(filter.process(Cursor::new(old), &mut out, NOW, false).unwrap(), 2);
        assert!(out.is_empty());

        assert_eq!(filter.process(Cursor::new(grown), &mut out, NOW, true).unwrap(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get(Field::Title), "c");
    }

    #[test]
    fn test_history_is_bounded() {
        let options = TailOptions {
            history: NonZeroUsize::new(2).unwrap(),
            ..TailOptions::default()
        };
        let mut filter = TailFilter::new(&options);
        for id in ["1", "2", "3"] {
            assert!(filter.filter(&record(NOW, id, "t"), NOW));
        }
        assert_eq!(filter.len(), 2);
        // "1" was evicted and counts as new again
        assert!(filter.filter(&record(NOW, "1", "t"), NOW));
    }

    #[test]
    fn test_gc() {
        let mut filter = TailFilter::new(&TailOptions::default());
        filter.filter(&record(NOW - 100, "1", "a"), NOW);
        filter.filter(&record(NOW, "2", "b"), NOW);

        assert_eq!(filter.gc(NOW + 86_400 - 50), 1);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.gc(NOW), 0);
    }

    #[test]
    fn test_merged_arity() {
        let mut rec = record(NOW, "1", "a");
        rec.set(Field::FeedName, "news");
        let mut filter = TailFilter::new(&TailOptions::default()).with_arity(crate::record::MERGED_FIELDS);
        let mut out = Vec::new();
        filter.process(Cursor::new(tsv(&[rec])), &mut out, NOW, true).unwrap();
        assert_eq!(out[0].get(Field::FeedName), "news");
    }
}
