use std::io::{self, Cursor, Read};

use rustyfeed::core::encoding::transcode_to_utf8;
use rustyfeed::core::tokenizer::DATA_BUFFER_SIZE;
use rustyfeed::record::{ITEM_FIELDS, MERGED_FIELDS};
use rustyfeed::{
    feed_to_tsv, parse_bytes, parse_feed, parse_feeds_parallel, Error, FeedInput, Field, Options,
    Record, RecordReader, RecordWriter, SliceSource, TailFilter, TailOptions,
};

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>Example</title>
  <link>http://example.com/</link>
  <item>
    <title>Hello &amp; World</title>
    <link>/news/1</link>
    <pubDate>Mon, 02 Jan 2023 03:04:05 GMT</pubDate>
  </item>
  <item>
    <title>Second</title>
    <link>http://other.example/2</link>
    <guid>2</guid>
    <description><![CDATA[<p>tab	and
newline</p>]]></description>
    <dc:creator>Jane</dc:creator>
  </item>
</channel>
</rss>
"#;

/// Hands out at most `chunk` bytes per read
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.len().min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn tsv(input: &str, options: &Options) -> String {
    let mut out = Vec::new();
    feed_to_tsv(input.as_bytes(), &mut out, options).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_rss_to_tsv() {
    let out = tsv(RSS, &Options::with_base_url("http://example.com"));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "1672628645\t2023-01-02 03:04:05 GMT+00:00\tHello & World\thttp://example.com/news/1\t\t\t\t\trss"
    );
    assert_eq!(
        lines[1],
        "\t\tSecond\thttp://other.example/2\t<p>tab\\tand\\nnewline</p>\thtml\t2\tJane\trss"
    );
}

#[test]
fn test_tsv_decodes_back() {
    let out = tsv(RSS, &Options::default());
    let records: Vec<Record> = RecordReader::new(Cursor::new(out), ITEM_FIELDS)
        .collect::<io::Result<_>>()
        .unwrap();
    assert_eq!(records[1].get(Field::Content), "<p>tab\tand\nnewline</p>");
    assert_eq!(records[0].timestamp(), Some(1_672_628_645));
}

#[test]
fn test_atom_in_latin1() {
    let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
        <feed xmlns=\"http://www.w3.org/2005/Atom\">\
        <entry><title>Caf\xE9</title><link href=\"http://x.example/a\"/>\
        <updated>2023-01-02T04:04:05+01:00</updated>\
        <author><name>Zo\xEB</name></author></entry></feed>";
    let records = parse_bytes(xml, &Options::default()).unwrap();
    assert_eq!(records.len(), 1);

    let r = &records[0];
    assert_eq!(r.get(Field::Title), "Caf\u{e9}");
    assert_eq!(r.get(Field::Author), "Zo\u{eb}");
    assert_eq!(r.get(Field::UnixTimestamp), "1672628645");
    assert_eq!(r.get(Field::Link), "http://x.example/a");
    assert_eq!(r.get(Field::FeedType), "atom");
}

#[test]
fn test_transcoded_input_streams_to_writer() {
    let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
        <rss><item><title>na\xEFve</title></item><item><title>two</title></item></rss>";
    let utf8 = transcode_to_utf8(xml);

    let mut writer = RecordWriter::new(Vec::new());
    let count = parse_feed(SliceSource::new(&utf8), &Options::default(), &mut writer).unwrap();
    assert_eq!(count, 2);
    assert_eq!(writer.written(), 2);

    let out = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(out, "\t\tna\u{ef}ve\t\t\t\t\t\trss\n\t\ttwo\t\t\t\t\t\trss\n");
}

#[test]
fn test_long_content_over_small_reads() {
    let body = "z".repeat(2 * DATA_BUFFER_SIZE + 3);
    let xml = format!("<rss><item><title>big</title><description>{body}</description></item></rss>");
    let reader = Trickle {
        data: xml.as_bytes(),
        chunk: 7,
    };

    let mut out = Vec::new();
    assert_eq!(feed_to_tsv(reader, &mut out, &Options::default()).unwrap(), 1);

    let line = String::from_utf8(out).unwrap();
    let record = rustyfeed::record::parse_line(&line, ITEM_FIELDS);
    assert_eq!(record.get(Field::Content), body);
}

struct Broken<'a> {
    data: &'a [u8],
}

impl Read for Broken<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"));
        }
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn test_read_error_keeps_finished_lines() {
    let reader = Broken {
        data: b"<rss><item><title>one</title></item><item><title>two",
    };
    let mut out = Vec::new();
    let err = feed_to_tsv(reader, &mut out, &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("\tone\t"));
}

#[test]
fn test_parallel_then_tail() {
    let now = 1_672_628_645 + 60;
    let feeds = [
        FeedInput {
            name: "example".to_string(),
            url: "http://example.com/rss".to_string(),
            base_url: Some("http://example.com".to_string()),
            data: RSS.as_bytes().to_vec(),
        },
        FeedInput {
            name: "empty".to_string(),
            data: b"<rss><channel/></rss>".to_vec(),
            ..FeedInput::default()
        },
    ];

    let mut writer = RecordWriter::new(Vec::new());
    for result in parse_feeds_parallel(&feeds) {
        for record in result.unwrap() {
            assert_eq!(record.len(), MERGED_FIELDS);
            writer.write_record(&record).unwrap();
        }
    }
    let lines = writer.into_inner();

    let mut filter = TailFilter::new(&TailOptions::default()).with_arity(MERGED_FIELDS);
    let mut seen = Vec::new();
    // Only the dated item passes; a second pass over the same lines adds nothing
    assert_eq!(filter.process(Cursor::new(&lines), &mut seen, now, true).unwrap(), 1);
    assert_eq!(filter.process(Cursor::new(&lines), &mut seen, now, true).unwrap(), 0);
    assert_eq!(seen[0].get(Field::FeedName), "example");
    assert_eq!(seen[0].get(Field::FeedUrl), "http://example.com/rss");
}
