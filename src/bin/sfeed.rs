//! sfeed - read an RSS/Atom document on stdin, write TSV records to stdout

use std::io::{self, BufWriter, Read};

use clap::Parser;

use rustyfeed::core::encoding::transcode_to_utf8;
use rustyfeed::{feed_to_tsv, parse_feed, Options, RecordWriter, SliceSource};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL for relative item links
    base_url: Option<String>,

    /// Stream stdin as-is, without charset detection
    #[arg(long)]
    raw: bool,
}

fn run(args: Args) -> rustyfeed::Result<usize> {
    let options = Options {
        base_url: args.base_url,
        transcode: !args.raw,
        ..Options::default()
    };

    let mut stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    if args.raw {
        return feed_to_tsv(stdin, stdout, &options);
    }

    let mut input = Vec::new();
    stdin.read_to_end(&mut input)?;
    let utf8 = transcode_to_utf8(&input);

    let mut writer = RecordWriter::new(stdout);
    let result = parse_feed(SliceSource::new(&utf8), &options, &mut writer);
    writer.flush()?;
    result
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("sfeed: {e}");
        std::process::exit(1);
    }
}
