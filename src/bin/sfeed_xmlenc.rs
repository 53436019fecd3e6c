//! sfeed_xmlenc - print the encoding declared by the XML document on stdin

use std::io::{self, Read};

use rustyfeed::core::encoding::declared_encoding;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut input = Vec::new();
    if let Err(e) = io::stdin().lock().read_to_end(&mut input) {
        eprintln!("sfeed_xmlenc: {e}");
        std::process::exit(1);
    }

    match declared_encoding(&input) {
        Some(encoding) => println!("{encoding}"),
        None => std::process::exit(1),
    }
}
