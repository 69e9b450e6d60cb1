//! Trackwav CLI entry point.

#![allow(clippy::print_stderr)]

fn main() {
    if let Err(e) = trackwav::run() {
        eprintln!("error: {}", e.with_sources());
        std::process::exit(1);
    }
}
