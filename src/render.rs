//! Line-oriented output sinks
//!
//! Commands never print directly; they emit lines into a sink so the
//! embedding shell owns the console and tests can capture whole outputs.

use crate::core::types::Address;
use std::io::Write;

/// Receives one rendered line at a time.
pub trait LineSink {
    fn line(&mut self, text: &str);
}

impl LineSink for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Writes lines to any `io::Write`, swallowing I/O errors the way a console
/// printer does (a broken pipe must not unwind into the command loop).
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer }
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.writer, "{text}");
    }
}

/// Stdout-backed sink for the REPL binary.
pub fn stdout_sink() -> WriterSink<std::io::Stdout> {
    WriterSink::new(std::io::stdout())
}

/// Number of addresses shown per raw-traversal row.
pub const ADDRESSES_PER_ROW: usize = 5;

/// Formats one row of link addresses: `0x10 -> 0x20 -> 0x30`.
pub fn address_row(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
