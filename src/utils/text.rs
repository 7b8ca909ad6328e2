// src/utils/text.rs
//! Small text helpers shared by the extractors and storage.

use clap::ValueEnum;

/// How raw input bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// UTF-8, invalid sequences replaced with U+FFFD.
    Utf8,
    /// ISO-8859-1: every byte is one character.
    Latin1,
    /// UTF-8 when valid, otherwise latin-1.
    Auto,
}

/// Decodes raw file bytes and normalizes line endings to `\n`.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    let text = match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Latin1 => latin1(bytes),
        Encoding::Auto => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                tracing::debug!("Input is not valid UTF-8, decoding as latin-1");
                latin1(bytes)
            }
        },
    };
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Character-based slice `[start, end)` of a line, trimmed.
/// Offsets past the end of the line yield an empty string.
pub fn slice_column(line: &str, start: usize, end: Option<usize>) -> String {
    let taken = match end {
        Some(end) => line.chars().skip(start).take(end.saturating_sub(start)).collect::<String>(),
        None => line.chars().skip(start).collect::<String>(),
    };
    taken.trim().to_string()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
