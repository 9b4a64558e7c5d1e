//! Repair of near-valid JSON payloads
//!
//! The DOC API regularly returns article lists that are almost JSON: raw
//! backslashes inside titles, newlines inside string values, and the odd
//! stray control byte. This module applies a fixed cleanup pass and then a
//! bounded delete-and-retry loop:
//!
//! 1. Escape every backslash and drop every `\n` byte
//! 2. Parse
//! 3. On a syntax error at byte offset `p`, delete the byte at `p` and parse
//!    again from scratch
//!
//! The loop can silently drop a byte that was not the real defect; callers
//! get the number of repairs so it can be logged.

use crate::SanitizeError;
use serde_json::error::Category;
use serde_json::Value;

/// Bytes of payload quoted in error messages
const SNIPPET_LEN: usize = 120;

/// A successfully decoded payload
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    /// The decoded document
    pub value: Value,

    /// Bytes deleted by the repair loop
    pub repairs: usize,
}

/// Escapes backslashes and removes newline bytes
pub fn strip_invalid_characters(body: &[u8]) -> Vec<u8> {
    let mut cleaned = Vec::with_capacity(body.len() + body.len() / 16);
    for &byte in body {
        match byte {
            b'\\' => cleaned.extend_from_slice(b"\\\\"),
            b'\n' => {}
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Cleans and decodes a response body
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `max_repairs` - Maximum number of bytes the repair loop may delete
///
/// # Returns
///
/// * `Ok(Sanitized)` - Decoded JSON and the number of repairs it took
/// * `Err(SanitizeError)` - The payload could not be repaired within budget
pub fn sanitize(body: &[u8], max_repairs: usize) -> Result<Sanitized, SanitizeError> {
    parse_with_repairs(strip_invalid_characters(body), max_repairs)
}

/// Runs the delete-and-retry loop on already cleaned bytes
pub fn parse_with_repairs(
    mut bytes: Vec<u8>,
    max_repairs: usize,
) -> Result<Sanitized, SanitizeError> {
    let mut repairs = 0;

    loop {
        let err = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => return Ok(Sanitized { value, repairs }),
            Err(err) => err,
        };

        if err.classify() == Category::Eof {
            return Err(SanitizeError::Unrepairable {
                message: err.to_string(),
                snippet: snippet(&bytes),
            });
        }

        if repairs >= max_repairs {
            return Err(SanitizeError::Exhausted {
                repairs,
                message: err.to_string(),
                snippet: snippet(&bytes),
            });
        }

        let Some(offset) = error_offset(&bytes, err.line(), err.column()) else {
            return Err(SanitizeError::Unrepairable {
                message: err.to_string(),
                snippet: snippet(&bytes),
            });
        };

        tracing::trace!(offset, byte = bytes[offset], "Deleting byte from payload");
        bytes.remove(offset);
        repairs += 1;
    }
}

/// Converts serde_json's 1-based line/column into a byte offset
///
/// Columns count bytes and point at the offending byte, so the offset is
/// `column - 1` bytes into the given line.
fn error_offset(bytes: &[u8], line: usize, column: usize) -> Option<usize> {
    let line_start = if line <= 1 {
        0
    } else {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)?
    };

    let offset = line_start + column.checked_sub(1)?;
    (offset < bytes.len()).then_some(offset)
}

fn snippet(bytes: &[u8]) -> String {
    let end = bytes.len().min(SNIPPET_LEN);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
