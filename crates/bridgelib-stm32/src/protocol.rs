//! Reply framing for the bridge firmware's text protocol.
//!
//! The firmware answers every command with exactly one newline-terminated
//! ASCII line. A line starting with `OK` carries zero or more payload tokens
//! after it; a line starting with `ERR` carries a signed numeric status
//! code. Tokens are separated by runs of spaces, and the firmware leaves a
//! trailing space after hex payloads, so decoding splits on whitespace
//! rather than counting separators.
//!
//! This module only classifies and tokenizes reply lines. Interpreting the
//! tokens (hex bytes, decimal counts, version strings) is command-specific
//! and lives in [`crate::commands`].

use bridgelib_core::error::{Error, Result};
use bytes::{BufMut, BytesMut};

/// The newline byte that terminates every firmware reply.
pub const TERMINATOR: u8 = b'\n';

/// Encode a command line into raw bytes ready for transmission.
///
/// Appends the newline terminator; this is the only place the terminator
/// is added, so command builders never include one.
///
/// # Example
///
/// ```
/// use bridgelib_stm32::protocol::encode_command;
///
/// assert_eq!(encode_command("version"), b"version\n");
/// assert_eq!(encode_command("gpio D 12 1"), b"gpio D 12 1\n");
/// ```
pub fn encode_command(line: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(line.len() + 1);
    buf.put_slice(line.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// A classified reply line from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success, with the whitespace-separated payload tokens after `OK`.
    Ok(Vec<String>),
    /// Failure, with the device's signed status code.
    Err(i32),
}

impl Reply {
    /// Returns the payload tokens of an `OK` reply, converting a device
    /// `ERR` into [`Error::Device`].
    ///
    /// Most operations treat any `ERR` uniformly; the ones that care about
    /// the code (chip-select routing, ADC channel lookup) match on the
    /// variants instead.
    pub fn into_tokens(self) -> Result<Vec<String>> {
        match self {
            Reply::Ok(tokens) => Ok(tokens),
            Reply::Err(code) => Err(Error::Device(code)),
        }
    }
}

/// Result of attempting to decode one reply line from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete reply line was decoded.
    Reply {
        /// The classified reply.
        reply: Reply,
        /// Number of bytes consumed from the input buffer.
        consumed: usize,
    },

    /// A complete line arrived but could not be classified. The line is
    /// consumed so a later reply can still be decoded from the buffer.
    Malformed {
        /// What was wrong with the line.
        reason: String,
        /// Number of bytes consumed from the input buffer.
        consumed: usize,
    },

    /// The buffer does not yet contain a complete line. More data is needed.
    Incomplete,
}

/// Decode one newline-terminated reply from a byte buffer.
///
/// Returns the first complete line found, or [`DecodeResult::Incomplete`]
/// if no terminator is present yet. A single carriage return before the
/// newline is tolerated. A blank line, a non-UTF-8 line, an `ERR` without
/// a parsable code, or a line starting with anything other than `OK` or
/// `ERR` decodes as [`DecodeResult::Malformed`].
pub fn decode_reply(buf: &[u8]) -> DecodeResult {
    if buf.is_empty() {
        return DecodeResult::Incomplete;
    }

    // Find the terminator.
    let term_pos = match buf.iter().position(|&b| b == TERMINATOR) {
        Some(pos) => pos,
        None => return DecodeResult::Incomplete,
    };

    let consumed = term_pos + 1;
    let mut body = &buf[..term_pos];

    // Tolerate CRLF line endings.
    if let [rest @ .., b'\r'] = body {
        body = rest;
    }

    let line = match std::str::from_utf8(body) {
        Ok(s) => s,
        Err(_) => {
            return DecodeResult::Malformed {
                reason: "reply contains non-UTF-8 bytes".into(),
                consumed,
            };
        }
    };

    let mut tokens = line.split_ascii_whitespace();
    match tokens.next() {
        Some("OK") => DecodeResult::Reply {
            reply: Reply::Ok(tokens.map(String::from).collect()),
            consumed,
        },
        Some("ERR") => match tokens.next().and_then(|t| t.parse::<i32>().ok()) {
            Some(code) => DecodeResult::Reply {
                reply: Reply::Err(code),
                consumed,
            },
            None => DecodeResult::Malformed {
                reason: format!("error reply without a numeric code: {line:?}"),
                consumed,
            },
        },
        Some(other) => DecodeResult::Malformed {
            reason: format!("unknown reply marker {other:?} in {line:?}"),
            consumed,
        },
        None => DecodeResult::Malformed {
            reason: "empty reply line".into(),
            consumed,
        },
    }
}
