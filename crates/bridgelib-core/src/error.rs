//! Error types for bridgelib.
//!
//! All fallible operations in bridgelib return [`Result<T>`], which uses the
//! unified [`Error`] enum. Argument validation errors (`InvalidPinName`,
//! `PinOutOfRange`, `InvalidParameter`, `TooLong`, and the capability
//! variants) are raised before any bytes reach the device; everything else
//! describes a failure of the exchange itself.

use crate::types::Pin;

/// Unified error type for all bridgelib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying transport failed (could not open, read, or write).
    #[error("transport error: {0}")]
    Transport(String),

    /// A pin name string did not match the `P<port><index>` form.
    #[error("invalid pin name '{0}': pins are written P<port><index> where port is A-E and index is 0-15 (e.g. PB5)")]
    InvalidPinName(String),

    /// A pin name parsed, but the index is outside the usable range.
    #[error("pin index {index} out of range: must be 0-15")]
    PinOutOfRange {
        /// The index as written.
        index: u32,
    },

    /// An argument failed validation before encoding.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A payload or encoded command exceeds a device limit.
    #[error("{what} of {len} bytes exceeds the device limit of {max}")]
    TooLong {
        /// What was oversized (e.g. "SPI write", "encoded command").
        what: &'static str,
        /// The offending length.
        len: usize,
        /// The device limit.
        max: usize,
    },

    /// The device reply could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No complete reply arrived within the response timeout.
    #[error("timed out waiting for a reply from the device")]
    Timeout,

    /// The device reported a numeric error code (`ERR <code>`).
    #[error("device error code {0}")]
    Device(i32),

    /// The device rejected the chip-select routing that precedes an SPI
    /// transfer. The cache is left untouched so the next transfer retries.
    #[error("failed to route SPI chip select to {pin}: device error code {code}")]
    ChipSelect {
        /// The requested chip-select pin.
        pin: Pin,
        /// The device's error code.
        code: i32,
    },

    /// The pin has no ADC channel (device-resolved, cached per session).
    #[error("{0} is not an ADC-capable pin")]
    NotAnAdcPin(Pin),

    /// The pin is not wired to a DAC channel on this board.
    #[error("{0} is not a DAC-capable pin")]
    NotADacPin(Pin),

    /// The pin is not wired to a PWM channel on this board.
    #[error("{0} is not a PWM-capable pin")]
    NotAPwmPin(Pin),

    /// The operation is not available on this board.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The transport is not connected (e.g. used after `close`).
    #[error("not connected")]
    NotConnected,

    /// An I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout bridgelib.
pub type Result<T> = std::result::Result<T, Error>;
