//! STM32 bridge-board backend for bridgelib.
//!
//! This crate drives the STM32F407 Discovery "bridge" firmware, which turns
//! the board into a USB-attached GPIO/I2C/SPI/ADC/DAC/PWM adapter speaking a
//! newline-terminated text protocol. It provides:
//!
//! - **Protocol codec** ([`protocol`]) -- encode newline-terminated command
//!   lines and decode `OK`/`ERR` reply lines, with tokenization and error
//!   detection.
//! - **Command builders** ([`commands`]) -- construct correctly-formatted
//!   commands for every peripheral operation and parse the corresponding
//!   reply payloads.
//! - **Board models** ([`models`]) -- static capability data for supported
//!   boards (currently the STM32F407 Discovery).
//! - **Session engine** ([`bridge`]) -- full [`Bridge`](bridgelib_core::Bridge)
//!   trait implementation with transport abstraction, chip-select and ADC
//!   channel caching, and session-start identification.
//! - **Builder** ([`builder`]) -- fluent builder API for constructing
//!   [`Stm32Bridge`] sessions with smart defaults.
//!
//! # Protocol shape
//!
//! Every exchange is one command line answered by one reply line:
//!
//! - Commands are lowercase words with space-separated arguments; byte
//!   payloads are uppercase hex pairs (`i2c 3A 2 2A`).
//! - Replies are `OK` with optional payload tokens, or `ERR <code>` with a
//!   signed decimal error code from the firmware.
//!
//! # Example
//!
//! ```
//! use bridgelib_stm32::commands::{cmd_i2c_transfer, parse_hex_bytes};
//! use bridgelib_stm32::protocol::{decode_reply, DecodeResult, Reply};
//!
//! // Build a "write register 0x2A, read two bytes back" I2C command.
//! let cmd = cmd_i2c_transfer(0x3A, 2, &[0x2A]);
//! assert_eq!(cmd, b"i2c 3A 2 2A\n");
//!
//! // Simulate the device's reply.
//! let reply = b"OK 12 34 \n";
//! if let DecodeResult::Reply { reply: Reply::Ok(tokens), .. } = decode_reply(reply) {
//!     let data = parse_hex_bytes(&tokens).unwrap();
//!     assert_eq!(data, vec![0x12, 0x34]);
//! }
//! ```

pub mod bridge;
pub mod builder;
pub mod commands;
pub mod models;
pub mod protocol;

// Re-export the primary types for ergonomic `use bridgelib_stm32::*`.
pub use bridge::Stm32Bridge;
pub use builder::Stm32Builder;
pub use models::Stm32Model;
