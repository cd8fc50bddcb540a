//! bridgelib-core: Core traits, types, and error definitions for bridgelib.
//!
//! This crate defines the board-agnostic abstractions that all bridgelib
//! backends implement. Test fixtures and other applications depend on these
//! types without pulling in any specific board driver.
//!
//! # Key types
//!
//! - [`Bridge`] -- the unified trait for driving any bridge board
//! - [`Transport`] -- byte-level communication channel
//! - [`Pin`] / [`PinMode`] / [`Pull`] -- GPIO addressing
//! - [`Error`] / [`Result`] -- error handling

pub mod bridge;
pub mod error;
pub mod helpers;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use bridgelib_core::*`.
pub use bridge::Bridge;
pub use error::{Error, Result};
pub use helpers::{counts_from_volts, pwm_ticks_from_duty, volts_from_counts};
pub use transport::Transport;
pub use types::*;
