//! bridgelib-test-harness: Test utilities and mock transports for bridgelib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! protocol engines without requiring real bridge hardware.

pub mod mock_serial;

pub use mock_serial::MockTransport;
