//! Transport implementations for bridgelib.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](bridgelib_core::Transport) trait from `bridgelib-core`:
//!
//! - [`SerialTransport`]: the USB virtual COM port (CDC-ACM) a bridge board
//!   enumerates as, or a real UART adapter wired to one
//!
//! # Example
//!
//! ```no_run
//! use bridgelib_transport::SerialTransport;
//! use bridgelib_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> bridgelib_core::Result<()> {
//! // Connect to a bridge board
//! let mut transport = SerialTransport::open("/dev/ttyACM0", 115200).await?;
//!
//! // Send a command line
//! transport.send(b"version\n").await?;
//!
//! // Receive the reply
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_millis(100)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
