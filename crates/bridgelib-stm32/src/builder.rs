//! Stm32Builder -- fluent builder for constructing [`Stm32Bridge`] sessions.
//!
//! Separates configuration from construction so that callers can set up the
//! serial port and timeout before the transport is opened and the
//! session-start sequence runs.
//!
//! # Example
//!
//! ```no_run
//! use bridgelib_stm32::builder::Stm32Builder;
//! use bridgelib_stm32::models::f407_discovery;
//! use std::time::Duration;
//!
//! # async fn example() -> bridgelib_core::Result<()> {
//! let bridge = Stm32Builder::new(f407_discovery())
//!     .serial_port("/dev/ttyACM0")
//!     .command_timeout(Duration::from_millis(250))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use bridgelib_core::error::{Error, Result};
use bridgelib_core::transport::Transport;

use crate::bridge::{Stm32Bridge, DEFAULT_COMMAND_TIMEOUT};
use crate::models::Stm32Model;

/// Fluent builder for [`Stm32Bridge`].
///
/// All configuration has sensible defaults derived from the [`Stm32Model`],
/// so the simplest usage is:
///
/// ```ignore
/// let bridge = Stm32Builder::new(f407_discovery())
///     .serial_port("/dev/ttyACM0")
///     .build()
///     .await?;
/// ```
pub struct Stm32Builder {
    model: Stm32Model,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    command_timeout: Duration,
}

impl Stm32Builder {
    /// Create a new builder for the given board model.
    pub fn new(model: Stm32Model) -> Self {
        Stm32Builder {
            model,
            serial_port: None,
            baud_rate: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyACM0` or `COM5`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate for this model.
    ///
    /// The board enumerates as a USB CDC-ACM device, so the rate is cosmetic
    /// for the data path; it only matters for exotic serial adapters.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set the timeout for waiting for a reply to a single command
    /// (default: 100 ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Build an [`Stm32Bridge`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a `MockTransport`
    /// from `bridgelib-test-harness`) and for advanced use cases where the
    /// caller manages the transport lifecycle directly. The session-start
    /// sequence runs against the provided transport, so a mock must expect
    /// the flush, `sn` and `version` exchanges.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Stm32Bridge> {
        let mut bridge = Stm32Bridge::new(transport, self.model, self.command_timeout);
        bridge.initialize().await?;
        Ok(bridge)
    }

    /// Build an [`Stm32Bridge`] using a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// The baud rate defaults to the model's default if not overridden.
    pub async fn build(self) -> Result<Stm32Bridge> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = bridgelib_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}
