//! The `Bridge` trait -- unified interface for all bridge board backends.
//!
//! This trait is the primary API surface of bridgelib. Test fixtures, lab
//! automation scripts, and peripheral drivers program against `dyn Bridge`
//! without needing to know which board's protocol is in use.
//!
//! Each board backend (bridgelib-stm32 today) provides a concrete type that
//! implements this trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Unified asynchronous interface for driving a bridge board.
///
/// All methods that communicate with the device are `async` because the
/// underlying transport involves serial I/O round-trips. Methods that return
/// cached state (like [`info()`](Bridge::info) and
/// [`capabilities()`](Bridge::capabilities)) are synchronous.
///
/// # Exclusivity
///
/// The wire protocol is strict request/reply on a half-duplex link, so every
/// I/O method takes `&mut self`: the borrow checker guarantees that one
/// exchange finishes before the next begins. To share a bridge between
/// tasks, wrap it in a `tokio::sync::Mutex`.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Return static information about the connected board (model, serial
    /// number, firmware version).
    fn info(&self) -> &BridgeInfo;

    /// Return the capabilities of the connected board.
    fn capabilities(&self) -> &BridgeCapabilities;

    /// Configure a GPIO pin's mode and, optionally, its pull resistor.
    ///
    /// Passing `None` for `pull` leaves the device's current pull setting
    /// alone; pass `Some(Pull::Floating)` to explicitly disable the pulls.
    async fn configure_gpio(&mut self, pin: Pin, mode: PinMode, pull: Option<Pull>) -> Result<()>;

    /// Read the input level of a GPIO pin.
    ///
    /// Returns `true` for high, `false` for low.
    async fn read_gpio(&mut self, pin: Pin) -> Result<bool>;

    /// Drive a GPIO pin high (`true`) or low (`false`).
    ///
    /// The pin must already be configured as an output.
    async fn write_gpio(&mut self, pin: Pin, level: bool) -> Result<()>;

    /// Perform an I2C transaction with the device at wire address `addr`.
    ///
    /// `addr` is the full 8-bit address byte as it appears on the wire,
    /// i.e. the 7-bit device address shifted left by one (a device at 0x40
    /// is addressed as 0x80). The board sets the read/write bit itself.
    ///
    /// The bytes in `write` are sent first, then `read_len` bytes are read
    /// back, all within one transaction. Either phase may be empty. Returns
    /// the bytes read, which may be fewer than requested if the device
    /// reply says so.
    async fn i2c_transfer(&mut self, addr: u8, read_len: usize, write: &[u8]) -> Result<Vec<u8>>;

    /// Set the I2C bus clock rate in Hz.
    ///
    /// Standard rates are 100 kHz and 400 kHz.
    async fn set_i2c_speed(&mut self, _hz: u32) -> Result<()> {
        Err(crate::error::Error::Unsupported(
            "I2C speed selection not supported".into(),
        ))
    }

    /// Select which pins the I2C peripheral is routed to.
    ///
    /// Boards with fixed I2C routing return `Unsupported`.
    async fn set_i2c_pins(&mut self, _pins: &[Pin]) -> Result<()> {
        Err(crate::error::Error::Unsupported(
            "I2C pin routing not supported".into(),
        ))
    }

    /// Perform a full-duplex SPI transfer with `cs` as the chip select.
    ///
    /// Every byte in `write` is clocked out while a byte is clocked in, so
    /// the returned vector has the same length as `write`. The chip select
    /// is asserted for the duration of the transfer.
    async fn spi_transfer(&mut self, cs: Pin, write: &[u8]) -> Result<Vec<u8>>;

    /// Configure the SPI clock rate and mode.
    ///
    /// `hz` must be a rate the board can produce exactly; see
    /// [`BridgeCapabilities::spi_speeds_hz`]. `cpol` and `cpha` select the
    /// usual SPI clock polarity and phase.
    async fn configure_spi(&mut self, hz: u32, cpol: bool, cpha: bool) -> Result<()>;

    /// Read the voltage on an ADC-capable pin.
    ///
    /// The pin must be in analog mode (see
    /// [`configure_gpio`](Bridge::configure_gpio)) for the reading to be
    /// meaningful.
    async fn read_adc(&mut self, pin: Pin) -> Result<f32>;

    /// Drive a DAC-capable pin to the given voltage.
    ///
    /// Voltages outside the DAC's range are clamped to it.
    async fn write_dac(&mut self, pin: Pin, volts: f32) -> Result<()>;

    /// Power up the DAC peripheral.
    ///
    /// Must be called once before [`write_dac`](Bridge::write_dac) on boards
    /// that gate the DAC behind an enable.
    async fn enable_dac(&mut self) -> Result<()> {
        Err(crate::error::Error::Unsupported(
            "DAC enable not supported".into(),
        ))
    }

    /// Set the duty cycle of a PWM-capable pin.
    ///
    /// `duty` is a fraction from 0.0 (always low) to 1.0 (always high);
    /// values outside that range are rejected.
    async fn write_pwm(&mut self, pin: Pin, duty: f32) -> Result<()>;

    /// Close the connection to the board.
    ///
    /// Subsequent I/O calls return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;
}
