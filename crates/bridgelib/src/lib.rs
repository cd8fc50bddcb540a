//! # bridgelib -- USB Peripheral Bridge Control
//!
//! `bridgelib` is an asynchronous Rust library for driving microcontroller
//! "bridge" boards: an MCU running a bridge firmware enumerates as a
//! USB-serial device and hands its GPIO, I2C, SPI, ADC, DAC, and PWM
//! peripherals to the host. It is designed for hardware test fixtures,
//! bring-up scripts, and lab automation where a full-speed logic analyzer or
//! a dedicated adapter per bus would be overkill.
//!
//! ## Quick Start
//!
//! Add `bridgelib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bridgelib = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a board and toggle an LED:
//!
//! ```no_run
//! use bridgelib::{Bridge, PinMode};
//! use bridgelib::stm32::{models::f407_discovery, Stm32Builder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut bridge = Stm32Builder::new(f407_discovery())
//!         .serial_port("/dev/ttyACM0")
//!         .build()
//!         .await?;
//!
//!     let led = "PD12".parse()?;
//!     bridge.configure_gpio(led, PinMode::Output, None).await?;
//!     bridge.write_gpio(led, true).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                   | Purpose                                       |
//! |-------------------------|-----------------------------------------------|
//! | `bridgelib-core`        | The [`Bridge`] trait, types, errors, converters |
//! | `bridgelib-transport`   | Serial (USB CDC-ACM) transport                |
//! | `bridgelib-stm32`       | STM32 text-protocol driver and board models   |
//! | `bridgelib-test-harness`| Mock transport for testing without hardware   |
//! | **`bridgelib`**         | This facade crate -- re-exports everything    |
//!
//! All board drivers implement the [`Bridge`] trait, so application code can
//! work with `dyn Bridge` and remain board-agnostic.
//!
//! ## Feature Flags
//!
//! Each board backend is gated behind a feature flag:
//!
//! | Feature | Enables                                | Default |
//! |---------|----------------------------------------|---------|
//! | `stm32` | [`stm32`] module (STM32 text protocol) | yes     |
//!
//! ## The `Bridge` Trait
//!
//! The [`Bridge`] trait is the central abstraction. It provides async methods
//! for every peripheral the firmware exposes:
//!
//! - **GPIO**: [`configure_gpio`](Bridge::configure_gpio),
//!   [`read_gpio`](Bridge::read_gpio), [`write_gpio`](Bridge::write_gpio)
//! - **I2C**: [`i2c_transfer`](Bridge::i2c_transfer),
//!   [`set_i2c_speed`](Bridge::set_i2c_speed),
//!   [`set_i2c_pins`](Bridge::set_i2c_pins)
//! - **SPI**: [`spi_transfer`](Bridge::spi_transfer),
//!   [`configure_spi`](Bridge::configure_spi)
//! - **Analog**: [`read_adc`](Bridge::read_adc),
//!   [`write_dac`](Bridge::write_dac), [`enable_dac`](Bridge::enable_dac)
//! - **PWM**: [`write_pwm`](Bridge::write_pwm)
//!
//! Operations take `&mut self`: the wire protocol is one command in flight
//! at a time, and the session holds state (SPI chip-select routing, ADC
//! channel lookups) that a concurrent caller would corrupt. Share a bridge
//! between tasks by wrapping it in a `tokio::sync::Mutex`.
//!
//! ## Supported Boards
//!
//! - **STM32**: STM32F407 Discovery

pub use bridgelib_core::*;

/// Transport implementations.
///
/// Provides [`SerialTransport`](transport::SerialTransport) for boards
/// attached over a serial port (USB CDC-ACM or a real UART). Custom
/// transports implement [`Transport`].
pub mod transport {
    pub use bridgelib_transport::*;
}

/// STM32 text-protocol backend.
///
/// Provides [`Stm32Bridge`](stm32::Stm32Bridge) and
/// [`Stm32Builder`](stm32::Stm32Builder) for boards running the STM32
/// bridge firmware, which speaks newline-terminated `OK`/`ERR` command
/// lines over USB CDC-ACM.
#[cfg(feature = "stm32")]
pub mod stm32 {
    pub use bridgelib_stm32::*;
}

/// Returns a flat list of all supported board models across all enabled
/// backends.
///
/// This is the primary entry point for applications that need to enumerate
/// supported boards (e.g. for a board picker dropdown). Each backend is
/// gated behind its feature flag -- only models from enabled backends are
/// included.
///
/// # Example
///
/// ```
/// let boards = bridgelib::supported_boards();
/// for board in &boards {
///     println!("{} ({} baud)", board.model_name, board.default_baud_rate);
/// }
/// ```
pub fn supported_boards() -> Vec<BoardDefinition> {
    let mut boards = Vec::new();

    #[cfg(feature = "stm32")]
    {
        boards.extend(
            stm32::models::all_stm32_models()
                .iter()
                .map(BoardDefinition::from),
        );
    }

    boards
}
