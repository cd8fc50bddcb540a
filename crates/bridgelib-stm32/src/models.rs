//! STM32 bridge board definitions.
//!
//! Each supported board is described by an [`Stm32Model`] struct that
//! captures its capability table: which pins are wired to DAC and PWM
//! outputs, which SPI clock rates its peripheral clock tree can produce,
//! and the converter scaling constants.
//!
//! All boards running the bridge firmware speak the same text protocol over
//! USB CDC-ACM; the capability tables are what distinguish them. Models are
//! defined as factory functions (e.g. [`f407_discovery()`]) that return a
//! fully populated [`Stm32Model`].
//!
//! ADC routing is not part of the model: which pins reach an ADC channel is
//! resolved by asking the device itself, once per pin per session. For
//! reference, the F407 Discovery maps:
//!
//! | Pins      | ADC channels |
//! |-----------|--------------|
//! | PA0-PA7   | 0-7          |
//! | PB0-PB1   | 8-9          |
//! | PC0-PC5   | 10-15        |

use bridgelib_core::{BoardDefinition, BridgeCapabilities, Pin, Port};

/// Static model definition for an STM32 bridge board.
///
/// Contains everything needed to talk to a board before the session is
/// opened: default serial parameters and the full capability table.
#[derive(Debug, Clone)]
pub struct Stm32Model {
    /// Human-readable board name (e.g. "STM32F407 Discovery").
    pub name: &'static str,
    /// Machine-readable board identifier, matching ST's board designation.
    pub model_id: &'static str,
    /// Default serial baud rate. CDC-ACM ignores the rate on the USB side,
    /// but it is honored when the bridge is wired through a real UART.
    pub default_baud_rate: u32,
    /// Full capability table for this board.
    pub capabilities: BridgeCapabilities,
}

impl From<&Stm32Model> for BoardDefinition {
    fn from(model: &Stm32Model) -> Self {
        BoardDefinition {
            model_name: model.name,
            model_id: model.model_id,
            default_baud_rate: model.default_baud_rate,
            capabilities: model.capabilities.clone(),
        }
    }
}

/// DAC output routing on the F407: the two DAC channels are bonded to
/// PA4 and PA5 and cannot be remapped.
const F407_DAC_CHANNELS: [(Pin, u8); 2] = [(Pin::at(Port::A, 4), 0), (Pin::at(Port::A, 5), 1)];

/// PWM output routing on the F407 bridge firmware: TIM9 channels 1 and 2
/// on PE5 and PE6.
const F407_PWM_CHANNELS: [(Pin, u8); 2] = [(Pin::at(Port::E, 5), 0), (Pin::at(Port::E, 6), 1)];

/// SPI clock rates the F407 can produce exactly.
///
/// The SPI peripheral divides its 84 MHz bus clock by a power-of-two
/// prescaler from 2 to 256, so only these eight rates exist. Requests for
/// any other rate are rejected rather than silently rounded.
const F407_SPI_SPEEDS_HZ: [u32; 8] = [
    42_000_000, 21_000_000, 10_500_000, 5_250_000, 2_625_000, 1_312_500, 656_250, 328_125,
];

/// STM32F407 Discovery model definition.
///
/// ST's F407 evaluation board, running the bridge firmware. The firmware
/// exposes GPIO on ports A through E, one I2C bus (100 kHz at power-up,
/// routable to the port B I2C-capable pins), one SPI bus with any GPIO as
/// chip select, the two 12-bit DAC outputs, 12-bit ADC inputs, and two PWM
/// outputs.
///
/// Key constants:
/// - 3.0 V converter reference, 4095 full-scale count for both ADC and DAC
/// - PWM period of 10000 timer ticks
/// - 1024-byte ceiling on I2C and SPI transfers
/// - 4095-byte ceiling on a command line, terminator included
pub fn f407_discovery() -> Stm32Model {
    Stm32Model {
        name: "STM32F407 Discovery",
        model_id: "STM32F4DISCOVERY",
        default_baud_rate: 115_200,
        capabilities: BridgeCapabilities {
            dac_channels: F407_DAC_CHANNELS.to_vec(),
            pwm_channels: F407_PWM_CHANNELS.to_vec(),
            spi_speeds_hz: F407_SPI_SPEEDS_HZ.to_vec(),
            adc_full_scale_volts: 3.0,
            adc_max_count: 4095,
            dac_full_scale_volts: 3.0,
            dac_max_count: 4095,
            pwm_period_ticks: 10_000,
            max_spi_transfer: 1024,
            max_i2c_transfer: 1024,
            max_command_len: 4095,
        },
    }
}

/// Returns a list of all supported STM32 bridge board definitions.
///
/// Useful for building board selection UIs or iterating over all known
/// boards.
pub fn all_stm32_models() -> Vec<Stm32Model> {
    vec![f407_discovery()]
}
