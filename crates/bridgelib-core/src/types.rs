//! Core types shared across bridgelib.
//!
//! Pins are named the way they are printed on the board silkscreen: a `P`
//! followed by a port letter and a pin index, e.g. `PA3` or `PD12`. Parsing
//! is case-insensitive and accepts leading zeros in the index (`pa003` is
//! `PA3`), but the whole string must be a pin name; trailing or leading
//! garbage is rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A GPIO port on the bridge device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

impl Port {
    /// The port letter as printed in pin names and on the wire.
    pub fn letter(&self) -> char {
        match self {
            Port::A => 'A',
            Port::B => 'B',
            Port::C => 'C',
            Port::D => 'D',
            Port::E => 'E',
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Port {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let port = match (chars.next(), chars.next()) {
            (Some(c), None) => match c.to_ascii_uppercase() {
                'A' => Port::A,
                'B' => Port::B,
                'C' => Port::C,
                'D' => Port::D,
                'E' => Port::E,
                _ => return Err(Error::InvalidPinName(s.to_string())),
            },
            _ => return Err(Error::InvalidPinName(s.to_string())),
        };
        Ok(port)
    }
}

/// A single GPIO pin, identified by port and index.
///
/// Construct with [`Pin::new`] or parse from a name:
///
/// ```
/// use bridgelib_core::types::{Pin, Port};
///
/// let pin: Pin = "PD12".parse().unwrap();
/// assert_eq!(pin.port(), Port::D);
/// assert_eq!(pin.index(), 12);
/// assert_eq!(pin.to_string(), "PD12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin {
    port: Port,
    index: u8,
}

impl Pin {
    /// Creates a pin, rejecting indexes above 15.
    pub fn new(port: Port, index: u8) -> Result<Self> {
        if index > 15 {
            return Err(Error::PinOutOfRange {
                index: index as u32,
            });
        }
        Ok(Pin { port, index })
    }

    /// Creates a pin in const context, for static board tables.
    ///
    /// Panics if `index` is above 15; in a `const` item that panic is a
    /// compile error. Use [`Pin::new`] for runtime construction.
    pub const fn at(port: Port, index: u8) -> Self {
        assert!(index <= 15, "pin index out of range");
        Pin { port, index }
    }

    /// The pin's port.
    pub fn port(&self) -> Port {
        self.port
    }

    /// The pin's index within its port, 0 through 15.
    pub fn index(&self) -> u8 {
        self.index
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port, self.index)
    }
}

impl FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidPinName(s.to_string());
        let mut chars = s.chars();
        match chars.next() {
            Some('P') | Some('p') => {}
            _ => return Err(bad()),
        }
        let port = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('A') => Port::A,
            Some('B') => Port::B,
            Some('C') => Port::C,
            Some('D') => Port::D,
            Some('E') => Port::E,
            _ => return Err(bad()),
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let index: u32 = digits.parse().map_err(|_| bad())?;
        if index > 15 {
            return Err(Error::PinOutOfRange { index });
        }
        Ok(Pin {
            port,
            index: index as u8,
        })
    }
}

/// GPIO pin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input.
    Input,
    /// Push-pull output.
    Output,
    /// Open-drain output.
    OpenDrain,
    /// Analog mode, as required for ADC reads.
    Analog,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PinMode::Input => "input",
            PinMode::Output => "output",
            PinMode::OpenDrain => "output-od",
            PinMode::Analog => "analog",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PinMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "input" => Ok(PinMode::Input),
            "output" => Ok(PinMode::Output),
            "output-od" => Ok(PinMode::OpenDrain),
            "analog" => Ok(PinMode::Analog),
            _ => Err(Error::InvalidParameter(format!(
                "unknown pin mode '{s}': expected input, output, output-od, or analog"
            ))),
        }
    }
}

/// Internal pull resistor selection.
///
/// Passing `None` for an `Option<Pull>` argument leaves the device's current
/// pull setting alone; `Some(Pull::Floating)` explicitly disables the pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    /// Pull-up enabled.
    Up,
    /// Pull-down enabled.
    Down,
    /// No pull resistor.
    Floating,
}

impl fmt::Display for Pull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pull::Up => "up",
            Pull::Down => "down",
            Pull::Floating => "none",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Pull {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Pull::Up),
            "down" => Ok(Pull::Down),
            "none" => Ok(Pull::Floating),
            _ => Err(Error::InvalidParameter(format!(
                "unknown pull setting '{s}': expected up, down, or none"
            ))),
        }
    }
}

/// Identity of a connected bridge device.
///
/// The serial number and firmware version are read once when the session is
/// opened; either may be `None` if the device did not answer that query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeInfo {
    /// The board model name, e.g. "STM32F407 Discovery".
    pub model_name: String,
    /// Unique hardware serial number, if the device reported one.
    pub serial_number: Option<String>,
    /// Firmware version string, if the device reported one.
    pub firmware_version: Option<String>,
}

/// Static capabilities of a bridge board.
///
/// These describe what the hardware can do: which pins are wired to DAC and
/// PWM channels, which SPI clock rates the peripheral can produce, and the
/// scaling constants for the converters.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeCapabilities {
    /// Pins wired to DAC outputs, with their channel numbers.
    pub dac_channels: Vec<(Pin, u8)>,
    /// Pins wired to PWM outputs, with their channel numbers.
    pub pwm_channels: Vec<(Pin, u8)>,
    /// SPI clock rates the device can produce exactly, in Hz.
    pub spi_speeds_hz: Vec<u32>,
    /// ADC reference voltage; a full-scale count reads as this many volts.
    pub adc_full_scale_volts: f32,
    /// Maximum raw ADC count.
    pub adc_max_count: u16,
    /// DAC reference voltage.
    pub dac_full_scale_volts: f32,
    /// Maximum DAC count.
    pub dac_max_count: u16,
    /// PWM period in timer ticks; duty cycles scale to this.
    pub pwm_period_ticks: u32,
    /// Largest SPI transfer the device accepts, in bytes.
    pub max_spi_transfer: usize,
    /// Largest I2C transfer the device accepts, in bytes.
    pub max_i2c_transfer: usize,
    /// Longest command line the device accepts, including the terminator.
    pub max_command_len: usize,
}

impl BridgeCapabilities {
    /// Looks up the DAC channel for a pin, if it has one.
    pub fn dac_channel(&self, pin: Pin) -> Option<u8> {
        self.dac_channels
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, ch)| *ch)
    }

    /// Looks up the PWM channel for a pin, if it has one.
    pub fn pwm_channel(&self, pin: Pin) -> Option<u8> {
        self.pwm_channels
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, ch)| *ch)
    }

    /// Whether the SPI peripheral can produce this clock rate exactly.
    pub fn supports_spi_speed(&self, hz: u32) -> bool {
        self.spi_speeds_hz.contains(&hz)
    }
}

impl Default for BridgeCapabilities {
    fn default() -> Self {
        BridgeCapabilities {
            dac_channels: Vec::new(),
            pwm_channels: Vec::new(),
            spi_speeds_hz: Vec::new(),
            adc_full_scale_volts: 3.0,
            adc_max_count: 4095,
            dac_full_scale_volts: 3.0,
            dac_max_count: 4095,
            pwm_period_ticks: 10_000,
            max_spi_transfer: 1024,
            max_i2c_transfer: 1024,
            max_command_len: 4095,
        }
    }
}

/// A supported board model, independent of any backend.
///
/// Backends convert their model structs into this for enumeration (e.g. a
/// board picker in a host application). Constructed via `From` impls in the
/// backend crates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDefinition {
    /// Human-readable board name (e.g. "STM32F407 Discovery").
    pub model_name: &'static str,
    /// Machine-readable model identifier.
    pub model_id: &'static str,
    /// Default serial baud rate.
    pub default_baud_rate: u32,
    /// Full capability description for this board.
    pub capabilities: BridgeCapabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Pin parsing ---

    #[test]
    fn pin_parses_upper_and_lower_case() {
        let pin: Pin = "PA3".parse().unwrap();
        assert_eq!(pin.port(), Port::A);
        assert_eq!(pin.index(), 3);

        let pin: Pin = "pe15".parse().unwrap();
        assert_eq!(pin.port(), Port::E);
        assert_eq!(pin.index(), 15);
    }

    #[test]
    fn pin_parses_leading_zeros() {
        let pin: Pin = "PA003".parse().unwrap();
        assert_eq!(pin.port(), Port::A);
        assert_eq!(pin.index(), 3);
    }

    #[test]
    fn pin_rejects_unknown_port() {
        let err = "PF3".parse::<Pin>().unwrap_err();
        assert!(matches!(err, Error::InvalidPinName(_)));
    }

    #[test]
    fn pin_rejects_index_out_of_range() {
        let err = "PA16".parse::<Pin>().unwrap_err();
        assert!(matches!(err, Error::PinOutOfRange { index: 16 }));
    }

    #[test]
    fn pin_rejects_embedded_and_trailing_garbage() {
        assert!("XPA3".parse::<Pin>().is_err());
        assert!("PA3X".parse::<Pin>().is_err());
        assert!("PA 3".parse::<Pin>().is_err());
        assert!("PA".parse::<Pin>().is_err());
        assert!("P3".parse::<Pin>().is_err());
        assert!("".parse::<Pin>().is_err());
    }

    #[test]
    fn pin_display_round_trips() {
        for name in ["PA0", "PB9", "PC13", "PD12", "PE15"] {
            let pin: Pin = name.parse().unwrap();
            assert_eq!(pin.to_string(), name);
        }
    }

    #[test]
    fn pin_new_checks_range() {
        assert!(Pin::new(Port::B, 15).is_ok());
        assert!(matches!(
            Pin::new(Port::B, 16),
            Err(Error::PinOutOfRange { index: 16 })
        ));
    }

    #[test]
    fn pin_at_matches_parsed() {
        const LED: Pin = Pin::at(Port::D, 12);
        assert_eq!(LED, "PD12".parse::<Pin>().unwrap());
    }

    // --- Mode and pull parsing ---

    #[test]
    fn pin_mode_parses_and_displays() {
        assert_eq!("input".parse::<PinMode>().unwrap(), PinMode::Input);
        assert_eq!("OUTPUT".parse::<PinMode>().unwrap(), PinMode::Output);
        assert_eq!("output-od".parse::<PinMode>().unwrap(), PinMode::OpenDrain);
        assert_eq!("analog".parse::<PinMode>().unwrap(), PinMode::Analog);
        assert!("od".parse::<PinMode>().is_err());
        assert_eq!(PinMode::OpenDrain.to_string(), "output-od");
    }

    #[test]
    fn pull_parses_and_displays() {
        assert_eq!("up".parse::<Pull>().unwrap(), Pull::Up);
        assert_eq!("Down".parse::<Pull>().unwrap(), Pull::Down);
        assert_eq!("none".parse::<Pull>().unwrap(), Pull::Floating);
        assert!("weak".parse::<Pull>().is_err());
        assert_eq!(Pull::Floating.to_string(), "none");
    }

    // --- Capabilities ---

    fn caps_with_channels() -> BridgeCapabilities {
        BridgeCapabilities {
            dac_channels: vec![
                (Pin::new(Port::A, 4).unwrap(), 0),
                (Pin::new(Port::A, 5).unwrap(), 1),
            ],
            pwm_channels: vec![
                (Pin::new(Port::E, 5).unwrap(), 0),
                (Pin::new(Port::E, 6).unwrap(), 1),
            ],
            spi_speeds_hz: vec![21_000_000, 10_500_000],
            ..Default::default()
        }
    }

    #[test]
    fn capability_channel_lookups() {
        let caps = caps_with_channels();
        let pa4 = Pin::new(Port::A, 4).unwrap();
        let pe6 = Pin::new(Port::E, 6).unwrap();
        let pd12 = Pin::new(Port::D, 12).unwrap();

        assert_eq!(caps.dac_channel(pa4), Some(0));
        assert_eq!(caps.dac_channel(pd12), None);
        assert_eq!(caps.pwm_channel(pe6), Some(1));
        assert_eq!(caps.pwm_channel(pd12), None);
    }

    #[test]
    fn capability_spi_speed_lookup() {
        let caps = caps_with_channels();
        assert!(caps.supports_spi_speed(21_000_000));
        assert!(!caps.supports_spi_speed(20_000_000));
    }
}
