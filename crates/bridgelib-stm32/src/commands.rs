//! Bridge firmware command builders and reply parsers.
//!
//! This module provides functions to construct command lines for every
//! operation the firmware console understands (GPIO, I2C, SPI, ADC, DAC,
//! PWM, identity) and to parse the payload tokens of the corresponding
//! replies.
//!
//! All functions are pure -- they produce or consume byte vectors / token
//! slices without performing any I/O. The caller is responsible for sending
//! the bytes over a transport and feeding decoded reply tokens back into
//! the parsers. Argument validation (pin capabilities, transfer limits,
//! duty ranges) also happens at the calling layer; builders format exactly
//! what they are given.
//!
//! # Command reference
//!
//! | Command                    | Reply payload            |
//! |----------------------------|--------------------------|
//! | `gpiocfg A 3 in pullup`    | none                     |
//! | `gpio A 3`                 | level digit `0`/`1`      |
//! | `gpio D 12 1`              | none                     |
//! | `i2c 3A 2 xx xx`           | hex bytes read           |
//! | `config i2cspeed 400000`   | none                     |
//! | `config i2cpins 576`       | none                     |
//! | `spics E 3`                | none                     |
//! | `spicfg 21000000 0 1`      | none                     |
//! | `spi AA 01`                | hex bytes clocked in     |
//! | `adcnum A 0`               | ADC channel, decimal     |
//! | `adc 5`                    | raw count, decimal       |
//! | `dac 0 2730`               | none                     |
//! | `dacenable`                | none                     |
//! | `pwm 0 5000`               | none                     |
//! | `sn`                       | serial number words      |
//! | `version`                  | version string           |

use std::fmt::Write as _;

use bridgelib_core::{Error, Pin, PinMode, Pull, Result};

use crate::protocol::encode_command;

// ---------------------------------------------------------------
// Wire tokens
// ---------------------------------------------------------------

/// The firmware's token for a GPIO mode.
fn mode_token(mode: PinMode) -> &'static str {
    match mode {
        PinMode::Input => "in",
        PinMode::Output => "outpp",
        PinMode::OpenDrain => "outod",
        PinMode::Analog => "analog",
    }
}

/// The firmware's token for a pull resistor setting.
fn pull_token(pull: Pull) -> &'static str {
    match pull {
        Pull::Up => "pullup",
        Pull::Down => "pulldown",
        Pull::Floating => "nopull",
    }
}

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Build a "configure GPIO" command (`gpiocfg <port> <index> <mode> [pull]`).
///
/// The pull token is omitted entirely when `pull` is `None`, which leaves
/// the device's current pull setting alone.
pub fn cmd_configure_gpio(pin: Pin, mode: PinMode, pull: Option<Pull>) -> Vec<u8> {
    let mut line = format!(
        "gpiocfg {} {} {}",
        pin.port(),
        pin.index(),
        mode_token(mode)
    );
    if let Some(pull) = pull {
        let _ = write!(line, " {}", pull_token(pull));
    }
    encode_command(&line)
}

/// Build a "read GPIO" command (`gpio <port> <index>`).
///
/// The reply carries the pin's level as a single `0`/`1` token.
pub fn cmd_read_gpio(pin: Pin) -> Vec<u8> {
    encode_command(&format!("gpio {} {}", pin.port(), pin.index()))
}

/// Build a "write GPIO" command (`gpio <port> <index> <0|1>`).
pub fn cmd_write_gpio(pin: Pin, level: bool) -> Vec<u8> {
    encode_command(&format!(
        "gpio {} {} {}",
        pin.port(),
        pin.index(),
        if level { 1 } else { 0 }
    ))
}

/// Build an I2C transaction command (`i2c <addr> <rlen> [wbytes...]`).
///
/// The address is two uppercase hex digits, the read length is decimal,
/// and each write byte is appended as two uppercase hex digits.
pub fn cmd_i2c_transfer(addr: u8, read_len: usize, write: &[u8]) -> Vec<u8> {
    let mut line = format!("i2c {addr:02X} {read_len}");
    for byte in write {
        let _ = write!(line, " {byte:02X}");
    }
    encode_command(&line)
}

/// Build a "set I2C bus speed" command (`config i2cspeed <hz>`).
pub fn cmd_set_i2c_speed(hz: u32) -> Vec<u8> {
    encode_command(&format!("config i2cspeed {hz}"))
}

/// Build a "route I2C pins" command (`config i2cpins <mask>`).
///
/// `mask` is a decimal bitmask over port B, bit N set for pin PBN. The
/// caller computes it from already-validated pins.
pub fn cmd_set_i2c_pins(mask: u32) -> Vec<u8> {
    encode_command(&format!("config i2cpins {mask}"))
}

/// Build a "select SPI chip select" command (`spics <port> <index>`).
pub fn cmd_select_spi_cs(pin: Pin) -> Vec<u8> {
    encode_command(&format!("spics {} {}", pin.port(), pin.index()))
}

/// Build a "configure SPI" command (`spicfg <hz> <cpol> <cpha>`).
///
/// Polarity and phase are encoded as `0`/`1` digits.
pub fn cmd_configure_spi(hz: u32, cpol: bool, cpha: bool) -> Vec<u8> {
    encode_command(&format!(
        "spicfg {} {} {}",
        hz,
        if cpol { 1 } else { 0 },
        if cpha { 1 } else { 0 }
    ))
}

/// Build an SPI transfer command (`spi [wbytes...]`).
///
/// Each write byte is two uppercase hex digits. An empty transfer encodes
/// as a bare `spi`, which the firmware answers with an empty payload.
pub fn cmd_spi_transfer(write: &[u8]) -> Vec<u8> {
    let mut line = String::from("spi");
    for byte in write {
        let _ = write!(line, " {byte:02X}");
    }
    encode_command(&line)
}

/// Build an "ADC channel lookup" command (`adcnum <port> <index>`).
///
/// The reply carries the ADC channel number the pin is wired to, or a
/// device error if the pin has no channel.
pub fn cmd_adc_channel(pin: Pin) -> Vec<u8> {
    encode_command(&format!("adcnum {} {}", pin.port(), pin.index()))
}

/// Build an "ADC read" command (`adc <channel>`).
///
/// The reply carries the raw conversion count in decimal.
pub fn cmd_read_adc(channel: u8) -> Vec<u8> {
    encode_command(&format!("adc {channel}"))
}

/// Build a "DAC write" command (`dac <channel> <count>`).
pub fn cmd_write_dac(channel: u8, count: u16) -> Vec<u8> {
    encode_command(&format!("dac {channel} {count}"))
}

/// Build a "DAC enable" command (`dacenable`).
pub fn cmd_enable_dac() -> Vec<u8> {
    encode_command("dacenable")
}

/// Build a "PWM write" command (`pwm <channel> <ticks>`).
pub fn cmd_write_pwm(channel: u8, ticks: u32) -> Vec<u8> {
    encode_command(&format!("pwm {channel} {ticks}"))
}

/// Build a "read serial number" command (`sn`).
pub fn cmd_serial_number() -> Vec<u8> {
    encode_command("sn")
}

/// Build a "read firmware version" command (`version`).
pub fn cmd_version() -> Vec<u8> {
    encode_command("version")
}

// ---------------------------------------------------------------
// Reply parsers
// ---------------------------------------------------------------

/// Parse hex byte tokens from an I2C or SPI reply payload.
///
/// Each token is two hex digits (the firmware prints uppercase; lowercase
/// is accepted). The number of tokens is taken as authoritative for how
/// many bytes the device actually transferred.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if any token is not a valid hex
/// byte.
pub fn parse_hex_bytes(tokens: &[String]) -> Result<Vec<u8>> {
    tokens
        .iter()
        .map(|t| {
            u8::from_str_radix(t, 16)
                .map_err(|_| Error::MalformedResponse(format!("invalid hex byte {t:?} in reply")))
        })
        .collect()
}

/// Parse a GPIO level from a `gpio` read reply payload.
///
/// - `"0"` = low
/// - `"1"` = high
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the payload is empty or the
/// token is anything other than `0` or `1`.
pub fn parse_gpio_level(tokens: &[String]) -> Result<bool> {
    match tokens.first().map(String::as_str) {
        Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) => Err(Error::MalformedResponse(format!(
            "expected GPIO level 0 or 1, got {other:?}"
        ))),
        None => Err(Error::MalformedResponse(
            "GPIO read reply had no level token".into(),
        )),
    }
}

/// Parse an ADC channel number from an `adcnum` reply payload.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the payload is empty or not a
/// decimal channel number.
pub fn parse_adc_channel(tokens: &[String]) -> Result<u8> {
    let token = tokens.first().ok_or_else(|| {
        Error::MalformedResponse("ADC channel reply had no payload".into())
    })?;
    token
        .parse::<u8>()
        .map_err(|_| Error::MalformedResponse(format!("invalid ADC channel {token:?}")))
}

/// Parse a raw conversion count from an `adc` reply payload.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the payload is empty or not a
/// decimal count.
pub fn parse_adc_raw(tokens: &[String]) -> Result<u16> {
    let token = tokens
        .first()
        .ok_or_else(|| Error::MalformedResponse("ADC read reply had no payload".into()))?;
    token
        .parse::<u16>()
        .map_err(|_| Error::MalformedResponse(format!("invalid ADC count {token:?}")))
}

/// Parse a serial number from an `sn` reply payload.
///
/// The device reports its unique ID as several hex words; they concatenate
/// into one serial number string.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the payload is empty.
pub fn parse_serial_number(tokens: &[String]) -> Result<String> {
    if tokens.is_empty() {
        return Err(Error::MalformedResponse(
            "serial number reply had no payload".into(),
        ));
    }
    Ok(tokens.concat())
}

/// Parse a firmware version from a `version` reply payload.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the payload is empty.
pub fn parse_version(tokens: &[String]) -> Result<String> {
    tokens
        .first()
        .cloned()
        .ok_or_else(|| Error::MalformedResponse("version reply had no payload".into()))
}
