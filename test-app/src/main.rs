// bridgelib test application -- CLI tool for exercising a bridge board's
// GPIO, I2C, SPI, ADC, DAC, and PWM peripherals against real hardware or a
// mock transport.
//
// Usage:
//   bridgelib-test-app --port /dev/ttyACM0 info
//   bridgelib-test-app --port /dev/ttyACM0 gpio config PD12 output
//   bridgelib-test-app --port /dev/ttyACM0 gpio write PD12 1
//   bridgelib-test-app --port /dev/ttyACM0 gpio blink PD12 --count 20
//   bridgelib-test-app --port /dev/ttyACM0 i2c scan
//   bridgelib-test-app --port /dev/ttyACM0 i2c xfer 0x3A --read 2 --write 2A
//   bridgelib-test-app --port /dev/ttyACM0 spi config 21000000 0 1
//   bridgelib-test-app --port /dev/ttyACM0 spi xfer PE3 8F00
//   bridgelib-test-app --port /dev/ttyACM0 adc PA1 --samples 10
//   bridgelib-test-app --port /dev/ttyACM0 dac enable
//   bridgelib-test-app --port /dev/ttyACM0 dac write PA4 1.5
//   bridgelib-test-app --port /dev/ttyACM0 pwm PE5 0.75
//   bridgelib-test-app --port /dev/ttyACM0 stress --count 500
//   bridgelib-test-app --mock info
//   bridgelib-test-app list

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;

use bridgelib::stm32::models::{all_stm32_models, Stm32Model};
use bridgelib::stm32::Stm32Builder;
use bridgelib::{Bridge, Pin, PinMode, Pull};
use bridgelib_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// bridgelib test application -- exercises bridge boards from the command line.
#[derive(Parser)]
#[command(name = "bridgelib-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM5).
    /// Required for all commands except `list` unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Override the default baud rate for this board.
    #[arg(long)]
    baud: Option<u32>,

    /// Board model name (see `list` for the known boards).
    #[arg(long, default_value = "STM32F4DISCOVERY")]
    model: String,

    /// Reply timeout per command, in milliseconds.
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Log filter (overridden by RUST_LOG), e.g. "debug" or
    /// "bridgelib_stm32=trace".
    #[arg(long, default_value = "warn")]
    log: String,

    /// Use a mock transport instead of a real serial port.
    /// Useful for verifying CLI parsing and builder wiring without hardware.
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print board identity and capabilities.
    Info,

    /// List all supported board models.
    List,

    /// GPIO operations.
    Gpio {
        #[command(subcommand)]
        action: GpioAction,
    },

    /// I2C operations.
    I2c {
        #[command(subcommand)]
        action: I2cAction,
    },

    /// SPI operations.
    Spi {
        #[command(subcommand)]
        action: SpiAction,
    },

    /// Read an ADC input and print the voltage.
    Adc {
        /// Pin name (e.g. PA1).
        pin: String,

        /// Number of samples to take.
        #[arg(long, default_value_t = 1)]
        samples: u32,

        /// Delay between samples in milliseconds.
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
    },

    /// DAC operations.
    Dac {
        #[command(subcommand)]
        action: DacAction,
    },

    /// Set a PWM output duty cycle.
    Pwm {
        /// Pin name (e.g. PE5).
        pin: String,

        /// Duty cycle from 0.0 to 1.0.
        duty: f32,
    },

    /// Stress test: rapid GPIO write/read-back cycles on one pin.
    Stress {
        /// Number of write/read cycles.
        #[arg(long, default_value_t = 100)]
        count: u32,

        /// Pin to exercise (an LED pin makes the test visible).
        #[arg(long, default_value = "PD12")]
        pin: String,
    },
}

#[derive(Subcommand)]
enum GpioAction {
    /// Configure a pin's mode and pull resistor.
    Config {
        /// Pin name (e.g. PD12).
        pin: String,

        /// Pin mode: input, output, output-od, or analog.
        mode: String,

        /// Pull resistor: up, down, or none (omit for the device default).
        #[arg(long)]
        pull: Option<String>,
    },

    /// Read a pin's input level.
    Read {
        /// Pin name (e.g. PA0).
        pin: String,
    },

    /// Drive a pin high or low.
    Write {
        /// Pin name (e.g. PD12).
        pin: String,

        /// Level: 0/1, on/off, or high/low.
        level: String,
    },

    /// Blink a pin (configures it as a push-pull output first).
    Blink {
        /// Pin name (e.g. PD12).
        pin: String,

        /// Number of blinks.
        #[arg(long, default_value_t = 10)]
        count: u32,

        /// On/off time in milliseconds.
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
    },
}

#[derive(Subcommand)]
enum I2cAction {
    /// Write then read on the I2C bus in one transaction.
    Xfer {
        /// 8-bit wire address: the 7-bit device address shifted left
        /// (hex, e.g. 0x80 for a device at 0x40).
        #[arg(value_parser = parse_hex_u8)]
        addr: u8,

        /// Number of bytes to read back.
        #[arg(long, default_value_t = 0)]
        read: usize,

        /// Bytes to write first, as a hex string (e.g. 2A01).
        #[arg(long, default_value = "")]
        write: String,
    },

    /// Scan the bus for responding devices.
    Scan,

    /// Set the bus clock rate in Hz.
    Speed {
        /// Clock rate in Hz (e.g. 100000 or 400000).
        hz: u32,
    },

    /// Route the I2C signals to a set of port B pins.
    Pins {
        /// Pin names, e.g. PB6 PB9.
        #[arg(required = true)]
        pins: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SpiAction {
    /// Configure the SPI clock rate and mode.
    Config {
        /// Clock rate in Hz; must be one the board can produce exactly
        /// (see `info` for the list).
        hz: u32,

        /// Clock polarity: 0 or 1.
        cpol: String,

        /// Clock phase: 0 or 1.
        cpha: String,
    },

    /// Run a full-duplex transfer against a chip-select pin.
    Xfer {
        /// Chip-select pin name (e.g. PE3).
        cs: String,

        /// Bytes to clock out, as a hex string (e.g. 8F00). Omit for a
        /// chip-select-only exchange.
        write: Option<String>,
    },
}

#[derive(Subcommand)]
enum DacAction {
    /// Route the DAC pins to the converters and power them on
    /// (required once before writes take effect).
    Enable,

    /// Set a DAC output voltage.
    Write {
        /// Pin name (PA4 or PA5 on the F407).
        pin: String,

        /// Output voltage; clamped to the converter's range.
        volts: f32,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a hex string like "0x3A" or "3A" into a u8.
fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

/// Parse a hex string like "2A01FF" (optionally 0x-prefixed, spaces allowed)
/// into bytes.
fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.trim();
    let cleaned: String = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.len() % 2 != 0 {
        bail!("hex string '{s}' has an odd number of digits");
    }

    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte '{}'", &cleaned[i..i + 2]))
        })
        .collect()
}

/// Format bytes as space-separated uppercase hex pairs.
fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a clock rate as a human-readable MHz/kHz string.
fn format_hz(hz: u32) -> String {
    if hz >= 1_000_000 {
        format!("{:.3} MHz", hz as f64 / 1_000_000.0)
    } else {
        format!("{:.3} kHz", hz as f64 / 1_000.0)
    }
}

/// Parse a pin name argument, turning the library error into CLI context.
fn parse_pin(s: &str) -> Result<Pin> {
    s.parse::<Pin>()
        .with_context(|| format!("invalid pin name '{s}'"))
}

/// Parse a 0/1-style level argument.
fn parse_level(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "0" | "off" | "low" => Ok(false),
        "1" | "on" | "high" => Ok(true),
        _ => bail!("invalid level '{s}' (use 0/1, on/off, or high/low)"),
    }
}

/// Parse a 0/1 mode bit (SPI cpol/cpha).
fn parse_mode_bit(what: &str, s: &str) -> Result<bool> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => bail!("invalid {what} '{s}' (use 0 or 1)"),
    }
}

/// Prompt the user for y/N confirmation. Returns true only if "y" or "Y"
/// entered.
fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    io::stdout().flush().ok();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim(), "y" | "Y")
}

// ---------------------------------------------------------------------------
// Model lookup
// ---------------------------------------------------------------------------

/// Normalize a model name for case-insensitive comparison.
/// Strips hyphens and spaces: "STM32F4-Discovery" -> "stm32f4discovery".
fn normalize_model(name: &str) -> String {
    name.to_lowercase().replace(['-', ' '], "")
}

/// Look up a board model by name or identifier (case-insensitive,
/// hyphen-insensitive).
fn lookup_model(name: &str) -> Result<Stm32Model> {
    let norm = normalize_model(name);
    for model in all_stm32_models() {
        if normalize_model(model.name) == norm || normalize_model(model.model_id) == norm {
            return Ok(model);
        }
    }

    let known: Vec<&'static str> = all_stm32_models().iter().map(|m| m.model_id).collect();
    bail!(
        "unknown board model '{}'. Supported models: {}",
        name,
        known.join(", ")
    );
}

// ---------------------------------------------------------------------------
// List command
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<()> {
    let boards = bridgelib::supported_boards();

    println!(
        "{:<24}  {:<18}  {:>8}  {:>4}  {:>4}",
        "Model", "Identifier", "Baud", "DAC", "PWM"
    );
    println!(
        "{:<24}  {:<18}  {:>8}  {:>4}  {:>4}",
        "-".repeat(24),
        "-".repeat(18),
        "-".repeat(8),
        "----",
        "----"
    );

    for board in &boards {
        println!(
            "{:<24}  {:<18}  {:>8}  {:>4}  {:>4}",
            board.model_name,
            board.model_id,
            board.default_baud_rate,
            board.capabilities.dac_channels.len(),
            board.capabilities.pwm_channels.len(),
        );
    }

    println!();
    println!("{} board(s) supported.", boards.len());

    Ok(())
}

// ---------------------------------------------------------------------------
// Bridge construction
// ---------------------------------------------------------------------------

/// Construct a bridge session from CLI arguments. Returns a trait object so
/// the command handlers stay board-agnostic.
async fn create_bridge(cli: &Cli) -> Result<Box<dyn Bridge>> {
    let model = lookup_model(&cli.model)?;

    let mut builder = Stm32Builder::new(model.clone())
        .command_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(baud) = cli.baud {
        builder = builder.baud_rate(baud);
    }

    if cli.mock {
        // The session-start sequence runs against the mock too, so preload
        // its exchanges. Commands past that point report the mock's
        // "unexpected command" error, which is exactly what this mode is
        // for: checking CLI wiring without hardware.
        let mut mock = MockTransport::new();
        mock.expect(b"\n", b"");
        mock.expect(b"sn\n", b"OK 00000000 00000000 00000000\n");
        mock.expect(b"version\n", b"OK 0.0\n");

        let bridge = builder
            .build_with_transport(Box::new(mock))
            .await
            .context("failed to build bridge with mock transport")?;
        println!("Connected (mock transport) -- {}", model.name);
        Ok(Box::new(bridge))
    } else {
        let port = cli
            .port
            .as_deref()
            .context("--port is required when not using --mock")?;
        let baud = cli.baud.unwrap_or(model.default_baud_rate);

        let bridge = builder
            .serial_port(port)
            .build()
            .await
            .with_context(|| format!("failed to open serial port {port} at {baud} baud"))?;

        println!("Connected to {port} at {baud} baud -- {}", model.name);
        Ok(Box::new(bridge))
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_info(bridge: &mut dyn Bridge) -> Result<()> {
    let info = bridge.info().clone();
    let caps = bridge.capabilities().clone();

    println!("Board Information");
    println!("  Model:          {}", info.model_name);
    println!(
        "  Serial number:  {}",
        info.serial_number.as_deref().unwrap_or("(not reported)")
    );
    println!(
        "  Firmware:       {}",
        info.firmware_version.as_deref().unwrap_or("(not reported)")
    );
    println!();
    println!("Capabilities");
    println!(
        "  DAC outputs:    {}",
        caps.dac_channels
            .iter()
            .map(|(pin, ch)| format!("{pin} (channel {ch})"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  PWM outputs:    {}",
        caps.pwm_channels
            .iter()
            .map(|(pin, ch)| format!("{pin} (channel {ch})"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  SPI clocks:     {}",
        caps.spi_speeds_hz
            .iter()
            .map(|hz| format_hz(*hz))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  ADC:            {} V full scale, {} counts",
        caps.adc_full_scale_volts, caps.adc_max_count
    );
    println!(
        "  DAC:            {} V full scale, {} counts",
        caps.dac_full_scale_volts, caps.dac_max_count
    );
    println!("  PWM period:     {} ticks", caps.pwm_period_ticks);
    println!(
        "  Transfer caps:  {} B SPI, {} B I2C",
        caps.max_spi_transfer, caps.max_i2c_transfer
    );
    Ok(())
}

async fn cmd_gpio_config(
    bridge: &mut dyn Bridge,
    pin_str: &str,
    mode_str: &str,
    pull_str: Option<&str>,
) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    let mode: PinMode = mode_str
        .parse()
        .with_context(|| format!("invalid mode '{mode_str}'"))?;
    let pull = match pull_str {
        Some(s) => Some(
            s.parse::<Pull>()
                .with_context(|| format!("invalid pull '{s}'"))?,
        ),
        None => None,
    };

    bridge.configure_gpio(pin, mode, pull).await?;
    match pull {
        Some(p) => println!("{pin}: {mode}, pull {p}"),
        None => println!("{pin}: {mode}"),
    }
    Ok(())
}

async fn cmd_gpio_read(bridge: &mut dyn Bridge, pin_str: &str) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    let level = bridge.read_gpio(pin).await?;
    println!("{pin}: {}", if level { "1 (high)" } else { "0 (low)" });
    Ok(())
}

async fn cmd_gpio_write(bridge: &mut dyn Bridge, pin_str: &str, level_str: &str) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    let level = parse_level(level_str)?;
    bridge.write_gpio(pin, level).await?;
    println!("{pin}: set {}", if level { "high" } else { "low" });
    Ok(())
}

async fn cmd_gpio_blink(
    bridge: &mut dyn Bridge,
    pin_str: &str,
    count: u32,
    interval_ms: u64,
) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    bridge.configure_gpio(pin, PinMode::Output, None).await?;

    println!("Blinking {pin} {count} times at {interval_ms} ms...");
    for _ in 0..count {
        bridge.write_gpio(pin, true).await?;
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        bridge.write_gpio(pin, false).await?;
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
    }
    println!("Done.");
    Ok(())
}

async fn cmd_i2c_xfer(
    bridge: &mut dyn Bridge,
    addr: u8,
    read_len: usize,
    write_hex: &str,
) -> Result<()> {
    let write = parse_hex_bytes(write_hex)?;

    if !write.is_empty() {
        println!("Write: {}", format_hex(&write));
    }
    let data = bridge.i2c_transfer(addr, read_len, &write).await?;
    if data.is_empty() {
        println!("Device 0x{addr:02X} acknowledged.");
    } else {
        println!("Read:  {}", format_hex(&data));
    }
    Ok(())
}

async fn cmd_i2c_scan(bridge: &mut dyn Bridge) -> Result<()> {
    println!("Scanning I2C bus...");
    println!();
    println!("     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f");

    let mut found = 0u32;
    for row in (0x00u8..0x80).step_by(16) {
        print!("{row:02x}:");
        for col in 0..16u8 {
            let addr = row + col;
            // 0x00-0x07 and 0x78-0x7F are reserved device addresses.
            if !(0x08..=0x77).contains(&addr) {
                print!("   ");
                continue;
            }
            // The grid shows 7-bit addresses; the wire takes them shifted.
            match bridge.i2c_transfer(addr << 1, 1, &[]).await {
                Ok(_) => {
                    print!(" {addr:02x}");
                    found += 1;
                }
                Err(bridgelib::Error::Device(_)) => print!(" --"),
                Err(e) => return Err(e.into()),
            }
        }
        println!();
    }

    println!();
    println!("{found} device(s) found (7-bit addresses shown).");
    Ok(())
}

async fn cmd_i2c_speed(bridge: &mut dyn Bridge, hz: u32) -> Result<()> {
    bridge.set_i2c_speed(hz).await?;
    println!("I2C clock set to {}", format_hz(hz));
    Ok(())
}

async fn cmd_i2c_pins(bridge: &mut dyn Bridge, pin_strs: &[String]) -> Result<()> {
    let pins = pin_strs
        .iter()
        .map(|s| parse_pin(s))
        .collect::<Result<Vec<Pin>>>()?;

    bridge.set_i2c_pins(&pins).await?;
    println!(
        "I2C routed to {}",
        pins.iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

async fn cmd_spi_config(
    bridge: &mut dyn Bridge,
    hz: u32,
    cpol_str: &str,
    cpha_str: &str,
) -> Result<()> {
    let cpol = parse_mode_bit("cpol", cpol_str)?;
    let cpha = parse_mode_bit("cpha", cpha_str)?;

    bridge.configure_spi(hz, cpol, cpha).await?;
    println!(
        "SPI configured: {}, cpol={}, cpha={}",
        format_hz(hz),
        cpol as u8,
        cpha as u8
    );
    Ok(())
}

async fn cmd_spi_xfer(
    bridge: &mut dyn Bridge,
    cs_str: &str,
    write_hex: Option<&str>,
) -> Result<()> {
    let cs = parse_pin(cs_str)?;
    let write = match write_hex {
        Some(s) => parse_hex_bytes(s)?,
        None => Vec::new(),
    };

    if !write.is_empty() {
        println!("MOSI: {}", format_hex(&write));
    }
    let data = bridge.spi_transfer(cs, &write).await?;
    println!("MISO: {}", format_hex(&data));
    Ok(())
}

async fn cmd_adc(
    bridge: &mut dyn Bridge,
    pin_str: &str,
    samples: u32,
    interval_ms: u64,
) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    let full_scale = bridge.capabilities().adc_full_scale_volts;

    for i in 1..=samples {
        let volts = bridge.read_adc(pin).await?;
        let bar_len = ((volts / full_scale) * 40.0) as usize;
        println!(
            "[{i}/{samples}] {pin}: {volts:.3} V  {}",
            "#".repeat(bar_len.min(40))
        );

        if i < samples {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }
    Ok(())
}

async fn cmd_dac_enable(bridge: &mut dyn Bridge) -> Result<()> {
    println!("WARNING: This drives the DAC pins as analog outputs.");
    println!("Ensure nothing else is connected to them that could be damaged.");
    if !confirm("Continue? [y/N] ") {
        println!("Aborted.");
        return Ok(());
    }

    bridge.enable_dac().await?;
    println!("DAC outputs enabled.");
    Ok(())
}

async fn cmd_dac_write(bridge: &mut dyn Bridge, pin_str: &str, volts: f32) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    bridge.write_dac(pin, volts).await?;
    println!("{pin}: {volts:.3} V");
    Ok(())
}

async fn cmd_pwm(bridge: &mut dyn Bridge, pin_str: &str, duty: f32) -> Result<()> {
    let pin = parse_pin(pin_str)?;
    bridge.write_pwm(pin, duty).await?;
    println!("{pin}: duty {:.1}%", duty * 100.0);
    Ok(())
}

async fn cmd_stress(bridge: &mut dyn Bridge, count: u32, pin_str: &str) -> Result<()> {
    let pin = parse_pin(pin_str)?;

    // Output mode so a read-back reflects the driven level.
    bridge.configure_gpio(pin, PinMode::Output, None).await?;

    println!("Stress test: {count} write/read cycles on {pin}");

    let mut rng = rand::thread_rng();
    let mut success = 0u32;
    let mut failures = 0u32;
    let start = Instant::now();

    for i in 1..=count {
        let level: bool = rng.gen_bool(0.5);

        if let Err(e) = bridge.write_gpio(pin, level).await {
            eprintln!("[{i}/{count}] write failed: {e}");
            failures += 1;
            continue;
        }

        match bridge.read_gpio(pin).await {
            Ok(readback) => {
                if readback == level {
                    success += 1;
                } else {
                    eprintln!("[{i}/{count}] mismatch: wrote {level}, read back {readback}");
                    failures += 1;
                }
            }
            Err(e) => {
                eprintln!("[{i}/{count}] read failed: {e}");
                failures += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    println!();
    println!("Results:");
    println!("  Total cycles:   {count}");
    println!("  Successes:      {success}");
    println!("  Failures:       {failures}");
    println!("  Elapsed:        {:.3} s", elapsed.as_secs_f64());
    println!("  Rate:           {rate:.1} cycles/sec");

    // Leave the pin low rather than wherever the last cycle landed.
    if let Err(e) = bridge.write_gpio(pin, false).await {
        eprintln!("Warning: failed to drive {pin} low: {e}");
    }

    if failures > 0 {
        bail!("{failures} out of {count} stress test cycles failed");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log so scripted runs can override the default.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // `list` does not need a board connection.
    if matches!(&cli.command, Command::List) {
        return cmd_list();
    }

    let mut bridge = create_bridge(&cli).await?;

    let result = match &cli.command {
        Command::Info => cmd_info(bridge.as_mut()).await,
        Command::Gpio { action } => match action {
            GpioAction::Config { pin, mode, pull } => {
                cmd_gpio_config(bridge.as_mut(), pin, mode, pull.as_deref()).await
            }
            GpioAction::Read { pin } => cmd_gpio_read(bridge.as_mut(), pin).await,
            GpioAction::Write { pin, level } => {
                cmd_gpio_write(bridge.as_mut(), pin, level).await
            }
            GpioAction::Blink {
                pin,
                count,
                interval_ms,
            } => cmd_gpio_blink(bridge.as_mut(), pin, *count, *interval_ms).await,
        },
        Command::I2c { action } => match action {
            I2cAction::Xfer { addr, read, write } => {
                cmd_i2c_xfer(bridge.as_mut(), *addr, *read, write).await
            }
            I2cAction::Scan => cmd_i2c_scan(bridge.as_mut()).await,
            I2cAction::Speed { hz } => cmd_i2c_speed(bridge.as_mut(), *hz).await,
            I2cAction::Pins { pins } => cmd_i2c_pins(bridge.as_mut(), pins).await,
        },
        Command::Spi { action } => match action {
            SpiAction::Config { hz, cpol, cpha } => {
                cmd_spi_config(bridge.as_mut(), *hz, cpol, cpha).await
            }
            SpiAction::Xfer { cs, write } => {
                cmd_spi_xfer(bridge.as_mut(), cs, write.as_deref()).await
            }
        },
        Command::Adc {
            pin,
            samples,
            interval_ms,
        } => cmd_adc(bridge.as_mut(), pin, *samples, *interval_ms).await,
        Command::Dac { action } => match action {
            DacAction::Enable => cmd_dac_enable(bridge.as_mut()).await,
            DacAction::Write { pin, volts } => {
                cmd_dac_write(bridge.as_mut(), pin, *volts).await
            }
        },
        Command::Pwm { pin, duty } => cmd_pwm(bridge.as_mut(), pin, *duty).await,
        Command::Stress { count, pin } => cmd_stress(bridge.as_mut(), *count, pin).await,
        Command::List => unreachable!("list handled above"),
    };

    bridge.close().await.ok();
    result
}
