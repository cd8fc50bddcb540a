//! I2C bus scan with a register read.
//!
//! Walks the device address space issuing a one-byte read at each address
//! and noting which ones acknowledge, then reads a register from the first
//! device found. Handy for checking wiring before writing a real driver.
//!
//! The board takes 8-bit wire addresses (the 7-bit device address shifted
//! left by one), so the probe sends `addr << 1` and prints the 7-bit value.
//! Device addresses 0x00-0x07 and 0x78-0x7F are reserved and are skipped.
//!
//! # Requirements
//!
//! - An STM32F407 Discovery running the bridge firmware
//! - Something wired to the I2C bus (PB6 = SCL, PB9 = SDA by default)
//!
//! # Usage
//!
//! ```sh
//! cargo run -p bridgelib --example i2c_probe
//! ```

use bridgelib::stm32::models::f407_discovery;
use bridgelib::stm32::Stm32Builder;
use bridgelib::{Bridge, Error};

/// Scan parameters.
const FIRST_ADDR: u8 = 0x08; // below this: reserved (general call etc.)
const LAST_ADDR: u8 = 0x77; // above this: reserved (10-bit addressing)
const BUS_SPEED_HZ: u32 = 100_000;
const PROBE_REGISTER: u8 = 0x00;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyACM0";

    println!("Connecting to bridge on {}...", serial_port);

    let mut bridge = Stm32Builder::new(f407_discovery())
        .serial_port(serial_port)
        .build()
        .await?;

    println!("Connected: {}", bridge.info().model_name);

    bridge.set_i2c_speed(BUS_SPEED_HZ).await?;
    println!(
        "Scanning 0x{:02X}-0x{:02X} at {} kHz...\n",
        FIRST_ADDR,
        LAST_ADDR,
        BUS_SPEED_HZ / 1_000
    );

    let mut found = Vec::new();
    for addr in FIRST_ADDR..=LAST_ADDR {
        match bridge.i2c_transfer(addr << 1, 1, &[]).await {
            Ok(_) => {
                println!("  0x{:02X}  ack", addr);
                found.push(addr);
            }
            // No acknowledge is the normal answer for an empty address.
            Err(Error::Device(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if found.is_empty() {
        println!("No devices answered.");
        return Ok(());
    }
    println!("\n{} device(s) found.", found.len());

    // Read one register from the first responder: write the register
    // address, repeated-start, read one byte back.
    let addr = found[0];
    let data = bridge.i2c_transfer(addr << 1, 1, &[PROBE_REGISTER]).await?;
    match data.first() {
        Some(value) => println!(
            "Register 0x{:02X} of device 0x{:02X} reads 0x{:02X}",
            PROBE_REGISTER, addr, value
        ),
        None => println!("Device 0x{:02X} sent no data back", addr),
    }

    Ok(())
}
