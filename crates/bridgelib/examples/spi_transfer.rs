//! SPI transfer against the Discovery's onboard motion sensor.
//!
//! The F407 Discovery ships with an ST MEMS accelerometer (LIS302DL or
//! LIS3DSH depending on board revision) on SPI1, chip select on PE3. This
//! example configures the bus, reads the sensor's WHO_AM_I register, and
//! identifies the part -- a full-duplex transfer with no external wiring
//! needed.
//!
//! # Requirements
//!
//! - An STM32F407 Discovery running the bridge firmware
//!
//! # Usage
//!
//! ```sh
//! cargo run -p bridgelib --example spi_transfer
//! ```

use bridgelib::stm32::models::f407_discovery;
use bridgelib::stm32::Stm32Builder;
use bridgelib::{Bridge, Pin};

/// Bus parameters. The sensor tops out at 10 MHz and talks SPI mode 3.
const SPI_HZ: u32 = 1_312_500;
const CS_PIN: &str = "PE3";

/// WHO_AM_I register, with the read bit (0x80) set. The second byte of the
/// transfer is a don't-care that clocks the answer out.
const WHO_AM_I_READ: [u8; 2] = [0x8F, 0x00];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyACM0";

    println!("Connecting to bridge on {}...", serial_port);

    let mut bridge = Stm32Builder::new(f407_discovery())
        .serial_port(serial_port)
        .build()
        .await?;

    println!("Connected: {}", bridge.info().model_name);

    let cs: Pin = CS_PIN.parse()?;

    bridge.configure_spi(SPI_HZ, true, true).await?;
    println!("SPI configured: {} Hz, mode 3, CS on {}\n", SPI_HZ, cs);

    let reply = bridge.spi_transfer(cs, &WHO_AM_I_READ).await?;
    println!("Transfer: {:02X?} -> {:02X?}", WHO_AM_I_READ, reply);

    match reply.get(1).copied() {
        Some(0x3B) => println!("WHO_AM_I = 0x3B: LIS302DL (early board revision)"),
        Some(0x3F) => println!("WHO_AM_I = 0x3F: LIS3DSH (later board revision)"),
        Some(other) => println!("WHO_AM_I = 0x{:02X}: unexpected part", other),
        None => println!("Sensor did not clock a second byte out"),
    }

    Ok(())
}
