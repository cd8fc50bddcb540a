//! LED chaser on the four Discovery user LEDs.
//!
//! Demonstrates GPIO configuration and writes by cycling the F407
//! Discovery's onboard LEDs (green PD12, orange PD13, red PD14, blue PD15).
//! This is the "hello world" of a freshly flashed bridge board: if the
//! lights chase, the whole path from host to pin works.
//!
//! # Requirements
//!
//! - An STM32F407 Discovery running the bridge firmware
//! - Serial port path adjusted for your system
//!
//! # Usage
//!
//! ```sh
//! cargo run -p bridgelib --example blinky
//! ```

use std::time::Duration;

use bridgelib::stm32::models::f407_discovery;
use bridgelib::stm32::Stm32Builder;
use bridgelib::{Bridge, Pin, PinMode};

/// Chaser parameters.
const CYCLES: usize = 10; // full trips around the ring
const DWELL_MS: u64 = 150; // time each LED stays lit

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyACM0";

    println!("Connecting to bridge on {}...", serial_port);

    let mut bridge = Stm32Builder::new(f407_discovery())
        .serial_port(serial_port)
        .build()
        .await?;

    let info = bridge.info();
    println!(
        "Connected: {} (serial {}, firmware {})",
        info.model_name,
        info.serial_number.as_deref().unwrap_or("?"),
        info.firmware_version.as_deref().unwrap_or("?"),
    );

    let leds: Vec<Pin> = ["PD12", "PD13", "PD14", "PD15"]
        .iter()
        .map(|name| name.parse())
        .collect::<Result<_, _>>()?;

    // All four LED pins as push-pull outputs, starting dark.
    for &led in &leds {
        bridge.configure_gpio(led, PinMode::Output, None).await?;
        bridge.write_gpio(led, false).await?;
    }

    println!("Chasing {} times...", CYCLES);

    for _ in 0..CYCLES {
        for &led in &leds {
            bridge.write_gpio(led, true).await?;
            tokio::time::sleep(Duration::from_millis(DWELL_MS)).await;
            bridge.write_gpio(led, false).await?;
        }
    }

    println!("Done.");
    Ok(())
}
