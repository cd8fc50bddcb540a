//! ADC polling with a live bar graph.
//!
//! Samples an analog input at a fixed rate and prints a voltage bar per
//! sample. Useful for watching a potentiometer, a sensor output, or a
//! supply rail settle.
//!
//! The ADC reads against a 3.0 V reference with 12-bit resolution; the
//! channel behind the pin is resolved once by the device itself, so any
//! ADC-capable pin name works here (PA0-PA7, PB0-PB1, PC0-PC5 on the F407).
//!
//! # Requirements
//!
//! - An STM32F407 Discovery running the bridge firmware
//! - A voltage between 0 and 3 V on the monitored pin
//!
//! # Usage
//!
//! ```sh
//! cargo run -p bridgelib --example adc_monitor
//! ```

use std::time::Duration;

use bridgelib::stm32::models::f407_discovery;
use bridgelib::stm32::Stm32Builder;
use bridgelib::{Bridge, Pin, PinMode};

/// Monitor parameters.
const PIN_NAME: &str = "PA1";
const SAMPLES: usize = 50;
const INTERVAL_MS: u64 = 200;
const BAR_WIDTH: usize = 40; // columns at full scale

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyACM0";

    println!("Connecting to bridge on {}...", serial_port);

    let mut bridge = Stm32Builder::new(f407_discovery())
        .serial_port(serial_port)
        .build()
        .await?;

    println!("Connected: {}", bridge.info().model_name);

    let pin: Pin = PIN_NAME.parse()?;
    let full_scale = bridge.capabilities().adc_full_scale_volts;

    // Put the pin in analog mode so the digital input stage is off.
    bridge.configure_gpio(pin, PinMode::Analog, None).await?;

    println!(
        "Sampling {} every {} ms ({} samples)...\n",
        pin, INTERVAL_MS, SAMPLES
    );

    for i in 0..SAMPLES {
        let volts = bridge.read_adc(pin).await?;

        let bar_len = ((volts / full_scale) * BAR_WIDTH as f32) as usize;
        let bar: String = "#".repeat(bar_len.min(BAR_WIDTH));

        println!("{:>3}: {:>6.3} V  {}", i, volts, bar);

        tokio::time::sleep(Duration::from_millis(INTERVAL_MS)).await;
    }

    Ok(())
}
