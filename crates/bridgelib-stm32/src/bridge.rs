//! Session engine for STM32 bridge boards.
//!
//! [`Stm32Bridge`] drives one board over one transport. Every operation is a
//! strict request/reply exchange: encode a command line, send it, accumulate
//! bytes until a complete reply line arrives or the timeout expires, then
//! classify the reply. Exactly one command is in flight at any time, which is
//! why every operation takes `&mut self`.
//!
//! Two pieces of state are cached per session to avoid redundant exchanges:
//! the SPI chip-select routing and the pin-to-ADC-channel map. Both belong to
//! this instance only; a second bridge on another port starts empty.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use bridgelib_core::{
    counts_from_volts, pwm_ticks_from_duty, volts_from_counts, Bridge, BridgeCapabilities,
    BridgeInfo, Error, Pin, PinMode, Port, Pull, Result, Transport,
};

use crate::commands;
use crate::models::Stm32Model;
use crate::protocol::{self, DecodeResult, Reply};

/// Default time to wait for a complete reply line.
///
/// The firmware answers well under 100 ms for every command, including a
/// full 1024-byte SPI transfer at the slowest clock.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(100);

/// A session with an STM32 bridge board.
///
/// Constructed through [`Stm32Builder`](crate::builder::Stm32Builder), which
/// opens the transport and runs the session-start sequence. All I/O goes
/// through the [`Bridge`] trait.
pub struct Stm32Bridge {
    transport: Box<dyn Transport>,
    model: Stm32Model,
    command_timeout: Duration,
    info: BridgeInfo,
    /// Chip-select pin the device last acknowledged, if any.
    last_cs_pin: Option<Pin>,
    /// Pin-to-ADC-channel resolutions. `None` records a device refusal, so
    /// a pin without an ADC channel is rejected without further I/O.
    adc_channels: HashMap<Pin, Option<u8>>,
}

impl Stm32Bridge {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        model: Stm32Model,
        command_timeout: Duration,
    ) -> Self {
        let info = BridgeInfo {
            model_name: model.name.to_string(),
            serial_number: None,
            firmware_version: None,
        };
        Self {
            transport,
            model,
            command_timeout,
            info,
            last_cs_pin: None,
            adc_channels: HashMap::new(),
        }
    }

    /// Clear the device-side line buffer and read the board identity.
    ///
    /// A board that was mid-command when the host last disconnected still
    /// holds the partial line; a bare terminator makes the firmware discard
    /// it. Whatever the device says in response is drained and thrown away.
    /// The identity reads are best-effort: a board that does not answer `sn`
    /// or `version` still yields a usable session.
    pub(crate) async fn initialize(&mut self) -> Result<()> {
        self.transport.send(&protocol::encode_command("")).await?;
        self.drain_stale_output().await?;

        match self.execute(commands::cmd_serial_number()).await {
            Ok(tokens) => match commands::parse_serial_number(&tokens) {
                Ok(sn) => self.info.serial_number = Some(sn),
                Err(e) => warn!(error = %e, "unusable serial number reply"),
            },
            Err(e) => warn!(error = %e, "could not read serial number"),
        }
        match self.execute(commands::cmd_version()).await {
            Ok(tokens) => match commands::parse_version(&tokens) {
                Ok(version) => self.info.firmware_version = Some(version),
                Err(e) => warn!(error = %e, "unusable version reply"),
            },
            Err(e) => warn!(error = %e, "could not read firmware version"),
        }

        debug!(
            serial_number = ?self.info.serial_number,
            firmware_version = ?self.info.firmware_version,
            "bridge session initialized"
        );
        Ok(())
    }

    /// Read and discard device output until the line goes quiet.
    async fn drain_stale_output(&mut self) -> Result<()> {
        let mut buf = [0u8; 256];
        loop {
            match self.transport.receive(&mut buf, self.command_timeout).await {
                Ok(0) => return Ok(()),
                Ok(n) => trace!(bytes = n, "discarding stale device output"),
                Err(Error::Timeout) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Send one encoded command and wait for its complete reply line.
    ///
    /// Bytes are accumulated across as many reads as the timeout allows;
    /// the deadline covers the whole reply, not each read. Anything after
    /// the first complete line is stale by definition and is dropped.
    async fn exchange(&mut self, frame: Vec<u8>) -> Result<Reply> {
        let max = self.model.capabilities.max_command_len;
        if frame.len() > max {
            return Err(Error::TooLong {
                what: "encoded command",
                len: frame.len(),
                max,
            });
        }

        trace!(command = %String::from_utf8_lossy(&frame).trim_end(), "sending");
        self.transport.send(&frame).await?;

        let deadline = Instant::now() + self.command_timeout;
        let mut reply_buf: Vec<u8> = Vec::new();
        let mut buf = [0u8; 256];

        loop {
            match protocol::decode_reply(&reply_buf) {
                DecodeResult::Reply { reply, .. } => {
                    trace!(?reply, "received");
                    return Ok(reply);
                }
                DecodeResult::Malformed { reason, .. } => {
                    return Err(Error::MalformedResponse(reason));
                }
                DecodeResult::Incomplete => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            match tokio::time::timeout(remaining, self.transport.receive(&mut buf, remaining))
                .await
            {
                Ok(Ok(0)) => {
                    return Err(Error::Transport("serial stream closed".to_string()));
                }
                Ok(Ok(n)) => reply_buf.extend_from_slice(&buf[..n]),
                Ok(Err(Error::Timeout)) | Err(_) => return Err(Error::Timeout),
                Ok(Err(e)) => return Err(e),
            }
        }
    }

    /// Exchange a command whose reply must be `OK`; returns its payload
    /// tokens and maps `ERR <code>` to [`Error::Device`].
    async fn execute(&mut self, frame: Vec<u8>) -> Result<Vec<String>> {
        self.exchange(frame).await?.into_tokens()
    }

    /// Route the SPI chip-select line to `cs`, skipping the exchange when
    /// the device already has it routed.
    ///
    /// The cache is written only on an acknowledged exchange. A device
    /// error, a timeout or a garbled reply leaves it untouched, so the next
    /// transfer sends `spics` again instead of trusting a route that never
    /// happened.
    async fn ensure_spi_cs(&mut self, cs: Pin) -> Result<()> {
        if self.last_cs_pin == Some(cs) {
            return Ok(());
        }
        debug!(%cs, "routing SPI chip select");
        match self.exchange(commands::cmd_select_spi_cs(cs)).await? {
            Reply::Ok(_) => {
                self.last_cs_pin = Some(cs);
                Ok(())
            }
            Reply::Err(code) => Err(Error::ChipSelect { pin: cs, code }),
        }
    }

    /// Resolve the ADC channel behind `pin`, asking the device at most once
    /// per pin per session.
    ///
    /// The wiring cannot change while the board is powered, so a device
    /// refusal is cached as a permanent negative entry. Timeouts and
    /// malformed replies are transient and cache nothing.
    async fn adc_channel_for(&mut self, pin: Pin) -> Result<u8> {
        if let Some(resolved) = self.adc_channels.get(&pin) {
            return match resolved {
                Some(channel) => Ok(*channel),
                None => Err(Error::NotAnAdcPin(pin)),
            };
        }

        match self.exchange(commands::cmd_adc_channel(pin)).await? {
            Reply::Ok(tokens) => {
                let channel = commands::parse_adc_channel(&tokens)?;
                debug!(%pin, channel, "resolved ADC channel");
                self.adc_channels.insert(pin, Some(channel));
                Ok(channel)
            }
            Reply::Err(code) => {
                debug!(%pin, code, "device reports no ADC channel for pin");
                self.adc_channels.insert(pin, None);
                Err(Error::NotAnAdcPin(pin))
            }
        }
    }
}

#[async_trait]
impl Bridge for Stm32Bridge {
    fn info(&self) -> &BridgeInfo {
        &self.info
    }

    fn capabilities(&self) -> &BridgeCapabilities {
        &self.model.capabilities
    }

    async fn configure_gpio(&mut self, pin: Pin, mode: PinMode, pull: Option<Pull>) -> Result<()> {
        debug!(%pin, %mode, ?pull, "configuring GPIO");
        self.execute(commands::cmd_configure_gpio(pin, mode, pull))
            .await?;
        Ok(())
    }

    async fn read_gpio(&mut self, pin: Pin) -> Result<bool> {
        let tokens = self.execute(commands::cmd_read_gpio(pin)).await?;
        let level = commands::parse_gpio_level(&tokens)?;
        debug!(%pin, level, "read GPIO");
        Ok(level)
    }

    async fn write_gpio(&mut self, pin: Pin, level: bool) -> Result<()> {
        debug!(%pin, level, "writing GPIO");
        self.execute(commands::cmd_write_gpio(pin, level)).await?;
        Ok(())
    }

    async fn i2c_transfer(&mut self, addr: u8, read_len: usize, write: &[u8]) -> Result<Vec<u8>> {
        let max = self.model.capabilities.max_i2c_transfer;
        if write.len() > max {
            return Err(Error::TooLong {
                what: "I2C write",
                len: write.len(),
                max,
            });
        }
        if read_len > max {
            return Err(Error::TooLong {
                what: "I2C read",
                len: read_len,
                max,
            });
        }

        debug!(
            addr = format_args!("{addr:#04x}"),
            write_len = write.len(),
            read_len,
            "I2C transfer"
        );
        let tokens = self
            .execute(commands::cmd_i2c_transfer(addr, read_len, write))
            .await?;
        commands::parse_hex_bytes(&tokens)
    }

    async fn set_i2c_speed(&mut self, hz: u32) -> Result<()> {
        debug!(hz, "setting I2C speed");
        self.execute(commands::cmd_set_i2c_speed(hz)).await?;
        Ok(())
    }

    async fn set_i2c_pins(&mut self, pins: &[Pin]) -> Result<()> {
        let mut mask: u32 = 0;
        for pin in pins {
            if pin.port() != Port::B {
                return Err(Error::InvalidParameter(format!(
                    "I2C pins must be on port B, got {pin}"
                )));
            }
            mask |= 1 << pin.index();
        }

        debug!(?pins, mask, "setting I2C pin routing");
        self.execute(commands::cmd_set_i2c_pins(mask)).await?;
        Ok(())
    }

    async fn spi_transfer(&mut self, cs: Pin, write: &[u8]) -> Result<Vec<u8>> {
        let max = self.model.capabilities.max_spi_transfer;
        if write.len() > max {
            return Err(Error::TooLong {
                what: "SPI transfer",
                len: write.len(),
                max,
            });
        }

        self.ensure_spi_cs(cs).await?;

        debug!(%cs, write_len = write.len(), "SPI transfer");
        let tokens = self.execute(commands::cmd_spi_transfer(write)).await?;
        commands::parse_hex_bytes(&tokens)
    }

    async fn configure_spi(&mut self, hz: u32, cpol: bool, cpha: bool) -> Result<()> {
        if !self.model.capabilities.supports_spi_speed(hz) {
            return Err(Error::InvalidParameter(format!(
                "SPI clock {hz} Hz is not achievable; supported: {:?}",
                self.model.capabilities.spi_speeds_hz
            )));
        }

        debug!(hz, cpol, cpha, "configuring SPI");
        self.execute(commands::cmd_configure_spi(hz, cpol, cpha))
            .await?;
        Ok(())
    }

    async fn read_adc(&mut self, pin: Pin) -> Result<f32> {
        let channel = self.adc_channel_for(pin).await?;
        let tokens = self.execute(commands::cmd_read_adc(channel)).await?;
        let raw = commands::parse_adc_raw(&tokens)?;
        let volts = volts_from_counts(
            raw,
            self.model.capabilities.adc_full_scale_volts,
            self.model.capabilities.adc_max_count,
        );
        debug!(%pin, channel, raw, volts, "read ADC");
        Ok(volts)
    }

    async fn write_dac(&mut self, pin: Pin, volts: f32) -> Result<()> {
        let channel = self
            .model
            .capabilities
            .dac_channel(pin)
            .ok_or(Error::NotADacPin(pin))?;
        if !volts.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "DAC voltage must be finite, got {volts}"
            )));
        }
        let count = counts_from_volts(
            volts,
            self.model.capabilities.dac_full_scale_volts,
            self.model.capabilities.dac_max_count,
        );

        debug!(%pin, channel, volts, count, "writing DAC");
        self.execute(commands::cmd_write_dac(channel, count)).await?;
        Ok(())
    }

    async fn enable_dac(&mut self) -> Result<()> {
        debug!("enabling DAC outputs");
        self.execute(commands::cmd_enable_dac()).await?;
        Ok(())
    }

    async fn write_pwm(&mut self, pin: Pin, duty: f32) -> Result<()> {
        let channel = self
            .model
            .capabilities
            .pwm_channel(pin)
            .ok_or(Error::NotAPwmPin(pin))?;
        if !(0.0..=1.0).contains(&duty) {
            return Err(Error::InvalidParameter(format!(
                "PWM duty cycle must be within 0.0..=1.0, got {duty}"
            )));
        }
        let ticks = pwm_ticks_from_duty(duty, self.model.capabilities.pwm_period_ticks);

        debug!(%pin, channel, duty, ticks, "writing PWM");
        self.execute(commands::cmd_write_pwm(channel, ticks)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing bridge session");
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::f407_discovery;
    use bridgelib_test_harness::MockTransport;

    fn make_test_bridge(mock: MockTransport) -> Stm32Bridge {
        Stm32Bridge::new(Box::new(mock), f407_discovery(), Duration::from_millis(100))
    }

    fn pin(name: &str) -> Pin {
        name.parse().unwrap()
    }

    // ----- session start -----

    #[tokio::test]
    async fn initialize_reads_identity() {
        let mut mock = MockTransport::new();
        mock.expect(b"\n", b"");
        mock.expect(b"sn\n", b"OK 0670FF48 30353243 87131814\n");
        mock.expect(b"version\n", b"OK 0.3\n");
        let mut bridge = make_test_bridge(mock);

        bridge.initialize().await.unwrap();
        assert_eq!(
            bridge.info().serial_number.as_deref(),
            Some("0670FF483035324387131814")
        );
        assert_eq!(bridge.info().firmware_version.as_deref(), Some("0.3"));
        assert_eq!(bridge.info().model_name, "STM32F407 Discovery");
    }

    #[tokio::test]
    async fn initialize_drains_stale_output() {
        let mut mock = MockTransport::new();
        // A board that was mid-command complains about the bare terminator;
        // the complaint must not be mistaken for the sn reply.
        mock.expect(b"\n", b"ERR -3\n");
        mock.expect(b"sn\n", b"OK CAFE\n");
        mock.expect(b"version\n", b"OK 0.3\n");
        let mut bridge = make_test_bridge(mock);

        bridge.initialize().await.unwrap();
        assert_eq!(bridge.info().serial_number.as_deref(), Some("CAFE"));
    }

    #[tokio::test]
    async fn initialize_survives_missing_identity() {
        let mut mock = MockTransport::new();
        mock.expect(b"\n", b"");
        mock.expect(b"sn\n", b"ERR -1\n");
        mock.expect(b"version\n", b"");
        let mut bridge = make_test_bridge(mock);

        bridge.initialize().await.unwrap();
        assert_eq!(bridge.info().serial_number, None);
        assert_eq!(bridge.info().firmware_version, None);
    }

    // ----- GPIO -----

    #[tokio::test]
    async fn configure_gpio_with_pull() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpiocfg A 3 in pullup\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge
            .configure_gpio(pin("PA3"), PinMode::Input, Some(Pull::Up))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn configure_gpio_without_pull() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpiocfg D 12 outpp\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge
            .configure_gpio(pin("PD12"), PinMode::Output, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn configure_gpio_device_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpiocfg A 3 analog\n", b"ERR -2\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge
            .configure_gpio(pin("PA3"), PinMode::Analog, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Device(-2)));
    }

    #[tokio::test]
    async fn write_gpio_levels() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio D 12 1\n", b"OK\n");
        mock.expect(b"gpio D 12 0\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.write_gpio(pin("PD12"), true).await.unwrap();
        bridge.write_gpio(pin("PD12"), false).await.unwrap();
    }

    #[tokio::test]
    async fn read_gpio_levels() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio A 0\n", b"OK 1\n");
        mock.expect(b"gpio A 0\n", b"OK 0\n");
        let mut bridge = make_test_bridge(mock);

        assert!(bridge.read_gpio(pin("PA0")).await.unwrap());
        assert!(!bridge.read_gpio(pin("PA0")).await.unwrap());
    }

    #[tokio::test]
    async fn read_gpio_rejects_junk_level() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio A 0\n", b"OK 7\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_gpio(pin("PA0")).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    // ----- I2C -----

    #[tokio::test]
    async fn i2c_write_then_read() {
        let mut mock = MockTransport::new();
        mock.expect(b"i2c 3A 2 2A\n", b"OK 12 34 \n");
        let mut bridge = make_test_bridge(mock);

        let data = bridge.i2c_transfer(0x3A, 2, &[0x2A]).await.unwrap();
        assert_eq!(data, vec![0x12, 0x34]);
    }

    #[tokio::test]
    async fn i2c_write_only() {
        let mut mock = MockTransport::new();
        mock.expect(b"i2c 68 0 6B 00\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        let data = bridge.i2c_transfer(0x68, 0, &[0x6B, 0x00]).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn i2c_reply_length_is_authoritative() {
        // The device reports how many bytes it actually moved; a short
        // reply must not be padded out to the requested length.
        let mut mock = MockTransport::new();
        mock.expect(b"i2c 50 4\n", b"OK AB CD \n");
        let mut bridge = make_test_bridge(mock);

        let data = bridge.i2c_transfer(0x50, 4, &[]).await.unwrap();
        assert_eq!(data, vec![0xAB, 0xCD]);
    }

    #[tokio::test]
    async fn i2c_nack_is_device_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"i2c 50 1\n", b"ERR -1\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.i2c_transfer(0x50, 1, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Device(-1)));
    }

    #[tokio::test]
    async fn i2c_accepts_shifted_wire_address() {
        // Addresses are 8-bit wire values (7-bit device address shifted
        // left), so bit 7 may be set. An HTU21D at 0x40 is reached as 0x80.
        let mut mock = MockTransport::new();
        mock.expect(b"i2c 80 1 E7\n", b"OK 02 \n");
        let mut bridge = make_test_bridge(mock);

        let data = bridge.i2c_transfer(0x80, 1, &[0xE7]).await.unwrap();
        assert_eq!(data, vec![0x02]);
    }

    #[tokio::test]
    async fn i2c_rejects_oversize_write_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.i2c_transfer(0x50, 0, &[0u8; 1025]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TooLong {
                what: "I2C write",
                len: 1025,
                max: 1024
            }
        ));
    }

    #[tokio::test]
    async fn i2c_rejects_oversize_read_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.i2c_transfer(0x50, 1025, &[]).await.unwrap_err();
        assert!(matches!(err, Error::TooLong { what: "I2C read", .. }));
    }

    #[tokio::test]
    async fn i2c_speed_passthrough() {
        let mut mock = MockTransport::new();
        mock.expect(b"config i2cspeed 400000\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.set_i2c_speed(400_000).await.unwrap();
    }

    #[tokio::test]
    async fn i2c_pins_build_port_b_mask() {
        let mut mock = MockTransport::new();
        // PB6 | PB9 = 64 + 512.
        mock.expect(b"config i2cpins 576\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge
            .set_i2c_pins(&[pin("PB6"), pin("PB9")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn i2c_pins_reject_other_ports_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge
            .set_i2c_pins(&[pin("PB6"), pin("PA9")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    // ----- SPI -----

    #[tokio::test]
    async fn spi_routes_chip_select_once() {
        let mut mock = MockTransport::new();
        mock.expect(b"spics E 3\n", b"OK\n");
        mock.expect(b"spi AA 01\n", b"OK 55 00 \n");
        // No second spics: the routing is cached.
        mock.expect(b"spi BB\n", b"OK 66 \n");
        let mut bridge = make_test_bridge(mock);

        let first = bridge.spi_transfer(pin("PE3"), &[0xAA, 0x01]).await.unwrap();
        assert_eq!(first, vec![0x55, 0x00]);
        let second = bridge.spi_transfer(pin("PE3"), &[0xBB]).await.unwrap();
        assert_eq!(second, vec![0x66]);
    }

    #[tokio::test]
    async fn spi_reroutes_on_chip_select_change() {
        let mut mock = MockTransport::new();
        mock.expect(b"spics E 3\n", b"OK\n");
        mock.expect(b"spi 01\n", b"OK FF \n");
        mock.expect(b"spics D 0\n", b"OK\n");
        mock.expect(b"spi 02\n", b"OK FE \n");
        let mut bridge = make_test_bridge(mock);

        bridge.spi_transfer(pin("PE3"), &[0x01]).await.unwrap();
        bridge.spi_transfer(pin("PD0"), &[0x02]).await.unwrap();
    }

    #[tokio::test]
    async fn spi_failed_routing_is_not_cached() {
        let mut mock = MockTransport::new();
        mock.expect(b"spics E 3\n", b"ERR -1\n");
        // The retry must route again rather than trust the failed attempt.
        mock.expect(b"spics E 3\n", b"OK\n");
        mock.expect(b"spi AA\n", b"OK 00 \n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.spi_transfer(pin("PE3"), &[0xAA]).await.unwrap_err();
        match err {
            Error::ChipSelect { pin: p, code } => {
                assert_eq!(p, pin("PE3"));
                assert_eq!(code, -1);
            }
            other => panic!("expected ChipSelect error, got {other:?}"),
        }

        bridge.spi_transfer(pin("PE3"), &[0xAA]).await.unwrap();
    }

    #[tokio::test]
    async fn spi_empty_transfer_still_runs() {
        let mut mock = MockTransport::new();
        mock.expect(b"spics E 3\n", b"OK\n");
        mock.expect(b"spi\n", b"OK \n");
        let mut bridge = make_test_bridge(mock);

        let data = bridge.spi_transfer(pin("PE3"), &[]).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn spi_rejects_oversize_transfer_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge
            .spi_transfer(pin("PE3"), &[0u8; 1025])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TooLong {
                what: "SPI transfer",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn spi_long_reply_accumulates_across_reads() {
        // A 100-byte transfer echoes a 304-byte reply line, longer than one
        // 256-byte read.
        let write: Vec<u8> = (0u8..100).collect();
        let mut line = String::from("spi");
        let mut reply = String::from("OK");
        for byte in &write {
            line.push_str(&format!(" {byte:02X}"));
            reply.push_str(&format!(" {:02X}", byte.wrapping_add(1)));
        }
        line.push('\n');
        reply.push_str(" \n");

        let mut mock = MockTransport::new();
        mock.expect(b"spics A 1\n", b"OK\n");
        mock.expect(line.as_bytes(), reply.as_bytes());
        let mut bridge = make_test_bridge(mock);

        let data = bridge.spi_transfer(pin("PA1"), &write).await.unwrap();
        let expected: Vec<u8> = write.iter().map(|b| b.wrapping_add(1)).collect();
        assert_eq!(data, expected);
    }

    #[tokio::test]
    async fn configure_spi_sends_mode_bits() {
        let mut mock = MockTransport::new();
        mock.expect(b"spicfg 21000000 0 1\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.configure_spi(21_000_000, false, true).await.unwrap();
    }

    #[tokio::test]
    async fn configure_spi_rejects_unachievable_clock_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.configure_spi(20_000_000, false, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    // ----- ADC -----

    #[tokio::test]
    async fn adc_resolves_channel_once_per_pin() {
        let mut mock = MockTransport::new();
        mock.expect(b"adcnum A 0\n", b"OK 0\n");
        mock.expect(b"adc 0\n", b"OK 2047\n");
        // Second read reuses the cached channel.
        mock.expect(b"adc 0\n", b"OK 1023\n");
        let mut bridge = make_test_bridge(mock);

        let first = bridge.read_adc(pin("PA0")).await.unwrap();
        assert!((first - 1.4996).abs() < 0.001, "got {first}");
        let second = bridge.read_adc(pin("PA0")).await.unwrap();
        assert!((second - 0.7495).abs() < 0.001, "got {second}");
    }

    #[tokio::test]
    async fn adc_full_scale_reads_three_volts() {
        let mut mock = MockTransport::new();
        mock.expect(b"adcnum C 5\n", b"OK 15\n");
        mock.expect(b"adc 15\n", b"OK 4095\n");
        let mut bridge = make_test_bridge(mock);

        let volts = bridge.read_adc(pin("PC5")).await.unwrap();
        assert!((volts - 3.0).abs() < f32::EPSILON, "got {volts}");
    }

    #[tokio::test]
    async fn adc_refusal_is_cached_without_further_io() {
        let mut mock = MockTransport::new();
        // Only one adcnum expectation: the second read must not touch the
        // wire at all.
        mock.expect(b"adcnum D 12\n", b"ERR -1\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_adc(pin("PD12")).await.unwrap_err();
        assert!(matches!(err, Error::NotAnAdcPin(_)));
        let err = bridge.read_adc(pin("PD12")).await.unwrap_err();
        assert!(matches!(err, Error::NotAnAdcPin(_)));
    }

    #[tokio::test]
    async fn adc_resolution_timeout_is_not_cached() {
        let mut mock = MockTransport::new();
        // Silent device on the first attempt; the retry asks again.
        mock.expect(b"adcnum A 1\n", b"");
        mock.expect(b"adcnum A 1\n", b"OK 1\n");
        mock.expect(b"adc 1\n", b"OK 0\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_adc(pin("PA1")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout));

        let volts = bridge.read_adc(pin("PA1")).await.unwrap();
        assert_eq!(volts, 0.0);
    }

    // ----- DAC -----

    #[tokio::test]
    async fn dac_write_truncates_to_counts() {
        let mut mock = MockTransport::new();
        mock.expect(b"dac 0 2047\n", b"OK\n");
        mock.expect(b"dac 1 2730\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.write_dac(pin("PA4"), 1.5).await.unwrap();
        bridge.write_dac(pin("PA5"), 2.0).await.unwrap();
    }

    #[tokio::test]
    async fn dac_write_clamps_out_of_range_voltage() {
        let mut mock = MockTransport::new();
        mock.expect(b"dac 0 4095\n", b"OK\n");
        mock.expect(b"dac 0 0\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.write_dac(pin("PA4"), 10.0).await.unwrap();
        bridge.write_dac(pin("PA4"), -1.0).await.unwrap();
    }

    #[tokio::test]
    async fn dac_rejects_non_dac_pin_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.write_dac(pin("PD12"), 1.0).await.unwrap_err();
        assert!(matches!(err, Error::NotADacPin(_)));
    }

    #[tokio::test]
    async fn dac_rejects_non_finite_voltage_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.write_dac(pin("PA4"), f32::NAN).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn dac_enable() {
        let mut mock = MockTransport::new();
        mock.expect(b"dacenable\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.enable_dac().await.unwrap();
    }

    // ----- PWM -----

    #[tokio::test]
    async fn pwm_duty_converts_to_ticks() {
        let mut mock = MockTransport::new();
        mock.expect(b"pwm 0 5000\n", b"OK\n");
        mock.expect(b"pwm 1 10000\n", b"OK\n");
        mock.expect(b"pwm 0 0\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.write_pwm(pin("PE5"), 0.5).await.unwrap();
        bridge.write_pwm(pin("PE6"), 1.0).await.unwrap();
        bridge.write_pwm(pin("PE5"), 0.0).await.unwrap();
    }

    #[tokio::test]
    async fn pwm_rejects_out_of_range_duty_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.write_pwm(pin("PE5"), 1.5).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        let err = bridge.write_pwm(pin("PE5"), -0.1).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn pwm_rejects_non_pwm_pin_before_io() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let err = bridge.write_pwm(pin("PA0"), 0.5).await.unwrap_err();
        assert!(matches!(err, Error::NotAPwmPin(_)));
    }

    // ----- exchange plumbing -----

    #[tokio::test]
    async fn exchange_rejects_oversize_frame_before_send() {
        let mut bridge = make_test_bridge(MockTransport::new());

        let frame = protocol::encode_command(&"x".repeat(4200));
        let err = bridge.exchange(frame).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TooLong {
                what: "encoded command",
                len: 4201,
                max: 4095
            }
        ));
    }

    #[tokio::test]
    async fn exchange_times_out_on_silent_device() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio A 0\n", b"");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_gpio(pin("PA0")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn exchange_times_out_on_partial_reply() {
        let mut mock = MockTransport::new();
        // No terminator ever arrives.
        mock.expect(b"gpio A 0\n", b"OK 1");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_gpio(pin("PA0")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn exchange_surfaces_malformed_reply() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio A 0\n", b"ERR: I2C Not enough arguments\n");
        let mut bridge = make_test_bridge(mock);

        let err = bridge.read_gpio(pin("PA0")).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn closed_bridge_refuses_io() {
        let mut mock = MockTransport::new();
        mock.expect(b"gpio D 12 1\n", b"OK\n");
        let mut bridge = make_test_bridge(mock);

        bridge.write_gpio(pin("PD12"), true).await.unwrap();
        bridge.close().await.unwrap();

        let err = bridge.write_gpio(pin("PD12"), false).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }
}
