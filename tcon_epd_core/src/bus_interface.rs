//! Defined the bus interface of the TCon board.
//!
//! Considering generality, this interface uses [embedded-hal](https://docs.rs/embedded-hal/latest/embedded_hal/).
//!
//! The board needs two extra pins next to the SPI bus to behave correctly.
//!
//! # Conventions:
//! - `busy_pin`: Low level while the panel is processing, high level when idle
//! - `enable_pin`: Low level for active (`/TC_EN`, ACTIVE_LOW)

use std::{fmt::Debug, time::Duration};

use crate::error::{Error, TimeOutError};
use embedded_hal::{
    delay::DelayNs,
    digital::{self, Error as _, InputPin, OutputPin},
    spi::SpiDevice,
};

/// Fixed back-off between two samples of the busy pin.
pub const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The bus and control pins of one panel, uses [embedded-hal](https://docs.rs/embedded-hal/latest/embedded_hal/).
pub struct BusInterface<Spi, I, O, D> {
    spi: Spi,
    busy_pin: I,
    enable_pin: O,

    delay: D,
}

impl<Spi, I, O, D> Debug for BusInterface<Spi, I, O, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusInterface").finish_non_exhaustive()
    }
}

impl<Spi, I, O, D> BusInterface<Spi, I, O, D>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: Spi, busy_pin: I, enable_pin: O, delay: D) -> Self {
        Self {
            spi,
            busy_pin,
            enable_pin,
            delay,
        }
    }

    /// Gives the hardware back.
    pub fn release(self) -> (Spi, I, O, D) {
        (self.spi, self.busy_pin, self.enable_pin, self.delay)
    }

    pub fn is_busy(&mut self) -> Result<bool, Error> {
        self.busy_pin.is_low().map_err(Error::pin)
    }

    /// Drives the active-low enable line.
    pub fn set_enabled(&mut self, active: bool) -> Result<(), digital::ErrorKind> {
        let driven = if active {
            self.enable_pin.set_low()
        } else {
            self.enable_pin.set_high()
        };
        driven.map_err(|e| e.kind())
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.spi.write(bytes).map_err(Error::bus)
    }

    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; len];
        if len > 0 {
            self.spi.read(&mut buf).map_err(Error::bus)?;
        }
        Ok(buf)
    }

    pub fn read_status(&mut self) -> Result<[u8; 2], Error> {
        let mut buf = [0; 2];
        self.spi.read(&mut buf).map_err(Error::bus)?;
        Ok(buf)
    }

    /// Sleeps for `delay`, saturating at `u32::MAX` milliseconds.
    fn delay(&mut self, delay: Duration) {
        let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        self.delay.delay_ms(ms);
    }

    /// Polls the busy pin every [`BUSY_POLL_INTERVAL`] until the panel is idle.
    ///
    /// An idle panel returns at once whatever the budget. A busy panel with no
    /// budget left fails without sleeping. Returns the time spent waiting.
    pub fn wait_until_not_busy(&mut self, timeout: Duration) -> Result<Duration, Error> {
        let mut remaining = timeout;
        let mut elapsed = Duration::ZERO;
        loop {
            if !self.is_busy()? {
                return Ok(elapsed);
            }
            if remaining.is_zero() {
                log::trace!("still busy after {elapsed:?}, giving up");
                return Err(TimeOutError { timeout, elapsed }.into());
            }
            self.delay(BUSY_POLL_INTERVAL);
            remaining = remaining.saturating_sub(BUSY_POLL_INTERVAL);
            elapsed += BUSY_POLL_INTERVAL;
        }
    }
}
