//! Linux driver for the **TC-P74-230** (7.4", 480×800) behind a TCon.
//!
//! # Examples
//! ```no_run
//! # use tcon_epd::tcp74230;
//! let mut epd = tcp74230::open().unwrap();
//! println!("{:?}", epd.device_info());
//! epd.display_update().unwrap();
//! ```

use std::path::Path;

use anyhow::Context;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};
use tcon_epd_core::{Session, SessionConfig};

pub type Tcp74230 = Session<SpidevDevice, CdevPin, CdevPin, Delay>;

pub const SPI_PATH: &str = "/dev/spidev0.0";
pub const GPIO_PATH: &str = "/dev/gpiochip0";
/// The TCon accepts up to 3 MHz.
pub const SPI_SPEED_HZ: u32 = 100_000;

/// BCM line offsets on the GPIO chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinDefinition {
    /// Input, low while the TCon is busy.
    pub busy_pin: u32,
    /// Output, active low.
    pub enable_pin: u32,
}

impl PinDefinition {
    pub const DEFAULT: Self = Self::new(23, 18);

    pub const fn new(busy_pin: u32, enable_pin: u32) -> Self {
        Self {
            busy_pin,
            enable_pin,
        }
    }
}

impl Default for PinDefinition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Use default [`PinDefinition`], [`SessionConfig`] and `/dev/spidev0.0`
/// `/dev/gpiochip0`.
pub fn open() -> anyhow::Result<Tcp74230> {
    open_with_pindefinition(
        PinDefinition::DEFAULT,
        SPI_PATH,
        GPIO_PATH,
        SessionConfig::DEFAULT,
    )
}

/// Opens the devices, leaves the panel disabled and reads its identity.
pub fn open_with_pindefinition(
    pindefinition: PinDefinition,
    spi_path: impl AsRef<Path>,
    gpio_path: impl AsRef<Path>,
    config: SessionConfig,
) -> anyhow::Result<Tcp74230> {
    let spi_path = spi_path.as_ref();
    let mut spi = SpidevDevice::open(spi_path)
        .with_context(|| format!("opening {}", spi_path.display()))?;
    spi.0.configure(
        &SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_SPEED_HZ)
            .lsb_first(false)
            .mode(SpiModeFlags::SPI_MODE_3)
            .build(),
    )?;

    let gpio_path = gpio_path.as_ref();
    let mut chip =
        Chip::new(gpio_path).with_context(|| format!("opening {}", gpio_path.display()))?;
    let busy_pin = CdevPin::new(chip.get_line(pindefinition.busy_pin)?.request(
        LineRequestFlags::INPUT,
        0,
        "tcp74230_busy_pin",
    )?)?;
    let enable_pin = CdevPin::new(chip.get_line(pindefinition.enable_pin)?.request(
        LineRequestFlags::OUTPUT,
        1,
        "tcp74230_enable_pin",
    )?)?;
    log::debug!(
        "opened {} and {} with {pindefinition:?}",
        spi_path.display(),
        gpio_path.display()
    );

    let session = Session::open(spi, busy_pin, enable_pin, Delay, config)
        .context("querying the device info")?;
    Ok(session)
}
