//! An open connection to one panel.
//!
//! # Examples
//! ```no_run
//! # use tcon_epd_core::{codec::{self, Dither}, session::Session, Error};
//! # fn demo<S, I, O, D>(spi: S, busy: I, enable: O, delay: D, image: &image::RgbaImage) -> Result<(), Error>
//! # where
//! #     S: embedded_hal::spi::SpiDevice,
//! #     I: embedded_hal::digital::InputPin,
//! #     O: embedded_hal::digital::OutputPin,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! let mut session = Session::open(spi, busy, enable, delay, Default::default())?;
//! println!("{:?}", session.device_info());
//!
//! let frame = codec::encode(image, Dither::FloydSteinberg)?;
//! session.upload_image(&frame)?;
//!
//! // hand the hardware back, the panel is disabled on the way out
//! let (_spi, _busy, _enable, _delay) = session.close();
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use image::RgbaImage;

use crate::{
    bus_interface::BusInterface,
    codec::{self, Dither, PackedFrame},
    command::Command,
    config::SessionConfig,
    device_info::{DeviceInfo, DEVICE_INFO_LEN},
    error::Error,
    machine::{run_command, CommandMachine, CommandState},
    result_code::ResultCode,
    transfer::{send_buffer, TransferSummary},
};

/// Length of the status word answering refresh and pointer commands.
const STATUS_LEN: usize = 2;

pub struct Session<Spi, I, O, D> {
    bus: BusInterface<Spi, I, O, D>,
    config: SessionConfig,
    state: CommandState,
    device_info: Option<DeviceInfo>,
}

impl<Spi, I, O, D> Debug for Session<Spi, I, O, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("device_info", &self.device_info)
            .finish_non_exhaustive()
    }
}

/// Result of a full image upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub transfer: TransferSummary,
    pub refresh: &'static ResultCode,
}

impl<Spi, I, O, D> Session<Spi, I, O, D>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    /// Wraps the hardware without talking to it.
    pub fn new(spi: Spi, busy_pin: I, enable_pin: O, delay: D, config: SessionConfig) -> Self {
        Self {
            bus: BusInterface::new(spi, busy_pin, enable_pin, delay),
            config,
            state: CommandState::Idle,
            device_info: None,
        }
    }

    /// Wraps the hardware and reads the device identity once.
    pub fn open(
        spi: Spi,
        busy_pin: I,
        enable_pin: O,
        delay: D,
        config: SessionConfig,
    ) -> Result<Self, Error> {
        let mut session = Self::new(spi, busy_pin, enable_pin, delay, config);
        let info = session.get_device_info()?;
        log::info!("connected to {:?}", info.text);
        Ok(session)
    }

    /// Disables the panel (best effort) and gives the hardware back.
    pub fn close(mut self) -> (Spi, I, O, D) {
        if let Err(err) = self.bus.set_enabled(false) {
            log::warn!("failed to disable the panel on close: {err:?}");
        }
        self.bus.release()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// State the last command ended in.
    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Identity cached by the last successful [`Session::get_device_info`].
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    /// Runs `action` inside the enable/busy/settle/disable sequence.
    pub fn execute<T, F>(&mut self, action: F) -> Result<T, Error>
    where
        F: FnOnce(&mut BusInterface<Spi, I, O, D>, &SessionConfig) -> Result<T, Error>,
    {
        let config = self.config;
        CommandMachine::new(&mut self.bus, &mut self.state, config.quiescence_timeout)
            .execute(|bus| action(bus, &config))
    }

    /// Sends one primitive command and returns the raw answer.
    pub fn execute_command(
        &mut self,
        command: &Command<'_>,
        read_bytes: usize,
    ) -> Result<Vec<u8>, Error> {
        self.execute(|bus, _| run_command(bus, command, read_bytes))
    }

    pub fn get_device_info(&mut self) -> Result<&DeviceInfo, Error> {
        let raw = self.execute_command(&Command::GET_DEVICE_INFO, DEVICE_INFO_LEN)?;
        let info = DeviceInfo::parse(&raw);
        log::debug!(
            "device info: size {:?}, version {:?}",
            info.size,
            info.version
        );
        Ok(self.device_info.insert(info))
    }

    /// Shows whatever image the panel currently holds.
    pub fn display_update(&mut self) -> Result<&'static ResultCode, Error> {
        let status = self.execute_command(&Command::DISPLAY_UPDATE, STATUS_LEN)?;
        status_code(&status)
    }

    /// Rewinds the image memory write pointer.
    pub fn reset_data_pointer(&mut self) -> Result<&'static ResultCode, Error> {
        let status = self.execute_command(&Command::RESET_DATA_POINTER, STATUS_LEN)?;
        status_code(&status)
    }

    /// Uploads a packed frame and refreshes the panel in one command.
    pub fn upload_image(&mut self, frame: &PackedFrame) -> Result<UploadReport, Error> {
        self.upload_raw(&frame.to_bytes())
    }

    /// Like [`Session::upload_image`], for bytes that are already in the
    /// packed format (e.g. read from an `.epd` file).
    pub fn upload_raw(&mut self, bytes: &[u8]) -> Result<UploadReport, Error> {
        self.execute(|bus, config| {
            let transfer =
                send_buffer(bus, bytes, config.max_chunk_size, config.chunk_timeout)?;
            let status = run_command(bus, &Command::DISPLAY_UPDATE, STATUS_LEN)?;
            let refresh = status_code(&status)?;
            Ok(UploadReport { transfer, refresh })
        })
    }

    /// Prepares, dithers and packs `image`, then uploads it.
    pub fn upload_raster(
        &mut self,
        image: &RgbaImage,
        dither: Dither,
    ) -> Result<UploadReport, Error> {
        let frame = codec::encode(image, dither)?;
        self.upload_image(&frame)
    }
}

fn status_code(status: &[u8]) -> Result<&'static ResultCode, Error> {
    let code = ResultCode::from_status([status[0], status[1]])?;
    if !code.is_ok() {
        log::warn!("panel answered {code}: {}", code.message);
    }
    Ok(code)
}
