use std::time::Duration;

use embedded_hal::{digital, spi};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("pin fault: {0:?}")]
    PinFault(digital::ErrorKind),

    #[error("bus fault: {0:?}")]
    BusFault(spi::ErrorKind),

    #[error("failed to drive the enable pin: {0:?}")]
    EnableError(digital::ErrorKind),

    #[error("device is busy or not connected")]
    BusyOrUnreachable,

    #[error(transparent)]
    TimeOut(#[from] TimeOutError),

    #[error("device did not settle after the command: {0}")]
    QuiescenceTimeout(TimeOutError),

    #[error("chunk {index} rejected with {code:#06X}: {message}")]
    ChunkRejected {
        index: usize,
        code: u16,
        message: &'static str,
    },

    #[error("unknown result code {0:#06X}")]
    UnknownResultCode(u16),

    #[error("unsupported image shape {width}x{height}")]
    UnsupportedImageShape { width: u32, height: u32 },

    #[error("chunk of {0} bytes does not fit in one frame")]
    ChunkTooLarge(usize),

    #[error("malformed packed frame: {0}")]
    MalformedFrame(&'static str),
}

impl Error {
    pub(crate) fn pin(e: impl digital::Error) -> Self {
        Self::PinFault(e.kind())
    }

    pub(crate) fn bus(e: impl spi::Error) -> Self {
        Self::BusFault(e.kind())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timeout: {:?}, elapsed: {:?}", self.timeout, self.elapsed)]
pub struct TimeOutError {
    pub timeout: Duration,
    pub elapsed: Duration,
}
