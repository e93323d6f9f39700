//! Bulk upload of a buffer in framed chunks.
//!
//! Chunks go out strictly one after another: the next one is written only
//! after the status word of the previous one has been read and accepted.
//! There is no way to undo or resume a transfer, a failure means the whole
//! buffer has to be sent again.

use std::time::{Duration, Instant};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::{
    bus_interface::BusInterface,
    command::{Command, MAX_CHUNK_SIZE},
    error::Error,
    result_code::ResultCode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    pub chunks: usize,
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Splits `payload` into framed data commands of at most `max_chunk_size` bytes.
pub fn frames(payload: &[u8], max_chunk_size: usize) -> impl Iterator<Item = Command<'_>> {
    payload
        .chunks(max_chunk_size.clamp(1, MAX_CHUNK_SIZE))
        .map(Command::image_data)
}

pub fn send_buffer<Spi, I, O, D>(
    bus: &mut BusInterface<Spi, I, O, D>,
    payload: &[u8],
    max_chunk_size: usize,
    chunk_timeout: Duration,
) -> Result<TransferSummary, Error>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    let now = Instant::now();
    let mut chunks = 0;

    for (index, frame) in frames(payload, max_chunk_size).enumerate() {
        bus.write(&frame.encode()?)?;
        bus.wait_until_not_busy(chunk_timeout)?;
        let result = ResultCode::from_status(bus.read_status()?)?;
        log::debug!("chunk {index}: {result}");
        if !result.is_ok() {
            return Err(Error::ChunkRejected {
                index,
                code: result.code,
                message: result.message,
            });
        }
        chunks += 1;
    }

    // trailing acknowledgement
    let trailing = bus.read_status()?;
    log::trace!("drained {trailing:02X?}");

    let summary = TransferSummary {
        chunks,
        bytes: payload.len(),
        elapsed: now.elapsed(),
    };
    log::info!(
        "buffer of {} bytes transferred in {} chunks, {:?}",
        summary.bytes,
        summary.chunks,
        summary.elapsed
    );
    Ok(summary)
}
