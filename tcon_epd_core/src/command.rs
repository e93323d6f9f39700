//! Commands understood by the TCon.
//!
//! Every command starts with `INS P1 P2`, followed by either nothing, an
//! expected answer length `Le`, or a length byte `Lc` and `Lc` bytes of data.

use crate::error::Error;

/// Largest data block a single command can carry.
pub const MAX_CHUNK_SIZE: usize = 0xFA;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    None,
    Le(u8),
    Data(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub body: Body<'a>,
}

impl Command<'static> {
    /// Reads the 32 byte identity string.
    pub const GET_DEVICE_INFO: Self = Self::new(0x30, 0x01, 0x01, Body::Le(0x00));
    /// Shows the uploaded image.
    pub const DISPLAY_UPDATE: Self = Self::new(0x24, 0x01, 0x00, Body::None);
    /// Rewinds the image memory write pointer.
    pub const RESET_DATA_POINTER: Self = Self::new(0x20, 0x0D, 0x00, Body::None);
}

impl<'a> Command<'a> {
    pub const fn new(ins: u8, p1: u8, p2: u8, body: Body<'a>) -> Self {
        Self { ins, p1, p2, body }
    }

    /// Frames one chunk of image data.
    pub fn upload_image_data(chunk: &'a [u8]) -> Result<Self, Error> {
        if chunk.len() > MAX_CHUNK_SIZE {
            return Err(Error::ChunkTooLarge(chunk.len()));
        }
        Ok(Self::image_data(chunk))
    }

    /// Unchecked, [`Command::encode`] rejects oversized data.
    pub(crate) const fn image_data(chunk: &'a [u8]) -> Self {
        Self::new(0x20, 0x01, 0x00, Body::Data(chunk))
    }

    pub fn encoded_len(&self) -> usize {
        3 + match self.body {
            Body::None => 0,
            Body::Le(_) => 1,
            Body::Data(data) => 1 + data.len(),
        }
    }

    /// Wire bytes of the command. A data body longer than
    /// [`MAX_CHUNK_SIZE`] cannot be framed and fails with `ChunkTooLarge`.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&[self.ins, self.p1, self.p2]);
        match self.body {
            Body::None => {}
            Body::Le(le) => out.push(le),
            Body::Data(data) => {
                let lc = u8::try_from(data.len())
                    .ok()
                    .filter(|&lc| usize::from(lc) <= MAX_CHUNK_SIZE)
                    .ok_or(Error::ChunkTooLarge(data.len()))?;
                out.push(lc);
                out.extend_from_slice(data);
            }
        }
        Ok(out)
    }
}
