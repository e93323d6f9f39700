//! Pixel format type 4 of the TC-P74-230.
//!
//! The controller does not read pixels in scan order. Every 16 consecutive
//! samples of a row are split into an even and an odd byte, and within a
//! 60-byte row the even bytes fill the first half back to front while the odd
//! bytes fill the second half back to front.

use super::{Bitmap, PAYLOAD_LEN};
use crate::error::Error;

/// Panel type, 480 (BE), 800 (BE), 1 bit per pixel, pixel format 4.
#[rustfmt::skip]
pub const HEADER: [u8; HEADER_LEN] = [
    0x3A, 0x01, 0xE0, 0x03, 0x20, 0x01, 0x04, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
pub const HEADER_LEN: usize = 16;

/// Sample feeding bits 7..0 of the first byte of a block.
pub const EVEN_SAMPLE_SOURCES: [usize; 8] = [6, 14, 4, 12, 2, 10, 0, 8];
/// Sample feeding bits 7..0 of the second byte of a block.
pub const ODD_SAMPLE_SOURCES: [usize; 8] = [1, 9, 3, 11, 5, 13, 7, 15];

const SAMPLES_PER_BLOCK: usize = 16;
const BLOCKS_PER_ROW: usize = 30;
const ROW_BYTES: usize = 2 * BLOCKS_PER_ROW;
const BLOCKS: usize = PAYLOAD_LEN / 2;

/// Payload offsets of the first and second byte of 16-sample block `block`.
pub const fn block_offsets(block: usize) -> (usize, usize) {
    let row = ROW_BYTES * (block / BLOCKS_PER_ROW);
    let s = block % BLOCKS_PER_ROW + 1;
    (row + BLOCKS_PER_ROW - s, row + ROW_BYTES - s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub panel_type: u8,
    pub width: u16,
    pub height: u16,
    pub bit_depth: u8,
    pub pixel_format: u8,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            panel_type: bytes[0],
            width: u16::from_be_bytes([bytes[1], bytes[2]]),
            height: u16::from_be_bytes([bytes[3], bytes[4]]),
            bit_depth: bytes[5],
            pixel_format: bytes[6],
        }
    }
}

/// Header plus packed payload, as stored in `.epd` files and sent to the panel.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedFrame {
    payload: Vec<u8>,
}

impl std::fmt::Debug for PackedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedFrame")
            .field("header", &self.header())
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl PackedFrame {
    pub fn header(&self) -> FrameHeader {
        FrameHeader::parse(&HEADER)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&HEADER);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Structural check of a stored frame: exact header and payload size.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::MalformedFrame("truncated header"));
        }
        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header != HEADER {
            return Err(Error::MalformedFrame("unexpected header"));
        }
        if payload.len() != PAYLOAD_LEN {
            return Err(Error::MalformedFrame("payload does not match the panel size"));
        }
        Ok(Self {
            payload: payload.to_vec(),
        })
    }
}

fn encode_byte(samples: &[u8; 2], sources: &[usize; 8]) -> u8 {
    sources.iter().enumerate().fold(0, |byte, (bit, &src)| {
        let sample = samples[src / 8] >> (7 - src % 8) & 1;
        byte | sample << (7 - bit)
    })
}

fn decode_byte(byte: u8, sources: &[usize; 8], samples: &mut [u8; 2]) {
    for (bit, &src) in sources.iter().enumerate() {
        if byte >> (7 - bit) & 1 != 0 {
            samples[src / 8] |= 1 << (7 - src % 8);
        }
    }
}

pub fn pack(bitmap: &Bitmap) -> PackedFrame {
    let bits = bitmap.as_bytes();
    let mut payload = vec![0; PAYLOAD_LEN];

    for block in 0..BLOCKS {
        let at = block * SAMPLES_PER_BLOCK / 8;
        let samples = [bits[at], bits[at + 1]];
        let (even, odd) = block_offsets(block);
        payload[even] = encode_byte(&samples, &EVEN_SAMPLE_SOURCES);
        payload[odd] = encode_byte(&samples, &ODD_SAMPLE_SOURCES);
    }

    PackedFrame { payload }
}

/// Inverse of [`pack`].
pub fn unpack(frame: &PackedFrame) -> Bitmap {
    let mut bitmap = Bitmap::new();

    for block in 0..BLOCKS {
        let (even, odd) = block_offsets(block);
        let mut samples = [0; 2];
        decode_byte(frame.payload[even], &EVEN_SAMPLE_SOURCES, &mut samples);
        decode_byte(frame.payload[odd], &ODD_SAMPLE_SOURCES, &mut samples);

        let first = block * SAMPLES_PER_BLOCK;
        for i in 0..SAMPLES_PER_BLOCK {
            bitmap.set_index(first + i, samples[i / 8] >> (7 - i % 8) & 1 != 0);
        }
    }
    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn offsets_walk_each_half_row_backwards() {
        assert_eq!(block_offsets(0), (29, 59));
        assert_eq!(block_offsets(1), (28, 58));
        assert_eq!(block_offsets(29), (0, 30));
        assert_eq!(block_offsets(30), (89, 119));
        assert_eq!(block_offsets(BLOCKS - 1), (PAYLOAD_LEN - 60, PAYLOAD_LEN - 30));
    }

    #[test]
    fn offsets_cover_the_payload_exactly_once() {
        let mut seen = HashSet::new();
        for block in 0..BLOCKS {
            let (even, odd) = block_offsets(block);
            assert!(seen.insert(even));
            assert!(seen.insert(odd));
        }
        assert_eq!(seen.len(), PAYLOAD_LEN);
        assert!(seen.iter().all(|&o| o < PAYLOAD_LEN));
    }

    #[test]
    fn sample_tables_are_permutations() {
        let mut all: Vec<_> = EVEN_SAMPLE_SOURCES
            .iter()
            .chain(&ODD_SAMPLE_SOURCES)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn single_sample_lands_on_its_mapped_bit() {
        // sample 0 of block 0 → bit 1 of the even byte at offset 29
        let mut bitmap = Bitmap::new();
        bitmap.set(0, 0, true);
        let frame = pack(&bitmap);
        assert_eq!(frame.payload()[29], 0b0000_0010);
        assert_eq!(frame.payload().iter().filter(|&&b| b != 0).count(), 1);

        // sample 15 of block 31 (second row, x = 31) → bit 0 of the odd byte at 118
        let mut bitmap = Bitmap::new();
        bitmap.set(31, 1, true);
        let frame = pack(&bitmap);
        assert_eq!(frame.payload()[118], 0b0000_0001);
        assert_eq!(unpack(&frame), bitmap);
    }

    #[test]
    fn frame_bytes_start_with_the_header() {
        let frame = pack(&Bitmap::new());
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + PAYLOAD_LEN);
        assert_eq!(bytes[..HEADER_LEN], HEADER);

        let header = frame.header();
        assert_eq!((header.width, header.height), (480, 800));
        assert_eq!((header.bit_depth, header.pixel_format), (1, 4));
    }

    #[test]
    fn parse_rejects_damaged_frames() {
        let mut bytes = pack(&Bitmap::new()).to_bytes();
        assert!(PackedFrame::parse(&bytes).is_ok());

        assert_eq!(
            PackedFrame::parse(&bytes[..10]),
            Err(Error::MalformedFrame("truncated header"))
        );
        assert!(PackedFrame::parse(&bytes[..bytes.len() - 1]).is_err());

        bytes[1] = 0x02;
        assert_eq!(
            PackedFrame::parse(&bytes),
            Err(Error::MalformedFrame("unexpected header"))
        );
    }
}
