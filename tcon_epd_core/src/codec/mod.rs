//! Raster image → packed panel frame.
//!
//! The pipeline is [`prepare`] (portrait 480×800 grayscale), [`dither`]
//! (error diffusion to pure black and white), [`Bitmap::from_raster`]
//! (one bit per pixel) and [`pack`] (the panel's interleaved layout).
//! [`encode`] runs all of it.

mod bitmap;
mod dither;
mod pack;

pub use bitmap::Bitmap;
pub use dither::{dither, Dither};
pub use pack::{
    block_offsets, pack, unpack, FrameHeader, PackedFrame, EVEN_SAMPLE_SOURCES, HEADER,
    HEADER_LEN, ODD_SAMPLE_SOURCES,
};

use image::{imageops, RgbaImage};

use crate::error::Error;

pub const PANEL_WIDTH: u32 = 480;
pub const PANEL_HEIGHT: u32 = 800;
/// Bytes of packed pixel data following the header.
pub const PAYLOAD_LEN: usize = (PANEL_WIDTH * PANEL_HEIGHT / 8) as usize;

/// Rotates landscape images to portrait, scales to the panel and drops color.
pub fn prepare(image: &RgbaImage) -> Result<RgbaImage, Error> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::UnsupportedImageShape { width, height });
    }

    let rotated;
    let portrait = if width > height {
        rotated = imageops::rotate90(image);
        &rotated
    } else {
        image
    };

    let mut out = if portrait.dimensions() == (PANEL_WIDTH, PANEL_HEIGHT) {
        portrait.clone()
    } else {
        imageops::resize(
            portrait,
            PANEL_WIDTH,
            PANEL_HEIGHT,
            imageops::FilterType::Triangle,
        )
    };

    for pixel in out.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let luma = (0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b))
            .round()
            .clamp(0.0, 255.0) as u8;
        pixel.0[..3].fill(luma);
    }
    Ok(out)
}

/// Full pipeline from any raster to a frame ready for upload.
pub fn encode(image: &RgbaImage, method: Dither) -> Result<PackedFrame, Error> {
    let mut prepared = prepare(image)?;
    dither(&mut prepared, method)?;
    let bitmap = Bitmap::from_raster(&prepared)?;
    Ok(pack(&bitmap))
}
