use image::RgbaImage;

use super::PANEL_WIDTH;
use crate::error::Error;

/// Error diffusion method used to reduce a grayscale raster to black and white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dither {
    /// Error measured against 128, a third of it pushed to the next pixel.
    /// The output pixel is still thresholded at 130.
    Simple,
    /// Threshold at 130, error split 7/16, 3/16, 5/16, 1/16.
    #[default]
    FloydSteinberg,
    /// Threshold at 130, 1/8 of the error to six neighbours. The remaining
    /// quarter is dropped.
    Atkinson,
}

/// `(dx, dy, numerator, denominator)`
type Weight = (i64, i64, f32, f32);

const FLOYD_STEINBERG: &[Weight] = &[
    (1, 0, 7.0, 16.0),
    (-1, 1, 3.0, 16.0),
    (0, 1, 5.0, 16.0),
    (1, 1, 1.0, 16.0),
];

const ATKINSON: &[Weight] = &[
    (1, 0, 1.0, 8.0),
    (2, 0, 1.0, 8.0),
    (-1, 1, 1.0, 8.0),
    (0, 1, 1.0, 8.0),
    (1, 1, 1.0, 8.0),
    (0, 2, 1.0, 8.0),
];

/// Luminance above which an output pixel is white, for every method.
const OUTPUT_THRESHOLD: f32 = 130.0;

impl Dither {
    /// Luminance above which the quantization error is taken against white.
    fn error_threshold(self) -> f32 {
        match self {
            Self::Simple => 128.0,
            Self::FloydSteinberg | Self::Atkinson => OUTPUT_THRESHOLD,
        }
    }
}

/// Dithers `image` in place, every pixel ends up pure black or white.
///
/// Rows must be exactly [`PANEL_WIDTH`] wide since the diffusion offsets are
/// taken relative to the panel's scan line; run [`prepare`](super::prepare)
/// first for arbitrary images.
pub fn dither(image: &mut RgbaImage, method: Dither) -> Result<(), Error> {
    let (width, height) = image.dimensions();
    if width != PANEL_WIDTH {
        return Err(Error::UnsupportedImageShape { width, height });
    }

    let width = i64::from(width);
    let height = i64::from(height);
    let error_threshold = method.error_threshold();
    let data: &mut [u8] = image;

    for index in 0..(width * height) {
        let (x, y) = (index % width, index / width);
        let px = 4 * index as usize;

        let ideal =
            (f32::from(data[px]) + f32::from(data[px + 1]) + f32::from(data[px + 2])) / 3.0;
        let quantized = if ideal > error_threshold { 255.0 } else { 0.0 };
        let error = ideal - quantized;
        let output = if ideal > OUTPUT_THRESHOLD { 255 } else { 0 };

        data[px..px + 3].fill(output);
        data[px + 3] = 255;

        if error == 0.0 {
            continue;
        }

        match method {
            Dither::Simple => {
                // next pixel in scan order, wrapping to the next row
                if index + 1 < width * height {
                    spread(data, 4 * (index as usize + 1), error / 3.0);
                }
            }
            Dither::FloydSteinberg | Dither::Atkinson => {
                let weights = if method == Dither::Atkinson {
                    ATKINSON
                } else {
                    FLOYD_STEINBERG
                };
                for &(dx, dy, num, den) in weights {
                    let (nx, ny) = (x + dx, y + dy);
                    if (0..width).contains(&nx) && (0..height).contains(&ny) {
                        spread(data, 4 * (ny * width + nx) as usize, error * num / den);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Adds `error` to the color channels of the pixel at byte offset `px`.
fn spread(data: &mut [u8], px: usize, error: f32) {
    for channel in &mut data[px..px + 3] {
        *channel = (f32::from(*channel) + error).clamp(0.0, 255.0) as u8;
    }
}
