use std::fmt::Debug;

use image::RgbaImage;

use super::{PANEL_HEIGHT, PANEL_WIDTH, PAYLOAD_LEN};
use crate::error::Error;

/// One bit per panel pixel, row-major, MSB first. A set bit is a dark pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    bits: Box<[u8; PAYLOAD_LEN]>,
}

impl Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("dark", &self.count_dark())
            .finish_non_exhaustive()
    }
}

impl Default for Bitmap {
    /// All white.
    fn default() -> Self {
        Self::new()
    }
}

impl Bitmap {
    pub fn new() -> Self {
        Self {
            bits: Box::new([0; PAYLOAD_LEN]),
        }
    }

    /// Thresholds a dithered raster: dark where `0.3R + 0.59G + 0.11B <= 128`,
    /// evaluated in hundredths so the boundary is exact.
    pub fn from_raster(image: &RgbaImage) -> Result<Self, Error> {
        let (width, height) = image.dimensions();
        if (width, height) != (PANEL_WIDTH, PANEL_HEIGHT) {
            return Err(Error::UnsupportedImageShape { width, height });
        }

        let mut bitmap = Self::new();
        for (index, pixel) in image.pixels().enumerate() {
            let [r, g, b, _] = pixel.0;
            let luminance = 30 * u32::from(r) + 59 * u32::from(g) + 11 * u32::from(b);
            bitmap.set_index(index, luminance <= 12_800);
        }
        Ok(bitmap)
    }

    /// Raw row-major bits, two bytes per 16 samples.
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.bits
    }

    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= PANEL_WIDTH || y >= PANEL_HEIGHT {
            return None;
        }
        Some(self.get_index((y * PANEL_WIDTH + x) as usize))
    }

    /// Out-of-panel coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, dark: bool) {
        if x < PANEL_WIDTH && y < PANEL_HEIGHT {
            self.set_index((y * PANEL_WIDTH + x) as usize, dark);
        }
    }

    pub fn count_dark(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub(crate) fn get_index(&self, index: usize) -> bool {
        let offset = 7 - (index % 8) as u8;
        self.bits[index / 8] & 1 << offset != 0
    }

    pub(crate) fn set_index(&mut self, index: usize, dark: bool) {
        let offset = 7 - (index % 8) as u8;
        let value = &mut self.bits[index / 8];
        if dark {
            *value |= 1 << offset;
        } else {
            *value &= !(1 << offset);
        }
    }
}

#[cfg(feature = "embedded_graphics")]
mod graphics {
    use std::convert::Infallible;

    use embedded_graphics_core::{image::GetPixel, pixelcolor::BinaryColor, prelude::*};

    use super::{Bitmap, PANEL_HEIGHT, PANEL_WIDTH};

    fn to_panel(point: Point) -> Option<(u32, u32)> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        Some((x, y))
    }

    impl OriginDimensions for Bitmap {
        fn size(&self) -> Size {
            Size::new(PANEL_WIDTH, PANEL_HEIGHT)
        }
    }

    /// [`BinaryColor::On`] draws a dark pixel.
    impl DrawTarget for Bitmap {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if let Some((x, y)) = to_panel(point) {
                    self.set(x, y, color.is_on());
                }
            }
            Ok(())
        }
    }

    impl GetPixel for Bitmap {
        type Color = BinaryColor;

        fn pixel(&self, p: Point) -> Option<Self::Color> {
            let (x, y) = to_panel(p)?;
            self.get(x, y).map(BinaryColor::from)
        }
    }
}
