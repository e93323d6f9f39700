//! Draws a test pattern, or shows the picture/`.epd` file given as argument.
//!
//! ```text
//! RUST_LOG=debug cargo run --example tcp74230 -- [picture.png | frame.epd]
//! ```

use std::{env, path::Path};

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, StyledDrawable},
};
use tcon_epd::{
    codec::{self, Bitmap, Dither},
    epd_file, tcp74230,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut epd = tcp74230::open()?;
    println!("device: {:?}", epd.device_info());

    let report = match env::args().nth(1) {
        Some(path) if Path::new(&path).extension().is_some_and(|ext| ext == "epd") => {
            epd_file::upload_epd_file(&mut epd, &path)?
        }
        Some(path) => {
            let frame = epd_file::convert_image_file(&path, Dither::FloydSteinberg)?;
            epd.upload_image(&frame)?
        }
        None => {
            let mut bitmap = Bitmap::new();
            let style = PrimitiveStyle::with_stroke(BinaryColor::On, 3);

            bitmap.bounding_box().draw_styled(&style, &mut bitmap)?;
            Line::new(Point::new(0, 0), Point::new(479, 799)).draw_styled(&style, &mut bitmap)?;
            Circle::with_center(Point::new(240, 400), 300).draw_styled(&style, &mut bitmap)?;

            epd.upload_image(&codec::pack(&bitmap))?
        }
    };

    println!(
        "sent {} bytes in {} chunks ({:?}), refresh: {}",
        report.transfer.bytes, report.transfer.chunks, report.transfer.elapsed, report.refresh
    );

    epd.close();
    Ok(())
}
