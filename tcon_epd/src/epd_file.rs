//! `.epd` files: a packed frame exactly as it is sent to the panel.

use std::{fs, path::Path};

use anyhow::Context;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use tcon_epd_core::{
    codec::{self, Dither, PackedFrame},
    session::UploadReport,
    Session,
};

/// Reads and validates a stored frame.
pub fn read_epd_file(path: impl AsRef<Path>) -> anyhow::Result<PackedFrame> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let frame =
        PackedFrame::parse(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(frame)
}

pub fn write_epd_file(path: impl AsRef<Path>, frame: &PackedFrame) -> anyhow::Result<()> {
    let path = path.as_ref();
    fs::write(path, frame.to_bytes()).with_context(|| format!("writing {}", path.display()))?;
    log::debug!("wrote {} bytes to {}", frame.encoded_len(), path.display());
    Ok(())
}

/// Decodes a PNG or JPEG picture and runs it through the codec.
pub fn convert_image_file(path: impl AsRef<Path>, method: Dither) -> anyhow::Result<PackedFrame> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .into_rgba8();
    log::debug!(
        "converting {} ({}x{}) with {method:?}",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(codec::encode(&image, method)?)
}

/// Sends the file content as is and refreshes the panel.
///
/// The bytes are not validated, so files for other panel sizes or pixel
/// formats can be pushed too.
pub fn upload_epd_file<Spi, I, O, D>(
    session: &mut Session<Spi, I, O, D>,
    path: impl AsRef<Path>,
) -> anyhow::Result<UploadReport>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    log::info!("uploading {} ({} bytes)", path.display(), bytes.len());
    let report = session
        .upload_raw(&bytes)
        .with_context(|| format!("uploading {}", path.display()))?;
    Ok(report)
}
