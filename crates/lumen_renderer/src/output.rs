//! Binary PPM (P6) output through the `image` crate's PNM codec.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ImageEncoder, ImageFormat, RgbImage};
use log::info;
use thiserror::Error;

use crate::renderer::ImageBuffer;

/// Errors that can occur when writing or reading images.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Encode `image` as binary PPM into `writer`.
pub fn encode_ppm<W: Write>(writer: W, image: &ImageBuffer, gamma: f64) -> OutputResult<()> {
    let bytes = image.to_rgb8(gamma);
    PnmEncoder::new(writer)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(&bytes, image.width, image.height, ColorType::Rgb8)?;
    Ok(())
}

/// Write `image` to `path` as binary PPM.
pub fn write_ppm(path: impl AsRef<Path>, image: &ImageBuffer, gamma: f64) -> OutputResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    encode_ppm(&mut writer, image, gamma)?;
    writer.flush()?;
    info!("Wrote {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}

/// Decode a PNM image held in memory.
pub fn decode_ppm(bytes: &[u8]) -> OutputResult<RgbImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Pnm)?.to_rgb8())
}

/// Read a PNM image from disk.
pub fn read_ppm(path: impl AsRef<Path>) -> OutputResult<RgbImage> {
    let bytes = std::fs::read(path)?;
    decode_ppm(&bytes)
}
