//! Image decoding into 8-bit planar pixel data.
//!
//! PNG and JPEG containers are recognized by their signature rather than by
//! the file extension. Every decoded image is normalized to 8 bits per
//! sample and split into one plane per channel, which is the layout the
//! metrics operate on.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use imgref::{ImgRef, ImgVec};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8];

/// Dimensions of a decoded image, including its channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Rows.
    pub height: usize,
    /// Columns.
    pub width: usize,
    /// Samples per pixel (1 = gray, 2 = gray + alpha, 3 = RGB, 4 = RGBA).
    pub channels: usize,
}

impl Shape {
    /// Total number of samples across all channels.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.height * self.width * self.channels
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// A decoded image stored as one 8-bit plane per channel.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: usize,
    height: usize,
    planes: Vec<ImgVec<u8>>,
}

impl DecodedImage {
    /// Split interleaved samples (row-major, `channels` per pixel) into planes.
    pub fn from_interleaved(
        data: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self> {
        if channels == 0 || data.len() < width * height * channels {
            return Err(Error::UnsupportedFormat(format!(
                "{} samples do not cover a {width}x{height} image with {channels} channels",
                data.len()
            )));
        }

        let samples = &data[..width * height * channels];
        let planes = (0..channels)
            .map(|channel| {
                let plane: Vec<u8> = samples
                    .iter()
                    .skip(channel)
                    .step_by(channels)
                    .copied()
                    .collect();
                ImgVec::new(plane, width, height)
            })
            .collect();

        Ok(Self { width, height, planes })
    }

    /// Shape of the image.
    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape {
            height: self.height,
            width: self.width,
            channels: self.planes.len(),
        }
    }

    /// Borrow one plane per channel.
    pub fn planes(&self) -> impl Iterator<Item = ImgRef<'_, u8>> {
        self.planes.iter().map(|plane| plane.as_ref())
    }
}

/// Read and decode an image file.
pub fn decode_file(path: &Path) -> Result<DecodedImage> {
    let data = std::fs::read(path).map_err(|e| Error::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    decode_bytes(&data).map_err(|e| match e {
        Error::UnsupportedFormat(_) => e,
        other => Error::ImageLoad {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })
}

/// Decode an in-memory PNG or JPEG image.
pub fn decode_bytes(data: &[u8]) -> Result<DecodedImage> {
    if data.starts_with(PNG_SIGNATURE) {
        decode_png(data)
    } else if data.starts_with(JPEG_SIGNATURE) {
        decode_jpeg(data)
    } else {
        Err(Error::UnsupportedFormat(
            "unrecognized image signature (expected PNG or JPEG)".to_string(),
        ))
    }
}

fn decode_png(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    // Palette and low bit depths expand to 8-bit, 16-bit samples are stripped.
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder.read_info().map_err(|e| png_error(&e))?;
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| codec_error("png", "output buffer size unavailable"))?;
    let mut buf = vec![0u8; buf_size];
    let frame = reader.next_frame(&mut buf).map_err(|e| png_error(&e))?;

    let channels = frame.color_type.samples();
    let width = frame.width as usize;
    let height = frame.height as usize;

    // Drop any row padding so samples are tightly packed.
    let row_bytes = width * channels;
    let packed: Vec<u8> = if frame.line_size == row_bytes {
        buf.truncate(row_bytes * height);
        buf
    } else {
        buf.chunks_exact(frame.line_size)
            .take(height)
            .flat_map(|row| row[..row_bytes].iter().copied())
            .collect()
    };

    DecodedImage::from_interleaved(&packed, width, height, channels)
}

fn png_error(e: &png::DecodingError) -> Error {
    codec_error("png", e)
}

fn codec_error(codec: &str, message: impl ToString) -> Error {
    Error::Codec {
        codec: codec.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "jpeg-decode")]
fn decode_jpeg(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    let pixels = decoder
        .decode()
        .map_err(|e| codec_error("jpeg-decoder", e))?;

    let info = decoder
        .info()
        .ok_or_else(|| codec_error("jpeg-decoder", "Missing JPEG info after decode"))?;

    jpeg_planes(
        info.pixel_format,
        &pixels,
        usize::from(info.width),
        usize::from(info.height),
    )
}

#[cfg(feature = "jpeg-decode")]
fn jpeg_planes(
    format: jpeg_decoder::PixelFormat,
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<DecodedImage> {
    match format {
        jpeg_decoder::PixelFormat::RGB24 => DecodedImage::from_interleaved(pixels, width, height, 3),
        jpeg_decoder::PixelFormat::L8 => DecodedImage::from_interleaved(pixels, width, height, 1),
        jpeg_decoder::PixelFormat::L16 => {
            // Keep the high byte of each big-endian sample.
            let gray: Vec<u8> = pixels.chunks_exact(2).map(|c| c[0]).collect();
            DecodedImage::from_interleaved(&gray, width, height, 1)
        }
        jpeg_decoder::PixelFormat::CMYK32 => Err(Error::UnsupportedFormat(
            "CMYK JPEGs are not supported".to_string(),
        )),
    }
}

#[cfg(not(feature = "jpeg-decode"))]
fn decode_jpeg(_data: &[u8]) -> Result<DecodedImage> {
    Err(Error::UnsupportedFormat(
        "JPEG support requires the `jpeg-decode` feature".to_string(),
    ))
}
