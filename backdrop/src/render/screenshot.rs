use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::{debug, info};

use crate::core::error::{Error, Result};
use crate::drivers::video::{OutputViewport, VideoDriver};

const JPEG_QUALITY: u8 = 100;

/// Tightly packed RGB8 image covering the whole desktop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Black bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[at], self.pixels[at + 1], self.pixels[at + 2]])
    }

    /// Copies an RGB8 block of `width` x `height` into this bitmap with its
    /// left edge at `x_offset`. Rows are copied in order when `vflip` is
    /// set; otherwise the source is bottom-up and row `r` lands on
    /// `height - 1 - r`. Anything falling outside is dropped.
    pub fn blit_rows(
        &mut self,
        source: &[u8],
        width: u32,
        height: u32,
        x_offset: u32,
        vflip: bool,
    ) {
        let src_stride = width as usize * 3;
        let dst_stride = self.width as usize * 3;
        let visible = width.min(self.width.saturating_sub(x_offset)) as usize;
        if visible == 0 {
            return;
        }

        for (row, src) in source
            .chunks_exact(src_stride)
            .take(height as usize)
            .enumerate()
        {
            let dst_row = if vflip {
                row
            } else {
                height as usize - 1 - row
            };
            if dst_row >= self.height as usize {
                continue;
            }

            let start = dst_row * dst_stride + x_offset as usize * 3;
            self.pixels[start..start + visible * 3]
                .copy_from_slice(&src[..visible * 3]);
        }
    }
}

/// Reads every viewport back and composes the desktop image. Viewports
/// flagged `single` are tiled left to right in registration order; the
/// rest are drawn at the left edge.
pub fn capture(video: &mut dyn VideoDriver) -> Result<Bitmap> {
    let output = video.output().clone();
    let mut bitmap = Bitmap::new(output.full_width, output.full_height);
    let mut x_offset = 0u32;

    for viewport in &output.viewports {
        let pixels = read_viewport(video, viewport)?;
        let rect = viewport.rect;
        let origin = if viewport.single { x_offset } else { 0 };

        bitmap.blit_rows(
            &pixels,
            rect.width,
            rect.height,
            origin,
            output.vflip,
        );

        if viewport.single {
            x_offset += rect.width;
        }
    }

    Ok(bitmap)
}

fn read_viewport(
    video: &mut dyn VideoDriver,
    viewport: &OutputViewport,
) -> Result<Vec<u8>> {
    let pixels = video.read_viewport_pixels(viewport)?;
    let expected = viewport.rect.rgb_len();
    if pixels.len() < expected {
        return Err(Error::Screenshot(format!(
            "viewport '{}' returned {} bytes, expected {}",
            viewport.name,
            pixels.len(),
            expected
        )));
    }
    Ok(pixels)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Bmp,
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Picks the encoder from the file extension, matched exactly.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "bmp" => Some(Self::Bmp),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// The extension matched no encoder; nothing was written.
    Skipped,
}

pub fn save(bitmap: &Bitmap, path: &Path) -> Result<SaveOutcome> {
    let Some(format) = ImageFormat::from_path(path) else {
        debug!("No encoder for {:?}, screenshot not written", path);
        return Ok(SaveOutcome::Skipped);
    };

    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        ImageFormat::Png => write_png(&mut writer, bitmap)?,
        ImageFormat::Bmp => BmpEncoder::new(&mut writer)
            .write_image(
                bitmap.pixels(),
                bitmap.width(),
                bitmap.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|err| Error::Screenshot(format!("bmp: {}", err)))?,
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .write_image(
                    bitmap.pixels(),
                    bitmap.width(),
                    bitmap.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|err| Error::Screenshot(format!("jpeg: {}", err)))?
        }
    }

    writer.flush()?;
    info!("Screenshot saved to {:?}", path);

    Ok(SaveOutcome::Written(path.to_path_buf()))
}

fn write_png(writer: &mut impl Write, bitmap: &Bitmap) -> Result<()> {
    let mut encoder =
        png::Encoder::new(writer, bitmap.width(), bitmap.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder
        .write_header()
        .map_err(|err| png_error("header", err))?;
    png_writer
        .write_image_data(bitmap.pixels())
        .map_err(|err| png_error("write", err))?;
    png_writer
        .finish()
        .map_err(|err| png_error("finish", err))
}

fn png_error(stage: &str, err: png::EncodingError) -> Error {
    Error::Screenshot(format!("png {} failed: {}", stage, err))
}
