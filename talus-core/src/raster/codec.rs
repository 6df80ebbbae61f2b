use std::io::Cursor;

use anyhow::Context;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::{
    foundation::error::{TalusError, TalusResult},
    raster::grid::{ChannelLayout, Mask, Raster},
};

/// Decode encoded image bytes into a [`Raster`], preserving channel layout.
///
/// 16-bit and float sources are narrowed to the pipeline's 8-bit working
/// depth. Two-channel (gray+alpha) sources are rejected, as is anything the
/// closed layout set does not cover.
pub fn decode_raster(name: &str, bytes: &[u8]) -> TalusResult<Raster> {
    let img = image::load_from_memory(bytes).map_err(|e| TalusError::unreadable(name, e))?;
    raster_from_dynamic(img)
}

/// Decode encoded mask bytes into a single-channel [`Mask`].
///
/// Multi-channel sources collapse through the standard luma reduction.
pub fn decode_mask(name: &str, bytes: &[u8]) -> TalusResult<Mask> {
    let img = image::load_from_memory(bytes).map_err(|e| TalusError::unreadable(name, e))?;
    let gray = match img {
        DynamicImage::ImageLuma8(buf) => buf,
        other => other.to_luma8(),
    };
    let (width, height) = gray.dimensions();
    Mask::from_vec(width, height, gray.into_raw())
}

/// Encode a raster as PNG bytes (lossless, alpha-preserving).
pub fn encode_png(raster: &Raster) -> TalusResult<Vec<u8>> {
    let img = dynamic_from_raster(raster)?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

pub(crate) fn raster_from_dynamic(img: DynamicImage) -> TalusResult<Raster> {
    match img {
        DynamicImage::ImageLuma8(buf) => {
            let (w, h) = buf.dimensions();
            Raster::from_vec(w, h, ChannelLayout::Gray, buf.into_raw())
        }
        DynamicImage::ImageRgb8(buf) => {
            let (w, h) = buf.dimensions();
            Raster::from_vec(w, h, ChannelLayout::Color, buf.into_raw())
        }
        DynamicImage::ImageRgba8(buf) => {
            let (w, h) = buf.dimensions();
            Raster::from_vec(w, h, ChannelLayout::ColorAlpha, buf.into_raw())
        }
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            Err(TalusError::UnsupportedChannelLayout(2))
        }
        other => {
            // Deeper-than-8-bit sources of a supported layout narrow to u8.
            match ChannelLayout::from_channels(other.color().channel_count())? {
                ChannelLayout::Gray => {
                    let buf = other.to_luma8();
                    let (w, h) = buf.dimensions();
                    Raster::from_vec(w, h, ChannelLayout::Gray, buf.into_raw())
                }
                ChannelLayout::Color => {
                    let buf = other.to_rgb8();
                    let (w, h) = buf.dimensions();
                    Raster::from_vec(w, h, ChannelLayout::Color, buf.into_raw())
                }
                ChannelLayout::ColorAlpha => {
                    let buf = other.to_rgba8();
                    let (w, h) = buf.dimensions();
                    Raster::from_vec(w, h, ChannelLayout::ColorAlpha, buf.into_raw())
                }
            }
        }
    }
}

pub(crate) fn dynamic_from_raster(raster: &Raster) -> TalusResult<DynamicImage> {
    let (w, h) = raster.dimensions();
    let data = raster.data.clone();
    let img = match raster.layout {
        ChannelLayout::Gray => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        ChannelLayout::Color => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        ChannelLayout::ColorAlpha => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
    };
    img.ok_or_else(|| TalusError::validation("raster data shorter than its dimensions"))
}

pub(crate) fn gray_image_from_mask(mask: &Mask) -> TalusResult<GrayImage> {
    GrayImage::from_raw(mask.width, mask.height, mask.data.clone())
        .ok_or_else(|| TalusError::validation("mask data shorter than its dimensions"))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/codec.rs"]
mod tests;
