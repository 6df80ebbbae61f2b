use image::imageops::{self, FilterType};

use crate::{
    foundation::error::TalusResult,
    raster::codec::{dynamic_from_raster, gray_image_from_mask, raster_from_dynamic},
    raster::grid::{Mask, Raster},
};

/// Resize a raster with the given filter, preserving its channel layout.
///
/// Callers pick the filter: `Lanczos3` for imagery, never for masks.
pub(crate) fn resize_raster(
    raster: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> TalusResult<Raster> {
    let img = dynamic_from_raster(raster)?;
    raster_from_dynamic(img.resize_exact(width, height, filter))
}

/// Resize a mask with nearest-neighbor sampling.
///
/// Label values are categorical; any smoothing filter would invent
/// intermediate values, so the mask path is pinned to `Nearest`.
pub(crate) fn resize_mask(mask: &Mask, width: u32, height: u32) -> TalusResult<Mask> {
    let gray = gray_image_from_mask(mask)?;
    let resized = imageops::resize(&gray, width, height, FilterType::Nearest);
    Mask::from_vec(width, height, resized.into_raw())
}
