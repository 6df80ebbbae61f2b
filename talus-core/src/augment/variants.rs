use image::imageops::{self, FilterType};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::{
    augment::config::AugmentConfig,
    foundation::error::{TalusError, TalusResult},
    foundation::stats::StageStats,
    raster::codec::{
        decode_mask, decode_raster, dynamic_from_raster, encode_png, gray_image_from_mask,
        raster_from_dynamic,
    },
    raster::grid::{Mask, Raster},
    raster::resample::{resize_mask, resize_raster},
    store::buffer::BufferStore,
    store::stem::{StemIndex, stem},
};

/// One augmented image + mask variant.
///
/// Image and mask dimensions are equal after every transform step, though
/// they generally differ from the input's.
#[derive(Clone, Debug)]
pub struct AugmentedPair {
    /// Augmented image.
    pub image: Raster,
    /// Mask transformed through the identical geometry.
    pub mask: Mask,
}

/// Produce `cfg.variant_count` independent variants of an (image, mask) pair.
///
/// Each variant draws its own rotation angle, flip decision, and scale factor
/// from `rng`. The image resizes through `Lanczos3`; the mask only ever moves
/// through nearest-neighbor sampling, so its value set never grows.
pub fn augment_pair<R: Rng + ?Sized>(
    image: &Raster,
    mask: &Mask,
    cfg: &AugmentConfig,
    rng: &mut R,
) -> TalusResult<Vec<AugmentedPair>> {
    cfg.validate()?;
    if image.dimensions() != mask.dimensions() {
        return Err(TalusError::dimension_mismatch(
            image.dimensions(),
            mask.dimensions(),
        ));
    }

    let mut variants = Vec::with_capacity(cfg.variant_count as usize);
    for _ in 0..cfg.variant_count {
        variants.push(augment_once(image, mask, cfg, rng)?);
    }
    Ok(variants)
}

fn augment_once<R: Rng + ?Sized>(
    image: &Raster,
    mask: &Mask,
    cfg: &AugmentConfig,
    rng: &mut R,
) -> TalusResult<AugmentedPair> {
    let angle = cfg
        .rotation_angles
        .choose(rng)
        .copied()
        .ok_or_else(|| TalusError::validation("rotation_angles must not be empty"))?;
    let (mut img, mut msk) = rotate_pair(image, mask, angle)?;

    if rng.random_bool(f64::from(cfg.flip_probability)) {
        (img, msk) = flip_pair(&img, &msk)?;
    }

    let (low, high) = cfg.scale_range;
    let factor = rng.random_range(low..=high);
    let (w, h) = img.dimensions();
    let new_w = ((w as f32 * factor) as u32).max(1);
    let new_h = ((h as f32 * factor) as u32).max(1);
    if (new_w, new_h) != (w, h) {
        img = resize_raster(&img, new_w, new_h, FilterType::Lanczos3)?;
        msk = resize_mask(&msk, new_w, new_h)?;
    }

    Ok(AugmentedPair {
        image: img,
        mask: msk,
    })
}

/// Rotate image and mask counterclockwise by `degrees`, expanding the canvas
/// so nothing is cropped. Both members expand identically.
fn rotate_pair(image: &Raster, mask: &Mask, degrees: f32) -> TalusResult<(Raster, Mask)> {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        return Ok((image.clone(), mask.clone()));
    }
    // Quarter turns stay bit-exact; everything else resamples.
    if normalized == 90.0 {
        rotate_quarter(image, mask, 1)
    } else if normalized == 180.0 {
        rotate_quarter(image, mask, 2)
    } else if normalized == 270.0 {
        rotate_quarter(image, mask, 3)
    } else {
        rotate_any(image, mask, normalized)
    }
}

fn rotate_quarter(image: &Raster, mask: &Mask, turns_ccw: u8) -> TalusResult<(Raster, Mask)> {
    // `imageops` rotations are clockwise; one turn counterclockwise is three
    // turns clockwise.
    let img = dynamic_from_raster(image)?;
    let rotated = match turns_ccw {
        1 => img.rotate270(),
        2 => img.rotate180(),
        _ => img.rotate90(),
    };

    let gray = gray_image_from_mask(mask)?;
    let rotated_mask = match turns_ccw {
        1 => imageops::rotate270(&gray),
        2 => imageops::rotate180(&gray),
        _ => imageops::rotate90(&gray),
    };
    let (mw, mh) = rotated_mask.dimensions();

    Ok((
        raster_from_dynamic(rotated)?,
        Mask::from_vec(mw, mh, rotated_mask.into_raw())?,
    ))
}

fn rotate_any(image: &Raster, mask: &Mask, degrees: f32) -> TalusResult<(Raster, Mask)> {
    let radians = f64::from(degrees).to_radians();
    let (sin, cos) = radians.sin_cos();
    let w = f64::from(image.width);
    let h = f64::from(image.height);
    let new_w = ((w * cos.abs() + h * sin.abs()).ceil() as u32).max(1);
    let new_h = ((w * sin.abs() + h * cos.abs()).ceil() as u32).max(1);

    let channels = image.layout.channels() as usize;
    let mut out_img = Raster::new(new_w, new_h, image.layout);
    let mut out_mask = Mask::new(new_w, new_h);

    let cx_src = w / 2.0;
    let cy_src = h / 2.0;
    let cx_dst = f64::from(new_w) / 2.0;
    let cy_dst = f64::from(new_h) / 2.0;

    for y in 0..new_h {
        for x in 0..new_w {
            let dx = f64::from(x) + 0.5 - cx_dst;
            let dy = f64::from(y) + 0.5 - cy_dst;
            // Inverse of the counterclockwise forward map (y points down).
            let sx = cos * dx - sin * dy + cx_src;
            let sy = sin * dx + cos * dy + cy_src;

            let offset = out_img.pixel_offset(x, y);
            for c in 0..channels {
                out_img.data[offset + c] = bilinear_channel(image, sx, sy, c);
            }
            out_mask.data[y as usize * new_w as usize + x as usize] =
                nearest_mask_value(mask, sx, sy);
        }
    }

    Ok((out_img, out_mask))
}

fn bilinear_channel(image: &Raster, sx: f64, sy: f64, c: usize) -> u8 {
    let fx = sx - 0.5;
    let fy = sy - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let mut acc = 0.0;
    for (iy, wy) in [(y0, 1.0 - ty), (y0 + 1.0, ty)] {
        for (ix, wx) in [(x0, 1.0 - tx), (x0 + 1.0, tx)] {
            acc += f64::from(texel(image, ix, iy, c)) * wx * wy;
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}

fn texel(image: &Raster, ix: f64, iy: f64, c: usize) -> u8 {
    if ix < 0.0 || iy < 0.0 || ix >= f64::from(image.width) || iy >= f64::from(image.height) {
        return 0;
    }
    image.data[image.pixel_offset(ix as u32, iy as u32) + c]
}

fn nearest_mask_value(mask: &Mask, sx: f64, sy: f64) -> u8 {
    if sx < 0.0 || sy < 0.0 || sx >= f64::from(mask.width) || sy >= f64::from(mask.height) {
        return 0;
    }
    mask.data[sy as usize * mask.width as usize + sx as usize]
}

fn flip_pair(image: &Raster, mask: &Mask) -> TalusResult<(Raster, Mask)> {
    let img = raster_from_dynamic(dynamic_from_raster(image)?.fliph())?;
    let flipped = imageops::flip_horizontal(&gray_image_from_mask(mask)?);
    Ok((
        img,
        Mask::from_vec(mask.width, mask.height, flipped.into_raw())?,
    ))
}

/// Augment every (image, mask) pair found in the input stores.
///
/// Pairs associate by stem; an image without a mask counterpart is skipped
/// with a diagnostic, as is any unreadable or mismatched pair. Each variant
/// is written to both output stores under the key `{stem}_aug_{i}` (1-based)
/// so later stages can re-pair them.
#[tracing::instrument(skip_all)]
pub fn augment_folder<R: Rng + ?Sized>(
    images: &dyn BufferStore,
    masks: &dyn BufferStore,
    out_images: &mut dyn BufferStore,
    out_masks: &mut dyn BufferStore,
    cfg: &AugmentConfig,
    rng: &mut R,
) -> TalusResult<StageStats> {
    cfg.validate()?;
    let mut stats = StageStats::default();
    let mask_index = StemIndex::build(masks.list()?);

    for name in images.list()? {
        let key = stem(&name).to_string();
        let variants = load_pair(&name, images, masks, &mask_index)
            .and_then(|(img, msk)| augment_pair(&img, &msk, cfg, rng));

        match variants {
            Ok(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    let out_name = format!("{}_aug_{}.png", key, i + 1);
                    out_images.write(&out_name, &encode_png(&variant.image)?)?;
                    out_masks.write(&out_name, &encode_png(&variant.mask.to_raster())?)?;
                    stats.note_written();
                }
                info!(image = %name, variants = variants.len(), "augmented pair");
            }
            Err(err) => {
                warn!(image = %name, error = %err, "skipping pair");
                stats.note_skipped();
            }
        }
    }

    Ok(stats)
}

fn load_pair(
    name: &str,
    images: &dyn BufferStore,
    masks: &dyn BufferStore,
    mask_index: &StemIndex,
) -> TalusResult<(Raster, Mask)> {
    let key = stem(name);
    let mask_name = mask_index
        .get(key)
        .ok_or_else(|| TalusError::missing_counterpart(key))?;
    let image = decode_raster(name, &images.read(name)?)?;
    let mask = decode_mask(mask_name, &masks.read(mask_name)?)?;
    Ok((image, mask))
}

#[cfg(test)]
#[path = "../../tests/unit/augment/variants.rs"]
mod tests;
