use image::imageops::FilterType;
use rand::Rng;
use tracing::{info, warn};

use crate::{
    composite::blend::blit_over,
    foundation::error::TalusResult,
    foundation::stats::StageStats,
    raster::codec::{decode_mask, decode_raster, encode_png},
    raster::grid::{Mask, Raster},
    raster::resample::{resize_mask, resize_raster},
    store::buffer::BufferStore,
    store::stem::{StemIndex, stem},
};

/// Placement strategy for compositing a foreground onto a background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Resize the background to the foreground's dimensions.
    ///
    /// The valid placement region collapses to the origin, so the offset draw
    /// is degenerate; it is still taken from the generator so seeded runs
    /// stay reproducible across modes. The output mask is the foreground's
    /// mask buffer copied verbatim.
    #[default]
    MatchForeground,
    /// Keep the background's dimensions and scatter the foreground onto it.
    ///
    /// The foreground (and its mask) shrink to fit if necessary, a genuinely
    /// random offset is drawn, and the output mask is synthesized on a
    /// background-sized canvas at the same offset.
    ScatterOnBackground,
}

/// Configuration for the compositing stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Number of foreground assets sampled per background, clamped to the
    /// pool size.
    pub overlay_count: u32,
    /// Placement strategy.
    pub placement: PlacementMode,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            overlay_count: 70,
            placement: PlacementMode::MatchForeground,
        }
    }
}

/// Composite sampled foregrounds over every background.
///
/// For each background, up to `cfg.overlay_count` foregrounds are drawn
/// without replacement (the whole pool when it is smaller; never an error).
/// Each (background, foreground) combination yields one composite image named
/// `{background-stem}_{foreground-stem}` plus the foreground's mask under the
/// same identifier. A missing mask skips only the mask write; the composite
/// image is still emitted. Unreadable inputs abort only their own iteration.
#[tracing::instrument(skip_all)]
pub fn composite_batch<R: Rng + ?Sized>(
    backgrounds: &dyn BufferStore,
    foregrounds: &dyn BufferStore,
    masks: &dyn BufferStore,
    out_images: &mut dyn BufferStore,
    out_masks: &mut dyn BufferStore,
    cfg: &CompositeConfig,
    rng: &mut R,
) -> TalusResult<StageStats> {
    let mut stats = StageStats::default();
    let fg_names = foregrounds.list()?;
    let mask_index = StemIndex::build(masks.list()?);

    for bg_name in backgrounds.list()? {
        let background = match backgrounds
            .read(&bg_name)
            .and_then(|bytes| decode_raster(&bg_name, &bytes))
        {
            Ok(r) => r,
            Err(err) => {
                warn!(background = %bg_name, error = %err, "skipping background");
                stats.note_skipped();
                continue;
            }
        };

        let take = (cfg.overlay_count as usize).min(fg_names.len());
        let picks = rand::seq::index::sample(rng, fg_names.len(), take);

        for idx in picks.iter() {
            let fg_name = &fg_names[idx];
            let prepared = render_composite(
                &background,
                stem(&bg_name),
                fg_name,
                foregrounds,
                masks,
                &mask_index,
                cfg,
                rng,
            );
            match prepared {
                Ok(prepared) => {
                    out_images.write(&prepared.image_name, &prepared.image_png)?;
                    match prepared.mask {
                        Some((mask_name, bytes)) => {
                            out_masks.write(&mask_name, &bytes)?;
                            info!(composite = %prepared.image_name, "wrote composite pair");
                        }
                        None => warn!(
                            composite = %prepared.image_name,
                            "mask counterpart missing; wrote composite image only"
                        ),
                    }
                    stats.note_written();
                }
                Err(err) => {
                    warn!(background = %bg_name, foreground = %fg_name, error = %err,
                          "skipping composite");
                    stats.note_skipped();
                }
            }
        }
    }

    Ok(stats)
}

struct PreparedComposite {
    image_name: String,
    image_png: Vec<u8>,
    mask: Option<(String, Vec<u8>)>,
}

#[allow(clippy::too_many_arguments)]
fn render_composite<R: Rng + ?Sized>(
    background: &Raster,
    bg_stem: &str,
    fg_name: &str,
    foregrounds: &dyn BufferStore,
    masks: &dyn BufferStore,
    mask_index: &StemIndex,
    cfg: &CompositeConfig,
    rng: &mut R,
) -> TalusResult<PreparedComposite> {
    let fg = decode_raster(fg_name, &foregrounds.read(fg_name)?)?.to_color_alpha();
    let fg_stem = stem(fg_name);
    let id = format!("{bg_stem}_{fg_stem}");

    match cfg.placement {
        PlacementMode::MatchForeground => {
            let (fw, fh) = fg.dimensions();
            let mut canvas =
                resize_raster(&background.to_color(), fw, fh, FilterType::Lanczos3)?;

            // The canvas matches the foreground exactly, so both ranges are
            // zero-width; the draws are kept for generator parity.
            let ox = rng.random_range(0..=canvas.width - fw);
            let oy = rng.random_range(0..=canvas.height - fh);
            blit_over(&mut canvas, &fg, ox, oy)?;

            let mask = copy_mask_verbatim(&id, fg_stem, masks, mask_index);
            Ok(PreparedComposite {
                image_name: format!("{id}.png"),
                image_png: encode_png(&canvas)?,
                mask,
            })
        }
        PlacementMode::ScatterOnBackground => {
            let mut canvas = background.to_color();
            let (bw, bh) = canvas.dimensions();
            let (fw, fh) = fg.dimensions();

            let scale = (f64::from(bw) / f64::from(fw))
                .min(f64::from(bh) / f64::from(fh))
                .min(1.0);
            let sw = ((f64::from(fw) * scale) as u32).clamp(1, bw);
            let sh = ((f64::from(fh) * scale) as u32).clamp(1, bh);
            let fg_scaled = if (sw, sh) == (fw, fh) {
                fg
            } else {
                resize_raster(&fg, sw, sh, FilterType::Lanczos3)?
            };

            let ox = rng.random_range(0..=bw - sw);
            let oy = rng.random_range(0..=bh - sh);
            blit_over(&mut canvas, &fg_scaled, ox, oy)?;

            let mask = synthesize_mask(&id, fg_stem, masks, mask_index, (bw, bh), (sw, sh), (ox, oy));
            Ok(PreparedComposite {
                image_name: format!("{id}.png"),
                image_png: encode_png(&canvas)?,
                mask,
            })
        }
    }
}

/// Byte-identical mask copy, keeping the source's own extension. A missing or
/// unreadable mask yields `None`: only the mask write is skipped.
fn copy_mask_verbatim(
    id: &str,
    fg_stem: &str,
    masks: &dyn BufferStore,
    mask_index: &StemIndex,
) -> Option<(String, Vec<u8>)> {
    let mask_name = mask_index.get(fg_stem)?;
    let bytes = masks.read(mask_name).ok()?;
    let suffix = &mask_name[stem(mask_name).len()..];
    Some((format!("{id}{suffix}"), bytes))
}

/// Background-sized mask with the scaled foreground mask pasted at the
/// composite offset; used by [`PlacementMode::ScatterOnBackground`].
fn synthesize_mask(
    id: &str,
    fg_stem: &str,
    masks: &dyn BufferStore,
    mask_index: &StemIndex,
    canvas_dims: (u32, u32),
    scaled_dims: (u32, u32),
    offset: (u32, u32),
) -> Option<(String, Vec<u8>)> {
    let mask_name = mask_index.get(fg_stem)?;
    let bytes = masks.read(mask_name).ok()?;
    let mask = decode_mask(mask_name, &bytes).ok()?;
    let scaled = resize_mask(&mask, scaled_dims.0, scaled_dims.1).ok()?;

    let mut canvas = Mask::new(canvas_dims.0, canvas_dims.1);
    paste_mask(&mut canvas, &scaled, offset.0, offset.1);
    let png = encode_png(&canvas.to_raster()).ok()?;
    Some((format!("{id}.png"), png))
}

fn paste_mask(canvas: &mut Mask, src: &Mask, ox: u32, oy: u32) {
    for y in 0..src.height {
        let dy = oy + y;
        if dy >= canvas.height {
            break;
        }
        for x in 0..src.width {
            let dx = ox + x;
            if dx >= canvas.width {
                break;
            }
            canvas.data[dy as usize * canvas.width as usize + dx as usize] =
                src.data[y as usize * src.width as usize + x as usize];
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/scatter.rs"]
mod tests;
