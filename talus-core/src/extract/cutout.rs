use tracing::{info, warn};

use crate::{
    foundation::error::{TalusError, TalusResult},
    foundation::stats::StageStats,
    raster::codec::{decode_mask, decode_raster, encode_png},
    raster::grid::{Mask, Raster},
    store::buffer::BufferStore,
    store::stem::{StemIndex, stem},
};

/// Fuse an image's color channels with its label mask into a 4-channel cutout.
///
/// Channels 0-2 come from the source's color (gray broadcasts, an existing
/// alpha channel is discarded); channel 3 is the mask, copied verbatim.
pub fn extract_cutout(image: &Raster, mask: &Mask) -> TalusResult<Raster> {
    image.with_alpha(mask)
}

/// Extract a cutout for every image with a mask counterpart.
///
/// Images and masks pair by stem. Per-item failures (missing counterpart,
/// unreadable buffer, shape or layout rejection) are logged and skipped; a
/// rejected pair produces no output at all. Output-store failures abort the
/// run.
#[tracing::instrument(skip(images, masks, out))]
pub fn extract_cutouts(
    images: &dyn BufferStore,
    masks: &dyn BufferStore,
    out: &mut dyn BufferStore,
) -> TalusResult<StageStats> {
    let mut stats = StageStats::default();
    let mask_index = StemIndex::build(masks.list()?);

    for name in images.list()? {
        match extract_one(&name, images, masks, &mask_index) {
            Ok(png) => {
                let out_name = format!("{}.png", stem(&name));
                out.write(&out_name, &png)?;
                stats.note_written();
                info!(image = %name, out = %out_name, "extracted cutout");
            }
            Err(err) => {
                warn!(image = %name, error = %err, "skipping pair");
                stats.note_skipped();
            }
        }
    }

    Ok(stats)
}

fn extract_one(
    name: &str,
    images: &dyn BufferStore,
    masks: &dyn BufferStore,
    mask_index: &StemIndex,
) -> TalusResult<Vec<u8>> {
    let key = stem(name);
    let mask_name = mask_index
        .get(key)
        .ok_or_else(|| TalusError::missing_counterpart(key))?;

    let image = decode_raster(name, &images.read(name)?)?;
    let mask = decode_mask(mask_name, &masks.read(mask_name)?)?;

    let cutout = extract_cutout(&image, &mask)?;
    encode_png(&cutout)
}

#[cfg(test)]
#[path = "../../tests/unit/extract/cutout.rs"]
mod tests;
