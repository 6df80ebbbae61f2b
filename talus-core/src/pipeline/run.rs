use std::path::Path;

use anyhow::Context;
use rand::Rng;

use crate::{
    augment::config::AugmentConfig,
    augment::variants::augment_folder,
    composite::scatter::{CompositeConfig, composite_batch},
    extract::cutout::extract_cutouts,
    foundation::error::{TalusError, TalusResult},
    foundation::stats::StageStats,
    store::buffer::BufferStore,
};

/// Configuration for a full synthesis run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Augmentation stage parameters.
    pub augment: AugmentConfig,
    /// Compositing stage parameters.
    pub composite: CompositeConfig,
}

impl SynthConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_path(path: impl AsRef<Path>) -> TalusResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TalusError::validation(format!("parse config: {e}")))
    }

    /// Check value ranges across all stages.
    pub fn validate(&self) -> TalusResult<()> {
        self.augment.validate()
    }
}

/// Per-stage statistics for a full synthesis run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SynthStats {
    /// Extraction stage outcome.
    pub extract: StageStats,
    /// Augmentation stage outcome.
    pub augment: StageStats,
    /// Compositing stage outcome.
    pub composite: StageStats,
}

/// The buffer stores a synthesis run reads and writes.
///
/// Inputs are the annotated photos, their masks, and the background pool;
/// `cutouts` and the `aug_*` stores hold intermediate stage output and feed
/// the next stage; `out_*` receive the final training pairs.
pub struct SynthStores<'a> {
    /// Annotated source photos.
    pub images: &'a dyn BufferStore,
    /// Label masks paired with `images` by stem.
    pub masks: &'a dyn BufferStore,
    /// Background photo pool.
    pub backgrounds: &'a dyn BufferStore,
    /// Intermediate: extracted 4-channel cutouts.
    pub cutouts: &'a mut dyn BufferStore,
    /// Intermediate: augmented cutout variants.
    pub aug_images: &'a mut dyn BufferStore,
    /// Intermediate: masks for the augmented variants.
    pub aug_masks: &'a mut dyn BufferStore,
    /// Final composite images.
    pub out_images: &'a mut dyn BufferStore,
    /// Final composite masks.
    pub out_masks: &'a mut dyn BufferStore,
}

/// Run the full extract -> augment -> composite chain.
///
/// Each stage is a pure batch transform over the stores; there is no shared
/// state between stages beyond them. The caller owns the generator, so a
/// seeded run reproduces its outputs exactly.
pub fn run_synthesis<R: Rng + ?Sized>(
    stores: SynthStores<'_>,
    cfg: &SynthConfig,
    rng: &mut R,
) -> TalusResult<SynthStats> {
    cfg.validate()?;

    let extract = extract_cutouts(stores.images, stores.masks, &mut *stores.cutouts)?;
    let augment = augment_folder(
        &*stores.cutouts,
        stores.masks,
        &mut *stores.aug_images,
        &mut *stores.aug_masks,
        &cfg.augment,
        rng,
    )?;
    let composite = composite_batch(
        stores.backgrounds,
        &*stores.aug_images,
        &*stores.aug_masks,
        &mut *stores.out_images,
        &mut *stores.out_masks,
        &cfg.composite,
        rng,
    )?;

    Ok(SynthStats {
        extract,
        augment,
        composite,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
