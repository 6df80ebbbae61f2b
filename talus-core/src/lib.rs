//! Talus synthesizes labeled training imagery for debris-flow segmentation.
//!
//! Starting from a small set of annotated photo + mask pairs, Talus produces a
//! much larger dataset through three chained, pure batch stages:
//!
//! 1. **Extract**: fuse a photo with its label mask into a 4-channel cutout
//!    (`Raster` with [`ChannelLayout::ColorAlpha`], alpha = mask).
//! 2. **Augment**: generate randomized geometric variants of each cutout
//!    (rotate, flip, scale) with the mask kept pixel-synchronized.
//! 3. **Composite**: alpha-blend augmented cutouts over background photos,
//!    emitting final image + mask training pairs.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: randomness is drawn from a caller-supplied
//!   [`rand::Rng`], never from an implicit global; seeded runs reproduce
//!   byte-identical outputs.
//! - **No hidden IO**: stages exchange named buffers through the
//!   [`BufferStore`] trait; decode/encode happens at the stage boundary.
//! - **Mask fidelity end-to-end**: label values pass through every geometric
//!   transform via nearest-neighbor sampling, so no intermediate values are
//!   invented.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod augment;
mod composite;
mod extract;
mod foundation;
mod pipeline;
mod raster;
mod store;

pub use augment::config::AugmentConfig;
pub use augment::variants::{AugmentedPair, augment_folder, augment_pair};
pub use composite::blend::{blit_over, over_straight};
pub use composite::scatter::{CompositeConfig, PlacementMode, composite_batch};
pub use extract::cutout::{extract_cutout, extract_cutouts};
pub use foundation::error::{TalusError, TalusResult};
pub use foundation::stats::StageStats;
pub use pipeline::run::{SynthConfig, SynthStats, SynthStores, run_synthesis};
pub use raster::codec::{decode_mask, decode_raster, encode_png};
pub use raster::grid::{ChannelLayout, Mask, Raster};
pub use store::buffer::{BufferStore, DirStore, MemStore};
pub use store::stem::{StemIndex, stem};
