use super::*;

use rand::{SeedableRng, rngs::StdRng};

use crate::{MemStore, raster::grid::ChannelLayout};

fn opaque_foreground(width: u32, height: u32, rgb: [u8; 3]) -> Raster {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    Raster::from_vec(width, height, ChannelLayout::ColorAlpha, data).unwrap()
}

fn constant_background(width: u32, height: u32, rgb: [u8; 3]) -> Raster {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&rgb);
    }
    Raster::from_vec(width, height, ChannelLayout::Color, data).unwrap()
}

struct Fixture {
    backgrounds: MemStore,
    foregrounds: MemStore,
    masks: MemStore,
}

impl Fixture {
    fn new() -> Self {
        Self {
            backgrounds: MemStore::new(),
            foregrounds: MemStore::new(),
            masks: MemStore::new(),
        }
    }

    fn run(&self, cfg: &CompositeConfig, seed: u64) -> (MemStore, MemStore, StageStats) {
        let mut out_images = MemStore::new();
        let mut out_masks = MemStore::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let stats = composite_batch(
            &self.backgrounds,
            &self.foregrounds,
            &self.masks,
            &mut out_images,
            &mut out_masks,
            cfg,
            &mut rng,
        )
        .unwrap();
        (out_images, out_masks, stats)
    }
}

#[test]
fn opaque_foreground_fully_replaces_the_background() {
    let mut fx = Fixture::new();
    let fg = opaque_foreground(4, 4, [200, 50, 25]);
    let mask_png = encode_png(&Mask::from_vec(4, 4, vec![255; 16]).unwrap().to_raster()).unwrap();
    fx.backgrounds
        .write("bg.png", &encode_png(&constant_background(8, 8, [1, 2, 3])).unwrap())
        .unwrap();
    fx.foregrounds
        .write("fg.png", &encode_png(&fg).unwrap())
        .unwrap();
    fx.masks.write("fg.png", &mask_png).unwrap();

    let (out_images, out_masks, stats) = fx.run(&CompositeConfig::default(), 1);
    assert_eq!(stats.written, 1);

    let composite = decode_raster("bg_fg.png", &out_images.read("bg_fg.png").unwrap()).unwrap();
    assert_eq!(composite.layout, ChannelLayout::Color);
    assert_eq!(composite.dimensions(), (4, 4));
    assert_eq!(composite.data, fg.to_color().data);

    // The mask travels byte-identically.
    assert_eq!(out_masks.read("bg_fg.png").unwrap(), mask_png);
}

#[test]
fn overlay_count_clamps_to_the_pool_size() {
    let mut fx = Fixture::new();
    fx.backgrounds
        .write("bg.png", &encode_png(&constant_background(6, 6, [9, 9, 9])).unwrap())
        .unwrap();
    for name in ["f1.png", "f2.png", "f3.png"] {
        fx.foregrounds
            .write(name, &encode_png(&opaque_foreground(2, 2, [50, 60, 70])).unwrap())
            .unwrap();
        fx.masks
            .write(
                name,
                &encode_png(&Mask::from_vec(2, 2, vec![255; 4]).unwrap().to_raster()).unwrap(),
            )
            .unwrap();
    }

    let cfg = CompositeConfig {
        overlay_count: 5,
        ..CompositeConfig::default()
    };
    let (out_images, out_masks, stats) = fx.run(&cfg, 2);

    assert_eq!(stats.written, 3);
    assert_eq!(stats.skipped, 0);
    assert_eq!(out_images.len(), 3);
    assert_eq!(out_masks.len(), 3);
    for name in ["bg_f1.png", "bg_f2.png", "bg_f3.png"] {
        assert!(out_images.contains(name));
    }
}

#[test]
fn missing_mask_skips_only_the_mask_write() {
    let mut fx = Fixture::new();
    fx.backgrounds
        .write("bg.png", &encode_png(&constant_background(4, 4, [0, 0, 0])).unwrap())
        .unwrap();
    fx.foregrounds
        .write("fg.png", &encode_png(&opaque_foreground(2, 2, [255, 255, 255])).unwrap())
        .unwrap();

    let (out_images, out_masks, stats) = fx.run(&CompositeConfig::default(), 3);
    assert_eq!(stats.written, 1);
    assert!(out_images.contains("bg_fg.png"));
    assert!(out_masks.is_empty());
}

#[test]
fn unreadable_foreground_aborts_only_its_iteration() {
    let mut fx = Fixture::new();
    fx.backgrounds
        .write("bg.png", &encode_png(&constant_background(4, 4, [0, 0, 0])).unwrap())
        .unwrap();
    fx.foregrounds
        .write("good.png", &encode_png(&opaque_foreground(2, 2, [10, 20, 30])).unwrap())
        .unwrap();
    fx.foregrounds.write("broken.png", &[1, 2, 3]).unwrap();

    let (out_images, _, stats) = fx.run(&CompositeConfig::default(), 4);
    assert_eq!(stats.written, 1);
    assert_eq!(stats.skipped, 1);
    assert!(out_images.contains("bg_good.png"));
}

#[test]
fn scatter_mode_keeps_background_dimensions_and_synthesizes_the_mask() {
    let mut fx = Fixture::new();
    fx.backgrounds
        .write("bg.png", &encode_png(&constant_background(16, 16, [0, 0, 0])).unwrap())
        .unwrap();
    fx.foregrounds
        .write("fg.png", &encode_png(&opaque_foreground(8, 8, [255, 255, 255])).unwrap())
        .unwrap();
    fx.masks
        .write(
            "fg.png",
            &encode_png(&Mask::from_vec(8, 8, vec![255; 64]).unwrap().to_raster()).unwrap(),
        )
        .unwrap();

    let cfg = CompositeConfig {
        overlay_count: 1,
        placement: PlacementMode::ScatterOnBackground,
    };
    let (out_images, out_masks, stats) = fx.run(&cfg, 5);
    assert_eq!(stats.written, 1);

    let composite = decode_raster("bg_fg.png", &out_images.read("bg_fg.png").unwrap()).unwrap();
    assert_eq!(composite.dimensions(), (16, 16));
    let white = composite
        .data
        .chunks_exact(3)
        .filter(|p| *p == [255, 255, 255])
        .count();
    assert_eq!(white, 64);

    let mask = decode_mask("bg_fg.png", &out_masks.read("bg_fg.png").unwrap()).unwrap();
    assert_eq!(mask.dimensions(), (16, 16));
    assert_eq!(mask.data.iter().filter(|&&v| v == 255).count(), 64);
}
