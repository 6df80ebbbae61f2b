use super::*;

use rand::{SeedableRng, rngs::StdRng};

use crate::{MemStore, raster::grid::ChannelLayout};

fn checker_pair(width: u32, height: u32) -> (Raster, Mask) {
    let mut color = Vec::with_capacity((width * height * 3) as usize);
    let mut labels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let on = (x + y) % 2 == 0;
            color.extend_from_slice(if on { &[220, 40, 40] } else { &[10, 10, 80] });
            labels.push(if on { 255 } else { 0 });
        }
    }
    (
        Raster::from_vec(width, height, ChannelLayout::Color, color).unwrap(),
        Mask::from_vec(width, height, labels).unwrap(),
    )
}

fn fixed(cfg_angles: &[f32]) -> AugmentConfig {
    AugmentConfig {
        variant_count: 1,
        rotation_angles: cfg_angles.to_vec(),
        flip_probability: 0.0,
        scale_range: (1.0, 1.0),
    }
}

#[test]
fn quarter_turn_swaps_dimensions_and_keeps_label_values() {
    let (image, mask) = checker_pair(100, 60);
    let before = mask.value_set();

    let mut rng = StdRng::seed_from_u64(7);
    let variants = augment_pair(&image, &mask, &fixed(&[90.0]), &mut rng).unwrap();
    assert_eq!(variants.len(), 1);

    let v = &variants[0];
    assert_eq!(v.image.dimensions(), (60, 100));
    assert_eq!(v.mask.dimensions(), (60, 100));
    assert_eq!(v.mask.value_set(), before);
}

#[test]
fn image_and_mask_dimensions_stay_equal_across_variants() {
    let (image, mask) = checker_pair(37, 21);
    let cfg = AugmentConfig {
        variant_count: 8,
        rotation_angles: vec![0.0, 45.0, 90.0, 180.0],
        flip_probability: 0.5,
        scale_range: (0.5, 1.5),
    };

    let mut rng = StdRng::seed_from_u64(42);
    for v in augment_pair(&image, &mask, &cfg, &mut rng).unwrap() {
        assert_eq!(v.image.dimensions(), v.mask.dimensions());
        assert_eq!(v.image.layout, ChannelLayout::Color);
    }
}

#[test]
fn mask_resize_never_invents_label_values() {
    let (image, mask) = checker_pair(16, 16);
    let before = mask.value_set();
    let cfg = AugmentConfig {
        variant_count: 6,
        rotation_angles: vec![0.0],
        flip_probability: 0.0,
        scale_range: (0.3, 0.7),
    };

    let mut rng = StdRng::seed_from_u64(3);
    for v in augment_pair(&image, &mask, &cfg, &mut rng).unwrap() {
        assert!(v.mask.value_set().is_subset(&before));
    }
}

#[test]
fn arbitrary_angle_expands_the_canvas_for_both_members() {
    let (image, mask) = checker_pair(10, 10);
    let mut rng = StdRng::seed_from_u64(11);

    let variants = augment_pair(&image, &mask, &fixed(&[45.0]), &mut rng).unwrap();
    let v = &variants[0];
    // 10x10 rotated 45 degrees needs a ceil(10 * sqrt(2)) = 15 pixel canvas.
    assert_eq!(v.image.dimensions(), (15, 15));
    assert_eq!(v.mask.dimensions(), (15, 15));
    // The padded corners carry 0; nothing outside the input label set
    // appears beyond that.
    let mut allowed = mask.value_set();
    allowed.insert(0);
    assert!(v.mask.value_set().is_subset(&allowed));
}

#[test]
fn certain_flip_mirrors_both_members() {
    let image = Raster::from_vec(2, 1, ChannelLayout::Color, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let mask = Mask::from_vec(2, 1, vec![255, 0]).unwrap();
    let cfg = AugmentConfig {
        variant_count: 1,
        rotation_angles: vec![0.0],
        flip_probability: 1.0,
        scale_range: (1.0, 1.0),
    };

    let mut rng = StdRng::seed_from_u64(0);
    let v = &augment_pair(&image, &mask, &cfg, &mut rng).unwrap()[0];
    assert_eq!(v.image.data, vec![4, 5, 6, 1, 2, 3]);
    assert_eq!(v.mask.data, vec![0, 255]);
}

#[test]
fn seeded_runs_reproduce_identical_variants() {
    let (image, mask) = checker_pair(20, 12);
    let cfg = AugmentConfig {
        variant_count: 4,
        rotation_angles: vec![0.0, 90.0, 270.0],
        flip_probability: 0.5,
        scale_range: (0.8, 1.2),
    };

    let a = augment_pair(&image, &mask, &cfg, &mut StdRng::seed_from_u64(99)).unwrap();
    let b = augment_pair(&image, &mask, &cfg, &mut StdRng::seed_from_u64(99)).unwrap();
    for (va, vb) in a.iter().zip(&b) {
        assert_eq!(va.image, vb.image);
        assert_eq!(va.mask, vb.mask);
    }
}

#[test]
fn mismatched_pair_is_rejected() {
    let (image, _) = checker_pair(4, 4);
    let mask = Mask::new(3, 3);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        augment_pair(&image, &mask, &AugmentConfig::default(), &mut rng),
        Err(TalusError::DimensionMismatch { .. })
    ));
}

#[test]
fn folder_batch_writes_paired_variant_keys() {
    let (image, mask) = checker_pair(8, 8);
    let mut images = MemStore::new();
    let mut masks = MemStore::new();
    let mut out_images = MemStore::new();
    let mut out_masks = MemStore::new();

    images
        .write("flow.png", &encode_png(&image).unwrap())
        .unwrap();
    masks
        .write("flow.png", &encode_png(&mask.to_raster()).unwrap())
        .unwrap();
    images
        .write("orphan.png", &encode_png(&image).unwrap())
        .unwrap();

    let cfg = AugmentConfig {
        variant_count: 2,
        rotation_angles: vec![0.0],
        flip_probability: 0.0,
        scale_range: (1.0, 1.0),
    };
    let mut rng = StdRng::seed_from_u64(5);
    let stats = augment_folder(
        &images,
        &masks,
        &mut out_images,
        &mut out_masks,
        &cfg,
        &mut rng,
    )
    .unwrap();

    assert_eq!(stats.written, 2);
    assert_eq!(stats.skipped, 1);
    for key in ["flow_aug_1.png", "flow_aug_2.png"] {
        assert!(out_images.contains(key));
        assert!(out_masks.contains(key));
    }
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let (image, mask) = checker_pair(4, 4);
    let cfg = AugmentConfig {
        flip_probability: 2.0,
        ..AugmentConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        augment_pair(&image, &mask, &cfg, &mut rng),
        Err(TalusError::Validation(_))
    ));
}
