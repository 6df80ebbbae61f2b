use super::*;

use crate::{MemStore, raster::grid::ChannelLayout};

fn gradient_color(width: u32, height: u32) -> Raster {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }
    }
    Raster::from_vec(width, height, ChannelLayout::Color, data).unwrap()
}

#[test]
fn constant_mask_becomes_the_alpha_channel() {
    let image = gradient_color(100, 100);
    let mask = Mask::from_vec(100, 100, vec![128; 100 * 100]).unwrap();

    let cutout = extract_cutout(&image, &mask).unwrap();
    assert_eq!(cutout.dimensions(), (100, 100));
    assert_eq!(cutout.layout, ChannelLayout::ColorAlpha);
    for (px, src) in cutout.data.chunks_exact(4).zip(image.data.chunks_exact(3)) {
        assert_eq!(&px[..3], src);
        assert_eq!(px[3], 128);
    }
}

#[test]
fn gray_source_broadcasts_into_identical_color_channels() {
    let image = Raster::from_vec(2, 1, ChannelLayout::Gray, vec![40, 200]).unwrap();
    let mask = Mask::from_vec(2, 1, vec![255, 0]).unwrap();

    let cutout = extract_cutout(&image, &mask).unwrap();
    assert_eq!(cutout.data, vec![40, 40, 40, 255, 200, 200, 200, 0]);
}

#[test]
fn source_alpha_is_discarded_not_reused() {
    let image =
        Raster::from_vec(1, 1, ChannelLayout::ColorAlpha, vec![1, 2, 3, 77]).unwrap();
    let mask = Mask::from_vec(1, 1, vec![200]).unwrap();
    assert_eq!(extract_cutout(&image, &mask).unwrap().data, vec![1, 2, 3, 200]);
}

#[test]
fn batch_skips_images_without_a_mask_counterpart() {
    let mut images = MemStore::new();
    let mut masks = MemStore::new();
    let mut out = MemStore::new();

    let img = gradient_color(4, 4);
    let msk = Mask::from_vec(4, 4, vec![255; 16]).unwrap();
    images
        .write("paired.jpg", &encode_png(&img).unwrap())
        .unwrap();
    images
        .write("orphan.jpg", &encode_png(&img).unwrap())
        .unwrap();
    masks
        .write("paired.png", &encode_png(&msk.to_raster()).unwrap())
        .unwrap();

    let stats = extract_cutouts(&images, &masks, &mut out).unwrap();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.skipped, 1);
    assert!(out.contains("paired.png"));
    assert_eq!(out.len(), 1);
}

#[test]
fn batch_rejects_mismatched_shapes_without_output() {
    let mut images = MemStore::new();
    let mut masks = MemStore::new();
    let mut out = MemStore::new();

    images
        .write("a.png", &encode_png(&gradient_color(4, 4)).unwrap())
        .unwrap();
    let small = Mask::from_vec(2, 2, vec![255; 4]).unwrap();
    masks
        .write("a.png", &encode_png(&small.to_raster()).unwrap())
        .unwrap();

    let stats = extract_cutouts(&images, &masks, &mut out).unwrap();
    assert_eq!(stats.written, 0);
    assert_eq!(stats.skipped, 1);
    assert!(out.is_empty());
}

#[test]
fn batch_skips_undecodable_buffers() {
    let mut images = MemStore::new();
    let mut masks = MemStore::new();
    let mut out = MemStore::new();

    images.write("bad.png", &[0, 1, 2]).unwrap();
    masks
        .write(
            "bad.png",
            &encode_png(&Mask::new(2, 2).to_raster()).unwrap(),
        )
        .unwrap();

    let stats = extract_cutouts(&images, &masks, &mut out).unwrap();
    assert_eq!(stats.written, 0);
    assert_eq!(stats.skipped, 1);
    assert!(out.is_empty());
}
