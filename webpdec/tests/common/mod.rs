#![allow(dead_code)]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random RGB888 image, reproducible from `seed`.
pub fn noise(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rgb = vec![0u8; (width * height * 3) as usize];
    rng.fill(&mut rgb[..]);
    rgb
}

/// Smooth diagonal gradient, kind to lossy coding.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            rgb.push((x * 255 / (width - 1).max(1)) as u8);
            rgb.push((y * 255 / (height - 1).max(1)) as u8);
            rgb.push(128);
        }
    }
    rgb
}

pub fn solid(width: u32, height: u32, px: [u8; 3]) -> Vec<u8> {
    px.repeat((width * height) as usize)
}

pub fn lossless(rgb: &[u8], width: u32, height: u32) -> Vec<u8> {
    webp::Encoder::from_rgb(rgb, width, height)
        .encode_lossless()
        .to_vec()
}

pub fn lossless_rgba(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    webp::Encoder::from_rgba(rgba, width, height)
        .encode_lossless()
        .to_vec()
}

pub fn lossy(rgb: &[u8], width: u32, height: u32, quality: f32) -> Vec<u8> {
    webp::Encoder::from_rgb(rgb, width, height)
        .encode(quality)
        .to_vec()
}

/// Reference RGB565 little-endian packing, written independently of the crate.
pub fn expected_rgb565(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|px| {
            let r = u16::from(px[0] >> 3);
            let g = u16::from(px[1] >> 2);
            let b = u16::from(px[2] >> 3);
            ((r << 11) | (g << 5) | b).to_le_bytes()
        })
        .collect()
}
