//! Segmentation mask decoding

use std::path::Path;

use image::GrayImage;
use ndarray::Array2;

use asp_core::Mask;

use crate::error::Result;

/// Decode a mask image from disk to 8-bit grayscale, row = v,
/// col = u, foreground 255.
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<Mask> {
    let img = image::open(path)?.to_luma8();
    Ok(mask_from_luma(&img))
}

/// Wrap an already-decoded grayscale buffer
pub fn mask_from_luma(img: &GrayImage) -> Mask {
    let (width, height) = img.dimensions();
    let data = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        img.get_pixel(col as u32, row as u32).0[0]
    });
    Mask::new(data)
}
