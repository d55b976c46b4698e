use crate::core::color::to_rgb8;
use crate::core::framebuffer::FrameBuffer;
use image::{ImageResult, Rgb, RgbImage};
use std::path::Path;

/// Resolves the framebuffer (averaging supersamples) and writes it as an image file.
/// The format follows the path's extension.
pub fn save_framebuffer(fb: &FrameBuffer, path: impl AsRef<Path>) -> ImageResult<()> {
    let mut img = RgbImage::new(fb.width as u32, fb.height as u32);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if let Some(color) = fb.get_pixel(x as usize, y as usize) {
            *pixel = Rgb(to_rgb8(color));
        }
    }

    img.save(path)
}
