// Saves the canvas as a bitmap next to the working directory.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb as Pixel, RgbImage};

use crate::error::Error;
use crate::types::{FrameBuffer, Rgb};

/// Write `fb` to `<base_name>.bmp` and return the path written.
pub fn save_bitmap(fb: &FrameBuffer, base_name: &str) -> Result<PathBuf, Error> {
    let path = PathBuf::from(format!("{base_name}.bmp"));
    write_bmp(fb, &path)?;
    Ok(path)
}

pub fn write_bmp(fb: &FrameBuffer, path: &Path) -> Result<(), Error> {
    let image = to_rgb_image(fb);
    image.save_with_format(path, ImageFormat::Bmp)?;
    Ok(())
}

/// Unpack 0x00RRGGBB pixels into an `image` buffer.
pub fn to_rgb_image(fb: &FrameBuffer) -> RgbImage {
    RgbImage::from_fn(fb.width as u32, fb.height as u32, |x, y| {
        let Rgb(r, g, b) = Rgb::from_u32(fb.pixels[y as usize * fb.width + x as usize]);
        Pixel([r, g, b])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_bitmap_decodes_to_the_canvas() {
        let mut fb = FrameBuffer::new(16, 8, Rgb::WHITE);
        fb.pixels[3 * 16 + 5] = Rgb::RED.to_u32();

        let base = std::env::temp_dir().join(format!("gesture_paint_export_{}", std::process::id()));
        let path = save_bitmap(&fb, base.to_str().unwrap()).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("bmp"));

        let decoded = image::open(&path).unwrap().to_rgb8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.get_pixel(5, 3), &Pixel([255, 0, 0]));
        assert_eq!(decoded.get_pixel(0, 0), &Pixel([255, 255, 255]));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let fb = FrameBuffer::new(2, 2, Rgb::WHITE);
        assert!(save_bitmap(&fb, "/definitely/not/a/dir/canvas").is_err());
    }
}
