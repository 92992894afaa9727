// Fingertip marker tracking for the camera sensor.
// The user wears a small colored marker (tape, a thimble) on the drawing
// finger. Each frame we collect the pixels close to that color and report
// their centroid; the blob's apparent size stands in for distance.

use crate::types::{FrameBuffer, Rgb};

/// A found marker, in camera pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub cx: f32,
    pub cy: f32,
    /// Matching pixels counted (after stride sampling, scaled back up).
    pub pixels: usize,
}

impl Blob {
    /// Radius of a disc with the same area.
    pub fn radius(&self) -> f32 {
        (self.pixels as f32 / std::f32::consts::PI).sqrt()
    }
}

#[derive(Clone, Debug)]
pub struct MarkerTracker {
    pub key: Rgb,
    pub tolerance: u8,
    pub min_pixels: usize,
    pub stride: usize,
}

impl MarkerTracker {
    pub fn new(key: Rgb, tolerance: u8, min_pixels: usize, stride: usize) -> Self {
        Self { key, tolerance, min_pixels, stride: stride.max(1) }
    }

    #[inline]
    fn matches(&self, px: u32) -> bool {
        let c = Rgb::from_u32(px);
        let tol = self.tolerance;
        c.0.abs_diff(self.key.0) <= tol && c.1.abs_diff(self.key.1) <= tol && c.2.abs_diff(self.key.2) <= tol
    }

    /// Centroid of the marker-colored pixels, or None if too few match.
    pub fn locate(&self, frame: &FrameBuffer) -> Option<Blob> {
        let step = self.stride.max(1);
        let (mut sx, mut sy, mut n) = (0u64, 0u64, 0u64);

        for y in (0..frame.height).step_by(step) {
            let row = y * frame.width;
            for x in (0..frame.width).step_by(step) {
                if self.matches(frame.pixels[row + x]) {
                    sx += x as u64;
                    sy += y as u64;
                    n += 1;
                }
            }
        }

        // Each sample stands for a stride x stride cell.
        let pixels = (n as usize) * step * step;
        if n == 0 || pixels < self.min_pixels {
            return None;
        }
        Some(Blob { cx: sx as f32 / n as f32, cy: sy as f32 / n as f32, pixels })
    }
}
