// Core types shared by the normalizer, the engine and the renderer.

use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame of `width * height` pixels, all set to `fill`.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self { width, height, pixels: vec![fill.to_u32(); width * height] }
    }

    /// Color at (x, y), or None outside the frame.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Rgb::from_u32(self.pixels[y * self.width + x]))
    }
}

/// 8-bit RGB color. Serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    /// Cursor color while hovering (not touching).
    pub const HOVER: Rgb = Rgb(0, 255, 153);
    /// Target highlight while it is expanding.
    pub const ACTIVE: Rgb = Rgb(0, 255, 0);
    /// Resting target color.
    pub const BUTTON: Rgb = Rgb(238, 238, 238);
    /// Background of the strip that holds the targets.
    pub const PANEL: Rgb = Rgb(215, 215, 215);

    /// Pack as 0x00RRGGBB.
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    #[inline]
    pub fn from_u32(px: u32) -> Self {
        Rgb(((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }
}

/// Axis-aligned rectangle in canvas pixels. `contains` is half-open:
/// the right and bottom edges are outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }

    /// Grow by `margin` on each axis, keeping the center where it was.
    pub fn inflate(&self, margin: i32) -> Rect {
        Rect {
            x: self.x - margin / 2,
            y: self.y - margin / 2,
            width: self.width + margin,
            height: self.height + margin,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// A `width x height` rect sharing this rect's center.
    pub fn resized_about_center(&self, width: i32, height: i32) -> Rect {
        let (cx, cy) = self.center();
        Rect { x: cx - width / 2, y: cy - height / 2, width, height }
    }
}

/// Position in sensor device space (arbitrary units).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One fingertip reading in canvas pixels.
/// `depth` is in [0, 1]; smaller means closer to the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerSample {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl FingerSample {
    pub const fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }

    /// Integer pixel position (truncated, like the hit tests use).
    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// One drawn line, kept so the canvas can be redrawn every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeSegment {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub color: Rgb,
}

/// What the presentation layer draws under the finger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub color: Rgb,
}
