// Opens the default camera and turns each frame into a finger frame.
// `CameraCapture` converts nokhwa frames into our 0x00RRGGBB FrameBuffer;
// `CameraSource` runs the marker tracker on them and reports what it finds
// in device space, the same shape any other gesture sensor would use.

use std::time::Instant;

use crate::config::CameraConfig;
use crate::error::Error;
use crate::normalize::{Finger, InteractionBox, SensorFrame};
use crate::sensor::FrameSource;
use crate::tracker::MarkerTracker;
use crate::types::{FrameBuffer, Vector3};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

// A small wrapper around nokhwa::Camera so the sensor loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` at a target resolution (falls back if not exact).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, prioritizing the format closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Grab one frame (blocks until ready) and convert it to 0x00RRGGBB pixels.
    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
            .collect();

        Ok(FrameBuffer {
            width: w as usize,
            height: h as usize,
            pixels,
        })
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Maps a tracked blob into device space.
/// x runs along the image (mirrored if asked), y grows upward, and z is the
/// negated blob radius so a bigger (closer) marker sits further forward.
#[derive(Clone, Debug)]
pub struct MarkerSpace {
    pub width: f32,
    pub height: f32,
    pub mirror: bool,
    pub near_radius: f32,
    pub far_radius: f32,
}

impl MarkerSpace {
    pub fn interaction_box(&self) -> InteractionBox {
        InteractionBox::from_bounds(
            Vector3::new(0.0, 0.0, -self.near_radius),
            Vector3::new(self.width, self.height, -self.far_radius),
        )
    }

    pub fn tip(&self, cx: f32, cy: f32, radius: f32) -> Vector3 {
        let x = if self.mirror { self.width - cx } else { cx };
        Vector3::new(x, self.height - cy, -radius)
    }
}

/// Consecutive failed grabs before the camera is reported gone.
const MAX_FAILED_FRAMES: u32 = 30;

pub struct CameraSource {
    name: String,
    failed: u32,
    capture: CameraCapture,
    tracker: MarkerTracker,
    space: MarkerSpace,
}

impl CameraSource {
    pub fn open(config: &CameraConfig) -> Result<Self, Error> {
        let capture = CameraCapture::new(config.index, config.width, config.height)?;
        let (w, h) = capture.resolution();
        log::info!("Camera {} streaming at {w}x{h}", config.index);
        Ok(Self {
            name: format!("camera {}", config.index),
            failed: 0,
            capture,
            tracker: MarkerTracker::new(config.marker, config.tolerance, config.min_pixels, config.stride),
            space: MarkerSpace {
                width: w as f32,
                height: h as f32,
                mirror: config.mirror,
                near_radius: config.near_radius,
                far_radius: config.far_radius,
            },
        })
    }
}

impl FrameSource for CameraSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> Result<Option<SensorFrame>, Error> {
        // One bad frame is skipped; a run of them means the device is gone.
        let image = match self.capture.next_frame() {
            Ok(image) => {
                self.failed = 0;
                image
            }
            Err(e) if self.failed + 1 < MAX_FAILED_FRAMES => {
                self.failed += 1;
                log::warn!("{e}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let fingers = self
            .tracker
            .locate(&image)
            .map(|blob| Finger { id: 0, tip: self.space.tip(blob.cx, blob.cy, blob.radius()) })
            .into_iter()
            .collect();
        Ok(Some(SensorFrame {
            timestamp: Instant::now(),
            fingers,
            interaction_box: self.space.interaction_box(),
        }))
    }
}
