// Sensor space -> canvas space.
// A sensor reports fingertips in its own units together with an "interaction
// box": the volume it can see. The box maps device space onto a unit cube,
// and from there we scale onto the canvas.

use std::time::{Duration, Instant};

use crate::types::{FingerSample, Vector3};

/// The volume the sensor tracks, as center + size in device units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionBox {
    pub center: Vector3,
    pub size: Vector3,
}

impl InteractionBox {
    pub const fn new(center: Vector3, size: Vector3) -> Self {
        Self { center, size }
    }

    /// Box spanning `[min, max]` on every axis.
    pub fn from_bounds(min: Vector3, max: Vector3) -> Self {
        Self {
            center: Vector3::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5, (min.z + max.z) * 0.5),
            size: Vector3::new(max.x - min.x, max.y - min.y, max.z - min.z),
        }
    }

    /// Map a device-space point into the unit cube, clamped to [0, 1].
    pub fn normalize_point(&self, p: Vector3) -> Vector3 {
        Vector3::new(
            unit_axis(p.x, self.center.x, self.size.x),
            unit_axis(p.y, self.center.y, self.size.y),
            unit_axis(p.z, self.center.z, self.size.z),
        )
    }
}

#[inline]
fn unit_axis(value: f32, center: f32, size: f32) -> f32 {
    if !size.is_finite() || size.abs() < f32::EPSILON {
        return 0.5;
    }
    ((value - center) / size + 0.5).clamp(0.0, 1.0)
}

/// One tracked finger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Finger {
    pub id: u32,
    /// Tip position in device space. Smaller `z` is further forward.
    pub tip: Vector3,
}

/// Everything the sensor reports for one tick.
#[derive(Clone, Debug)]
pub struct SensorFrame {
    pub timestamp: Instant,
    pub fingers: Vec<Finger>,
    pub interaction_box: InteractionBox,
}

impl SensorFrame {
    /// The finger pointing furthest toward the surface.
    pub fn frontmost(&self) -> Option<&Finger> {
        self.fingers
            .iter()
            .min_by(|a, b| a.tip.z.total_cmp(&b.tip.z))
    }

    /// How long ago the sensor captured this frame.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }
}

/// Convert a device-space tip into a canvas sample.
/// Y is flipped: the sensor's "up" grows away from it, the canvas's "down"
/// grows away from its top edge.
pub fn normalize(
    raw_tip: Vector3,
    interaction_box: &InteractionBox,
    canvas_width: f32,
    canvas_height: f32,
) -> FingerSample {
    let unit = interaction_box.normalize_point(raw_tip);
    let x = unit.x * canvas_width;
    let y = canvas_height - unit.y * canvas_height;
    FingerSample::new(x, y, unit.z)
}

/// Sample for the frontmost finger, or None when no finger is in view.
pub fn sample_from_frame(frame: &SensorFrame, canvas_width: f32, canvas_height: f32) -> Option<FingerSample> {
    let finger = frame.frontmost()?;
    Some(normalize(finger.tip, &frame.interaction_box, canvas_width, canvas_height))
}
