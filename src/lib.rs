// Finger painting driven by a gesture sensor.
// normalize: device space -> canvas. engine: samples -> strokes, cursor,
// target activations. The rest feeds it (camera, sensor) or shows it
// (draw, scene, export).

pub mod camera;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod export;
pub mod normalize;
pub mod scene;
pub mod sensor;
pub mod target;
pub mod tracker;
pub mod types;
