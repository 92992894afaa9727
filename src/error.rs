// One error type for the whole crate.
// Every variant states *where* things went wrong.
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Opening/starting the camera failed
    #[error("Camera init error: {0}")]
    CameraInit(String),

    /// Grabbing/decoding a frame failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String),

    /// Encoding the canvas bitmap failed
    #[error("Export error: {0}")]
    Export(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The config file exists but is not valid JSON for `Config`
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
