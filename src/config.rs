// Runtime configuration, read from a JSON file.
// Every section carries `#[serde(default)]`, so a file only needs the
// fields it wants to change, e.g.
//   { "input": "pointer", "interaction": { "touch_threshold": 0.4 } }

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::target::Action;
use crate::types::Rgb;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "GESTURE_PAINT_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "gesture_paint.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub input: InputMode,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    /// Line thickness of drawn strokes, in pixels.
    pub stroke_width: i32,
    pub initial_ink: Rgb,
    /// Saved canvas goes to `<export_name>.bmp`.
    pub export_name: String,
    pub targets: Vec<TargetConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            input: InputMode::default(),
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
            stroke_width: 3,
            initial_ink: Rgb::MAGENTA,
            export_name: "gesture_paint".into(),
            targets: vec![
                TargetConfig::new("Red", Action::SetInk { color: Rgb::RED }),
                TargetConfig::new("Blue", Action::SetInk { color: Rgb::BLUE }),
                TargetConfig::new("Purple", Action::SetInk { color: Rgb::MAGENTA }),
                TargetConfig::new("Save", Action::Save),
            ],
        }
    }
}

impl Config {
    /// Path from `$GESTURE_PAINT_CONFIG`, else `gesture_paint.json`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Parse the file at `path`. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }

    /// Like `load`, but never fails: a missing file is silent, a broken one
    /// is reported and both fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub fps: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Gesture Paint - Place a finger in view to draw!".into(),
            width: 800,
            height: 800,
            fps: 60,
        }
    }
}

/// Where finger frames come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Webcam + colored fingertip marker.
    #[default]
    Camera,
    /// Mouse as finger; hold the left button to touch.
    Pointer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Color of the marker worn on the fingertip.
    pub marker: Rgb,
    /// Max per-channel distance from `marker` for a pixel to count.
    pub tolerance: u8,
    /// Fewer matching pixels than this means "no finger".
    pub min_pixels: usize,
    /// Sample every Nth pixel in both directions.
    pub stride: usize,
    /// Flip horizontally so moving right moves the cursor right.
    pub mirror: bool,
    /// Marker radius (pixels) that maps to depth 0 (touching).
    pub near_radius: f32,
    /// Marker radius (pixels) that maps to depth 1.
    pub far_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            marker: Rgb(0, 200, 80),
            tolerance: 60,
            min_pixels: 12,
            stride: 2,
            mirror: true,
            near_radius: 40.0,
            far_radius: 8.0,
        }
    }
}

/// Thresholds and animation timing used by the interaction engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Depth at or below which the finger draws.
    pub touch_threshold: f32,
    /// Depth at or below which the cursor is shown.
    pub hover_threshold: f32,
    /// Extra width/height of a target's hit box (split evenly per side).
    pub hit_margin: i32,
    pub expansion_factor: f64,
    pub expansion_steps: u32,
    pub step_delay_ms: u64,
    pub cursor_min_radius: i32,
    pub cursor_max_radius: i32,
    /// Oldest strokes are dropped past this many; `None` keeps them all.
    pub max_segments: Option<usize>,
}

impl InteractionConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            touch_threshold: 0.5,
            hover_threshold: 0.95,
            hit_margin: 30,
            expansion_factor: 1.5,
            expansion_steps: 10,
            step_delay_ms: 75,
            cursor_min_radius: 20,
            cursor_max_radius: 100,
            max_segments: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub label: String,
    pub action: Action,
}

impl TargetConfig {
    pub fn new(label: &str, action: Action) -> Self {
        Self { label: label.into(), action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_layout() {
        let config = Config::default();
        assert_eq!(config.targets.len(), 4);
        assert_eq!(config.targets[3].action, Action::Save);
        assert_eq!(config.interaction.touch_threshold, 0.5);
        assert_eq!(config.interaction.hover_threshold, 0.95);
        assert_eq!(config.interaction.step_delay(), Duration::from_millis(75));
        assert_eq!(config.initial_ink, Rgb::MAGENTA);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = Config::from_json(
            r#"{ "input": "pointer", "interaction": { "touch_threshold": 0.4 } }"#,
        )
        .unwrap();
        assert_eq!(config.input, InputMode::Pointer);
        assert_eq!(config.interaction.touch_threshold, 0.4);
        assert_eq!(config.interaction.expansion_steps, 10);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn targets_and_colors_parse_from_json() {
        let config = Config::from_json(
            r#"{ "targets": [
                { "label": "Green", "action": { "kind": "set_ink", "color": [0, 128, 0] } },
                { "label": "Save", "action": { "kind": "save" } }
            ] }"#,
        )
        .unwrap();
        assert_eq!(config.targets[0].action, Action::SetInk { color: Rgb(0, 128, 0) });
        assert_eq!(config.targets[1].action, Action::Save);
    }

    #[test]
    fn broken_json_is_a_config_error() {
        assert!(matches!(Config::from_json("{ nope"), Err(Error::Config(_))));
    }

    #[test]
    fn save_then_load_keeps_everything() {
        let path = std::env::temp_dir().join(format!("gesture_paint_cfg_{}.json", std::process::id()));
        let mut config = Config::default();
        config.export_name = "drawing".into();
        config.interaction.max_segments = Some(500);
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("/definitely/not/here.json"));
        assert_eq!(config, Config::default());
    }
}
