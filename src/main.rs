// What you SEE:
// • A white canvas with four targets along the top: Red, Blue, Purple, Save.
// • Move your finger (marker) or the mouse: a green cursor follows it.
// • Push closer (or hold Left Mouse): the cursor takes the ink color and you draw.
// • Hover a target until it has grown to full size: it fires.
// • C clears the canvas. ESC quits.

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};

use gesture_paint::camera::CameraSource;
use gesture_paint::config::{Config, InputMode};
use gesture_paint::draw::Drawer;
use gesture_paint::engine::InteractionEngine;
use gesture_paint::error::Error;
use gesture_paint::export::save_bitmap;
use gesture_paint::scene;
use gesture_paint::sensor::{SensorEvent, SensorThread};
use gesture_paint::target::Action;
use gesture_paint::types::{FrameBuffer, Rgb};

// Older than this, a frame is worth a debug line: the camera is lagging.
const STALE_FRAME: Duration = Duration::from_millis(100);

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(&Config::default_path());
    let (w, h) = (config.window.width, config.window.height);

    /* --- Window + canvas buffer --- */
    let mut drawer = Drawer::new(&config.window.title, w, h, config.window.fps)?;
    let mut screen = FrameBuffer::new(w, h, Rgb::WHITE);

    /* --- Engine: targets laid out along the top strip --- */
    let targets = scene::layout_targets(w, &config.targets, &config.interaction);
    let mut engine = InteractionEngine::new(&config.interaction, targets, config.initial_ink);
    engine.set_canvas_size(w, h);

    /* --- Sensor: camera thread, or the mouse polled right here --- */
    let (tx, rx) = bounded(4);
    let mut sensor = match config.input {
        InputMode::Camera => {
            let camera = config.camera.clone();
            Some(SensorThread::spawn(move || CameraSource::open(&camera), tx))
        }
        InputMode::Pointer => {
            log::info!("Using the mouse as finger; hold the left button to draw");
            None
        }
    };

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        // 1) Follow window resizes: new canvas, targets re-centered.
        let (cw, ch) = drawer.size();
        if (cw, ch) != (screen.width, screen.height) && cw > 0 && ch > 0 {
            screen = FrameBuffer::new(cw, ch, Rgb::WHITE);
            engine.set_canvas_size(cw, ch);
            scene::relayout(cw, engine.targets_mut());
        }

        // 2) Feed every finger frame that arrived since the last pass.
        //    If the camera thread has ended, the mouse takes over.
        if let Some(thread) = sensor.as_ref() {
            drain_sensor(&rx, &mut engine, now);
            if !thread.is_running() {
                log::info!("Camera input ended; switching to the mouse");
                sensor = None;
            }
        } else {
            engine.on_frame(&drawer.pointer_frame(), now);
        }

        if drawer.c_pressed_once() {
            engine.clear_strokes();
        }

        // 3) Let the targets animate; ink changes are already applied.
        let fired = engine.tick(now);

        // 4) Draw, then run Save against exactly what is on screen.
        scene::render(&engine, &mut screen, config.stroke_width);
        for action in fired {
            if action == Action::Save {
                match save_bitmap(&screen, &config.export_name) {
                    Ok(path) => log::info!("Saved canvas to {}", path.display()),
                    Err(e) => log::warn!("Saving canvas failed: {e}"),
                }
            }
        }

        // 5) Present. A single failed frame is not fatal.
        if let Err(e) = drawer.present(&screen) {
            log::warn!("{e}");
        }
    }

    // Nobody reads the queue any more.
    drop(rx);
    if let Some(sensor) = sensor.as_mut() {
        sensor.stop();
    }
    Ok(())
}

fn drain_sensor(rx: &Receiver<SensorEvent>, engine: &mut InteractionEngine, now: Instant) {
    for event in rx.try_iter() {
        match event {
            SensorEvent::Frame(frame) => {
                let age = frame.age(now);
                if age > STALE_FRAME {
                    log::debug!("Applying a frame captured {} ms ago", age.as_millis());
                }
                engine.on_frame(&frame, now);
            }
            SensorEvent::Connected(name) => log::info!("Sensor ready: {name}"),
            SensorEvent::Disconnected => log::info!("Sensor disconnected"),
        }
    }
}
