// The sensor side of the app: something that produces finger frames, run on
// its own thread and connected to the UI loop by a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use crate::error::Error;
use crate::normalize::SensorFrame;

/// A device that reports fingertips.
pub trait FrameSource {
    fn name(&self) -> &str;

    /// Block until the next frame. `Ok(None)` means "nothing this tick";
    /// an error means the device is gone.
    fn poll(&mut self) -> Result<Option<SensorFrame>, Error>;
}

#[derive(Debug)]
pub enum SensorEvent {
    Connected(String),
    Frame(SensorFrame),
    Disconnected,
}

/// Handle to the worker thread polling a `FrameSource`.
pub struct SensorThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SensorThread {
    /// Build the source with `open` on a new thread and forward its frames.
    ///
    /// The source is created on the worker because camera handles are not
    /// always `Send`. When the channel is full the frame is dropped: a fresh
    /// one follows right behind it.
    pub fn spawn<S, F>(open: F, events: Sender<SensorEvent>) -> Self
    where
        S: FrameSource,
        F: FnOnce() -> Result<S, Error> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || run(open, events, flag));
        Self { running, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the worker to stop and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Sensor thread panicked");
            }
        }
    }
}

impl Drop for SensorThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<S, F>(open: F, events: Sender<SensorEvent>, running: Arc<AtomicBool>)
where
    S: FrameSource,
    F: FnOnce() -> Result<S, Error>,
{
    let mut source = match open() {
        Ok(source) => source,
        Err(e) => {
            log::error!("Failed to open sensor: {e}");
            notify_disconnected(&events);
            return;
        }
    };

    log::info!("Connected to {}", source.name());
    if events.send(SensorEvent::Connected(source.name().to_string())).is_err() {
        return;
    }

    while running.load(Ordering::Relaxed) {
        match source.poll() {
            Ok(Some(frame)) => match events.try_send(SensorEvent::Frame(frame)) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            },
            Ok(None) => thread::sleep(Duration::from_millis(5)),
            Err(e) => {
                log::warn!("Lost {}: {e}", source.name());
                notify_disconnected(&events);
                return;
            }
        }
    }

    log::info!("Disconnected from {}", source.name());
    notify_disconnected(&events);
}

// Never blocks: on shutdown the UI has stopped draining, and a full queue
// must not keep `stop()` waiting on the join.
fn notify_disconnected(events: &Sender<SensorEvent>) {
    if let Err(TrySendError::Full(_)) = events.try_send(SensorEvent::Disconnected) {
        log::debug!("Sensor queue full; disconnect notice dropped");
    }
}
