// The interaction engine: finger samples in; strokes, a cursor and target
// activations out.
// Owned by the UI loop alone. Sensor frames arrive by value over a channel
// and animations advance in `tick`, so session state has one writer.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::InteractionConfig;
use crate::normalize::{sample_from_frame, SensorFrame};
use crate::target::{Action, HitTarget};
use crate::types::{Cursor, FingerSample, Rgb, StrokeSegment};

/// Drawn segments in the order they were made.
///
/// Unbounded unless a cap is given; with a cap the oldest segment goes first.
#[derive(Clone, Debug, Default)]
pub struct StrokeLog {
    segments: VecDeque<StrokeSegment>,
    cap: Option<usize>,
}

impl StrokeLog {
    pub fn new(cap: Option<usize>) -> Self {
        Self { segments: VecDeque::new(), cap }
    }

    pub fn push(&mut self, segment: StrokeSegment) {
        if let Some(cap) = self.cap {
            if cap == 0 {
                return;
            }
            while self.segments.len() >= cap {
                self.segments.pop_front();
            }
        }
        self.segments.push_back(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrokeSegment> {
        self.segments.iter()
    }

    pub fn last(&self) -> Option<&StrokeSegment> {
        self.segments.back()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

/// What the finger is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerMode {
    /// No sample yet.
    Absent,
    /// Too far from the surface to show a cursor.
    Hidden,
    Hovering,
    Drawing,
}

pub struct InteractionEngine {
    config: InteractionConfig,
    canvas: (f32, f32),
    ink: Rgb,
    strokes: StrokeLog,
    previous: Option<FingerSample>,
    current: Option<FingerSample>,
    targets: Vec<HitTarget>,
}

impl InteractionEngine {
    pub fn new(config: &InteractionConfig, targets: Vec<HitTarget>, ink: Rgb) -> Self {
        Self {
            config: config.clone(),
            canvas: (0.0, 0.0),
            ink,
            strokes: StrokeLog::new(config.max_segments),
            previous: None,
            current: None,
            targets,
        }
    }

    pub fn set_canvas_size(&mut self, width: usize, height: usize) {
        self.canvas = (width as f32, height as f32);
    }

    /// Feed one sensor frame. Returns false if it held no finger, in which
    /// case nothing changes.
    pub fn on_frame(&mut self, frame: &SensorFrame, now: Instant) -> bool {
        match sample_from_frame(frame, self.canvas.0, self.canvas.1) {
            Some(sample) => {
                self.on_sample(sample, now);
                true
            }
            None => false,
        }
    }

    /// Feed one canvas-space sample: extend the stroke and update targets.
    pub fn on_sample(&mut self, sample: FingerSample, now: Instant) {
        self.previous = self.current.replace(sample);

        if sample.depth <= self.config.touch_threshold {
            if let Some(prev) = self.previous {
                let (start_x, start_y) = prev.pixel();
                let (end_x, end_y) = sample.pixel();
                self.strokes.push(StrokeSegment { start_x, start_y, end_x, end_y, color: self.ink });
            }
        }

        let (x, y) = sample.pixel();
        for target in &mut self.targets {
            if target.hit_box().contains(x, y) {
                target.expand(now);
            } else {
                target.release();
            }
        }
    }

    /// Advance every target's animation. Ink changes are applied here;
    /// every fired action is returned so the caller can run the rest.
    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        let fired: Vec<Action> = self.targets.iter_mut().filter_map(|t| t.tick(now)).collect();
        for action in &fired {
            if let Action::SetInk { color } = *action {
                self.ink = color;
            }
        }
        fired
    }

    pub fn mode(&self) -> PointerMode {
        match self.current {
            None => PointerMode::Absent,
            Some(s) if s.depth <= self.config.touch_threshold => PointerMode::Drawing,
            Some(s) if s.depth <= self.config.hover_threshold => PointerMode::Hovering,
            Some(_) => PointerMode::Hidden,
        }
    }

    /// The cursor to draw, if the finger is close enough to show one.
    pub fn cursor(&self) -> Option<Cursor> {
        let sample = self.current?;
        let color = match self.mode() {
            PointerMode::Drawing => self.ink,
            PointerMode::Hovering => Rgb::HOVER,
            PointerMode::Hidden | PointerMode::Absent => return None,
        };
        let (x, y) = sample.pixel();
        Some(Cursor { x, y, radius: self.cursor_radius(sample.depth), color })
    }

    /// `max(min, max_radius - depth * max_radius)`: shrinks as the finger
    /// pulls back.
    pub fn cursor_radius(&self, depth: f32) -> i32 {
        let max = self.config.cursor_max_radius as f32;
        (max - depth * max).max(self.config.cursor_min_radius as f32) as i32
    }

    pub fn ink(&self) -> Rgb {
        self.ink
    }

    pub fn strokes(&self) -> &StrokeLog {
        &self.strokes
    }

    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
    }

    pub fn current(&self) -> Option<FingerSample> {
        self.current
    }

    pub fn previous(&self) -> Option<FingerSample> {
        self.previous
    }

    pub fn targets(&self) -> &[HitTarget] {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut [HitTarget] {
        &mut self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    fn engine() -> InteractionEngine {
        let config = InteractionConfig::default();
        let targets = vec![
            HitTarget::new("Red", Rect::new(200, 10, 100, 40), Action::SetInk { color: Rgb::RED }, &config),
            HitTarget::new("Save", Rect::new(500, 10, 100, 40), Action::Save, &config),
        ];
        let mut e = InteractionEngine::new(&config, targets, Rgb::MAGENTA);
        e.set_canvas_size(800, 800);
        e
    }

    #[test]
    fn touching_samples_add_one_segment_each_in_order() {
        let mut e = engine();
        let now = Instant::now();
        let points = [(10.0, 400.0), (20.0, 410.0), (30.0, 420.0), (40.0, 430.0)];
        for (x, y) in points {
            e.on_sample(FingerSample::new(x, y, 0.2), now);
        }
        // First sample has no predecessor.
        assert_eq!(e.strokes().len(), 3);
        let starts: Vec<i32> = e.strokes().iter().map(|s| s.start_x).collect();
        assert_eq!(starts, vec![10, 20, 30]);
        let last = e.strokes().last().unwrap();
        assert_eq!((last.end_x, last.end_y, last.color), (40, 430, Rgb::MAGENTA));
    }

    #[test]
    fn hovering_does_not_draw() {
        let mut e = engine();
        let now = Instant::now();
        e.on_sample(FingerSample::new(10.0, 400.0, 0.7), now);
        e.on_sample(FingerSample::new(20.0, 400.0, 0.51), now);
        assert!(e.strokes().is_empty());
        e.on_sample(FingerSample::new(30.0, 400.0, 0.5), now);
        assert_eq!(e.strokes().len(), 1);
    }

    #[test]
    fn cursor_radius_follows_depth() {
        let e = engine();
        assert_eq!(e.cursor_radius(0.0), 100);
        assert_eq!(e.cursor_radius(0.5), 50);
        assert_eq!(e.cursor_radius(0.9), 20);
        let mut last = i32::MAX;
        for i in 0..=80 {
            let r = e.cursor_radius(i as f32 / 100.0);
            assert!(r <= last && r >= 20);
            last = r;
        }
    }

    #[test]
    fn cursor_color_and_visibility() {
        let mut e = engine();
        let now = Instant::now();
        assert_eq!(e.cursor(), None);
        assert_eq!(e.mode(), PointerMode::Absent);

        e.on_sample(FingerSample::new(50.0, 60.0, 0.3), now);
        assert_eq!(e.cursor().map(|c| c.color), Some(Rgb::MAGENTA));

        // Both thresholds are inclusive.
        e.on_sample(FingerSample::new(50.0, 60.0, 0.5), now);
        assert_eq!(e.mode(), PointerMode::Drawing);
        assert_eq!(e.cursor().map(|c| c.color), Some(Rgb::MAGENTA));

        e.on_sample(FingerSample::new(50.0, 60.0, 0.95), now);
        assert_eq!(e.mode(), PointerMode::Hovering);
        assert_eq!(e.cursor().map(|c| (c.color, c.radius)), Some((Rgb::HOVER, 20)));

        e.on_sample(FingerSample::new(50.0, 60.0, 0.8), now);
        let c = e.cursor().unwrap();
        assert_eq!((c.x, c.y, c.color, c.radius), (50, 60, Rgb::HOVER, 20));

        e.on_sample(FingerSample::new(50.0, 60.0, 0.96), now);
        assert_eq!(e.cursor(), None);
        assert_eq!(e.mode(), PointerMode::Hidden);
    }

    #[test]
    fn frame_without_fingers_keeps_the_last_sample() {
        let mut e = engine();
        let now = Instant::now();
        e.on_sample(FingerSample::new(5.0, 5.0, 0.9), now);
        let frame = SensorFrame {
            timestamp: now,
            fingers: vec![],
            interaction_box: crate::normalize::InteractionBox::from_bounds(
                crate::types::Vector3::new(0.0, 0.0, 0.0),
                crate::types::Vector3::new(1.0, 1.0, 1.0),
            ),
        };
        assert!(!e.on_frame(&frame, now));
        assert_eq!(e.current(), Some(FingerSample::new(5.0, 5.0, 0.9)));
        assert_eq!(e.previous(), None);
    }

    #[test]
    fn hovering_a_target_switches_ink_after_full_expansion() {
        let mut e = engine();
        let t0 = Instant::now();
        let step = InteractionConfig::default().step_delay();
        // Inside the hit box but outside the base bounds.
        e.on_sample(FingerSample::new(190.0, 20.0, 0.8), t0);
        for k in 0..10 {
            assert!(e.tick(t0 + step * k).is_empty());
        }
        assert_eq!(e.tick(t0 + step * 10), vec![Action::SetInk { color: Rgb::RED }]);
        assert_eq!(e.ink(), Rgb::RED);
    }

    #[test]
    fn leaving_a_target_cancels_it() {
        let mut e = engine();
        let t0 = Instant::now();
        let step = InteractionConfig::default().step_delay();
        e.on_sample(FingerSample::new(250.0, 30.0, 0.8), t0);
        e.tick(t0 + step * 3);
        e.on_sample(FingerSample::new(250.0, 400.0, 0.8), t0 + step * 3);
        for k in 4..20 {
            assert!(e.tick(t0 + step * k).is_empty());
        }
        assert_eq!(e.ink(), Rgb::MAGENTA);
        assert_eq!(e.targets()[0].size(), (100, 40));
    }

    #[test]
    fn stroke_cap_drops_oldest_first() {
        let mut log = StrokeLog::new(Some(2));
        for i in 0..5 {
            log.push(StrokeSegment { start_x: i, start_y: 0, end_x: i, end_y: 0, color: Rgb::RED });
        }
        let kept: Vec<i32> = log.iter().map(|s| s.start_x).collect();
        assert_eq!(kept, vec![3, 4]);
    }
}
