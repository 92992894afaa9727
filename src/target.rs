// Expandable hit targets.
// Hovering a target's padded hit box makes it grow step by step; staying
// until it reaches `base * expansion_factor` fires its action, leaving early
// shrinks it back. `tick` drives the animation from the owning loop.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::InteractionConfig;
use crate::types::{Rect, Rgb};

/// What a target does once it is fully expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Switch the ink used by new strokes.
    SetInk { color: Rgb },
    /// Export the canvas as a bitmap.
    Save,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Idle,
    Expanding,
    /// Action just fired; becomes Idle on the next tick.
    Settled,
}

#[derive(Clone, Debug)]
struct Expansion {
    original: (i32, i32),
    goal: (i32, i32),
    step: (i32, i32),
    total_steps: u32,
    steps_taken: u32,
    next_at: Instant,
}

impl Expansion {
    fn size_after(&self, steps: u32) -> (i32, i32) {
        if steps >= self.total_steps {
            // Snap both axes so integer steps never leave the aspect off.
            return self.goal;
        }
        let k = steps as i32;
        (self.original.0 + self.step.0 * k, self.original.1 + self.step.1 * k)
    }
}

#[derive(Clone, Debug)]
pub struct HitTarget {
    label: String,
    bounds: Rect,
    action: Action,
    factor: f64,
    margin: i32,
    steps: u32,
    delay: Duration,
    highlight: Rgb,
    size: (i32, i32),
    state: TargetState,
    expansion: Option<Expansion>,
    may_expand: bool,
}

impl HitTarget {
    pub fn new(label: &str, bounds: Rect, action: Action, config: &InteractionConfig) -> Self {
        Self {
            label: label.to_string(),
            bounds,
            action,
            factor: config.expansion_factor,
            margin: config.hit_margin,
            steps: config.expansion_steps,
            delay: config.step_delay(),
            highlight: Rgb::BUTTON,
            size: (bounds.width, bounds.height),
            state: TargetState::Idle,
            expansion: None,
            may_expand: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Layout changed. A running expansion keeps the size it started from.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if self.expansion.is_none() {
            self.size = (bounds.width, bounds.height);
        }
    }

    /// The enlarged, easier-to-hit area.
    pub fn hit_box(&self) -> Rect {
        self.bounds.inflate(self.margin)
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    /// Current size placed over the center of the base bounds.
    pub fn display_rect(&self) -> Rect {
        self.bounds.resized_about_center(self.size.0, self.size.1)
    }

    pub fn highlight(&self) -> Rgb {
        self.highlight
    }

    pub fn may_expand(&self) -> bool {
        self.may_expand
    }

    /// Start expanding. Returns false (and does nothing) while an
    /// expansion is already running.
    pub fn expand(&mut self, now: Instant) -> bool {
        if self.state == TargetState::Expanding {
            return false;
        }

        let original = (self.bounds.width, self.bounds.height);
        let goal = (
            (original.0 as f64 * self.factor) as i32,
            (original.1 as f64 * self.factor) as i32,
        );
        // Already at full size: fire on the first tick.
        let total_steps = if goal.0 <= original.0 { 0 } else { self.steps.max(1) };
        let div = total_steps.max(1) as i32;

        self.may_expand = true;
        self.state = TargetState::Expanding;
        self.expansion = Some(Expansion {
            original,
            goal,
            step: ((goal.0 - original.0) / div, (goal.1 - original.1) / div),
            total_steps,
            steps_taken: 0,
            next_at: now,
        });
        self.size = original;
        self.highlight = Rgb::ACTIVE;
        true
    }

    /// The finger left the hit box. A running expansion stops at its next step.
    pub fn release(&mut self) {
        self.may_expand = false;
    }

    /// Advance the animation to `now`. Returns the action if it fired.
    pub fn tick(&mut self, now: Instant) -> Option<Action> {
        match self.state {
            TargetState::Idle => None,
            TargetState::Settled => {
                self.state = TargetState::Idle;
                None
            }
            TargetState::Expanding => self.advance(now),
        }
    }

    fn advance(&mut self, now: Instant) -> Option<Action> {
        loop {
            let exp = self.expansion.as_mut()?;
            if now < exp.next_at {
                return None;
            }
            if exp.steps_taken >= exp.total_steps {
                self.finish();
                self.state = TargetState::Settled;
                log::debug!("target {:?} fired {:?}", self.label, self.action);
                return Some(self.action);
            }
            if !self.may_expand {
                self.finish();
                self.state = TargetState::Idle;
                log::debug!("target {:?} cancelled", self.label);
                return None;
            }
            exp.steps_taken += 1;
            exp.next_at += self.delay;
            self.size = exp.size_after(exp.steps_taken);
        }
    }

    fn finish(&mut self) {
        if let Some(exp) = self.expansion.take() {
            self.size = exp.original;
            self.highlight = Rgb::BUTTON;
        }
        self.may_expand = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(75);

    fn target() -> HitTarget {
        HitTarget::new(
            "Red",
            Rect::new(100, 10, 100, 40),
            Action::SetInk { color: Rgb::RED },
            &InteractionConfig::default(),
        )
    }

    #[test]
    fn grows_five_pixels_per_step_and_fires_at_full_size() {
        let mut t = target();
        let t0 = Instant::now();
        assert!(t.expand(t0));
        assert_eq!(t.highlight(), Rgb::ACTIVE);

        assert_eq!(t.tick(t0), None);
        assert_eq!(t.size(), (105, 42));

        let mut widths = vec![];
        for k in 1..10 {
            assert_eq!(t.tick(t0 + STEP * k), None);
            widths.push(t.size().0);
        }
        assert_eq!(widths, vec![110, 115, 120, 125, 130, 135, 140, 145, 150]);
        assert_eq!(t.size(), (150, 60));

        assert_eq!(t.tick(t0 + STEP * 10), Some(Action::SetInk { color: Rgb::RED }));
        assert_eq!(t.state(), TargetState::Settled);
        assert_eq!(t.size(), (100, 40));
        assert_eq!(t.highlight(), Rgb::BUTTON);

        t.tick(t0 + STEP * 11);
        assert_eq!(t.state(), TargetState::Idle);
    }

    #[test]
    fn expand_while_expanding_is_a_noop() {
        let mut t = target();
        let t0 = Instant::now();
        assert!(t.expand(t0));
        t.tick(t0 + STEP * 3);
        let size = t.size();
        assert!(!t.expand(t0 + STEP * 3));
        assert_eq!(t.size(), size);
        assert_eq!(t.state(), TargetState::Expanding);
    }

    #[test]
    fn release_cancels_and_restores_size() {
        let mut t = target();
        let t0 = Instant::now();
        t.expand(t0);
        t.tick(t0 + STEP * 4);
        assert!(t.size().0 > 100);

        t.release();
        assert!(!t.may_expand());
        assert_eq!(t.tick(t0 + STEP * 5), None);
        assert_eq!(t.state(), TargetState::Idle);
        assert_eq!(t.size(), (100, 40));
        assert_eq!(t.highlight(), Rgb::BUTTON);

        // Cancelling again changes nothing.
        t.release();
        assert_eq!(t.tick(t0 + STEP * 6), None);
        assert_eq!(t.size(), (100, 40));
    }

    #[test]
    fn cancel_is_only_seen_at_step_boundaries() {
        let mut t = target();
        let t0 = Instant::now();
        t.expand(t0);
        t.tick(t0);
        t.release();
        // Next step not due yet: still expanding.
        t.tick(t0 + STEP / 2);
        assert_eq!(t.state(), TargetState::Expanding);
        t.tick(t0 + STEP);
        assert_eq!(t.state(), TargetState::Idle);
    }

    #[test]
    fn release_after_last_step_still_fires() {
        let mut t = target();
        let t0 = Instant::now();
        t.expand(t0);
        t.tick(t0 + STEP * 9);
        assert_eq!(t.size(), (150, 60));
        t.release();
        assert!(t.tick(t0 + STEP * 10).is_some());
    }

    #[test]
    fn settled_target_can_be_rearmed() {
        let mut t = target();
        let t0 = Instant::now();
        t.expand(t0);
        assert!(t.tick(t0 + STEP * 20).is_some());
        assert_eq!(t.state(), TargetState::Settled);
        assert!(t.expand(t0 + STEP * 20));
    }

    #[test]
    fn factor_of_one_fires_on_first_tick() {
        let config = InteractionConfig { expansion_factor: 1.0, ..InteractionConfig::default() };
        let mut t = HitTarget::new("Save", Rect::new(0, 0, 100, 40), Action::Save, &config);
        let t0 = Instant::now();
        t.expand(t0);
        assert_eq!(t.tick(t0), Some(Action::Save));
    }

    #[test]
    fn hit_box_is_padded_around_the_bounds() {
        let t = target();
        assert_eq!(t.hit_box(), Rect::new(85, -5, 130, 70));
        assert!(t.hit_box().contains(90, 0));
        assert!(!t.bounds().contains(90, 0));
    }

    #[test]
    fn display_rect_grows_about_the_center() {
        let mut t = target();
        let t0 = Instant::now();
        t.expand(t0);
        t.tick(t0 + STEP * 9);
        assert_eq!(t.display_rect(), Rect::new(75, 0, 150, 60));
    }

    #[test]
    fn concurrent_triggers_start_one_expansion() {
        use std::sync::{Arc, Mutex};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let shared = Arc::new(Mutex::new(target()));
        let started = Arc::new(AtomicUsize::new(0));
        let t0 = Instant::now();

        std::thread::scope(|s| {
            for _ in 0..8 {
                let shared = Arc::clone(&shared);
                let started = Arc::clone(&started);
                s.spawn(move || {
                    if shared.lock().unwrap().expand(t0) {
                        started.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(shared.lock().unwrap().state(), TargetState::Expanding);
    }
}
