// Layout and per-frame rendering of the painting screen.
// Top strip: the targets in a centered row. Below: the canvas with every
// stroke, and the cursor on top of everything.

use crate::config::{InteractionConfig, TargetConfig};
use crate::draw::{clear, draw_line, draw_text_5x7, fill_circle, fill_rect, stroke_rect, text_width_5x7};
use crate::engine::{InteractionEngine, PointerMode};
use crate::target::{Action, HitTarget};
use crate::types::{FrameBuffer, Rect, Rgb};

pub const BUTTON_WIDTH: i32 = 100;
pub const BUTTON_HEIGHT: i32 = 40;
pub const BUTTON_GAP: i32 = 5;
/// Extra space in front of the Save target.
pub const SAVE_GAP: i32 = 25;
/// Height of the strip holding the targets; leaves room to expand.
pub const PANEL_HEIGHT: i32 = 80;

/// Base bounds for one target per action, in a centered row. Targets whose
/// action is `Save` get a wider gap in front of them.
pub fn layout_row(width: usize, actions: &[Action]) -> Vec<Rect> {
    let gaps: Vec<i32> = actions
        .iter()
        .enumerate()
        .map(|(i, a)| match (i, a) {
            (0, _) => 0,
            (_, Action::Save) => SAVE_GAP,
            _ => BUTTON_GAP,
        })
        .collect();
    let total: i32 = gaps.iter().sum::<i32>() + BUTTON_WIDTH * actions.len() as i32;
    let y = (PANEL_HEIGHT - BUTTON_HEIGHT) / 2;
    let mut x = (width as i32 - total) / 2;

    gaps.iter()
        .map(|gap| {
            x += gap;
            let r = Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT);
            x += BUTTON_WIDTH;
            r
        })
        .collect()
}

/// Build the configured targets, laid out for a canvas `width` wide.
pub fn layout_targets(width: usize, targets: &[TargetConfig], config: &InteractionConfig) -> Vec<HitTarget> {
    let actions: Vec<Action> = targets.iter().map(|t| t.action).collect();
    targets
        .iter()
        .zip(layout_row(width, &actions))
        .map(|(t, bounds)| HitTarget::new(&t.label, bounds, t.action, config))
        .collect()
}

/// Re-run the layout after the window changed size.
/// Visual: the row of targets stays centered as you drag the window edge.
pub fn relayout(width: usize, targets: &mut [HitTarget]) {
    let actions: Vec<Action> = targets.iter().map(|t| t.action()).collect();
    for (t, bounds) in targets.iter_mut().zip(layout_row(width, &actions)) {
        t.set_bounds(bounds);
    }
}

/// Draw the whole screen for this frame.
/// Visual: grey panel with the targets on top (green while growing), white
/// canvas with all strokes below, the cursor over everything.
pub fn render(engine: &InteractionEngine, fb: &mut FrameBuffer, stroke_width: i32) {
    clear(fb, Rgb::WHITE.to_u32());
    fill_rect(fb, 0, 0, fb.width as i32, PANEL_HEIGHT, Rgb::PANEL.to_u32());

    for target in engine.targets() {
        let r = target.display_rect();
        fill_rect(fb, r.x, r.y, r.width, r.height, target.highlight().to_u32());
        stroke_rect(fb, r.x, r.y, r.width, r.height, Rgb(120, 120, 120).to_u32());
        let (cx, cy) = r.center();
        let label = target.label();
        draw_text_5x7(fb, cx - text_width_5x7(label) / 2, cy - 3, label, label_color(target).to_u32());
    }

    for s in engine.strokes().iter() {
        draw_line(fb, s.start_x, s.start_y, s.end_x, s.end_y, stroke_width, s.color.to_u32());
    }

    if let Some(c) = engine.cursor() {
        fill_circle(fb, c.x, c.y, c.radius, c.color.to_u32());
    }

    let status = match engine.mode() {
        PointerMode::Absent => "NO FINGER",
        PointerMode::Hidden => "TOO FAR",
        PointerMode::Hovering => "HOVER",
        PointerMode::Drawing => "DRAW",
    };
    draw_text_5x7(fb, 8, fb.height as i32 - 14, status, Rgb(90, 90, 90).to_u32());
}

/// Color targets show their ink in the label.
fn label_color(target: &HitTarget) -> Rgb {
    match target.action() {
        Action::SetInk { color } => color,
        Action::Save => Rgb::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::FingerSample;
    use std::time::Instant;

    #[test]
    fn row_is_centered_with_a_gap_before_save() {
        let config = Config::default();
        let targets = layout_targets(800, &config.targets, &config.interaction);
        let xs: Vec<i32> = targets.iter().map(|t| t.bounds().x).collect();
        // 4 * 100 + 2 * 5 + 25 = 435 wide, starting at (800 - 435) / 2.
        assert_eq!(xs, vec![182, 287, 392, 517]);
        assert!(targets.iter().all(|t| t.bounds().y == 20 && t.bounds().height == 40));
    }

    #[test]
    fn relayout_moves_targets() {
        let config = Config::default();
        let mut targets = layout_targets(800, &config.targets, &config.interaction);
        relayout(1000, &mut targets);
        assert_eq!(targets[0].bounds().x, 282);
    }

    #[test]
    fn renders_strokes_targets_and_cursor() {
        let config = Config::default();
        let targets = layout_targets(200, &config.targets[..1], &config.interaction);
        let mut engine = InteractionEngine::new(&config.interaction, targets, Rgb::BLUE);
        engine.set_canvas_size(200, 200);
        let now = Instant::now();
        engine.on_sample(FingerSample::new(20.0, 150.0, 0.2), now);
        engine.on_sample(FingerSample::new(120.0, 150.0, 0.2), now);

        let mut fb = FrameBuffer::new(200, 200, Rgb::BLACK);
        render(&engine, &mut fb, 3);

        assert_eq!(fb.get(60, 150), Some(Rgb::BLUE));
        assert_eq!(fb.get(10, 100), Some(Rgb::WHITE));
        assert_eq!(fb.get(2, 2), Some(Rgb::PANEL));
        // Target fill (corner inside the border).
        let r = engine.targets()[0].display_rect();
        assert_eq!(fb.get((r.x + 2) as usize, (r.y + 2) as usize), Some(Rgb::BUTTON));
        // Cursor disc around the last sample.
        assert_eq!(fb.get(120, 170), Some(Rgb::BLUE));
    }
}
