/// Presentation helpers shared by every screen: buttons, boxed text,
/// timed frame playback, and the title-screen flasher.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::ui::surface::{Rect, RenderSurface, Rgb, GLYPH_W, LINE_H};

/// Bottom-right "Back" button used on every sub-screen.
pub const BACK_BUTTON: Rect = Rect::new(252, 209, 319, 239);

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// Lines break at the last space that keeps them within the limit; the
/// space itself is consumed. A word longer than the limit is hard-split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let max = max_chars.max(1);
    let mut lines = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = start + max;
        if end < chars.len() {
            let mut brk = end;
            while brk > start && chars[brk] != ' ' {
                brk -= 1;
            }
            if brk > start {
                end = brk;
            }
        } else {
            end = chars.len();
        }

        lines.push(chars[start..end].iter().collect());
        start = end;
        if start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
    }

    lines
}

/// Write `text` wrapped and centered both ways inside `rect`.
pub fn text_in_box<S: RenderSurface + ?Sized>(surface: &mut S, text: &str, color: Rgb, rect: Rect) {
    let per_line = (rect.width() / GLYPH_W).max(1) as usize;
    let lines = wrap_text(text, per_line);
    let block_h = lines.len() as i32 * LINE_H;
    let mut y = rect.y1 + (rect.height() - block_h) / 2;

    surface.set_text_color(color);
    for line in &lines {
        let w = line.chars().count() as i32 * GLYPH_W;
        let x = rect.x1 + (rect.width() - w) / 2;
        surface.write_text(line, x, y);
        y += LINE_H;
    }
}

/// Outlined button with a centered label.
pub fn draw_button<S: RenderSurface + ?Sized>(surface: &mut S, rect: Rect, label: &str, color: Rgb) {
    surface.set_text_color(color);
    surface.draw_rect(rect);
    let mid_x = (rect.x1 + rect.x2) / 2;
    let mid_y = (rect.y1 + rect.y2) / 2;
    let w = label.chars().count() as i32 * GLYPH_W;
    surface.write_text(label, mid_x - w / 2, mid_y - 8);
}

pub fn draw_back_button<S: RenderSurface + ?Sized>(surface: &mut S) {
    draw_button(surface, BACK_BUTTON, "Back", Rgb::WHITE);
}

// ── Timing ──

/// "Has a full period passed since the last advance?"
pub struct FrameClock {
    period: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(period: Duration) -> Self {
        FrameClock { period, last: Instant::now() }
    }

    /// True (and restarts the period) once `period` has elapsed at `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Sleep out the rest of the current period, then advance.
    pub fn wait(&mut self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.period {
            std::thread::sleep(self.period - elapsed);
        }
        self.last = Instant::now();
    }
}

/// Visibility toggle for the title screen's continue arrow.
pub struct Flasher {
    period: Duration,
    last: Instant,
    visible: bool,
}

impl Flasher {
    pub fn new(period: Duration, now: Instant) -> Self {
        Flasher { period, last: now, visible: true }
    }

    /// Advance to `now`; returns whether the arrow is currently shown.
    pub fn update(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) > self.period {
            self.visible = !self.visible;
            self.last = now;
        }
        self.visible
    }
}

/// Full-screen frames drawn one per `period`.
pub fn play_frames<S, I>(surface: &mut S, frames: I, period: Duration) -> Result<()>
where
    S: RenderSurface + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    let mut clock = FrameClock::new(period);
    for path in frames {
        clock.wait();
        surface.draw_image(&path, 0, 0)?;
        surface.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::testing::{Op, ScriptedSurface};

    #[test]
    fn wraps_at_last_space() {
        assert_eq!(wrap_text("the quick brown fox", 10), vec!["the quick", "brown fox"]);
    }

    #[test]
    fn breaks_when_space_sits_at_limit() {
        assert_eq!(wrap_text("abcde fgh", 5), vec!["abcde", "fgh"]);
    }

    #[test]
    fn hard_splits_long_words_without_dropping_characters() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap_text("Back", 20), vec!["Back"]);
        assert!(wrap_text("", 20).is_empty());
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(wrap_text("CO₂ CO₂", 3), vec!["CO₂", "CO₂"]);
    }

    #[test]
    fn text_box_centers_lines() {
        let mut s = ScriptedSurface::new();
        text_in_box(&mut s, "You lost!", Rgb::WHITE, Rect::new(0, 70, 319, 120));
        // 9 glyphs = 108px wide in a 319px box; one 17px line in a 50px box.
        assert_eq!(s.ops, vec![Op::Text("You lost!".into(), 105, 86)]);
    }

    #[test]
    fn text_box_stacks_lines() {
        let mut s = ScriptedSurface::new();
        text_in_box(&mut s, "aaaa bbbb", Rgb::WHITE, Rect::new(0, 0, 60, 100));
        let ys: Vec<i32> = s.ops.iter()
            .filter_map(|op| if let Op::Text(_, _, y) = op { Some(*y) } else { None })
            .collect();
        assert_eq!(ys, vec![33, 50]);
    }

    #[test]
    fn button_outline_and_label() {
        let mut s = ScriptedSurface::new();
        draw_back_button(&mut s);
        assert_eq!(s.ops[0], Op::Rect(BACK_BUTTON));
        assert_eq!(s.ops[1], Op::Text("Back".into(), 261, 216));
    }

    #[test]
    fn frame_clock_gates_on_period() {
        let start = Instant::now();
        let mut clock = FrameClock { period: Duration::from_millis(40), last: start };
        assert!(!clock.due(start + Duration::from_millis(39)));
        assert!(clock.due(start + Duration::from_millis(40)));
        assert!(!clock.due(start + Duration::from_millis(60)));
        assert!(clock.due(start + Duration::from_millis(80)));
    }

    #[test]
    fn flasher_toggles_each_half_second() {
        let t0 = Instant::now();
        let mut f = Flasher::new(Duration::from_millis(500), t0);
        assert!(f.update(t0 + Duration::from_millis(400)));
        assert!(!f.update(t0 + Duration::from_millis(501)));
        assert!(!f.update(t0 + Duration::from_millis(900)));
        assert!(f.update(t0 + Duration::from_millis(1002)));
    }

    #[test]
    fn play_frames_draws_in_order() {
        let mut s = ScriptedSurface::new();
        let frames = (1..=3).map(|i| PathBuf::from(format!("{i}.png")));
        play_frames(&mut s, frames, Duration::ZERO).unwrap();
        assert_eq!(
            s.images(),
            vec![PathBuf::from("1.png"), PathBuf::from("2.png"), PathBuf::from("3.png")]
        );
    }
}
