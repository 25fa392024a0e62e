/// Touch input poller.
///
/// Turns raw contact samples into discrete press events:
///   - One sample per `tick()`
///   - A press is queued only on the edge from "no contact" to "contact",
///     at the point where the contact started
///   - Holding or dragging produces nothing more until release, so one
///     physical touch is one logical press
///   - Samples off the 320×240 panel are noise and ignored
///
/// Screens drain presses in FIFO order and test them against their buttons.

use std::collections::VecDeque;

use crate::ui::surface::{Point, Rect, RenderSurface};

pub struct InputPoller {
    queue: VecDeque<Point>,
    in_contact: bool,
}

impl InputPoller {
    pub fn new() -> Self {
        InputPoller {
            queue: VecDeque::with_capacity(4),
            in_contact: false,
        }
    }

    /// Sample the surface once and record a press edge if there is one.
    pub fn tick<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match surface.sample_touch() {
            Some(p) if p.on_screen() => {
                if !self.in_contact {
                    tracing::trace!(x = p.x, y = p.y, "press");
                    self.queue.push_back(p);
                }
                self.in_contact = true;
            }
            Some(_) => {
                // Noise: neither starts nor ends a contact.
            }
            None => self.in_contact = false,
        }
    }

    /// Oldest unconsumed press.
    pub fn next_press(&mut self) -> Option<Point> {
        self.queue.pop_front()
    }

    /// Tick, then pop.
    pub fn poll<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Option<Point> {
        self.tick(surface);
        self.next_press()
    }

    /// Tick, then consume one press and report whether it landed in `rect`.
    pub fn pressed<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, rect: Rect) -> bool {
        self.poll(surface).is_some_and(|p| rect.contains(p))
    }

    /// Drop queued presses, e.g. when a new screen takes over.
    /// Contact state is kept so a touch that is still down stays spent.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::testing::ScriptedSurface;

    #[test]
    fn held_contact_is_one_press() {
        let mut s = ScriptedSurface::new();
        let p = Point::new(10, 10);
        s.raw(Some(p)).raw(Some(p)).raw(Some(Point::new(12, 11))).raw(None);
        let mut input = InputPoller::new();
        assert_eq!(input.poll(&mut s), Some(p));
        assert_eq!(input.poll(&mut s), None);
        assert_eq!(input.poll(&mut s), None);
        assert_eq!(input.poll(&mut s), None);
    }

    #[test]
    fn release_rearms() {
        let mut s = ScriptedSurface::new();
        s.tap(Point::new(1, 1)).tap(Point::new(2, 2));
        let mut input = InputPoller::new();
        let mut presses = Vec::new();
        while s.remaining() > 0 {
            if let Some(p) = input.poll(&mut s) {
                presses.push(p);
            }
        }
        assert_eq!(presses, vec![Point::new(1, 1), Point::new(2, 2)]);
    }

    #[test]
    fn off_panel_samples_are_ignored() {
        let mut s = ScriptedSurface::new();
        s.raw(Some(Point::new(400, 10))).raw(None);
        let mut input = InputPoller::new();
        assert_eq!(input.poll(&mut s), None);
        assert_eq!(input.poll(&mut s), None);
    }

    #[test]
    fn pressed_checks_inclusive_rect() {
        let back = Rect::new(252, 209, 319, 239);
        let mut s = ScriptedSurface::new();
        s.tap(Point::new(319, 239)).tap(Point::new(100, 100));
        let mut input = InputPoller::new();
        assert!(input.pressed(&mut s, back));
        assert!(!input.pressed(&mut s, back)); // release sample
        assert!(!input.pressed(&mut s, back)); // press outside
    }

    #[test]
    fn clear_keeps_contact_spent() {
        let mut s = ScriptedSurface::new();
        let p = Point::new(5, 5);
        s.raw(Some(p)).raw(Some(p)).raw(None);
        let mut input = InputPoller::new();
        input.tick(&mut s);
        input.clear();
        assert_eq!(input.poll(&mut s), None);
        assert_eq!(input.poll(&mut s), None);
    }
}
