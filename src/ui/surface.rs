/// Display/touch contract every screen draws through.
///
/// Logical resolution is fixed at 320×240 with (0, 0) top-left. Screens
/// never talk to a concrete backend; the terminal implementation lives in
/// `ui::terminal`, and tests use the recording `ScriptedSurface`.

use std::path::Path;

use crate::error::Result;

pub const SCREEN_W: i32 = 320;
pub const SCREEN_H: i32 = 240;

/// Glyph metrics of the display font.
pub const GLYPH_W: i32 = 12;
pub const LINE_H: i32 = 17;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn on_screen(self) -> bool {
        (0..SCREEN_W).contains(&self.x) && (0..SCREEN_H).contains(&self.y)
    }
}

/// Axis-aligned box given by two inclusive corners.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    /// The whole display.
    pub const FULL: Rect = Rect::new(0, 0, SCREEN_W - 1, SCREEN_H - 1);

    /// Corner-to-corner span, used for text layout.
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }
}

pub trait RenderSurface {
    fn clear(&mut self, color: Rgb);
    /// Draw the image at `path` with its top-left corner at (x, y).
    /// Fails with `AssetMissing` when the image cannot be loaded.
    fn draw_image(&mut self, path: &Path, x: i32, y: i32) -> Result<()>;
    fn set_text_color(&mut self, color: Rgb);
    fn write_text(&mut self, text: &str, x: i32, y: i32);
    fn draw_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn draw_line(&mut self, from: Point, to: Point);
    fn flush(&mut self) -> Result<()>;
    /// Current contact point, if the panel is being touched. Never blocks.
    fn sample_touch(&mut self) -> Option<Point>;
    /// Set when the host asks the program to stop (e.g. Ctrl+C).
    fn quit_requested(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Clear,
        Image(PathBuf, i32, i32),
        Text(String, i32, i32),
        Rect(Rect),
        Fill(Rect),
        Line,
        Flush,
    }

    /// Records every draw call and replays a script of touch samples.
    ///
    /// Running out of script panics, so a test that waits for a tap it
    /// never scripted fails instead of spinning forever.
    pub struct ScriptedSurface {
        pub ops: Vec<Op>,
        touches: VecDeque<Option<Point>>,
        pub missing: Vec<PathBuf>,
        pub quit: bool,
    }

    impl ScriptedSurface {
        pub fn new() -> Self {
            ScriptedSurface {
                ops: Vec::new(),
                touches: VecDeque::new(),
                missing: Vec::new(),
                quit: false,
            }
        }

        /// One complete tap: contact at `p`, then release.
        pub fn tap(&mut self, p: Point) -> &mut Self {
            self.touches.push_back(Some(p));
            self.touches.push_back(None);
            self
        }

        pub fn raw(&mut self, sample: Option<Point>) -> &mut Self {
            self.touches.push_back(sample);
            self
        }

        pub fn remaining(&self) -> usize {
            self.touches.len()
        }

        pub fn texts(&self) -> Vec<String> {
            self.ops.iter()
                .filter_map(|op| match op {
                    Op::Text(s, _, _) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn images(&self) -> Vec<PathBuf> {
            self.ops.iter()
                .filter_map(|op| match op {
                    Op::Image(p, _, _) => Some(p.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl RenderSurface for ScriptedSurface {
        fn clear(&mut self, _color: Rgb) {
            self.ops.push(Op::Clear);
        }

        fn draw_image(&mut self, path: &Path, x: i32, y: i32) -> Result<()> {
            if self.missing.iter().any(|m| m == path) {
                return Err(crate::error::GameError::AssetMissing {
                    path: path.to_path_buf(),
                    reason: "scripted".into(),
                });
            }
            self.ops.push(Op::Image(path.to_path_buf(), x, y));
            Ok(())
        }

        fn set_text_color(&mut self, _color: Rgb) {}

        fn write_text(&mut self, text: &str, x: i32, y: i32) {
            self.ops.push(Op::Text(text.to_string(), x, y));
        }

        fn draw_rect(&mut self, rect: Rect) {
            self.ops.push(Op::Rect(rect));
        }

        fn fill_rect(&mut self, rect: Rect) {
            self.ops.push(Op::Fill(rect));
        }

        fn draw_line(&mut self, _from: Point, _to: Point) {
            self.ops.push(Op::Line);
        }

        fn flush(&mut self) -> Result<()> {
            self.ops.push(Op::Flush);
            Ok(())
        }

        fn sample_touch(&mut self) -> Option<Point> {
            match self.touches.pop_front() {
                Some(sample) => sample,
                None => panic!("touch script exhausted"),
            }
        }

        fn quit_requested(&self) -> bool {
            self.quit
        }
    }
}
