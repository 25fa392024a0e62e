/// Terminal render surface: double-buffered, diff-based crossterm output.
///
/// How it works:
///   1. Drawing calls paint a 320×240 RGB canvas plus a text overlay
///   2. `flush` downsamples the canvas onto the terminal grid, two pixel
///      rows per terminal row ('▀' with fg = top, bg = bottom)
///   3. Text runs are laid over their cells, centered on their logical extent
///   4. The new grid is diffed against the previous one and only changed
///      cells are emitted, batched with `queue!` and flushed once
///
/// Touch comes from the mouse: left button down/drag is contact, button up
/// is release. Ctrl+C raises the quit flag.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use image::RgbaImage;

use crate::error::Result;
use crate::ui::assets::ImageCache;
use crate::ui::surface::{Point, Rect, RenderSurface, Rgb, GLYPH_W, LINE_H, SCREEN_H, SCREEN_W};

const W: usize = SCREEN_W as usize;
const H: usize = SCREEN_H as usize;

// ── Canvas: logical pixels + text overlay ──

#[derive(Clone, Debug, PartialEq)]
struct TextRun {
    text: String,
    x: i32,
    y: i32,
    color: Rgb,
}

/// Backend-independent drawing state.
pub struct Canvas {
    pixels: Vec<Rgb>,
    texts: Vec<TextRun>,
    pen: Rgb,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas {
            pixels: vec![Rgb::BLACK; W * H],
            texts: Vec::new(),
            pen: Rgb::WHITE,
        }
    }

    fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y.min(H - 1) * W + x.min(W - 1)]
    }

    fn plot(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < W && (y as usize) < H {
            self.pixels[y as usize * W + x as usize] = color;
        }
    }

    /// A fill over a run's anchor hides the run.
    fn cover(&mut self, r: Rect) {
        self.texts.retain(|t| !r.contains(Point::new(t.x, t.y)));
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
        self.texts.clear();
    }

    fn blit(&mut self, img: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, px) in img.enumerate_pixels() {
            if px[3] >= 128 {
                self.plot(x + ix as i32, y + iy as i32, Rgb { r: px[0], g: px[1], b: px[2] });
            }
        }
        // Overlays are mostly transparent: only an opaque pixel hides a run.
        self.texts.retain(|t| {
            let (ix, iy) = (t.x - x, t.y - y);
            let inside = ix >= 0 && iy >= 0 && (ix as u32) < img.width() && (iy as u32) < img.height();
            !(inside && img.get_pixel(ix as u32, iy as u32)[3] >= 128)
        });
    }

    fn fill(&mut self, r: Rect) {
        for y in r.y1..=r.y2 {
            for x in r.x1..=r.x2 {
                self.plot(x, y, self.pen);
            }
        }
        self.cover(r);
    }

    fn outline(&mut self, r: Rect) {
        let (x2, y2) = (r.x2, r.y2);
        self.line(Point::new(r.x1, r.y1), Point::new(x2, r.y1));
        self.line(Point::new(r.x1, y2), Point::new(x2, y2));
        self.line(Point::new(r.x1, r.y1), Point::new(r.x1, y2));
        self.line(Point::new(x2, r.y1), Point::new(x2, y2));
    }

    fn line(&mut self, from: Point, to: Point) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).max(1);
        for i in 0..=steps {
            let x = from.x + dx * i / steps;
            let y = from.y + dy * i / steps;
            self.plot(x, y, self.pen);
        }
    }

    /// A new run replaces any run at the same anchor, so redrawing a label
    /// every frame keeps one copy.
    fn text(&mut self, text: &str, x: i32, y: i32) {
        self.texts.retain(|t| t.x != x || t.y != y);
        self.texts.push(TextRun { text: text.to_string(), x, y, color: self.pen });
    }

    /// Project onto a `cols × rows` cell grid.
    fn compose(&self, grid: &mut Grid) {
        let (cols, rows) = (grid.width, grid.height);
        if cols == 0 || rows == 0 {
            return;
        }
        let sub_rows = rows * 2;
        for cy in 0..rows {
            let top_y = (4 * cy + 1) * H / (2 * sub_rows);
            let bot_y = (4 * cy + 3) * H / (2 * sub_rows);
            for cx in 0..cols {
                let px = (2 * cx + 1) * W / (2 * cols);
                let top = self.pixel(px, top_y);
                let bot = self.pixel(px, bot_y);
                grid.set(cx, cy, Cell { ch: '▀', fg: to_color(top), bg: to_color(bot) });
            }
        }

        for run in &self.texts {
            let len = run.text.chars().count() as i32;
            let center = run.x + len * GLYPH_W / 2;
            let center_col = center * cols as i32 / SCREEN_W;
            let start = center_col - len / 2;
            let row = (run.y + LINE_H / 2) * rows as i32 / SCREEN_H;
            if row < 0 || row >= rows as i32 {
                continue;
            }
            for (i, ch) in run.text.chars().enumerate() {
                let col = start + i as i32;
                if col < 0 || col >= cols as i32 {
                    continue;
                }
                let bg = grid.get(col as usize, row as usize).fg;
                grid.set(col as usize, row as usize, Cell { ch, fg: to_color(run.color), bg });
            }
        }
    }
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── Grid: the terminal-cell back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Color::Black };

    /// Sentinel used to invalidate the back buffer; differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    fn new(w: usize, h: usize) -> Self {
        Grid { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }
}

// ── Touch latch ──

/// Mouse state folded into touch samples.
///
/// A press is held until the next sample reads it, so a click whose down
/// and up both arrive between two samples still reads as one contact
/// followed by a release.
#[derive(Default)]
struct TouchLatch {
    contact: Option<Point>,
    pending: Option<Point>,
}

impl TouchLatch {
    /// Button down or drag at `p`. Only a fresh contact is latched.
    fn down(&mut self, p: Point) {
        if self.contact.is_none() && self.pending.is_none() {
            self.pending = Some(p);
        }
        self.contact = Some(p);
    }

    fn up(&mut self) {
        self.contact = None;
    }

    fn sample(&mut self) -> Option<Point> {
        self.pending.take().or(self.contact)
    }
}

// ── TerminalSurface ──

pub struct TerminalSurface {
    writer: BufWriter<io::Stdout>,
    canvas: Canvas,
    images: ImageCache,
    front: Grid,
    back: Grid,
    touch: TouchLatch,
    quit: bool,
}

impl TerminalSurface {
    pub fn new(image_cache_entries: usize) -> Self {
        TerminalSurface {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            canvas: Canvas::new(),
            images: ImageCache::new(image_cache_entries),
            front: Grid::new(0, 0),
            back: Grid::new(0, 0),
            touch: TouchLatch::default(),
            quit: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    /// Terminal cell → logical pixel at the cell's center.
    fn to_logical(&self, col: u16, row: u16) -> Option<Point> {
        if self.front.width == 0 || self.front.height == 0 {
            return None;
        }
        let x = (2 * col as i32 + 1) * SCREEN_W / (2 * self.front.width as i32);
        let y = (2 * row as i32 + 1) * SCREEN_H / (2 * self.front.height as i32);
        Some(Point::new(x, y))
    }

    /// Read everything pending without blocking.
    fn drain_events(&mut self) {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left)
                    | MouseEventKind::Drag(MouseButton::Left) => {
                        if let Some(p) = self.to_logical(m.column, m.row) {
                            self.touch.down(p);
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => self.touch.up(),
                    _ => {}
                },
                Ok(Event::Key(k)) => {
                    if k.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
                    {
                        self.quit = true;
                    }
                }
                Ok(Event::Resize(w, h)) => self.resize(w as usize, h as usize),
                _ => {}
            }
        }
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Color::Black;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl RenderSurface for TerminalSurface {
    fn clear(&mut self, color: Rgb) {
        self.canvas.clear(color);
    }

    fn draw_image(&mut self, path: &Path, x: i32, y: i32) -> Result<()> {
        let img = self.images.get(path)?;
        self.canvas.blit(img, x, y);
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.canvas.pen = color;
    }

    fn write_text(&mut self, text: &str, x: i32, y: i32) {
        self.canvas.text(text, x, y);
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.canvas.outline(rect);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.canvas.fill(rect);
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.canvas.line(from, to);
    }

    fn flush(&mut self) -> Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.front.width || th as usize != self.front.height {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, Clear(ClearType::All))?;
        }
        self.canvas.compose(&mut self.front);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn sample_touch(&mut self) -> Option<Point> {
        self.drain_events();
        self.touch.sample()
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::input::InputPoller;
    use crate::ui::surface::testing::ScriptedSurface;

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    #[test]
    fn click_between_samples_is_not_lost() {
        let p = Point::new(160, 120);
        let mut latch = TouchLatch::default();
        latch.down(p);
        latch.up();
        assert_eq!(latch.sample(), Some(p));
        assert_eq!(latch.sample(), None);
    }

    #[test]
    fn held_and_dragged_contact_is_one_press() {
        let (p, q) = (Point::new(10, 10), Point::new(40, 12));
        let mut latch = TouchLatch::default();
        let mut surface = ScriptedSurface::new();
        latch.down(p);
        surface.raw(latch.sample());
        latch.down(q);
        surface.raw(latch.sample());
        latch.up();
        surface.raw(latch.sample());
        latch.down(q);
        latch.up();
        surface.raw(latch.sample()).raw(latch.sample());

        let mut input = InputPoller::new();
        let mut presses = Vec::new();
        while surface.remaining() > 0 {
            presses.extend(input.poll(&mut surface));
        }
        assert_eq!(presses, vec![p, q]);
    }

    #[test]
    fn redrawn_label_keeps_one_run() {
        let mut c = Canvas::new();
        let clear_art = RgbaImage::from_pixel(320, 240, image::Rgba([0, 0, 0, 0]));
        for _ in 0..100 {
            c.blit(&clear_art, 0, 0);
            c.text("You lost!", 105, 86);
        }
        assert_eq!(c.texts.len(), 1);
    }

    #[test]
    fn fill_includes_far_corner() {
        let mut c = Canvas::new();
        c.pen = RED;
        c.fill(Rect::FULL);
        assert_eq!(c.pixel(319, 239), RED);
        c.pen = Rgb::BLACK;
        c.fill(Rect::new(10, 10, 12, 12));
        assert_eq!(c.pixel(12, 12), Rgb::BLACK);
        assert_eq!(c.pixel(13, 12), RED);
    }

    #[test]
    fn fill_covers_text_anchor() {
        let mut c = Canvas::new();
        c.text("Back", 270, 216);
        c.text("kept", 10, 10);
        c.pen = RED;
        c.fill(Rect::new(252, 209, 319, 239));
        assert_eq!(c.texts.len(), 1);
        assert_eq!(c.texts[0].text, "kept");
        assert_eq!(c.pixel(260, 220), RED);
        assert_eq!(c.pixel(200, 220), Rgb::BLACK);
    }

    #[test]
    fn blit_skips_transparent_pixels_and_clips() {
        let mut c = Canvas::new();
        let mut img = RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
        img.put_pixel(0, 0, image::Rgba([0, 0, 255, 0]));
        c.blit(&img, 318, 238);
        assert_eq!(c.pixel(318, 238), Rgb::BLACK);
        assert_eq!(c.pixel(319, 239), Rgb { r: 0, g: 255, b: 0 });
    }

    #[test]
    fn blit_hides_text_only_under_opaque_pixels() {
        let mut c = Canvas::new();
        c.text("under", 1, 1);
        c.text("through", 3, 3);
        let mut overlay = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]));
        overlay.put_pixel(1, 1, image::Rgba([9, 9, 9, 255]));
        c.blit(&overlay, 0, 0);
        assert_eq!(c.texts.len(), 1);
        assert_eq!(c.texts[0].text, "through");
    }

    #[test]
    fn outline_draws_edges_only() {
        let mut c = Canvas::new();
        c.outline(Rect::new(10, 10, 20, 20));
        assert_eq!(c.pixel(10, 15), Rgb::WHITE);
        assert_eq!(c.pixel(20, 20), Rgb::WHITE);
        assert_eq!(c.pixel(15, 15), Rgb::BLACK);
    }

    #[test]
    fn compose_centers_text_on_logical_extent() {
        let mut c = Canvas::new();
        // "ab" spans x 148..172, centered on 160 → column 40 of 80.
        c.text("ab", 148, 100);
        let mut grid = Grid::new(80, 24);
        c.compose(&mut grid);
        let row = (100 + LINE_H / 2) as usize * 24 / H;
        assert_eq!(grid.get(39, row).ch, 'a');
        assert_eq!(grid.get(40, row).ch, 'b');
        assert_eq!(grid.get(41, row).ch, '▀');
    }

    #[test]
    fn compose_samples_top_and_bottom_halves() {
        let mut c = Canvas::new();
        c.pen = RED;
        c.fill(Rect::new(0, 0, 319, 119));
        let mut grid = Grid::new(32, 2);
        c.compose(&mut grid);
        let top = grid.get(0, 0);
        assert_eq!(top.fg, to_color(RED));
        assert_eq!(top.bg, to_color(RED));
        let bottom = grid.get(0, 1);
        assert_eq!(bottom.fg, to_color(Rgb::BLACK));
    }
}
