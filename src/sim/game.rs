/// Navigator: owns the current screen and runs it until it yields a trigger.
///
/// One top-level loop drives everything:
///   1. Enter the current screen (full redraw, fresh input queue)
///   2. The screen polls input, ticking its own timers, until a button
///      fires or its work completes, and reports a `Trigger`
///   3. The transition table (`Screen::on`) picks the next screen
///
/// No screen ever calls another, so revisiting a screen starts it from
/// scratch and the call stack never grows with navigation.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{GameConfig, TimingConfig};
use crate::domain::activity::{format_rolling, Catalog};
use crate::domain::pick::Dice;
use crate::domain::rules::{reveal_values, slide_frames, Guess};
use crate::error::Result;
use crate::sim::ledger::ScoreLedger;
use crate::sim::round::{Round, Verdict};
use crate::sim::screen::{Next, Screen, Trigger};
use crate::ui::assets::Assets;
use crate::ui::draw::{
    draw_back_button, draw_button, play_frames, text_in_box, Flasher, FrameClock, BACK_BUTTON,
};
use crate::ui::input::InputPoller;
use crate::ui::sound::{Effect, SoundEngine};
use crate::ui::surface::{Point, Rect, RenderSurface, Rgb, GLYPH_W, SCREEN_W};

// ── Layout ──

const CONTINUE_ARROW: Rect = Rect::new(273, 206, 306, 227);

const MENU_PLAY: Rect = Rect::new(70, 0, 250, 42);
const MENU_INSTRUCTIONS: Rect = Rect::new(70, 48, 250, 90);
const MENU_CREDITS: Rect = Rect::new(70, 96, 250, 138);
const MENU_LEADERBOARD: Rect = Rect::new(70, 144, 250, 186);
const MENU_QUIT: Rect = Rect::new(120, 206, 200, 239);

const CREDITS_DETAIL: Rect = Rect::new(35, 60, 285, 102);
const CREDITS_REFERENCES: Rect = Rect::new(35, 108, 285, 150);

const HIGHER: Rect = Rect::new(164, 213, 238, 236);
const LOWER: Rect = Rect::new(242, 213, 316, 236);
const LEFT_NOTE: Rect = Rect::new(136, 4, 157, 24);
const RIGHT_NOTE: Rect = Rect::new(296, 4, 317, 24);

const PANEL_W: i32 = SCREEN_W / 2;
const LEFT_DESCRIPTION: Rect = Rect::new(8, 24, 145, 200);
const RIGHT_DESCRIPTION: Rect = Rect::new(175, 24, 312, 200);
const LEFT_VALUE: Rect = Rect::new(4, 200, 156, 216);
const LEFT_UNIT: Rect = Rect::new(4, 220, 156, 236);
const RIGHT_VALUE: Rect = Rect::new(164, 200, 316, 216);
const RIGHT_UNIT: Rect = Rect::new(164, 220, 316, 236);
const ROLLING_VALUE_Y: i32 = 213;
const UNIT: &str = "kg CO2eq";

const LEADERBOARD_TITLE: Rect = Rect::new(0, 0, 319, 30);
const LEADERBOARD_FIRST_Y: i32 = 40;
const LEADERBOARD_ROW_PITCH: i32 = 40;
const LEADERBOARD_ROW_H: i32 = 30;

const LOST_BANNER: Rect = Rect::new(0, 70, 319, 120);
const LOST_SCORE: Rect = Rect::new(0, 100, 319, 150);

#[derive(Clone, Copy, Debug)]
enum PlayAction {
    Guess(Guess),
    LeftNote,
    RightNote,
}

pub struct Game<'a, S: RenderSurface, L: ScoreLedger, D: Dice> {
    surface: &'a mut S,
    ledger: &'a mut L,
    catalog: &'a Catalog,
    dice: D,
    assets: Assets,
    timing: TimingConfig,
    clip_frames: Vec<u32>,
    sound: Option<SoundEngine>,
    input: InputPoller,
}

impl<'a, S: RenderSurface, L: ScoreLedger, D: Dice> Game<'a, S, L, D> {
    pub fn new(
        surface: &'a mut S,
        ledger: &'a mut L,
        catalog: &'a Catalog,
        dice: D,
        config: &GameConfig,
    ) -> Self {
        Game {
            surface,
            ledger,
            catalog,
            dice,
            assets: Assets::new(&config.data.assets_dir),
            timing: config.timing.clone(),
            clip_frames: config.losing.clip_frames.clone(),
            sound: None,
            input: InputPoller::new(),
        }
    }

    pub fn with_sound(mut self, sound: Option<SoundEngine>) -> Self {
        self.sound = sound;
        self
    }

    /// Run from the title screen until Quit.
    pub fn run(&mut self) -> Result<()> {
        let mut screen = Screen::Title;
        loop {
            self.input.clear();
            let trigger = match screen {
                Screen::Title => self.title()?,
                Screen::MainMenu => self.main_menu()?,
                Screen::Instructions => {
                    let path = self.assets.instructions();
                    self.picture_with_back(path)?
                }
                Screen::Credits => self.credits()?,
                Screen::CreditsDetail => {
                    let path = self.assets.credits();
                    self.picture_with_back(path)?
                }
                Screen::References => {
                    let path = self.assets.references();
                    self.picture_with_back(path)?
                }
                Screen::Leaderboard => self.leaderboard()?,
                Screen::Briefing => self.briefing()?,
                Screen::Play => self.play()?,
                Screen::Losing { score } => self.losing(score)?,
            };

            match screen.on(trigger) {
                Some(Next::Go(next)) => {
                    tracing::debug!(from = ?screen, ?trigger, to = ?next, "transition");
                    screen = next;
                }
                Some(Next::Exit) => {
                    tracing::info!(from = ?screen, ?trigger, "exit");
                    return Ok(());
                }
                None => unreachable!("no transition from {screen:?} on {trigger:?}"),
            }
        }
    }

    // ── Input ──

    /// Block until a press lands on one of `buttons`. `None` means the
    /// host asked to quit. Presses elsewhere are ignored.
    fn wait_for<T: Copy>(&mut self, buttons: &[(Rect, T)]) -> Option<T> {
        loop {
            if self.surface.quit_requested() {
                return None;
            }
            if let Some(p) = self.input.poll(self.surface) {
                if let Some(&(_, action)) = buttons.iter().find(|(r, _)| r.contains(p)) {
                    self.sfx(Effect::Tap);
                    return Some(action);
                }
            }
            self.idle();
        }
    }

    /// Block until any tap. `false` means the host asked to quit.
    fn wait_for_tap(&mut self) -> bool {
        self.wait_for(&[(Rect::FULL, ())]).is_some()
    }

    fn idle(&self) {
        if !self.timing.poll_sleep.is_zero() {
            std::thread::sleep(self.timing.poll_sleep);
        }
    }

    fn pause(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }

    fn sfx(&self, effect: Effect) {
        if let Some(sound) = &self.sound {
            sound.play(effect);
        }
    }

    // ── Menu screens ──

    fn title(&mut self) -> Result<Trigger> {
        let image = self.assets.title();
        let mut flasher = Flasher::new(self.timing.flash_period, Instant::now());
        let mut shown = None;

        loop {
            if self.surface.quit_requested() {
                return Ok(Trigger::HostQuit);
            }

            let visible = flasher.update(Instant::now());
            if shown != Some(visible) {
                self.surface.clear(Rgb::BLACK);
                self.surface.draw_image(&image, 0, 0)?;
                if !visible {
                    self.surface.set_text_color(Rgb::BLACK);
                    self.surface.fill_rect(CONTINUE_ARROW);
                }
                self.surface.flush()?;
                shown = Some(visible);
            }

            if let Some(p) = self.input.poll(self.surface) {
                if CONTINUE_ARROW.contains(p) {
                    self.sfx(Effect::Tap);
                    return Ok(Trigger::Continue);
                }
            }
            self.idle();
        }
    }

    fn main_menu(&mut self) -> Result<Trigger> {
        let buttons = [
            (MENU_PLAY, "Play Game", Trigger::Play),
            (MENU_INSTRUCTIONS, "Instructions", Trigger::Instructions),
            (MENU_CREDITS, "Credits", Trigger::Credits),
            (MENU_LEADERBOARD, "Leaderboard", Trigger::Leaderboard),
            (MENU_QUIT, "Quit", Trigger::Quit),
        ];
        self.surface.clear(Rgb::BLACK);
        for (rect, label, _) in &buttons {
            draw_button(self.surface, *rect, label, Rgb::WHITE);
        }
        self.surface.flush()?;

        let targets: Vec<(Rect, Trigger)> = buttons.iter().map(|&(r, _, t)| (r, t)).collect();
        Ok(self.wait_for(&targets).unwrap_or(Trigger::HostQuit))
    }

    fn picture_with_back(&mut self, image: PathBuf) -> Result<Trigger> {
        self.surface.clear(Rgb::BLACK);
        self.surface.draw_image(&image, 0, 0)?;
        draw_back_button(self.surface);
        self.surface.flush()?;
        Ok(self.wait_for(&[(BACK_BUTTON, Trigger::Back)]).unwrap_or(Trigger::HostQuit))
    }

    fn credits(&mut self) -> Result<Trigger> {
        self.surface.clear(Rgb::BLACK);
        draw_button(self.surface, CREDITS_DETAIL, "Credits", Rgb::WHITE);
        draw_button(self.surface, CREDITS_REFERENCES, "Abbr. References", Rgb::WHITE);
        draw_back_button(self.surface);
        self.surface.flush()?;

        let buttons = [
            (BACK_BUTTON, Trigger::Back),
            (CREDITS_REFERENCES, Trigger::References),
            (CREDITS_DETAIL, Trigger::CreditsDetail),
        ];
        Ok(self.wait_for(&buttons).unwrap_or(Trigger::HostQuit))
    }

    fn leaderboard(&mut self) -> Result<Trigger> {
        let top = self.ledger.leaderboard()?;

        self.surface.clear(Rgb::BLACK);
        text_in_box(self.surface, "DEVICE TOP 5 SCORES:", Rgb::WHITE, LEADERBOARD_TITLE);
        self.surface.set_text_color(Rgb::WHITE);
        self.surface.draw_line(Point::new(35, 32), Point::new(285, 32));
        for (i, score) in top.iter().enumerate() {
            let y = LEADERBOARD_FIRST_Y + i as i32 * LEADERBOARD_ROW_PITCH;
            let row = Rect::new(0, y, 319, y + LEADERBOARD_ROW_H);
            text_in_box(self.surface, &score.to_string(), Rgb::WHITE, row);
        }
        draw_back_button(self.surface);
        self.surface.flush()?;

        Ok(self.wait_for(&[(BACK_BUTTON, Trigger::Back)]).unwrap_or(Trigger::HostQuit))
    }

    /// Two pages, each dismissed by a tap anywhere.
    fn briefing(&mut self) -> Result<Trigger> {
        for page in 1..=2 {
            let image = self.assets.briefing(page);
            self.surface.draw_image(&image, 0, 0)?;
            self.surface.flush()?;
            if !self.wait_for_tap() {
                return Ok(Trigger::HostQuit);
            }
        }
        Ok(Trigger::BriefingDone)
    }

    // ── Round engine ──

    fn play(&mut self) -> Result<Trigger> {
        self.surface.clear(Rgb::BLACK);
        self.surface.flush()?;

        let mut round = Round::start(self.catalog, &mut self.dice)?;
        let buttons = [
            (HIGHER, PlayAction::Guess(Guess::Higher)),
            (LOWER, PlayAction::Guess(Guess::Lower)),
            (LEFT_NOTE, PlayAction::LeftNote),
            (RIGHT_NOTE, PlayAction::RightNote),
        ];

        loop {
            self.draw_pair(round.left, round.right)?;

            let guess = loop {
                let Some(action) = self.wait_for(&buttons) else {
                    return Ok(Trigger::HostQuit);
                };
                let index = match action {
                    PlayAction::Guess(g) => break g,
                    PlayAction::LeftNote => round.left,
                    PlayAction::RightNote => round.right,
                };
                if !self.show_note(index)? {
                    return Ok(Trigger::HostQuit);
                }
                self.draw_pair(round.left, round.right)?;
            };

            self.reveal(round.right)?;

            match round.guess(self.catalog, guess, &mut self.dice) {
                Verdict::Correct { outgoing, promoted, incoming } => {
                    self.sfx(Effect::Correct);
                    self.verdict_animation(true)?;
                    self.slide(outgoing, promoted, incoming)?;
                }
                Verdict::Wrong { final_score } => {
                    self.sfx(Effect::Incorrect);
                    self.verdict_animation(false)?;
                    self.ledger.record(final_score)?;
                    return Ok(Trigger::RoundOver { score: final_score });
                }
            }
        }
    }

    fn draw_left(&mut self, index: usize) -> Result<()> {
        let catalog = self.catalog;
        let activity = catalog.get(index);
        self.surface.draw_image(&self.assets.activity(index), 0, 0)?;
        text_in_box(self.surface, &activity.description, Rgb::WHITE, LEFT_DESCRIPTION);
        text_in_box(self.surface, &activity.value_text(), Rgb::WHITE, LEFT_VALUE);
        text_in_box(self.surface, UNIT, Rgb::WHITE, LEFT_UNIT);
        Ok(())
    }

    fn draw_right(&mut self, index: usize) -> Result<()> {
        let catalog = self.catalog;
        let activity = catalog.get(index);
        self.surface.draw_image(&self.assets.activity(index), PANEL_W, 0)?;
        text_in_box(self.surface, &activity.description, Rgb::WHITE, RIGHT_DESCRIPTION);
        self.surface.draw_image(&self.assets.guess_buttons(), 0, 0)?;
        self.surface.draw_image(&self.assets.versus(), 0, 0)?;
        self.surface.draw_image(&self.assets.note_buttons(), 0, 0)?;
        Ok(())
    }

    fn draw_pair(&mut self, left: usize, right: usize) -> Result<()> {
        self.draw_left(left)?;
        self.draw_right(right)?;
        self.surface.flush()
    }

    /// Full-screen note until a tap. `false` means the host asked to quit.
    fn show_note(&mut self, index: usize) -> Result<bool> {
        let catalog = self.catalog;
        let note = &catalog.get(index).note;
        self.surface.clear(Rgb::BLACK);
        text_in_box(self.surface, note, Rgb::WHITE, Rect::FULL);
        self.surface.flush()?;
        Ok(self.wait_for_tap())
    }

    /// Count the right activity's value up from zero, then show it exactly.
    fn reveal(&mut self, index: usize) -> Result<()> {
        let catalog = self.catalog;
        let activity = catalog.get(index);
        let image = self.assets.activity(index);

        for value in reveal_values(activity.co2, self.timing.reveal_steps) {
            self.surface.draw_image(&image, PANEL_W, 0)?;
            self.surface.draw_image(&self.assets.note_buttons(), 0, 0)?;
            self.surface.draw_image(&self.assets.versus(), 0, 0)?;

            let text = format_rolling(value);
            let w = text.chars().count() as i32 * GLYPH_W;
            self.surface.set_text_color(Rgb::WHITE);
            self.surface.write_text(&text, RIGHT_VALUE.x1 + (RIGHT_VALUE.width() - w) / 2, ROLLING_VALUE_Y);
            text_in_box(self.surface, &activity.description, Rgb::WHITE, RIGHT_DESCRIPTION);

            self.surface.flush()?;
            self.pause(self.timing.reveal_step);
        }

        self.surface.draw_image(&image, PANEL_W, 0)?;
        self.surface.draw_image(&self.assets.versus(), 0, 0)?;
        self.surface.draw_image(&self.assets.note_buttons(), 0, 0)?;
        text_in_box(self.surface, &activity.description, Rgb::WHITE, RIGHT_DESCRIPTION);
        text_in_box(self.surface, &activity.value_text(), Rgb::WHITE, RIGHT_VALUE);
        text_in_box(self.surface, UNIT, Rgb::WHITE, RIGHT_UNIT);
        self.surface.flush()?;
        self.pause(self.timing.reveal_hold);
        Ok(())
    }

    fn verdict_animation(&mut self, correct: bool) -> Result<()> {
        let frames: Vec<PathBuf> = (1..=self.timing.verdict_frames)
            .map(|n| {
                if correct {
                    self.assets.correct_frame(n)
                } else {
                    self.assets.incorrect_frame(n)
                }
            })
            .collect();
        play_frames(self.surface, frames, self.timing.verdict_frame)?;
        self.pause(self.timing.verdict_hold);
        Ok(())
    }

    /// Outgoing panel leaves left, promoted panel takes its place, the new
    /// activity arrives from the right.
    fn slide(&mut self, outgoing: usize, promoted: usize, incoming: usize) -> Result<()> {
        let (out_img, promo_img, in_img) = (
            self.assets.activity(outgoing),
            self.assets.activity(promoted),
            self.assets.activity(incoming),
        );
        for frame in slide_frames(self.timing.slide_steps, PANEL_W) {
            if frame.outgoing + PANEL_W > 0 {
                self.surface.draw_image(&out_img, frame.outgoing, 0)?;
            }
            self.surface.draw_image(&promo_img, frame.shifting, 0)?;
            if frame.incoming < SCREEN_W {
                self.surface.draw_image(&in_img, frame.incoming, 0)?;
            }
            self.surface.flush()?;
            self.pause(self.timing.slide_step);
        }
        Ok(())
    }

    // ── Losing screen ──

    /// Loop a randomly chosen clip under the score until Back.
    fn losing(&mut self, score: u32) -> Result<Trigger> {
        let clip = self.dice.roll(self.clip_frames.len());
        let frame_count = self.clip_frames[clip];
        let banner = format!("Score: {score}");
        tracing::debug!(clip = clip + 1, frame_count, "losing clip");

        let mut clock = FrameClock::new(self.timing.losing_frame);
        let mut frame = 0;
        loop {
            if self.surface.quit_requested() {
                return Ok(Trigger::HostQuit);
            }

            if clock.due(Instant::now()) {
                let path = self.assets.losing_frame(clip + 1, frame);
                self.surface.draw_image(&path, 0, 0)?;
                frame = (frame + 1) % frame_count;

                draw_back_button(self.surface);
                text_in_box(self.surface, "You lost!", Rgb::WHITE, LOST_BANNER);
                text_in_box(self.surface, &banner, Rgb::WHITE, LOST_SCORE);
                self.surface.flush()?;
            }

            if self.input.pressed(self.surface, BACK_BUTTON) {
                self.sfx(Effect::Tap);
                return Ok(Trigger::Back);
            }
            self.idle();
        }
    }
}
