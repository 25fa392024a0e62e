/// Guess judgment, leaderboard ranking, and animation curves.
///
/// Pure functions, no drawing and no I/O.
///
/// ## Guess Truth Table
/// ┌────────────────────┬──────────┬──────────┐
/// │ Comparison          │ Higher   │ Lower    │
/// ├────────────────────┼──────────┼──────────┤
/// │ right > left        │ WIN      │ LOSE     │
/// │ right < left        │ LOSE     │ WIN      │
/// │ right == left       │ LOSE     │ LOSE     │
/// └────────────────────┴──────────┴──────────┘
///
/// A tie can never be won: neither strict comparison holds.

/// Player's claim about the right-hand activity relative to the left.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Guess {
    Higher,
    Lower,
}

/// Is `guess` correct for the pair `(left, right)`?
pub fn judge(guess: Guess, left: f64, right: f64) -> bool {
    match guess {
        Guess::Higher => right > left,
        Guess::Lower => right < left,
    }
}

// ── Leaderboard ──

pub const LEADERBOARD_SLOTS: usize = 5;

/// The five largest scores, descending, zero-padded.
///
/// Repeated max-extraction: each pick removes exactly one entry, so equal
/// scores each keep their own slot.
pub fn top_five(scores: &[u32]) -> [u32; LEADERBOARD_SLOTS] {
    let mut pool: Vec<u32> = scores.to_vec();
    let mut top = [0u32; LEADERBOARD_SLOTS];
    for slot in top.iter_mut() {
        let best = pool
            .iter()
            .enumerate()
            .max_by_key(|&(i, v)| (*v, std::cmp::Reverse(i)))
            .map(|(i, v)| (i, *v));
        match best {
            Some((i, v)) => {
                *slot = v;
                pool.swap_remove(i);
            }
            None => break,
        }
    }
    top
}

// ── Curves ──

/// Ease-out quintic: fast start, gentle landing. `t` in `[0, 1]`.
pub fn ease_out_quint(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(5)
}

/// X positions of the three panels during a slide transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SlideFrame {
    /// Outgoing left panel, heading off-screen left.
    pub outgoing: i32,
    /// Former right panel, moving into the left slot.
    pub shifting: i32,
    /// New right panel, arriving from off-screen right.
    pub incoming: i32,
}

/// `steps + 1` frames from the start layout to the end layout.
///
/// `panel_w` is the width of one activity panel; the screen holds two.
pub fn slide_frames(steps: u32, panel_w: i32) -> Vec<SlideFrame> {
    let steps = steps.max(1);
    let screen_w = panel_w * 2;
    let lerp = |from: i32, to: i32, t: f32| from + ((to - from) as f32 * t) as i32;
    (0..=steps)
        .map(|i| {
            let t = ease_out_quint(i as f32 / steps as f32);
            SlideFrame {
                outgoing: lerp(0, -panel_w, t),
                shifting: lerp(panel_w, 0, t),
                incoming: lerp(screen_w, panel_w, t),
            }
        })
        .collect()
}

/// Intermediate values of the reveal counter: `steps` linear increments
/// from 0 up to `target`, never overshooting. The last value is `target`.
pub fn reveal_values(target: f64, steps: u32) -> Vec<f64> {
    let steps = steps.max(1);
    let mut increment = target / steps as f64;
    let mut current = 0.0;
    (0..steps)
        .map(|_| {
            if current + increment > target {
                increment = target - current;
            }
            current += increment;
            current
        })
        .collect()
}
