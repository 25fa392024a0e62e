/// Random index selection for seeding and advancing a round.

use rand::Rng;

/// Resample budget before the successor falls back to `current + 1`.
pub const SUCCESSOR_ATTEMPTS: u32 = 10;

/// Uniform draws in `[0, n)`.
pub trait Dice {
    fn roll(&mut self, n: usize) -> usize;
}

/// `Dice` backed by any `rand` generator.
pub struct RngDice<R>(pub R);

impl<R: Rng> Dice for RngDice<R> {
    fn roll(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}

/// Two distinct indices in `[0, n)`. The second is resampled until it
/// differs from the first. Requires `n >= 2`.
pub fn pick_pair(n: usize, dice: &mut impl Dice) -> (usize, usize) {
    debug_assert!(n >= 2, "pick_pair needs at least two entries");
    let first = dice.roll(n);
    let mut second = dice.roll(n);
    while second == first {
        second = dice.roll(n);
    }
    (first, second)
}

/// A new index different from `current`.
///
/// At most `SUCCESSOR_ATTEMPTS` draws are made; if every one collides the
/// result is `(current + 1) % n`, so this always terminates.
pub fn pick_successor(n: usize, current: usize, dice: &mut impl Dice) -> usize {
    debug_assert!(n >= 2, "pick_successor needs at least two entries");
    for _ in 0..SUCCESSOR_ATTEMPTS {
        let candidate = dice.roll(n);
        if candidate != current {
            return candidate;
        }
    }
    (current + 1) % n
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays a fixed sequence of draws (each reduced mod n), then repeats the last.
    pub struct ScriptedDice {
        draws: Vec<usize>,
        pos: usize,
        pub rolls: usize,
    }

    impl ScriptedDice {
        pub fn new(draws: &[usize]) -> Self {
            ScriptedDice { draws: draws.to_vec(), pos: 0, rolls: 0 }
        }
    }

    impl Dice for ScriptedDice {
        fn roll(&mut self, n: usize) -> usize {
            self.rolls += 1;
            let v = self.draws[self.pos.min(self.draws.len() - 1)];
            self.pos += 1;
            v % n
        }
    }

    #[test]
    fn pair_is_distinct_and_in_range() {
        let mut dice = RngDice(StdRng::seed_from_u64(7));
        for n in 2..40 {
            for _ in 0..50 {
                let (a, b) = pick_pair(n, &mut dice);
                assert!(a < n && b < n);
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn pair_resamples_second_on_collision() {
        let mut dice = ScriptedDice::new(&[3, 3, 3, 5]);
        assert_eq!(pick_pair(10, &mut dice), (3, 5));
        assert_eq!(dice.rolls, 4);
    }

    #[test]
    fn successor_is_distinct_and_in_range() {
        let mut dice = RngDice(StdRng::seed_from_u64(11));
        for n in 2..40 {
            for current in 0..n {
                let next = pick_successor(n, current, &mut dice);
                assert!(next < n);
                assert_ne!(next, current);
            }
        }
    }

    #[test]
    fn successor_accepts_first_non_colliding_draw() {
        let mut dice = ScriptedDice::new(&[4, 4, 2]);
        assert_eq!(pick_successor(8, 4, &mut dice), 2);
        assert_eq!(dice.rolls, 3);
    }

    #[test]
    fn successor_falls_back_after_bounded_collisions() {
        // Always draws `current`: exactly ten attempts, then the fallback.
        let mut dice = ScriptedDice::new(&[6]);
        assert_eq!(pick_successor(8, 6, &mut dice), 7);
        assert_eq!(dice.rolls, SUCCESSOR_ATTEMPTS as usize);
    }

    #[test]
    fn successor_fallback_wraps_around() {
        let mut dice = ScriptedDice::new(&[7]);
        assert_eq!(pick_successor(8, 7, &mut dice), 0);
    }

    #[test]
    fn successor_uses_eleventh_value_never() {
        let mut script = vec![2; 10];
        script.push(5);
        let mut dice = ScriptedDice::new(&script);
        assert_eq!(pick_successor(8, 2, &mut dice), 3);
    }
}
