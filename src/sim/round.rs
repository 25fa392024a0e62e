/// Round state: the reference activity, the one being judged, and the score.
///
/// Invariant while active: `left != right`.
///   - Correct guess → score + 1, right becomes left, fresh right drawn
///   - Wrong guess   → round over, score frozen as the final score

use crate::domain::activity::Catalog;
use crate::domain::pick::{pick_pair, pick_successor, Dice};
use crate::domain::rules::{judge, Guess};
use crate::error::{GameError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub left: usize,
    pub right: usize,
    pub score: u32,
    pub active: bool,
}

/// Result of one guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Panels before the shift plus the newly drawn right activity.
    Correct { outgoing: usize, promoted: usize, incoming: usize },
    Wrong { final_score: u32 },
}

impl Round {
    /// Seed a round with two distinct activities.
    pub fn start(catalog: &Catalog, dice: &mut impl Dice) -> Result<Self> {
        if catalog.len() < 2 {
            return Err(GameError::CatalogTooSmall { count: catalog.len() });
        }
        let (left, right) = pick_pair(catalog.len(), dice);
        tracing::debug!(left, right, "round started");
        Ok(Round { left, right, score: 0, active: true })
    }

    /// Judge `guess` and advance. Must not be called once the round is over.
    pub fn guess(&mut self, catalog: &Catalog, guess: Guess, dice: &mut impl Dice) -> Verdict {
        assert!(self.active, "guess on a finished round");
        let left = catalog.get(self.left).co2;
        let right = catalog.get(self.right).co2;

        if judge(guess, left, right) {
            self.score += 1;
            let outgoing = self.left;
            let promoted = self.right;
            let incoming = pick_successor(catalog.len(), promoted, dice);
            self.left = promoted;
            self.right = incoming;
            tracing::debug!(?guess, left, right, score = self.score, "correct");
            Verdict::Correct { outgoing, promoted, incoming }
        } else {
            self.active = false;
            tracing::debug!(?guess, left, right, score = self.score, "wrong");
            Verdict::Wrong { final_score: self.score }
        }
    }
}
