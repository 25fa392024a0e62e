pub mod game;
pub mod ledger;
pub mod round;
pub mod screen;
