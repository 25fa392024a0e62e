pub mod assets;
pub mod draw;
pub mod input;
pub mod sound;
pub mod surface;
pub mod terminal;
