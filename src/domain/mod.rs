pub mod activity;
pub mod pick;
pub mod rules;
