//! Animated greeting: a sequence of slide messages, then a letter typed out word by word.

pub mod app;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod events;
pub mod letter;
pub mod particles;
pub mod render;
pub mod sequencer;
pub mod slide;
pub mod slideshow;
pub mod stage;
pub mod timers;
