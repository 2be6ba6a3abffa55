//! Request handlers.

pub mod cloud;
pub mod editor;
pub mod health;
pub mod styles;
pub mod video;

pub use health::*;
