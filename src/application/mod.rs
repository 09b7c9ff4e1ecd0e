//! Application services orchestrating lookups, rendering and settings.

pub mod error;
pub mod hooks;
pub mod lookup;
pub mod repos;
pub mod settings;
pub mod widget;
