//! "Posts on this day" widget engine.
//!
//! Finds posts published on or around today's calendar day in years past,
//! caches the grouped result until local midnight and renders it as an HTML
//! fragment.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
