//! File-backed adapters for the host collaborators, plus telemetry.

mod atomic;
pub mod catalog;
pub mod error;
pub mod settings_store;
pub mod telemetry;
pub mod transients;
