//! Askama views for the widget, its items and the settings form.

pub mod views;
