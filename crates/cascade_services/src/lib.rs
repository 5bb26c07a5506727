//! Cascade Services Layer
//!
//! Platform-facing services. Currently: settings files.

pub mod settings;

pub use settings::{Settings, SettingsError, WindowSettings};
