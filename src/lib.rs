//! Toolforged - locates the external binaries a media pipeline depends on
//!
//! This library crate exposes the settings store and configuration loading
//! used by the binary, and by applications embedding the resolution step.

pub mod config;
pub mod settings;

pub use settings::{change_settings, get_setting, SettingValue, SettingsError, SettingsStore};
