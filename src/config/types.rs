use crate::settings::SettingValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use toolforged_av::{ToolKind, ToolOverride, AUTO_DETECT};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Extra constants seeded into the settings store.
    #[serde(default)]
    pub settings: BTreeMap<String, SettingValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Path or command name for ffmpeg, or "auto-detect"
    #[serde(default = "default_auto_detect")]
    pub ffmpeg_binary: String,

    /// Path to ImageMagick's convert, or "auto-detect"
    #[serde(default = "default_auto_detect")]
    pub imagemagick_binary: String,

    /// Directory holding bundled ffmpeg builds
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    /// Kill probes running longer than this (unset = wait indefinitely)
    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,
}

fn default_auto_detect() -> String {
    AUTO_DETECT.to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: default_auto_detect(),
            imagemagick_binary: default_auto_detect(),
            resources_dir: None,
            probe_timeout_secs: None,
        }
    }
}

impl ToolsConfig {
    /// Configured override for `kind`.
    pub fn override_for(&self, kind: ToolKind) -> ToolOverride {
        match kind {
            ToolKind::Codec => ToolOverride::parse(&self.ffmpeg_binary),
            ToolKind::Image => ToolOverride::parse(&self.imagemagick_binary),
        }
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    /// Configured resources directory, else the default bundled location.
    pub fn resources_dir(&self) -> Option<PathBuf> {
        self.resources_dir
            .clone()
            .or_else(toolforged_av::default_resources_dir)
    }
}

impl Config {
    /// Apply `FFMPEG_BINARY` / `IMAGEMAGICK_BINARY` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply tool overrides using `lookup` to read variables.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for kind in ToolKind::ALL {
            let Some(value) = lookup(kind.setting_name()).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            tracing::debug!("{} overridden from environment: {}", kind.setting_name(), value);
            match kind {
                ToolKind::Codec => self.tools.ffmpeg_binary = value,
                ToolKind::Image => self.tools.imagemagick_binary = value,
            }
        }
    }
}
