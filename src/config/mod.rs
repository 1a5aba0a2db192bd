mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config.
///
/// Tool overrides from the environment are applied on top in every case.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    let mut config = find_config(custom_path)?;
    config.apply_env_overrides();
    Ok(config)
}

fn find_config(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./toolforged.toml",
        "~/.config/toolforged/config.toml",
        "/etc/toolforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.tools.probe_timeout_secs == Some(0) {
        anyhow::bail!("tools.probe_timeout_secs cannot be 0");
    }

    if let Some(dir) = &config.tools.resources_dir {
        if !dir.is_dir() {
            tracing::warn!("Resources directory does not exist: {:?}", dir);
        }
    }

    for kind in toolforged_av::ToolKind::ALL {
        if config.settings.contains_key(kind.setting_name()) {
            anyhow::bail!(
                "{} cannot be set in [settings]; use the [tools] section",
                kind.setting_name()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingValue;
    use toolforged_av::{ToolKind, ToolOverride};

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_auto_detect() {
        let config = Config::default();
        assert_eq!(config.tools.override_for(ToolKind::Codec), ToolOverride::AutoDetect);
        assert_eq!(config.tools.override_for(ToolKind::Image), ToolOverride::AutoDetect);
        assert_eq!(config.tools.probe_timeout(), None);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[tools]
ffmpeg_binary = "/opt/ffmpeg/bin/ffmpeg"
probe_timeout_secs = 5

[settings]
DEFAULT_FPS = 24
TEMP_DIR = "/tmp/render"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.tools.override_for(ToolKind::Codec),
            ToolOverride::Path("/opt/ffmpeg/bin/ffmpeg".to_string())
        );
        assert_eq!(config.tools.imagemagick_binary, "auto-detect");
        assert_eq!(config.tools.probe_timeout_secs, Some(5));
        assert_eq!(config.settings["DEFAULT_FPS"], SettingValue::Integer(24));
        assert_eq!(config.settings["TEMP_DIR"], SettingValue::from("/tmp/render"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config("[tools]\nprobe_timeout_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("probe_timeout_secs"));
    }

    #[test]
    fn test_tool_keys_rejected_in_settings() {
        let file = write_config("[settings]\nFFMPEG_BINARY = \"ffmpeg\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_non_scalar_setting_rejected() {
        let file = write_config("[settings]\nCODECS = [\"h264\", \"vp9\"]\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/toolforged.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|name| match name {
            "IMAGEMAGICK_BINARY" => Some("/usr/bin/convert".to_string()),
            "FFMPEG_BINARY" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.tools.imagemagick_binary, "/usr/bin/convert");
        assert_eq!(config.tools.ffmpeg_binary, "auto-detect");
    }
}
