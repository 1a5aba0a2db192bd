//! Descriptions of the two managed external tools.

use crate::platform::PlatformTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Override value meaning "search for the tool instead of trusting a path".
pub const AUTO_DETECT: &str = "auto-detect";

/// Stored value meaning "no working binary was found".
pub const UNSET: &str = "unset";

/// Bundled ffmpeg builds, keyed by platform. There is no 32-bit Linux or
/// 32-bit macOS build.
const FFMPEG_BUNDLED: &[(PlatformTag, &str)] = &[
    (PlatformTag::Osx64, "ffmpeg-osx64-v4.1"),
    (PlatformTag::Win32, "ffmpeg-win32-v4.1.exe"),
    (PlatformTag::Win64, "ffmpeg-win64-v4.1.exe"),
    (PlatformTag::Linux64, "ffmpeg-linux64-v4.1"),
];

/// Which external tool a [`ToolSpec`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// The video/audio converter (ffmpeg).
    Codec,
    /// The image converter (ImageMagick).
    Image,
}

impl ToolKind {
    /// Both kinds, in resolution order.
    pub const ALL: [ToolKind; 2] = [ToolKind::Codec, ToolKind::Image];

    /// Settings key holding the resolved location.
    pub fn setting_name(self) -> &'static str {
        match self {
            Self::Codec => "FFMPEG_BINARY",
            Self::Image => "IMAGEMAGICK_BINARY",
        }
    }

    /// Human-readable tool name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Codec => "ffmpeg",
            Self::Image => "ImageMagick",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// User-supplied location for a tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolOverride {
    /// Search for the tool.
    #[default]
    AutoDetect,
    /// Trust this path or command name, after validating it.
    Path(String),
}

impl ToolOverride {
    /// Parse a configured value; empty or exactly `"auto-detect"` means
    /// [`ToolOverride::AutoDetect`]. Anything else is kept verbatim.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == AUTO_DETECT {
            Self::AutoDetect
        } else {
            Self::Path(value.to_string())
        }
    }

    /// The configured value, with auto-detect spelled as the sentinel.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AutoDetect => AUTO_DETECT,
            Self::Path(path) => path,
        }
    }
}

impl From<&str> for ToolOverride {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// A string value under `HKEY_LOCAL_MACHINE` naming a directory that holds
/// the tool's executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLocation {
    /// Subkey path below `HKEY_LOCAL_MACHINE`.
    pub key: &'static str,
    /// Name of the string value holding the install directory.
    pub value: &'static str,
    /// File name appended to the directory.
    pub executable: &'static str,
}

/// Everything the resolver needs to know about one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub kind: ToolKind,
    /// Settings key for the resolved location.
    pub name: String,
    pub user_override: ToolOverride,
    /// Bare command names tried on the search path, in order.
    pub search_names: Vec<String>,
    /// Extra names tried after `search_names` on Windows only.
    pub windows_alt_names: Vec<String>,
    /// Bundled binary file names by platform.
    pub bundled_filenames: BTreeMap<PlatformTag, String>,
    /// Where Windows installs record the tool. When present, Windows
    /// discovery consults only the registry.
    pub registry: Option<RegistryLocation>,
    /// Arguments proving the binary is the expected tool.
    pub validation_args: Vec<String>,
    /// Overrides must name an existing regular file, checked before probing.
    pub require_existing_file: bool,
}

impl ToolSpec {
    /// Compiled-in defaults for ffmpeg.
    pub fn codec() -> Self {
        Self {
            kind: ToolKind::Codec,
            name: ToolKind::Codec.setting_name().to_string(),
            user_override: ToolOverride::AutoDetect,
            search_names: vec!["ffmpeg".to_string()],
            windows_alt_names: vec!["ffmpeg.exe".to_string()],
            bundled_filenames: FFMPEG_BUNDLED
                .iter()
                .map(|(tag, file)| (*tag, file.to_string()))
                .collect(),
            registry: None,
            validation_args: vec!["-version".to_string()],
            require_existing_file: false,
        }
    }

    /// Compiled-in defaults for ImageMagick.
    pub fn image() -> Self {
        Self {
            kind: ToolKind::Image,
            name: ToolKind::Image.setting_name().to_string(),
            user_override: ToolOverride::AutoDetect,
            search_names: vec!["convert".to_string()],
            windows_alt_names: Vec::new(),
            bundled_filenames: BTreeMap::new(),
            registry: Some(RegistryLocation {
                key: r"SOFTWARE\ImageMagick\Current",
                value: "BinPath",
                executable: "convert.exe",
            }),
            validation_args: vec!["-version".to_string()],
            require_existing_file: true,
        }
    }

    /// Defaults for `kind`.
    pub fn for_kind(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Codec => Self::codec(),
            ToolKind::Image => Self::image(),
        }
    }

    /// Replace the user override.
    pub fn with_override(mut self, user_override: impl Into<ToolOverride>) -> Self {
        self.user_override = user_override.into();
        self
    }

    /// Bundled file name for `platform`, if one is shipped.
    pub fn bundled_filename(&self, platform: PlatformTag) -> Option<&str> {
        self.bundled_filenames.get(&platform).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_parse() {
        assert_eq!(ToolOverride::parse("auto-detect"), ToolOverride::AutoDetect);
        assert_eq!(ToolOverride::parse(""), ToolOverride::AutoDetect);
        assert_eq!(
            ToolOverride::parse("/usr/local/bin/ffmpeg"),
            ToolOverride::Path("/usr/local/bin/ffmpeg".to_string())
        );
        assert_eq!(ToolOverride::AutoDetect.as_str(), AUTO_DETECT);
    }

    #[test]
    fn test_override_kept_as_given() {
        assert_eq!(
            ToolOverride::parse("AUTO-DETECT"),
            ToolOverride::Path("AUTO-DETECT".to_string())
        );
        assert_eq!(
            ToolOverride::parse(" /opt/ffmpeg "),
            ToolOverride::Path(" /opt/ffmpeg ".to_string())
        );
    }

    #[test]
    fn test_codec_bundled_names() {
        let spec = ToolSpec::codec();
        assert_eq!(spec.bundled_filename(PlatformTag::Linux64), Some("ffmpeg-linux64-v4.1"));
        assert_eq!(spec.bundled_filename(PlatformTag::Win32), Some("ffmpeg-win32-v4.1.exe"));
        assert_eq!(spec.bundled_filename(PlatformTag::Linux32), None);
        assert_eq!(spec.bundled_filename(PlatformTag::Osx32), None);
        assert_eq!(spec.bundled_filename(PlatformTag::Unknown), None);
    }

    #[test]
    fn test_image_defaults() {
        let spec = ToolSpec::image();
        assert_eq!(spec.name, "IMAGEMAGICK_BINARY");
        assert!(spec.require_existing_file);
        assert!(spec.bundled_filenames.is_empty());
        assert_eq!(spec.registry.unwrap().executable, "convert.exe");
    }

    #[test]
    fn test_with_override() {
        let spec = ToolSpec::for_kind(ToolKind::Codec).with_override("/opt/ffmpeg");
        assert_eq!(spec.user_override, ToolOverride::Path("/opt/ffmpeg".to_string()));
        assert_eq!(spec.kind.to_string(), "ffmpeg");
    }
}
