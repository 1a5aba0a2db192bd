//! Availability checks for resolved tools.

use crate::process::Launcher;
use crate::resolver::Resolution;
use crate::toolspec::ToolKind;
use serde::Serialize;
use std::path::PathBuf;

/// Information about an external tool after resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Which tool this is.
    pub kind: ToolKind,
    /// Settings key holding the location.
    pub setting: String,
    /// Value stored in settings (a path, a command name or `"unset"`).
    pub value: String,
    /// Whether the tool could be run.
    pub available: bool,
    /// First line of the version output, if available.
    pub version: Option<String>,
    /// Absolute path of the executable, when it can be located.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    /// One-line success or failure summary.
    pub fn summary(&self) -> String {
        if self.available {
            format!("{} successfully found.", self.kind)
        } else {
            format!("can't find or access {}.", self.kind)
        }
    }
}

/// Check whether the resolved location of `kind` can be run.
///
/// # Example
///
/// ```no_run
/// use toolforged_av::{check_tool, Resolution, SystemLauncher, ToolKind};
///
/// let info = check_tool(
///     &SystemLauncher::new(),
///     ToolKind::Codec,
///     &Resolution::Resolved("ffmpeg".to_string()),
/// );
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(launcher: &dyn Launcher, kind: ToolKind, resolution: &Resolution) -> ToolInfo {
    let setting = kind.setting_name().to_string();
    let value = resolution.as_setting().to_string();

    let Some(program) = resolution.path() else {
        return ToolInfo {
            kind,
            setting,
            value,
            available: false,
            version: None,
            path: None,
        };
    };

    let result = launcher.probe(&[program.to_string(), "-version".to_string()]);
    let version = result
        .output()
        .filter(|output| output.success())
        .and_then(|output| output.stdout.lines().next())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty());

    ToolInfo {
        kind,
        setting,
        value,
        available: result.ok(),
        version,
        path: which::which(program).ok(),
    }
}
