//! Location of bundled binaries.

use std::path::{Path, PathBuf};

/// Environment variable naming the bundled-binaries directory.
pub const RESOURCES_DIR_ENV: &str = "TOOLFORGED_RESOURCES_DIR";

/// Name of the bundled-binaries directory next to the executable.
const BUNDLED_DIR_NAME: &str = "binaries";

/// Find the directory holding bundled binaries.
///
/// Checks [`RESOURCES_DIR_ENV`] first, then a `binaries/` directory next to
/// the running executable. Returns `None` when neither exists, which disables
/// the bundled-binary strategy.
pub fn default_resources_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(RESOURCES_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }

    let exe = std::env::current_exe().ok()?;
    bundled_dir_beside(&exe)
}

/// `binaries/` next to `exe`, if it is a directory.
pub fn bundled_dir_beside(exe: &Path) -> Option<PathBuf> {
    let candidate = exe.parent()?.join(BUNDLED_DIR_NAME);
    candidate.is_dir().then_some(candidate)
}
