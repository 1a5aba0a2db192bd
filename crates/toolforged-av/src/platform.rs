//! Host platform identification.
//!
//! The [`PlatformTag`] selects which bundled binary name applies and whether
//! discovery goes through the Windows registry or the search path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating-system family plus pointer width of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Linux32,
    Linux64,
    Win32,
    Win64,
    Osx32,
    Osx64,
    /// Unrecognized OS or pointer width. No bundled binary exists for it.
    Unknown,
}

impl PlatformTag {
    /// All tags, in declaration order.
    pub const ALL: [PlatformTag; 7] = [
        PlatformTag::Linux32,
        PlatformTag::Linux64,
        PlatformTag::Win32,
        PlatformTag::Win64,
        PlatformTag::Osx32,
        PlatformTag::Osx64,
        PlatformTag::Unknown,
    ];

    /// Map an OS name (as in [`std::env::consts::OS`]) and a pointer width in
    /// bits to a tag.
    ///
    /// # Example
    ///
    /// ```
    /// use toolforged_av::PlatformTag;
    ///
    /// assert_eq!(PlatformTag::from_parts("linux", 64), PlatformTag::Linux64);
    /// assert_eq!(PlatformTag::from_parts("cygwin", 32), PlatformTag::Win32);
    /// assert_eq!(PlatformTag::from_parts("haiku", 64), PlatformTag::Unknown);
    /// ```
    pub fn from_parts(os: &str, bits: u32) -> Self {
        match (os, bits) {
            ("linux", 32) => Self::Linux32,
            ("linux", 64) => Self::Linux64,
            ("windows" | "cygwin", 32) => Self::Win32,
            ("windows" | "cygwin", 64) => Self::Win64,
            ("macos" | "darwin", 32) => Self::Osx32,
            ("macos" | "darwin", 64) => Self::Osx64,
            _ => Self::Unknown,
        }
    }

    /// Whether this is one of the Windows tags.
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Win32 | Self::Win64)
    }

    /// Pointer width of the tag, if known.
    pub fn bits(self) -> Option<u32> {
        match self {
            Self::Linux32 | Self::Win32 | Self::Osx32 => Some(32),
            Self::Linux64 | Self::Win64 | Self::Osx64 => Some(64),
            Self::Unknown => None,
        }
    }

    /// Lowercase tag string, e.g. `"linux64"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux32 => "linux32",
            Self::Linux64 => "linux64",
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Osx32 => "osx32",
            Self::Osx64 => "osx64",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown platform tag: {s}"))
    }
}

/// Pointer width of the running process in bits.
pub fn pointer_width() -> u32 {
    (std::mem::size_of::<*const ()>() * 8) as u32
}

/// Identify the platform this process is running on.
pub fn identify() -> PlatformTag {
    PlatformTag::from_parts(std::env::consts::OS, pointer_width())
}
