//! Per-platform discovery rules.
//!
//! The resolver asks a [`Discovery`] which bare command names to try on the
//! search path and whether the OS has a recorded install location. One
//! implementation exists per platform family; [`discovery_for`] picks it.

use crate::platform::PlatformTag;
use crate::registry::{RegistryReader, SystemRegistry};
use crate::toolspec::ToolSpec;

/// Platform-specific candidate sources for a tool.
pub trait Discovery: Send + Sync {
    /// Bare command names to try on the search path, in order.
    fn search_names(&self, spec: &ToolSpec) -> Vec<String>;

    /// Install location recorded by the OS. Trusted without probing.
    fn registered_path(&self, spec: &ToolSpec) -> Option<String>;
}

/// Linux, macOS and anything else that is not Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixDiscovery;

impl Discovery for PosixDiscovery {
    fn search_names(&self, spec: &ToolSpec) -> Vec<String> {
        spec.search_names.clone()
    }

    fn registered_path(&self, _spec: &ToolSpec) -> Option<String> {
        None
    }
}

/// Windows: alternate `.exe` names and registry lookups.
#[derive(Debug, Clone, Default)]
pub struct WindowsDiscovery<R = SystemRegistry> {
    registry: R,
}

impl<R: RegistryReader> WindowsDiscovery<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }
}

impl<R: RegistryReader> Discovery for WindowsDiscovery<R> {
    fn search_names(&self, spec: &ToolSpec) -> Vec<String> {
        // `convert` on a Windows search path is the system disk converter,
        // so registry-located tools are never looked up by name.
        if spec.registry.is_some() {
            return Vec::new();
        }
        spec.search_names
            .iter()
            .chain(&spec.windows_alt_names)
            .cloned()
            .collect()
    }

    fn registered_path(&self, spec: &ToolSpec) -> Option<String> {
        let location = spec.registry?;
        let dir = self.registry.read_string(location.key, location.value)?;
        let dir = dir.trim_end_matches(['\\', '/']);
        if dir.is_empty() {
            return None;
        }
        Some(format!(r"{dir}\{}", location.executable))
    }
}

/// Discovery rules for `platform`.
pub fn discovery_for(platform: PlatformTag) -> Box<dyn Discovery> {
    if platform.is_windows() {
        Box::new(WindowsDiscovery::new(SystemRegistry))
    } else {
        Box::new(PosixDiscovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeRegistry(HashMap<(String, String), String>);

    impl FakeRegistry {
        fn with(key: &str, value: &str, data: &str) -> Self {
            let mut map = HashMap::new();
            map.insert((key.to_string(), value.to_string()), data.to_string());
            Self(map)
        }
    }

    impl RegistryReader for FakeRegistry {
        fn read_string(&self, key: &str, value: &str) -> Option<String> {
            self.0.get(&(key.to_string(), value.to_string())).cloned()
        }
    }

    #[test]
    fn test_posix_uses_plain_names() {
        let d = PosixDiscovery;
        assert_eq!(d.search_names(&ToolSpec::codec()), vec!["ffmpeg"]);
        assert_eq!(d.search_names(&ToolSpec::image()), vec!["convert"]);
        assert_eq!(d.registered_path(&ToolSpec::image()), None);
    }

    #[test]
    fn test_windows_adds_exe_name_for_codec() {
        let d = WindowsDiscovery::new(FakeRegistry::default());
        assert_eq!(
            d.search_names(&ToolSpec::codec()),
            vec!["ffmpeg", "ffmpeg.exe"]
        );
        assert_eq!(d.registered_path(&ToolSpec::codec()), None);
    }

    #[test]
    fn test_windows_image_uses_registry_only() {
        let d = WindowsDiscovery::new(FakeRegistry::with(
            r"SOFTWARE\ImageMagick\Current",
            "BinPath",
            r"C:\Program Files\ImageMagick-7.1.1-Q16-HDRI",
        ));
        assert!(d.search_names(&ToolSpec::image()).is_empty());
        assert_eq!(
            d.registered_path(&ToolSpec::image()).as_deref(),
            Some(r"C:\Program Files\ImageMagick-7.1.1-Q16-HDRI\convert.exe")
        );
    }

    #[test]
    fn test_windows_registry_trailing_separator() {
        let d = WindowsDiscovery::new(FakeRegistry::with(
            r"SOFTWARE\ImageMagick\Current",
            "BinPath",
            r"C:\ImageMagick\",
        ));
        assert_eq!(
            d.registered_path(&ToolSpec::image()).as_deref(),
            Some(r"C:\ImageMagick\convert.exe")
        );
    }

    #[test]
    fn test_windows_registry_miss() {
        let d = WindowsDiscovery::new(FakeRegistry::default());
        assert_eq!(d.registered_path(&ToolSpec::image()), None);
    }

    #[test]
    fn test_discovery_for_selects_family() {
        let spec = ToolSpec::codec();
        assert_eq!(discovery_for(PlatformTag::Win64).search_names(&spec).len(), 2);
        assert_eq!(discovery_for(PlatformTag::Linux64).search_names(&spec).len(), 1);
        assert_eq!(discovery_for(PlatformTag::Unknown).search_names(&spec).len(), 1);
    }
}
