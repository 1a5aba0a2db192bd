//! Tool resolution.
//!
//! [`Resolver::resolve`] turns a [`ToolSpec`] into a [`Resolution`]:
//!
//! 1. An explicit override is authoritative. It must pass validation, and
//!    when it does not the error is returned to the caller.
//! 2. Otherwise candidates are tried in order, stopping at the first hit:
//!    bare command names on the search path, the bundled binary for this
//!    platform, then the install location recorded in the registry.
//! 3. When nothing is found the tool is [`Resolution::Unset`]. That is not an
//!    error here; code that needs the tool fails when it tries to use it.

use crate::discovery::{discovery_for, Discovery};
use crate::error::{Error, Result};
use crate::platform::{identify, PlatformTag};
use crate::process::{Launcher, SystemLauncher};
use crate::toolspec::{ToolOverride, ToolSpec, UNSET};
use crate::validate::validate;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a tool was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A filesystem path, or a bare command name found on the search path.
    Resolved(String),
    /// No working binary was found.
    Unset,
}

impl Resolution {
    /// The resolved path or command name.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Value stored in settings: the path, or `"unset"`.
    pub fn as_setting(&self) -> &str {
        self.path().unwrap_or(UNSET)
    }

    /// Inverse of [`Resolution::as_setting`].
    pub fn from_setting(value: &str) -> Self {
        if value == UNSET {
            Self::Unset
        } else {
            Self::Resolved(value.to_string())
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_setting())
    }
}

/// Resolves tools for one platform.
pub struct Resolver {
    platform: PlatformTag,
    launcher: Arc<dyn Launcher>,
    discovery: Box<dyn Discovery>,
    resources_dir: Option<PathBuf>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("platform", &self.platform)
            .field("resources_dir", &self.resources_dir)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Resolver for `platform` that spawns real processes.
    pub fn new(platform: PlatformTag) -> Self {
        Self {
            platform,
            launcher: Arc::new(SystemLauncher::new()),
            discovery: discovery_for(platform),
            resources_dir: None,
        }
    }

    /// Resolver for the host platform.
    pub fn system() -> Self {
        Self::new(identify())
    }

    /// Use `launcher` to run probes.
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Replace the platform discovery rules.
    pub fn with_discovery(mut self, discovery: Box<dyn Discovery>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Directory holding bundled binaries. `None` disables that strategy.
    pub fn with_resources_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.resources_dir = dir;
        self
    }

    pub fn platform(&self) -> PlatformTag {
        self.platform
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    pub fn resources_dir(&self) -> Option<&Path> {
        self.resources_dir.as_deref()
    }

    /// Resolve `spec`.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicit override is broken: the path is
    /// missing or not a file (for tools requiring a file), or the binary fails
    /// validation.
    pub fn resolve(&self, spec: &ToolSpec) -> Result<Resolution> {
        let resolution = match &spec.user_override {
            ToolOverride::Path(path) => Resolution::Resolved(self.resolve_override(spec, path)?),
            ToolOverride::AutoDetect => self.auto_detect(spec),
        };

        #[cfg(feature = "tracing")]
        tracing::info!("{} resolved to {}", spec.name, resolution);

        Ok(resolution)
    }

    fn resolve_override(&self, spec: &ToolSpec, path: &str) -> Result<String> {
        if spec.require_existing_file {
            let candidate = Path::new(path);
            if !candidate.exists() {
                return Err(Error::override_not_found(spec.kind, path));
            }
            if !candidate.is_file() {
                return Err(Error::override_not_a_file(spec.kind, path));
            }
        }

        validate(self.launcher(), path, &spec.validation_args)
            .map_err(|cause| Error::invalid_override(spec.kind, path, cause))?;

        Ok(path.to_string())
    }

    fn auto_detect(&self, spec: &ToolSpec) -> Resolution {
        for name in self.discovery.search_names(spec) {
            if self.runs(&name, spec) {
                return Resolution::Resolved(name);
            }
        }

        if let Some(path) = self.bundled_candidate(spec) {
            return Resolution::Resolved(path);
        }

        if let Some(path) = self.discovery.registered_path(spec) {
            #[cfg(feature = "tracing")]
            tracing::debug!("{} found in registry at {}", spec.name, path);
            return Resolution::Resolved(path);
        }

        Resolution::Unset
    }

    /// Basic probe: the command has to start and finish, exit status aside.
    fn runs(&self, program: &str, spec: &ToolSpec) -> bool {
        let argv: Vec<String> = std::iter::once(program.to_string())
            .chain(spec.validation_args.iter().cloned())
            .collect();
        let ok = self.launcher.probe(&argv).ok();

        #[cfg(feature = "tracing")]
        tracing::debug!("{}: search path candidate {:?} ok={}", spec.name, program, ok);

        ok
    }

    fn bundled_candidate(&self, spec: &ToolSpec) -> Option<String> {
        let dir = self.resources_dir.as_ref()?;
        let filename = spec.bundled_filename(self.platform)?;
        let candidate = dir.join(filename);
        if !candidate.is_file() {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}: no bundled binary at {}", spec.name, candidate.display());
            return None;
        }

        let candidate = candidate.to_string_lossy().into_owned();
        match validate(self.launcher(), &candidate, &spec.validation_args) {
            Ok(_) => Some(candidate),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{}: bundled binary {} rejected: {}", spec.name, candidate, _err);
                None
            }
        }
    }
}
