//! # toolforged-av
//!
//! Discovery and validation of the external binaries a media pipeline shells
//! out to: ffmpeg (the codec tool) and ImageMagick (the image tool).
//!
//! This crate provides:
//!
//! - **Platform identification** ([`identify`]) -- OS family plus pointer
//!   width, as a [`PlatformTag`].
//! - **Process probing** ([`Launcher`], [`SystemLauncher`]) -- run a command
//!   with stdin closed, output captured, no console window and no shared
//!   process group.
//! - **Validation** ([`validate()`]) -- a probe that must also exit zero.
//! - **Resolution** ([`Resolver`]) -- explicit override, search path, bundled
//!   binary, registry, or [`Resolution::Unset`].
//! - **Availability checks** ([`check_tool`]) -- version and location of a
//!   resolved tool.
//!
//! ## Features
//!
//! - `tracing` - Log probes and resolution results
//!
//! ## Example
//!
//! ```no_run
//! use toolforged_av::{Resolver, ToolSpec};
//!
//! let resolver = Resolver::system();
//! let ffmpeg = resolver.resolve(&ToolSpec::codec())?;
//! match ffmpeg.path() {
//!     Some(path) => println!("ffmpeg: {path}"),
//!     None => println!("ffmpeg not found"),
//! }
//! # Ok::<(), toolforged_av::Error>(())
//! ```

pub mod discovery;
mod error;
pub mod paths;
pub mod platform;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod tools;
pub mod toolspec;
pub mod validate;

// Re-exports
pub use discovery::{discovery_for, Discovery, PosixDiscovery, WindowsDiscovery};
pub use error::{Error, Result};
pub use paths::default_resources_dir;
pub use platform::{identify, PlatformTag};
pub use process::{Launcher, ProbeOutput, ProbeResult, SystemLauncher};
pub use registry::{RegistryReader, SystemRegistry};
pub use resolver::{Resolution, Resolver};
pub use tools::{check_tool, ToolInfo};
pub use toolspec::{RegistryLocation, ToolKind, ToolOverride, ToolSpec, AUTO_DETECT, UNSET};
pub use validate::{is_valid_exe, validate, ValidationError};
