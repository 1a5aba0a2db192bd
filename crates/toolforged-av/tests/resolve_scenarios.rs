//! End-to-end resolution scenarios against the public API.
//!
//! Probes are answered by a scripted launcher so the results do not depend on
//! what happens to be installed on the machine running the tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use toolforged_av::{
    is_valid_exe, Error, Launcher, PlatformTag, ProbeOutput, ProbeResult, Resolution, Resolver,
    ToolKind, ToolSpec,
};

#[derive(Clone, Copy)]
enum Reply {
    Exit(i32),
    Denied,
}

#[derive(Default)]
struct ScriptedLauncher {
    replies: HashMap<String, Reply>,
    spawned: Mutex<Vec<String>>,
}

impl ScriptedLauncher {
    fn reply(mut self, program: &str, reply: Reply) -> Self {
        self.replies.insert(program.to_string(), reply);
        self
    }

    fn spawned(&self) -> Vec<String> {
        self.spawned.lock().unwrap().clone()
    }
}

impl Launcher for ScriptedLauncher {
    fn probe(&self, argv: &[String]) -> ProbeResult {
        self.spawned.lock().unwrap().push(argv[0].clone());
        match self.replies.get(&argv[0]) {
            Some(Reply::Exit(code)) => ProbeResult::Completed(ProbeOutput {
                code: Some(*code),
                stdout: String::new(),
                stderr: String::new(),
            }),
            Some(Reply::Denied) => ProbeResult::Failed(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied (os error 13)",
            )),
            None => ProbeResult::Failed(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

fn resolver(launcher: &Arc<ScriptedLauncher>) -> Resolver {
    Resolver::new(PlatformTag::Linux64).with_launcher(launcher.clone())
}

#[test]
fn auto_detect_returns_bare_command_name() {
    let launcher = Arc::new(ScriptedLauncher::default().reply("ffmpeg", Reply::Exit(0)));
    let resolution = resolver(&launcher).resolve(&ToolSpec::codec()).unwrap();
    assert_eq!(resolution, Resolution::Resolved("ffmpeg".to_string()));
    assert_eq!(resolution.as_setting(), "ffmpeg");
}

#[test]
fn auto_detect_without_candidates_is_unset() {
    let launcher = Arc::new(ScriptedLauncher::default());
    for kind in ToolKind::ALL {
        let resolution = resolver(&launcher).resolve(&ToolSpec::for_kind(kind)).unwrap();
        assert!(resolution.is_unset());
        assert_eq!(resolution.as_setting(), "unset");
    }
}

#[test]
fn valid_override_is_returned_unchanged() {
    let path = "/usr/local/Cellar/ffmpeg/6.1/bin/ffmpeg";
    let launcher = Arc::new(ScriptedLauncher::default().reply(path, Reply::Exit(0)));
    let spec = ToolSpec::codec().with_override(path);
    assert_eq!(
        resolver(&launcher).resolve(&spec).unwrap(),
        Resolution::Resolved(path.to_string())
    );
}

#[test]
fn invalid_override_names_configured_path() {
    let launcher = Arc::new(ScriptedLauncher::default());
    let spec = ToolSpec::codec().with_override("/opt/broken/ffmpeg");
    let err = resolver(&launcher).resolve(&spec).unwrap_err();
    assert!(matches!(err, Error::InvalidOverride { .. }));
    assert_eq!(err.path(), "/opt/broken/ffmpeg");
    assert!(err.to_string().contains("/opt/broken/ffmpeg"));
}

#[test]
fn image_override_to_missing_file_fails_before_spawning() {
    let launcher = Arc::new(ScriptedLauncher::default());
    let spec = ToolSpec::image().with_override("/nonexistent/tool");
    let err = resolver(&launcher).resolve(&spec).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/tool"));
    assert_eq!(err.tool(), ToolKind::Image);
    assert!(launcher.spawned().is_empty());
}

#[test]
fn image_override_to_existing_file_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let convert = dir.path().join("convert");
    std::fs::write(&convert, "").unwrap();
    let convert = convert.to_string_lossy().into_owned();

    let launcher = Arc::new(ScriptedLauncher::default().reply(&convert, Reply::Exit(0)));
    let spec = ToolSpec::image().with_override(convert.as_str());
    assert_eq!(
        resolver(&launcher).resolve(&spec).unwrap(),
        Resolution::Resolved(convert.clone())
    );
    assert_eq!(launcher.spawned(), vec![convert]);
}

#[test]
fn permission_denied_probe_is_not_valid() {
    let launcher = ScriptedLauncher::default().reply("/opt/ffmpeg", Reply::Denied);
    assert!(!is_valid_exe(&launcher, "/opt/ffmpeg", &["-version".to_string()]));

    let result = launcher.probe(&["/opt/ffmpeg".to_string()]);
    assert!(!result.ok());
    assert_eq!(
        result.error().map(io::Error::kind),
        Some(io::ErrorKind::PermissionDenied)
    );
}

#[test]
fn permission_denied_override_is_configuration_error() {
    let launcher = Arc::new(ScriptedLauncher::default().reply("/opt/ffmpeg", Reply::Denied));
    let spec = ToolSpec::codec().with_override("/opt/ffmpeg");
    let err = resolver(&launcher).resolve(&spec).unwrap_err();
    assert!(err.to_string().starts_with("Permission denied"));
}
