use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const WINDOWS_EXECUTABLE: &str = "mavproxy.exe";
pub const POSIX_EXECUTABLE: &str = "mavproxy.py";

/// Host platform family. Linux, macOS, the BSDs and Cygwin are all `Posix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Shell program and the flag that makes it run a single command string
    pub fn shell(&self) -> (&'static str, &'static str) {
        match self {
            Platform::Windows => ("cmd", "/C"),
            Platform::Posix => ("sh", "-c"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Posix => f.write_str("posix"),
        }
    }
}

/// How a running router is asked to shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationStrategy {
    /// Console interrupt delivered to the child's own process group (Windows)
    ConsoleInterrupt,
    /// SIGTERM delivered to the whole process group (POSIX)
    ProcessGroupTerminate,
}

/// Platform capabilities resolved once at startup and handed to the
/// synthesizer and the process manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProfile {
    platform: Platform,
    executable: String,
    termination: TerminationStrategy,
}

impl PlatformProfile {
    pub fn current() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self {
                platform,
                executable: WINDOWS_EXECUTABLE.to_string(),
                termination: TerminationStrategy::ConsoleInterrupt,
            },
            Platform::Posix => Self {
                platform,
                executable: POSIX_EXECUTABLE.to_string(),
                termination: TerminationStrategy::ProcessGroupTerminate,
            },
        }
    }

    /// Replace the MAVProxy executable name, e.g. for a `mavproxy` wrapper script
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn termination(&self) -> TerminationStrategy {
        self.termination
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::current()
    }
}

/// Resolve `program` the way the platform shell would, using `PATH`.
///
/// Programs given with a directory component are checked as-is.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }

    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    let mut found = vec![dir.join(program)];
    if cfg!(windows) && Path::new(program).extension().is_none() {
        for ext in ["exe", "bat", "cmd"] {
            found.push(dir.join(format!("{program}.{ext}")));
        }
    }
    found
}
