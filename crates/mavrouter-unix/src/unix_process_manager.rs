#[cfg(unix)]
mod unix_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use mavrouter_core::{
        CommandLine, Platform, ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager,
        ProcessStatus, ProcessTermination, TerminationResult, TerminationStrategy, find_on_path,
    };
    use nix::sys::signal::{self, Signal};
    use nix::unistd::{Pid as NixPid, getpgid};
    use std::process::Stdio;
    use tokio::process::{Child, Command};
    use tracing::{info, warn};

    /// Unix-specific process handle implementation
    pub struct UnixProcessHandle {
        child: Child,
        command: String,
        process_group: Option<ProcessId>,
    }

    impl UnixProcessHandle {
        pub fn new(child: Child, command: String) -> Self {
            let process_group = child.id().map(|pid| {
                getpgid(Some(NixPid::from_raw(pid as i32)))
                    .map(|pgid| pgid.as_raw() as ProcessId)
                    .unwrap_or(pid)
            });
            Self {
                child,
                command,
                process_group,
            }
        }
    }

    #[async_trait]
    impl ProcessHandle for UnixProcessHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            self.child.id()
        }

        fn get_process_group(&self) -> Option<ProcessId> {
            self.process_group
        }

        fn get_command(&self) -> &str {
            &self.command
        }

        async fn try_wait(&mut self) -> Result<Option<ProcessStatus>> {
            match self.child.try_wait()? {
                Some(status) => Ok(Some(ProcessStatus::Exited(status.code()))),
                None => Ok(None),
            }
        }
    }

    /// Unix-specific process manager that launches through `sh -c`
    #[derive(Debug, Default)]
    pub struct UnixProcessManager;

    #[async_trait]
    impl ProcessLifecycle for UnixProcessManager {
        type Handle = UnixProcessHandle;

        async fn spawn_command(&self, command: &CommandLine) -> std::io::Result<Self::Handle> {
            if find_on_path(command.program()).is_none() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found on PATH", command.program()),
                ));
            }

            let line = command.to_shell_string();
            let (shell, flag) = Platform::Posix.shell();
            let mut cmd = Command::new(shell);
            cmd.arg(flag).arg(&line).stdin(Stdio::null());

            // New process group so SIGTERM also reaches whatever MAVProxy starts
            cmd.process_group(0);

            let child = cmd.spawn()?;

            if let Some(pid) = child.id() {
                info!(pid, command = %line, "Spawned Unix process");
            }

            Ok(UnixProcessHandle::new(child, line))
        }
    }

    #[async_trait]
    impl ProcessTermination for UnixProcessManager {
        fn strategy(&self) -> TerminationStrategy {
            TerminationStrategy::ProcessGroupTerminate
        }

        async fn terminate_gracefully(&self, handle: &mut dyn ProcessHandle) -> TerminationResult {
            let Some(pgid) = handle.get_process_group().or_else(|| handle.get_pid()) else {
                return TerminationResult::ProcessNotFound;
            };

            match signal::killpg(NixPid::from_raw(pgid as i32), Signal::SIGTERM) {
                Ok(()) => {
                    info!(pgid, "Sent SIGTERM to process group");
                    TerminationResult::Success
                }
                Err(nix::errno::Errno::ESRCH) => {
                    info!(pgid, "Process group not found (already terminated)");
                    TerminationResult::ProcessNotFound
                }
                Err(nix::errno::Errno::EPERM) => {
                    warn!(pgid, "Permission denied to terminate process group");
                    TerminationResult::AccessDenied
                }
                Err(e) => {
                    warn!(pgid, "Failed to send SIGTERM to process group: {e}");
                    TerminationResult::Failed(format!("SIGTERM to process group failed: {e}"))
                }
            }
        }
    }

    impl ProcessManager for UnixProcessManager {
        fn new() -> Self {
            info!("Initializing Unix process manager");
            Self
        }
    }

}

// Re-export the Unix implementation when on Unix systems
#[cfg(unix)]
pub use unix_impl::{UnixProcessHandle, UnixProcessManager};

// Provide stub implementations for non-Unix systems
#[cfg(not(unix))]
pub struct UnixProcessHandle;

#[cfg(not(unix))]
pub struct UnixProcessManager;
