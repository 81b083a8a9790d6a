#[cfg(windows)]
mod windows_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use mavrouter_core::{
        CommandLine, Platform, ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager,
        ProcessStatus, ProcessTermination, TerminationResult, TerminationStrategy, find_on_path,
    };
    use tokio::process::{Child, Command};
    use tracing::{info, warn};
    use windows::Win32::System::Console::{CTRL_BREAK_EVENT, GenerateConsoleCtrlEvent};

    // The child gets its own console process group so that a console control
    // event can be aimed at it without interrupting this process.
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

    /// Windows-specific process handle implementation
    pub struct WindowsProcessHandle {
        child: Child,
        command: String,
    }

    impl WindowsProcessHandle {
        pub fn new(child: Child, command: String) -> Self {
            Self { child, command }
        }
    }

    #[async_trait]
    impl ProcessHandle for WindowsProcessHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            self.child.id()
        }

        /// Console process groups are not POSIX process groups
        fn get_process_group(&self) -> Option<ProcessId> {
            None
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

    /// Windows-specific process manager that launches through `cmd /C`
    #[derive(Debug, Default)]
    pub struct WindowsProcessManager;

    #[async_trait]
    impl ProcessLifecycle for WindowsProcessManager {
        type Handle = WindowsProcessHandle;

        async fn spawn_command(&self, command: &CommandLine) -> std::io::Result<Self::Handle> {
            if find_on_path(command.program()).is_none() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found on PATH", command.program()),
                ));
            }

            let line = command.to_shell_string();
            let (shell, flag) = Platform::Windows.shell();
            let mut cmd = Command::new(shell);
            // With /S cmd.exe strips exactly the outer pair of quotes and parses
            // the rest as written
            cmd.arg("/S").arg(flag).raw_arg(format!("\"{line}\""));
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);

            let child = cmd.spawn()?;

            if let Some(pid) = child.id() {
                info!(pid = %pid, command = %line, "Spawned Windows process");
            }

            Ok(WindowsProcessHandle::new(child, line))
        }
    }

    #[async_trait]
    impl ProcessTermination for WindowsProcessManager {
        fn strategy(&self) -> TerminationStrategy {
            TerminationStrategy::ConsoleInterrupt
        }

        async fn terminate_gracefully(&self, handle: &mut dyn ProcessHandle) -> TerminationResult {
            let Some(pid) = handle.get_pid() else {
                return TerminationResult::ProcessNotFound;
            };

            // SAFETY: plain Win32 call with no pointers; an unknown group id is
            // reported as an error rather than undefined behavior.
            match unsafe { GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid) } {
                Ok(()) => {
                    info!(pid = %pid, "Sent Ctrl-Break to console process group");
                    TerminationResult::Success
                }
                Err(e) => {
                    let reason = e.to_string();
                    match handle.try_wait().await {
                        Ok(Some(_)) => {
                            info!(pid = %pid, "Process not found (already terminated)");
                            TerminationResult::ProcessNotFound
                        }
                        _ => {
                            warn!(pid = %pid, "Failed to send Ctrl-Break: {reason}");
                            TerminationResult::Failed(format!("Ctrl-Break failed: {reason}"))
                        }
                    }
                }
            }
        }
    }

    impl ProcessManager for WindowsProcessManager {
        fn new() -> Self {
            info!("Initializing Windows process manager");
            Self
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::Duration;

        #[tokio::test]
        async fn test_missing_program_fails_to_spawn() {
            let manager = WindowsProcessManager::new();
            let mut command = CommandLine::new("definitely-not-mavproxy.exe", Platform::Windows);
            command.arg("--map");
            let err = manager.spawn_command(&command).await.err().unwrap();
            assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        }

        async fn wait_for_exit(handle: &mut WindowsProcessHandle) -> ProcessStatus {
            for _ in 0..100 {
                if let Some(status) = handle.try_wait().await.unwrap() {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            panic!("process {:?} did not exit", handle.get_pid());
        }

        #[tokio::test]
        async fn test_spawn_and_interrupt() {
            let manager = WindowsProcessManager::new();
            // waitfor keeps the default console handler, so Ctrl-Break ends it
            let mut command = CommandLine::new("waitfor", Platform::Windows);
            command.args(["/t", "30", "MavrouterInterruptTest"]);
            let mut handle = manager.spawn_command(&command).await.unwrap();

            assert!(handle.get_pid().is_some());
            assert_eq!(handle.get_command(), "waitfor /t 30 MavrouterInterruptTest");
            assert!(handle.try_wait().await.unwrap().is_none());

            assert_eq!(
                manager.terminate_gracefully(&mut handle).await,
                TerminationResult::Success
            );
            assert!(matches!(
                wait_for_exit(&mut handle).await,
                ProcessStatus::Exited(_)
            ));
        }

        #[test]
        fn test_strategy() {
            assert_eq!(
                WindowsProcessManager.strategy(),
                TerminationStrategy::ConsoleInterrupt
            );
        }
    }
}

#[cfg(windows)]
pub use windows_impl::{WindowsProcessHandle, WindowsProcessManager};

// Provide stub implementations for non-Windows systems
#[cfg(not(windows))]
pub struct WindowsProcessHandle;

#[cfg(not(windows))]
pub struct WindowsProcessManager;
