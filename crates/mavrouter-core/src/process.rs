use crate::{CommandLine, TerminationStrategy};
use anyhow::Result;
use async_trait::async_trait;

/// Unique identifier for a process
pub type ProcessId = u32;

/// Status of a process as observed by a non-blocking poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Process is currently running
    Running,
    /// Process exited; the code is missing when it was ended by a signal
    Exited(Option<i32>),
}

/// Result of a process termination operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationResult {
    /// Termination signal was delivered
    Success,
    /// Process was not found (already exited)
    ProcessNotFound,
    /// Permission denied (insufficient privileges)
    AccessDenied,
    /// Operation failed with specific error message
    Failed(String),
}

/// Trait representing a handle to a spawned router process
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None once the process has been reaped)
    fn get_pid(&self) -> Option<ProcessId>;

    /// Get the process group the child leads, where the platform has one
    fn get_process_group(&self) -> Option<ProcessId>;

    /// Get the shell command line that started this process
    fn get_command(&self) -> &str;

    /// Try to get exit status without blocking
    async fn try_wait(&mut self) -> Result<Option<ProcessStatus>>;
}

/// Spawning side of a platform process manager
#[async_trait]
pub trait ProcessLifecycle: Send + Sync {
    /// The type of process handle this lifecycle manager produces
    type Handle: ProcessHandle;

    /// Launch `command` through the platform shell without waiting for it.
    ///
    /// Fails with `NotFound` when the program cannot be resolved on `PATH`.
    async fn spawn_command(&self, command: &CommandLine) -> std::io::Result<Self::Handle>;
}

/// Termination side of a platform process manager
#[async_trait]
pub trait ProcessTermination: Send + Sync {
    /// The signal delivery this implementation uses
    fn strategy(&self) -> TerminationStrategy;

    /// Ask the process, and everything it started, to shut down
    async fn terminate_gracefully(&self, handle: &mut dyn ProcessHandle) -> TerminationResult;
}

/// High-level process manager trait that combines lifecycle and termination
pub trait ProcessManager: ProcessLifecycle + ProcessTermination {
    /// Create a new process manager instance
    fn new() -> Self
    where
        Self: Sized;
}

/// Factory trait for creating platform-specific process managers
pub trait ProcessManagerFactory {
    /// The type of process manager this factory creates
    type Manager: ProcessManager;

    /// Create a process manager for the current platform
    fn create_process_manager() -> Self::Manager;

    /// Get the platform name for logging and debugging
    fn platform_name() -> &'static str;
}
