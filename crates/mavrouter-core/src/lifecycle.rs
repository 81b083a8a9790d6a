use crate::{CommandLine, ProcessHandle, ProcessId, ProcessManager, RouterError, TerminationResult};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Observable state of the managed router process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RouterState {
    /// Nothing has been started during this run
    NotStarted,
    /// A router process is alive
    #[serde(rename_all = "camelCase")]
    Running {
        pid: ProcessId,
        process_group: Option<ProcessId>,
    },
    /// The last router process was stopped or exited on its own
    Stopped,
}

impl RouterState {
    pub fn is_running(&self) -> bool {
        matches!(self, RouterState::Running { .. })
    }
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterState::NotStarted => f.write_str("not started"),
            RouterState::Running {
                pid,
                process_group: Some(pgid),
            } => write!(f, "running (pid {pid}, process group {pgid})"),
            RouterState::Running { pid, .. } => write!(f, "running (pid {pid})"),
            RouterState::Stopped => f.write_str("stopped"),
        }
    }
}

/// What happens to a still-running router when the front-end exits
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Stop the router the same way the stop action does
    #[default]
    StopChild,
    /// Leave the router running after the front-end is gone
    LeaveRunning,
}

/// Owns at most one router process and drives it through
/// `NotStarted -> Running -> Stopped -> Running -> ...`.
pub struct RouterLifecycle<M: ProcessManager> {
    manager: M,
    handle: Option<M::Handle>,
    state: RouterState,
    exit_policy: ExitPolicy,
}

impl<M: ProcessManager> RouterLifecycle<M> {
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            handle: None,
            state: RouterState::NotStarted,
            exit_policy: ExitPolicy::default(),
        }
    }

    pub fn with_exit_policy(mut self, exit_policy: ExitPolicy) -> Self {
        self.exit_policy = exit_policy;
        self
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit_policy
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Last observed state, without polling the process
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Start a router for `command`, stopping the current one first.
    pub async fn start(&mut self, command: &CommandLine) -> Result<RouterState, RouterError> {
        if self.state.is_running() {
            info!("MAVProxy is already running. Stopping current instance.");
            self.stop().await;
        }

        let line = command.to_shell_string();
        let handle = self
            .manager
            .spawn_command(command)
            .await
            .map_err(|source| RouterError::SpawnError {
                command: line.clone(),
                source,
            })?;

        self.state = match handle.get_pid() {
            Some(pid) => RouterState::Running {
                pid,
                process_group: handle.get_process_group(),
            },
            None => {
                warn!(command = %line, "MAVProxy exited before its PID could be read");
                RouterState::Stopped
            }
        };
        self.handle = Some(handle);

        info!(command = %line, state = %self.state, "Started MAVProxy");
        Ok(self.state)
    }

    /// Stop the router if one is running.
    ///
    /// Calling this before anything was started is a no-op. Signal delivery
    /// failures are logged and the router is treated as stopped.
    pub async fn stop(&mut self) -> RouterState {
        let Some(mut handle) = self.handle.take() else {
            match self.state {
                RouterState::NotStarted => debug!("MAVProxy has not been started yet"),
                _ => debug!("MAVProxy is not running"),
            }
            return self.state;
        };

        match handle.try_wait().await {
            Ok(Some(status)) => {
                info!(?status, "MAVProxy is not running");
            }
            Ok(None) => self.terminate(&mut handle).await,
            Err(e) => {
                warn!("Failed to poll MAVProxy status, terminating anyway: {e}");
                self.terminate(&mut handle).await;
            }
        }

        self.state = RouterState::Stopped;
        self.state
    }

    async fn terminate(&self, handle: &mut M::Handle) {
        let pid = handle.get_pid();
        info!(?pid, strategy = ?self.manager.strategy(), "Stopping MAVProxy");

        match self.manager.terminate_gracefully(handle).await {
            TerminationResult::Success => debug!(?pid, "Termination signal delivered"),
            TerminationResult::ProcessNotFound => info!(?pid, "MAVProxy already exited"),
            other => warn!(?pid, "Failed to terminate MAVProxy: {other:?}"),
        }
    }

    /// Poll the router without blocking and return the current state.
    pub async fn status(&mut self) -> RouterState {
        let polled = match self.handle.as_mut() {
            Some(handle) => handle.try_wait().await,
            None => return self.state,
        };

        match polled {
            Ok(Some(status)) => {
                info!(?status, "MAVProxy exited");
                self.handle = None;
                self.state = RouterState::Stopped;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to poll MAVProxy status: {e}"),
        }
        self.state
    }

    /// Apply the exit policy when the front-end is going away.
    pub async fn shutdown(&mut self) -> RouterState {
        match self.exit_policy {
            ExitPolicy::StopChild => self.stop().await,
            ExitPolicy::LeaveRunning => {
                let state = self.status().await;
                if let RouterState::Running { pid, .. } = state {
                    info!(pid, "Leaving MAVProxy running after exit");
                }
                state
            }
        }
    }
}
