//! In-memory process manager that records what the lifecycle asked of it.

use crate::{
    CommandLine, ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager, ProcessStatus,
    ProcessTermination, TerminationResult, TerminationStrategy,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Spawn { pid: ProcessId, command: String },
    Terminate { pid: ProcessId },
}

#[derive(Default)]
struct Shared {
    events: Vec<MockEvent>,
    exited: HashSet<ProcessId>,
    next_pid: ProcessId,
    fail_next_spawn: bool,
    next_terminate: Option<TerminationResult>,
}

/// Clones share state, so a test can keep one as a probe after handing the
/// other to a lifecycle.
#[derive(Clone, Default)]
pub struct MockProcessManager {
    shared: Arc<Mutex<Shared>>,
}

impl MockProcessManager {
    pub fn events(&self) -> Vec<MockEvent> {
        self.shared.lock().unwrap().events.clone()
    }

    pub fn spawned_commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MockEvent::Spawn { command, .. } => Some(command),
                MockEvent::Terminate { .. } => None,
            })
            .collect()
    }

    /// Pretend the process exited on its own
    pub fn mark_exited(&self, pid: ProcessId) {
        self.shared.lock().unwrap().exited.insert(pid);
    }

    /// Make the next spawn fail as if the program were missing from `PATH`
    pub fn fail_next_spawn(&self) {
        self.shared.lock().unwrap().fail_next_spawn = true;
    }

    /// Make the next termination report `result` and leave the process running
    pub fn fail_next_terminate(&self, result: TerminationResult) {
        self.shared.lock().unwrap().next_terminate = Some(result);
    }

    /// PIDs that have neither exited nor been terminated
    pub fn live_pids(&self) -> Vec<ProcessId> {
        let shared = self.shared.lock().unwrap();
        shared
            .events
            .iter()
            .filter_map(|event| match event {
                MockEvent::Spawn { pid, .. } if !shared.exited.contains(pid) => Some(*pid),
                _ => None,
            })
            .collect()
    }
}

pub struct MockProcessHandle {
    pid: ProcessId,
    command: String,
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl ProcessHandle for MockProcessHandle {
    fn get_pid(&self) -> Option<ProcessId> {
        Some(self.pid)
    }

    fn get_process_group(&self) -> Option<ProcessId> {
        Some(self.pid)
    }

    fn get_command(&self) -> &str {
        &self.command
    }

    async fn try_wait(&mut self) -> Result<Option<ProcessStatus>> {
        let exited = self.shared.lock().unwrap().exited.contains(&self.pid);
        Ok(exited.then_some(ProcessStatus::Exited(Some(0))))
    }
}

#[async_trait]
impl ProcessLifecycle for MockProcessManager {
    type Handle = MockProcessHandle;

    async fn spawn_command(&self, command: &CommandLine) -> std::io::Result<Self::Handle> {
        let mut shared = self.shared.lock().unwrap();
        if std::mem::take(&mut shared.fail_next_spawn) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found on PATH", command.program()),
            ));
        }

        shared.next_pid += 1;
        let pid = 1000 + shared.next_pid;
        let line = command.to_shell_string();
        shared.events.push(MockEvent::Spawn {
            pid,
            command: line.clone(),
        });

        Ok(MockProcessHandle {
            pid,
            command: line,
            shared: self.shared.clone(),
        })
    }
}

#[async_trait]
impl ProcessTermination for MockProcessManager {
    fn strategy(&self) -> TerminationStrategy {
        TerminationStrategy::ProcessGroupTerminate
    }

    async fn terminate_gracefully(&self, handle: &mut dyn ProcessHandle) -> TerminationResult {
        let Some(pid) = handle.get_pid() else {
            return TerminationResult::ProcessNotFound;
        };

        let mut shared = self.shared.lock().unwrap();
        shared.events.push(MockEvent::Terminate { pid });
        if let Some(result) = shared.next_terminate.take() {
            return result;
        }
        if shared.exited.insert(pid) {
            TerminationResult::Success
        } else {
            TerminationResult::ProcessNotFound
        }
    }
}

impl ProcessManager for MockProcessManager {
    fn new() -> Self {
        Self::default()
    }
}
