use crate::console::parse_line;
use crate::platform_factory::{PlatformProcessManager, PlatformProcessManagerFactory};
use crate::ports::SerialPortEnumerator;
use crate::session::RouterSession;
use anyhow::Result;
use mavrouter_core::{
    CommandLine, ExitPolicy, PlatformProfile, PortEnumerator, ProcessManager,
    ProcessManagerFactory, RouteConfig, RouterError, RouterLifecycle, RouterState,
};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// How often a running router is polled for an unexpected exit
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Session wired to the real process manager and serial port scan
pub fn platform_session(
    profile: PlatformProfile,
    exit_policy: ExitPolicy,
) -> RouterSession<PlatformProcessManager, SerialPortEnumerator> {
    info!(
        platform = PlatformProcessManagerFactory::platform_name(),
        executable = profile.executable(),
        "Creating router session"
    );
    let manager = PlatformProcessManagerFactory::create_process_manager();
    let lifecycle = RouterLifecycle::new(manager).with_exit_policy(exit_policy);
    RouterSession::new(profile, lifecycle, SerialPortEnumerator)
}

/// Machine-readable view of a synthesized command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReport<'a> {
    pub route: RouteConfig,
    pub profile: &'a PlatformProfile,
    pub command: &'a CommandLine,
    pub shell_line: String,
}

impl<'a> CommandReport<'a> {
    pub fn new(route: RouteConfig, profile: &'a PlatformProfile, command: &'a CommandLine) -> Self {
        Self {
            route,
            profile,
            shell_line: command.to_shell_string(),
            command,
        }
    }
}

/// Start the router and keep it alive until `interrupt` resolves or the
/// child exits on its own, then apply the exit policy.
pub async fn run_until<M, P, F>(
    session: &mut RouterSession<M, P>,
    interrupt: F,
    poll: Duration,
) -> Result<RouterState, RouterError>
where
    M: ProcessManager,
    P: PortEnumerator,
    F: Future,
{
    let state = session.start().await?;
    info!(%state, "MAVProxy started");

    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = ticker.tick() => {
                if !session.status().await.is_running() {
                    warn!("MAVProxy exited on its own");
                    break;
                }
            }
        }
    }

    Ok(session.shutdown().await)
}

/// Read operator actions line by line until end of input or `quit`.
///
/// The running router is polled between lines so an exit is reported even
/// while the operator is idle.
pub async fn run_console<M, P, R, W>(
    session: &mut RouterSession<M, P>,
    input: R,
    mut output: W,
    poll: Duration,
) -> Result<RouterState>
where
    M: ProcessManager,
    P: PortEnumerator,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    write_line(&mut output, "mavrouter console, type `help` for actions").await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let reply = match parse_line(&line) {
                    Ok(None) => continue,
                    Ok(Some(action)) => session.handle(action).await,
                    Err(text) => {
                        write_line(&mut output, &text).await?;
                        continue;
                    }
                };
                if !reply.message.is_empty() {
                    write_line(&mut output, &reply.message).await?;
                }
                if reply.quit {
                    break;
                }
            }
            _ = ticker.tick() => {
                if session.lifecycle().state().is_running() && !session.status().await.is_running() {
                    write_line(&mut output, "MAVProxy exited").await?;
                }
            }
        }
    }

    let state = session.shutdown().await;
    info!(%state, "Console closed");
    Ok(state)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
