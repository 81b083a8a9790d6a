use crate::console::Action;
use crate::form::{RouterForm, on_off};
use mavrouter_core::{
    CommandLine, NO_PORT_SELECTED, PlatformProfile, PortEnumerator, ProcessManager,
    RouterError, RouterLifecycle, RouterState, SourceKind, port_choices, synthesize,
};
use tracing::{info, warn};

/// What the operator sees after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub quit: bool,
}

impl Reply {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            quit: false,
        }
    }
}

/// Top-level application context: the form, the resolved platform profile
/// and the single router lifecycle.
pub struct RouterSession<M: ProcessManager, P: PortEnumerator> {
    form: RouterForm,
    profile: PlatformProfile,
    lifecycle: RouterLifecycle<M>,
    ports: P,
    known_ports: Vec<String>,
}

impl<M: ProcessManager, P: PortEnumerator> RouterSession<M, P> {
    pub fn new(profile: PlatformProfile, lifecycle: RouterLifecycle<M>, ports: P) -> Self {
        let mut session = Self {
            form: RouterForm::default(),
            profile,
            lifecycle,
            ports,
            known_ports: Vec::new(),
        };
        info!(
            platform = %session.profile.platform(),
            executable = session.profile.executable(),
            termination = ?session.profile.termination(),
            exit_policy = ?session.lifecycle.exit_policy(),
            "Router session ready"
        );
        if !session.termination_matches_profile() {
            warn!(
                expected = ?session.profile.termination(),
                actual = ?session.lifecycle.manager().strategy(),
                "Process manager does not use the platform termination strategy"
            );
        }
        if let Err(e) = session.refresh_ports() {
            warn!("{e}");
        }
        session
    }

    /// Whether the process manager stops children the way the profile expects
    pub fn termination_matches_profile(&self) -> bool {
        self.lifecycle.manager().strategy() == self.profile.termination()
    }

    pub fn form(&self) -> &RouterForm {
        &self.form
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn lifecycle(&self) -> &RouterLifecycle<M> {
        &self.lifecycle
    }

    /// Re-scan serial ports. On failure the previous list is kept.
    pub fn refresh_ports(&mut self) -> Result<&[String], RouterError> {
        self.known_ports = self.ports.available_ports()?;
        Ok(&self.known_ports)
    }

    /// Entries for the port selector, the placeholder when there are none
    pub fn port_choices(&self) -> Vec<String> {
        port_choices(&self.known_ports)
    }

    /// Select a serial port; only enumerated ports are accepted.
    pub fn select_port(&mut self, port: &str) -> Result<(), RouterError> {
        self.ensure_known_port(port)?;
        self.form.serial_port = port.to_string();
        Ok(())
    }

    fn ensure_known_port(&mut self, port: &str) -> Result<(), RouterError> {
        if port == NO_PORT_SELECTED || self.known_ports.iter().any(|p| p == port) {
            return Ok(());
        }
        if self.refresh_ports()?.iter().any(|p| p == port) {
            return Ok(());
        }
        Err(RouterError::UnknownPort(port.to_string()))
    }

    pub fn set_source_kind(&mut self, kind: SourceKind) {
        self.form.source_kind = kind;
    }

    /// The address is checked when a command is built, not here
    pub fn set_udp_address(&mut self, address: impl Into<String>) {
        self.form.udp_address = address.into();
    }

    pub fn set_baud_rate(&mut self, rate: u32) {
        self.form.baud_rate = rate;
    }

    pub fn set_destinations(&mut self, first: Option<String>, second: Option<String>) {
        if let Some(first) = first {
            self.form.destination1 = first;
        }
        if let Some(second) = second {
            self.form.destination2 = second;
        }
    }

    pub fn set_show_map(&mut self, show: bool) {
        self.form.show_map = show;
    }

    pub fn set_show_console(&mut self, show: bool) {
        self.form.show_console = show;
    }

    /// Validate the form and build the command it describes
    pub fn command(&mut self) -> Result<CommandLine, RouterError> {
        let config = self.form.route_config();
        let command = synthesize(&config, &self.profile)?;
        if config.source_kind == SourceKind::Serial {
            // The port may have been unplugged since it was selected
            self.ensure_known_port(&config.source_value)?;
        }
        Ok(command)
    }

    /// Validate, synthesize and start as one step
    pub async fn start(&mut self) -> Result<RouterState, RouterError> {
        let command = self.command()?;
        self.lifecycle.start(&command).await
    }

    pub async fn stop(&mut self) -> RouterState {
        self.lifecycle.stop().await
    }

    pub async fn status(&mut self) -> RouterState {
        self.lifecycle.status().await
    }

    pub async fn shutdown(&mut self) -> RouterState {
        self.lifecycle.shutdown().await
    }

    /// Apply one operator action. Errors are turned into the reply text and
    /// never escape.
    pub async fn handle(&mut self, action: Action) -> Reply {
        match action {
            Action::Source { kind } => {
                self.set_source_kind(kind);
                Reply::say(format!("Source type: {kind}"))
            }
            Action::Port { name } => match self.select_port(&name) {
                Ok(()) => Reply::say(format!("Serial port: {name}")),
                Err(e) => error_reply(e),
            },
            Action::Udp { address } => {
                self.set_udp_address(address.as_str());
                Reply::say(format!("Source UDP address: {address}"))
            }
            Action::Baud { rate } => {
                self.set_baud_rate(rate);
                Reply::say(format!("Baud rate: {rate}"))
            }
            Action::Out1 { address } => {
                self.set_destinations(Some(address.clone()), None);
                Reply::say(format!("Output port 1: {address}"))
            }
            Action::Out2 { address } => {
                self.set_destinations(None, Some(address.clone()));
                Reply::say(format!("Output port 2: {address}"))
            }
            Action::Map { state } => {
                self.set_show_map(state.into());
                Reply::say(format!("Map window: {}", on_off(state.into())))
            }
            Action::Console { state } => {
                self.set_show_console(state.into());
                Reply::say(format!("Console window: {}", on_off(state.into())))
            }
            Action::Ports => match self.refresh_ports().map(|_| ()) {
                Ok(()) => Reply::say(self.port_choices().join("\n")),
                Err(e) => error_reply(e),
            },
            Action::Show => {
                let preview = match self.command() {
                    Ok(command) => format!("Command:         {command}"),
                    Err(e) => format!("Command:         unavailable ({e})"),
                };
                Reply::say(format!("{}\n{preview}", self.form))
            }
            Action::Start => match self.start().await {
                Ok(state) => {
                    info!(%state, "Start requested from console");
                    Reply::say(format!("MAVProxy {state}"))
                }
                Err(e) => error_reply(e),
            },
            Action::Stop => {
                let before = self.lifecycle.state();
                let after = self.stop().await;
                Reply::say(match (before, after) {
                    (RouterState::NotStarted, _) => "MAVProxy has not been started yet",
                    (RouterState::Running { .. }, _) => "MAVProxy stopped",
                    _ => "MAVProxy is not running",
                })
            }
            Action::Status => {
                let state = self.status().await;
                Reply::say(format!("MAVProxy {state}"))
            }
            Action::Quit => Reply {
                message: String::new(),
                quit: true,
            },
        }
    }
}

fn error_reply(error: RouterError) -> Reply {
    if error.is_input_error() {
        info!("{error}");
    } else {
        warn!("{error}");
    }
    Reply::say(format!("Error: {error}"))
}
