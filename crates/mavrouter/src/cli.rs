use crate::session::RouterSession;
use clap::{Args, Parser, Subcommand};
use mavrouter_core::{
    DEFAULT_BAUD_RATE, DEFAULT_DESTINATION_1, DEFAULT_DESTINATION_2, ExitPolicy, PlatformProfile,
    PortEnumerator, ProcessManager, RouterError, SourceKind,
};

#[derive(Debug, Parser)]
#[command(name = "mavrouter", version, about = "Route MAVLink telemetry through MAVProxy")]
pub struct Cli {
    /// MAVProxy executable to launch instead of the platform default
    #[arg(long, env = "MAVROUTER_EXE", global = true)]
    pub exe: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Platform capabilities for this run, with the executable override applied
    pub fn platform_profile(&self) -> PlatformProfile {
        let profile = PlatformProfile::current();
        match &self.exe {
            Some(exe) => profile.with_executable(exe),
            None => profile,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the serial ports MAVProxy can read from
    Ports,
    /// Print the MAVProxy command for a route without starting it
    Command {
        #[command(flatten)]
        route: RouteArgs,
        /// Print the route and command tokens as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start MAVProxy and keep it running until Ctrl-C or until it exits
    Run {
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Edit the route and start/stop MAVProxy interactively (default)
    Console {
        #[command(flatten)]
        route: RouteArgs,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Console {
            route: RouteArgs::default(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// Serial port to read telemetry from
    #[arg(long, value_name = "PORT", conflicts_with = "udp")]
    pub serial: Option<String>,

    /// UDP endpoint to read telemetry from
    #[arg(long, value_name = "IP:PORT")]
    pub udp: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// First output port
    #[arg(long, value_name = "IP:PORT", default_value = DEFAULT_DESTINATION_1)]
    pub out1: String,

    /// Second output port
    #[arg(long, value_name = "IP:PORT", default_value = DEFAULT_DESTINATION_2)]
    pub out2: String,

    /// Open the MAVProxy map window
    #[arg(long)]
    pub map: bool,

    /// Open the MAVProxy console window
    #[arg(long)]
    pub console: bool,

    /// Keep MAVProxy running after mavrouter exits
    #[arg(long)]
    pub leave_running: bool,
}

impl Default for RouteArgs {
    fn default() -> Self {
        Self {
            serial: None,
            udp: None,
            baud: DEFAULT_BAUD_RATE,
            out1: DEFAULT_DESTINATION_1.to_string(),
            out2: DEFAULT_DESTINATION_2.to_string(),
            map: false,
            console: false,
            leave_running: false,
        }
    }
}

impl RouteArgs {
    pub fn exit_policy(&self) -> ExitPolicy {
        if self.leave_running {
            ExitPolicy::LeaveRunning
        } else {
            ExitPolicy::StopChild
        }
    }

    /// Fill the session form from the command line
    pub fn apply<M: ProcessManager, P: PortEnumerator>(
        &self,
        session: &mut RouterSession<M, P>,
    ) -> Result<(), RouterError> {
        if let Some(address) = &self.udp {
            session.set_source_kind(SourceKind::Udp);
            session.set_udp_address(address.as_str());
        }
        if let Some(port) = &self.serial {
            session.set_source_kind(SourceKind::Serial);
            session.select_port(port)?;
        }
        session.set_baud_rate(self.baud);
        session.set_destinations(Some(self.out1.clone()), Some(self.out2.clone()));
        session.set_show_map(self.map);
        session.set_show_console(self.console);
        Ok(())
    }
}
