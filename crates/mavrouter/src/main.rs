use anyhow::Result;
use clap::Parser;
use mavrouter::{
    CommandReport, STATUS_POLL_INTERVAL, SerialPortEnumerator, logging, platform_session,
    run_console, run_until,
};
use mavrouter::{Cli, Command};
use mavrouter_core::{PortEnumerator, port_choices};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let profile = cli.platform_profile();

    match cli.command.unwrap_or_default() {
        Command::Ports => {
            let ports = SerialPortEnumerator.available_ports()?;
            for choice in port_choices(&ports) {
                println!("{choice}");
            }
        }
        Command::Command { route, json } => {
            let mut session = platform_session(profile, route.exit_policy());
            route.apply(&mut session)?;
            let command = session.command()?;
            if json {
                let report =
                    CommandReport::new(session.form().route_config(), session.profile(), &command);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{command}");
            }
        }
        Command::Run { route } => {
            let mut session = platform_session(profile, route.exit_policy());
            route.apply(&mut session)?;
            let state = run_until(&mut session, tokio::signal::ctrl_c(), STATUS_POLL_INTERVAL).await?;
            info!(%state, "Router finished");
        }
        Command::Console { route } => {
            let mut session = platform_session(profile, route.exit_policy());
            // A bad flag should not keep the operator out of the console
            if let Err(e) = route.apply(&mut session) {
                error!("{e}");
            }
            run_console(
                &mut session,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                STATUS_POLL_INTERVAL,
            )
            .await?;
        }
    }

    Ok(())
}
