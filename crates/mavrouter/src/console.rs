use clap::{Parser, Subcommand, ValueEnum};
use mavrouter_core::SourceKind;

/// One line typed at the interactive console
#[derive(Debug, Parser)]
#[command(multicall = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}

/// Operator actions, one per form control
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Choose the source type
    Source { kind: SourceKind },
    /// Select the serial port to read from
    Port { name: String },
    /// Set the source UDP address (ip:port)
    Udp { address: String },
    /// Set the serial baud rate
    Baud { rate: u32 },
    /// Set output port 1 (ip:port)
    Out1 { address: String },
    /// Set output port 2 (ip:port)
    Out2 { address: String },
    /// Toggle the MAVProxy map window
    Map { state: Toggle },
    /// Toggle the MAVProxy console window
    Console { state: Toggle },
    /// Re-scan and list serial ports
    Ports,
    /// Show the form and the command it produces
    Show,
    /// Start MAVProxy, replacing a running instance
    Start,
    /// Stop MAVProxy
    Stop,
    /// Show whether MAVProxy is running
    Status,
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

/// Parse a console line. Help requests and mistakes come back as the text
/// to show the operator.
pub fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }

    ConsoleLine::try_parse_from(tokens)
        .map(|parsed| Some(parsed.action))
        .map_err(|e| e.render().to_string().trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_actions() {
        assert_eq!(
            parse_line("source udp").unwrap(),
            Some(Action::Source {
                kind: SourceKind::Udp
            })
        );
        assert_eq!(
            parse_line("  port   /dev/ttyACM0 ").unwrap(),
            Some(Action::Port {
                name: "/dev/ttyACM0".to_string()
            })
        );
        assert_eq!(
            parse_line("baud 115200").unwrap(),
            Some(Action::Baud { rate: 115200 })
        );
        assert_eq!(
            parse_line("map on").unwrap(),
            Some(Action::Map { state: Toggle::On })
        );
        assert_eq!(
            parse_line("console off").unwrap(),
            Some(Action::Console { state: Toggle::Off })
        );
        assert_eq!(parse_line("exit").unwrap(), Some(Action::Quit));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_mistakes_are_reported() {
        assert!(parse_line("source tcp").unwrap_err().contains("tcp"));
        assert!(parse_line("baud fast").is_err());
        assert!(parse_line("launch").is_err());
        assert!(parse_line("map maybe").is_err());
    }

    #[test]
    fn test_help_lists_actions() {
        let help = parse_line("help").unwrap_err();
        assert!(help.contains("start"));
        assert!(help.contains("stop"));
    }

    #[test]
    fn test_toggle_into_bool() {
        assert!(bool::from(Toggle::On));
        assert!(!bool::from(Toggle::Off));
    }
}
