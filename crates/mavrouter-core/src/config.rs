use crate::RouterError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown in the port selector until the operator picks a port
pub const NO_PORT_SELECTED: &str = "Select Port";

pub const DEFAULT_BAUD_RATE: u32 = 57600;
pub const DEFAULT_DESTINATION_1: &str = "127.0.0.1:14540";
pub const DEFAULT_DESTINATION_2: &str = "127.0.0.1:14550";
pub const DEFAULT_UDP_SOURCE: &str = "172.21.144.1:18570";

/// Where MAVProxy reads telemetry from
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Serial,
    Udp,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Serial => f.write_str("serial"),
            SourceKind::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serial" => Ok(SourceKind::Serial),
            "udp" => Ok(SourceKind::Udp),
            other => Err(format!("unknown source type {other:?}, expected serial or udp")),
        }
    }
}

/// One routing request, rebuilt from the form on every start
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    #[builder(default)]
    pub source_kind: SourceKind,
    /// Serial device name, or `ip:port` for UDP sources
    #[builder(default = "NO_PORT_SELECTED.to_string()")]
    pub source_value: String,
    /// Only meaningful for serial sources
    #[builder(default = "DEFAULT_BAUD_RATE")]
    pub baud_rate: u32,
    #[builder(default = "DEFAULT_DESTINATION_1.to_string()")]
    pub destination1: String,
    #[builder(default = "DEFAULT_DESTINATION_2.to_string()")]
    pub destination2: String,
    #[builder(default)]
    pub show_map: bool,
    #[builder(default)]
    pub show_console: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            source_kind: SourceKind::Serial,
            source_value: NO_PORT_SELECTED.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            destination1: DEFAULT_DESTINATION_1.to_string(),
            destination2: DEFAULT_DESTINATION_2.to_string(),
            show_map: false,
            show_console: false,
        }
    }
}

impl RouteConfig {
    pub fn builder() -> RouteConfigBuilder {
        RouteConfigBuilder::default()
    }

    /// Check the source fields before a command is built.
    ///
    /// Destinations are passed to MAVProxy verbatim and are not checked here.
    pub fn validate(&self) -> Result<(), RouterError> {
        match self.source_kind {
            SourceKind::Serial => {
                let port = self.source_value.trim();
                if port.is_empty() || port == NO_PORT_SELECTED {
                    return Err(RouterError::MissingSource);
                }
            }
            SourceKind::Udp => {
                if !is_valid_udp_address(&self.source_value) {
                    return Err(RouterError::InvalidAddress(self.source_value.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Accepts `<1-3 digits>.<1-3 digits>.<1-3 digits>.<1-3 digits>:<digits>` only.
///
/// Hostnames such as `localhost` are rejected. Octets are not range-checked,
/// so `999.1.1.1:5` passes.
pub fn is_valid_udp_address(address: &str) -> bool {
    let Some((host, port)) = address.rsplit_once(':') else {
        return false;
    };

    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| is_digits(octet, 3))
        && is_digits(port, usize::MAX)
}

fn is_digits(s: &str, max_len: usize) -> bool {
    !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
}
