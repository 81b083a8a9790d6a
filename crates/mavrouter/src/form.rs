use mavrouter_core::{
    DEFAULT_BAUD_RATE, DEFAULT_DESTINATION_1, DEFAULT_DESTINATION_2, DEFAULT_UDP_SOURCE,
    NO_PORT_SELECTED, RouteConfig, SourceKind,
};
use serde::Serialize;
use std::fmt;

/// Operator-editable state. Both source entries are kept so switching the
/// source type back and forth loses nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterForm {
    pub source_kind: SourceKind,
    pub serial_port: String,
    pub udp_address: String,
    pub baud_rate: u32,
    pub destination1: String,
    pub destination2: String,
    pub show_map: bool,
    pub show_console: bool,
}

impl Default for RouterForm {
    fn default() -> Self {
        Self {
            source_kind: SourceKind::Serial,
            serial_port: NO_PORT_SELECTED.to_string(),
            udp_address: DEFAULT_UDP_SOURCE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            destination1: DEFAULT_DESTINATION_1.to_string(),
            destination2: DEFAULT_DESTINATION_2.to_string(),
            show_map: false,
            show_console: false,
        }
    }
}

impl RouterForm {
    /// Snapshot of the form as a route, using the entry of the active source type
    pub fn route_config(&self) -> RouteConfig {
        let source_value = match self.source_kind {
            SourceKind::Serial => self.serial_port.clone(),
            SourceKind::Udp => self.udp_address.clone(),
        };
        RouteConfig {
            source_kind: self.source_kind,
            source_value,
            baud_rate: self.baud_rate,
            destination1: self.destination1.clone(),
            destination2: self.destination2.clone(),
            show_map: self.show_map,
            show_console: self.show_console,
        }
    }
}

pub(crate) fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

impl fmt::Display for RouterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source type:     {}", self.source_kind)?;
        match self.source_kind {
            SourceKind::Serial => {
                writeln!(f, "Serial port:     {}", self.serial_port)?;
                writeln!(f, "Baud rate:       {}", self.baud_rate)?;
            }
            SourceKind::Udp => writeln!(f, "UDP address:     {}", self.udp_address)?,
        }
        writeln!(f, "Output port 1:   {}", self.destination1)?;
        writeln!(f, "Output port 2:   {}", self.destination2)?;
        writeln!(f, "Map window:      {}", on_off(self.show_map))?;
        write!(f, "Console window:  {}", on_off(self.show_console))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_route_defaults() {
        let form = RouterForm::default();
        assert_eq!(form.route_config(), RouteConfig::default());
        assert_eq!(form.udp_address, "172.21.144.1:18570");
    }

    #[test]
    fn test_active_source_entry_is_used() {
        let mut form = RouterForm {
            serial_port: "COM3".to_string(),
            udp_address: "10.0.0.5:14550".to_string(),
            ..RouterForm::default()
        };
        assert_eq!(form.route_config().source_value, "COM3");

        form.source_kind = SourceKind::Udp;
        let config = form.route_config();
        assert_eq!(config.source_kind, SourceKind::Udp);
        assert_eq!(config.source_value, "10.0.0.5:14550");

        form.source_kind = SourceKind::Serial;
        assert_eq!(form.route_config().source_value, "COM3");
    }

    #[test]
    fn test_display_hides_inactive_source() {
        let mut form = RouterForm::default();
        let text = form.to_string();
        assert!(text.contains("Baud rate:       57600"));
        assert!(!text.contains("UDP address"));

        form.source_kind = SourceKind::Udp;
        let text = form.to_string();
        assert!(text.contains("UDP address:     172.21.144.1:18570"));
        assert!(!text.contains("Baud rate"));
    }
}
