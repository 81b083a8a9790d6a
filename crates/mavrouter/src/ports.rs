use mavrouter_core::{PortEnumerator, RouterError};
use tracing::debug;

/// Enumerates serial ports through the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortEnumerator;

impl PortEnumerator for SerialPortEnumerator {
    fn available_ports(&self) -> Result<Vec<String>, RouterError> {
        let ports = serialport::available_ports()
            .map_err(|e| RouterError::PortEnumeration(e.to_string()))?;
        debug!(count = ports.len(), "Enumerated serial ports");
        Ok(ports.into_iter().map(|port| port.port_name).collect())
    }
}
