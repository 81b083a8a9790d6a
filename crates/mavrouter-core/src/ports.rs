use crate::{NO_PORT_SELECTED, RouterError};

/// Source of the serial ports the operator can choose from
pub trait PortEnumerator {
    /// Ports available right now, in the order the platform reports them
    fn available_ports(&self) -> Result<Vec<String>, RouterError>;
}

impl PortEnumerator for Vec<String> {
    fn available_ports(&self) -> Result<Vec<String>, RouterError> {
        Ok(self.clone())
    }
}

/// Entries for the port selector; an empty list shows only the placeholder.
pub fn port_choices(ports: &[String]) -> Vec<String> {
    if ports.is_empty() {
        vec![NO_PORT_SELECTED.to_string()]
    } else {
        ports.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_enumeration_shows_placeholder() {
        assert_eq!(port_choices(&[]), vec!["Select Port".to_string()]);
    }

    #[test]
    fn test_port_order_is_kept() {
        let ports = vec!["/dev/ttyUSB1".to_string(), "/dev/ttyACM0".to_string()];
        assert_eq!(port_choices(&ports), ports);
        assert_eq!(ports.available_ports().unwrap(), ports);
    }
}
