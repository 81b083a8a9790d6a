use thiserror::Error;

/// Core error types for routing operations
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No serial port selected")]
    MissingSource,

    #[error("Invalid UDP address format {0:?}. Use <ip>:<port>")]
    InvalidAddress(String),

    #[error("Serial port {0:?} is not among the available ports")]
    UnknownPort(String),

    #[error("Failed to enumerate serial ports: {0}")]
    PortEnumeration(String),

    #[error("Failed to start `{command}`: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl RouterError {
    /// Check if this error was caused by the operator's form input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RouterError::MissingSource | RouterError::InvalidAddress(_) | RouterError::UnknownPort(_)
        )
    }
}
