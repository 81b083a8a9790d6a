pub mod app;
pub mod cli;
pub mod console;
pub mod form;
pub mod logging;
pub mod platform_factory;
pub mod ports;
pub mod session;

pub use app::*;
pub use cli::{Cli, Command, RouteArgs};
pub use console::{Action, parse_line};
pub use form::RouterForm;
pub use platform_factory::*;
pub use ports::SerialPortEnumerator;
pub use session::{Reply, RouterSession};
