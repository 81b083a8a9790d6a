use crate::{Platform, PlatformProfile, RouteConfig, RouterError, SourceKind};
use serde::Serialize;
use std::fmt;

/// A MAVProxy invocation kept as separate tokens.
///
/// Tokens are only joined into a shell string at the spawn boundary, see
/// [`CommandLine::to_shell_string`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    #[serde(skip)]
    platform: Platform,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, platform: Platform) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            platform,
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<S: Into<String>, I: IntoIterator<Item = S>>(&mut self, iter: I) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by every argument
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Join the tokens into one line for the platform shell, quoting any token
    /// the shell would otherwise split or interpret.
    pub fn to_shell_string(&self) -> String {
        let mut tokens = Vec::with_capacity(self.args.len() + 1);
        match self.platform {
            Platform::Posix => {
                tokens.extend(self.tokens().map(quote_posix));
            }
            Platform::Windows => {
                tokens.push(quote_cmd_program(&self.program));
                tokens.extend(self.args.iter().map(|arg| quote_cmd(arg)));
            }
        }
        tokens.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_string())
    }
}

fn quote_posix(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

// cmd.exe takes the command name up to the first unquoted blank. Program
// paths cannot contain `"`, so plain quotes are enough here.
fn quote_cmd_program(program: &str) -> String {
    if program.chars().any(|c| c.is_whitespace() || CMD_SPECIAL.contains(c)) {
        format!("\"{program}\"")
    } else {
        program.to_string()
    }
}

const CMD_SPECIAL: &str = "^&|<>()\"%";

// Arguments are quoted for the program's own argv parser first, then every
// cmd.exe special character, quotes included, is escaped with `^`. cmd never
// enters a quoted region, so nothing in the token can act as an operator.
// `^%` also stops `%NAME%` expansion, since the looked-up name ends in `^`.
fn quote_cmd(token: &str) -> String {
    let argv = if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c == '"') {
        quote_argv(token)
    } else {
        token.to_string()
    };

    let mut escaped = String::with_capacity(argv.len());
    for c in argv.chars() {
        if CMD_SPECIAL.contains(c) {
            escaped.push('^');
        }
        escaped.push(c);
    }
    escaped
}

// Quoting understood by CommandLineToArgvW and the MSVC runtime.
fn quote_argv(token: &str) -> String {
    let mut quoted = String::from('"');
    let mut backslashes = 0;
    for c in token.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat_n('\\', backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat_n('\\', backslashes * 2));
    quoted.push('"');
    quoted
}

/// Turn a route into the MAVProxy command for the given platform.
///
/// The route is validated first; on failure nothing is built and the
/// validation error is returned as-is.
pub fn synthesize(config: &RouteConfig, profile: &PlatformProfile) -> Result<CommandLine, RouterError> {
    config.validate()?;

    let mut command = CommandLine::new(profile.executable(), profile.platform());

    match config.source_kind {
        SourceKind::Serial => {
            command
                .arg(format!("--master={}", config.source_value.trim()))
                .arg("--baudrate")
                .arg(config.baud_rate.to_string());
        }
        SourceKind::Udp => {
            command.arg(format!("--master=udp:{}", config.source_value));
        }
    }

    // MAVProxy runs as a managed child, so its own prompt is disabled
    command
        .args(["--out", config.destination1.as_str()])
        .args(["--out", config.destination2.as_str()])
        .arg("--non-interactive");

    if config.show_map {
        command.arg("--map");
    }
    if config.show_console {
        command.arg("--console");
    }

    Ok(command)
}
