use std::time::Duration;

use clap::{Parser, ValueEnum};
use viera_api::command_names;

use crate::error::CliError;
use crate::logging::LoggingMode;

/// Panasonic Viera remote control
///
/// Sends a single UPnP action to the TV, relays a DIAL launch request,
/// registers an event subscription, or runs a long-lived event listener.
#[derive(Parser, Debug)]
#[command(name = "viera")]
#[command(about = "Panasonic Viera UPnP remote control and event listener")]
#[command(version)]
pub struct Args {
    /// TV host name or IP address
    pub tv_addr: String,

    /// TV control port, usually 55000
    pub tv_port: String,

    /// Command to run
    pub command: String,

    /// Command arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Address the TV should call back in event mode (detected when omitted)
    #[arg(long)]
    pub callback_host: Option<String>,

    /// Seconds between subscription renewals
    #[arg(long, default_value = "290")]
    pub renewal_window: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "development")]
    pub log_mode: LogModeArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogModeArg {
    Silent,
    Development,
    Debug,
}

impl From<LogModeArg> for LoggingMode {
    fn from(mode: LogModeArg) -> Self {
        match mode {
            LogModeArg::Silent => LoggingMode::Silent,
            LogModeArg::Development => LoggingMode::Development,
            LogModeArg::Debug => LoggingMode::Debug,
        }
    }
}

impl Args {
    pub fn renewal_window_duration(&self) -> Duration {
        Duration::from_secs(self.renewal_window)
    }

    /// Validate options that clap cannot check on its own
    pub fn validate(&self) -> Result<(), CliError> {
        if self.renewal_window == 0 {
            return Err(CliError::Usage("Renewal window must be positive".to_string()));
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(CliError::Usage(format!(
                "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                self.log_level
            ))),
        }
    }
}

/// Usage line followed by every command name
pub fn usage() -> String {
    let commands: Vec<&str> = command_names().collect();
    format!(
        "Usage : viera [OPTIONS] <TV_ADDR> <TV_PORT> <COMMAND> [ARGS]...\nCommands: {}",
        commands.join(" ")
    )
}
