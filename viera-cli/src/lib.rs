//! Command-line front end for Panasonic Viera TVs
//!
//! `viera <tv_addr> <tv_port> <command> [args...]` resolves the command,
//! checks its arity, resolves the TV, and hands off to one of the modes in
//! [`commands`]. Every user-facing failure maps to a fixed exit code, see
//! [`CliError::exit_code`].

pub mod args;
pub mod commands;
pub mod error;
pub mod logging;

use std::io::Write;

use soap_client::{DeviceAddress, Transport};
use tracing::debug;
use viera_api::{parse_port, resolve_command, CommandTarget};

pub use args::{usage, Args};
pub use commands::EventOptions;
pub use error::CliError;

/// Resolve the TV named on the command line.
///
/// The host is looked up before the port is checked, so an unresolvable host
/// wins over a bad port.
pub async fn resolve_device(tv_addr: &str, tv_port: &str) -> Result<DeviceAddress, CliError> {
    let resolved = DeviceAddress::resolve(tv_addr, 0)
        .await
        .map_err(|source| CliError::Resolve {
            host: tv_addr.to_string(),
            source,
        })?;
    let port = parse_port(tv_port).map_err(CliError::DevicePort)?;
    Ok(DeviceAddress::new(tv_addr, port, resolved.ip()))
}

/// Run one invocation, writing device output to `out`
pub async fn run<W: Write>(args: &Args, out: &mut W) -> Result<(), CliError> {
    let command = resolve_command(&args.command)?;
    command.check_arity(args.args.len())?;

    let device = resolve_device(&args.tv_addr, &args.tv_port).await?;
    debug!(host = device.host(), ip = %device.ip(), port = device.port(), "resolved TV");
    let transport = Transport::new(device);

    match command.target {
        CommandTarget::Service(_) => commands::run_soap(command, &args.args, &transport, out).await,
        CommandTarget::Dial => commands::run_dial(&args.args, &transport, out).await,
        CommandTarget::RegisterEvent => {
            commands::run_regevent(&args.args, transport, args.renewal_window_duration(), out).await
        }
        CommandTarget::Event => {
            let options = EventOptions {
                callback_host: args.callback_host.clone(),
                renewal_window: args.renewal_window_duration(),
            };
            commands::run_event(&args.args, transport, &options, out).await
        }
    }
}
