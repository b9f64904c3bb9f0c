//! The four ways an invocation can talk to the TV

use std::io::Write;
use std::net::{IpAddr, UdpSocket};
use std::time::Duration;

use anyhow::Context;
use soap_client::{extract_response, response_values, SoapError, Transport};
use tracing::{debug, info, warn};
use viera_api::dial::dial_request;
use viera_api::events::subscribe_request;
use viera_api::keys::check_key;
use viera_api::{encode, parse_port, resolve_service, ApiError, CommandEntry};
use viera_stream::{EventLoop, StreamConfig, SubscriptionEngine};

use crate::error::CliError;

/// Options that only matter in event mode
#[derive(Debug, Clone)]
pub struct EventOptions {
    pub callback_host: Option<String>,
    pub renewal_window: Duration,
}

/// Send one SOAP action and print the request and the raw reply.
///
/// For `key`, an unknown token is still sent and the device decides what to
/// do with it. The key list is reported whether or not the send succeeded.
pub async fn run_soap<W: Write>(
    command: &CommandEntry,
    args: &[String],
    transport: &Transport,
    out: &mut W,
) -> Result<(), CliError> {
    let request = encode(command, args, transport.device())?;
    writeln!(out, "{}{}", request.header, request.body).context("Failed to write request")?;
    debug!(command = command.name, request = %request.to_wire(), "sending action");

    let sent = transport
        .send_and_drain(transport.device().port(), Some(&request.header), &request.body)
        .await;
    if let Ok(reply) = &sent {
        out.write_all(reply).context("Failed to write reply")?;
        inspect_reply(reply, command.action);
    }

    if command.name == "key" {
        if let Some(token) = args.first() {
            if let Err(ApiError::UnknownKey { key, valid }) = check_key(token) {
                warn!(%key, "unknown key token");
                writeln!(out, "Invalid key !\n{valid}").context("Failed to write key list")?;
            }
        }
    }

    sent.with_context(|| format!("Failed to send '{}'", command.name))?;
    Ok(())
}

fn inspect_reply(reply: &[u8], action: &str) {
    match extract_response(reply, action) {
        Ok(response) => {
            for (name, value) in response_values(&response) {
                info!(action, %name, %value, "response value");
            }
        }
        Err(SoapError::Fault(code)) => warn!(action, code, "device returned a SOAP fault"),
        Err(e) => debug!(action, error = %e, "reply carries no action response"),
    }
}

/// Relay `<verb> <path> [body]` to the DIAL endpoint
pub async fn run_dial<W: Write>(args: &[String], transport: &Transport, out: &mut W) -> Result<(), CliError> {
    let (verb, path) = match args {
        [verb, path, ..] => (verb, path),
        _ => return Err(missing("dial", 2, args.len())),
    };
    let request = dial_request(verb, path, args.get(2).map(String::as_str), transport.device());
    writeln!(out, "{request}").context("Failed to write request")?;
    debug!(%request, "sending DIAL request");

    let reply = transport
        .send_and_drain(transport.device().port(), None, &request)
        .await
        .context("Failed to send DIAL request")?;
    out.write_all(&reply).context("Failed to write reply")?;
    Ok(())
}

/// Ask the TV to send events for one service to `<host>:<port>`
pub async fn run_regevent<W: Write>(
    args: &[String],
    transport: Transport,
    renewal_window: Duration,
    out: &mut W,
) -> Result<(), CliError> {
    let [service_key, callback_host, callback_port, ..] = args else {
        return Err(missing("regevent", 3, args.len()));
    };

    let service = resolve_service(service_key).map_err(CliError::ServiceKey)?;
    let callback_port = parse_port(callback_port).map_err(CliError::CallbackPort)?;

    let request = subscribe_request(service, transport.device(), callback_host, callback_port);
    write!(out, "{request}").context("Failed to write request")?;

    let device = transport.device().clone();
    let engine = SubscriptionEngine::new(transport, device, renewal_window);
    let reply = engine
        .subscribe(service_key, callback_host, callback_port)
        .await
        .context("Failed to register subscription")?;
    out.write_all(&reply).context("Failed to write reply")?;
    Ok(())
}

/// Listen for notifications on `<listenPort>` forever, subscribing any
/// service keys given after it.
pub async fn run_event<W: Write>(
    args: &[String],
    transport: Transport,
    options: &EventOptions,
    out: &mut W,
) -> Result<(), CliError> {
    let Some((port, service_keys)) = args.split_first() else {
        return Err(missing("event", 1, 0));
    };

    let listen_port = parse_port(port).map_err(CliError::ListenPort)?;
    for key in service_keys {
        resolve_service(key).map_err(CliError::ServiceKey)?;
    }

    let callback_host = match (&options.callback_host, service_keys.is_empty()) {
        (Some(host), _) => Some(host.clone()),
        (None, true) => None,
        (None, false) => Some(
            detect_local_ip()
                .context("Cannot detect a local address for callbacks, pass --callback-host")?
                .to_string(),
        ),
    };

    writeln!(out, "Listening on port {listen_port}").context("Failed to write status")?;

    let config = StreamConfig::new()
        .with_listen_port(listen_port)
        .with_renewal_window(options.renewal_window);
    let event_loop = EventLoop::start(&config, transport)
        .await
        .context("Failed to start event listener")?;

    if let Some(callback_host) = callback_host {
        for key in service_keys {
            match event_loop.engine().subscribe(key, &callback_host, listen_port).await {
                Ok(_) => info!(service = %key, %callback_host, "subscribed"),
                Err(e) => warn!(service = %key, error = %e, "subscription request failed"),
            }
        }
    }

    event_loop.run().await.context("Event loop stopped")?;
    Ok(())
}

fn missing(command: &str, expected: usize, supplied: usize) -> CliError {
    CliError::MissingValues(ApiError::ArgumentCountMismatch {
        command: command.to_string(),
        expected,
        supplied,
    })
}

/// Local address of the interface that routes to the outside world.
/// Nothing is sent; connecting a UDP socket only selects a route.
pub fn detect_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let local_addr = socket.local_addr().ok()?;
    Some(local_addr.ip())
}
