//! UPnP callback listener for receiving event notifications from the TV.
//!
//! The TV delivers events as `NOTIFY` requests to the callback URL given at
//! subscription time (`http://<host>:<port>/<service key>`). This crate:
//!
//! 1. Binds a listening socket with address reuse
//! 2. Drains each connection until the closing `</e:propertyset>` tag
//! 3. Extracts the subscription id and service key with literal matching
//! 4. Writes a bare `200 OK` status line back
//!
//! Forwarding the resulting [`NotificationPayload`] to subscription state is
//! left to the caller.
//!
//! # Example
//!
//! ```no_run
//! use callback_server::EventServer;
//!
//! # async fn run() -> Result<(), callback_server::ServerError> {
//! let server = EventServer::bind(2222, 4).await?;
//! loop {
//!     let (stream, peer) = server.accept().await?;
//!     if let Some(notification) = server.handle_connection(stream, peer).await {
//!         println!("{} -> {}", notification.service_key, notification.subscription_id);
//!     }
//! }
//! # }
//! ```

mod error;
pub mod notify;
pub mod propertyset;
mod server;

pub use error::{Result, ServerError};
pub use notify::NotificationPayload;
pub use server::{EventServer, DEFAULT_BACKLOG, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_NOTIFICATION_SIZE};
