//! Event subscription lifecycle for Panasonic Viera TVs.
//!
//! Event mode keeps a set of UPnP subscriptions alive for as long as the
//! process runs:
//!
//! - [`SubscriptionEngine`] owns the [`ServiceRegistry`], learns subscription
//!   ids from notifications and renews them before the TV expires them
//! - [`HeartbeatMonitor`] keeps the TV's liveness channel open
//! - [`EventLoop`] multiplexes the notification listener, the heartbeat and
//!   the next renewal deadline on a single thread
//!
//! ```no_run
//! use soap_client::{DeviceAddress, Transport};
//! use viera_stream::{EventLoop, StreamConfig};
//!
//! # async fn run() -> viera_stream::Result<()> {
//! let device = DeviceAddress::resolve("192.168.1.20", 55000).await?;
//! let config = StreamConfig::new().with_listen_port(2222);
//! let event_loop = EventLoop::start(&config, Transport::new(device)).await?;
//! event_loop.engine().subscribe("dmr0", "192.168.1.10", 2222).await?;
//! event_loop.run().await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event_loop;
pub mod heartbeat;
pub mod registry;
pub mod sender;
pub mod subscription;

pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use event_loop::{EventLoop, Wakeup};
pub use heartbeat::{HeartbeatEvent, HeartbeatMonitor};
pub use registry::{ActiveSubscription, ServiceEntry, ServiceRegistry};
pub use sender::RequestSender;
pub use subscription::{NotifyOutcome, SubscriptionEngine};
