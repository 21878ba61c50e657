//! Correlation runtime for the Chrome DevTools Protocol.
//!
//! The [`Correlator`] turns a command into exactly one terminal outcome:
//! a reply, a remote error, a timeout, a caller cancellation, or a
//! target shutdown. It needs nothing from its host beyond the [`Target`]
//! trait; [`Connection`] is the host shipped here, wired to the pipe and
//! WebSocket transports.

pub mod channel;
pub mod config;
pub mod connection;
pub mod correlator;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod observer;
pub mod target;
pub mod transport;

pub use channel::Channel;
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use correlator::{Correlator, Reply};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{Error, Result};
pub use events::{EventHandler, EventRouter, HandlerId, Subscription};
pub use observer::{MessageObserver, NoopObserver, TracingObserver};
pub use target::{InboundMessage, OutboundMessage, ReplySlot, Target};
pub use tokio_util::sync::CancellationToken;
pub use transport::{FrameReader, FrameWriter, TransportParts};
