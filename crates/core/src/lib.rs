//! Typed Chrome DevTools Protocol domains.
//!
//! ```ignore
//! use cdp::{CancellationToken, ConnectionConfig, Session};
//! use cdp::media::PlayersCreated;
//!
//! let session = Session::connect("ws://127.0.0.1:9222/devtools/page/ABC", ConnectionConfig::default()).await?;
//! let _players = session.on::<PlayersCreated, _>(|event| println!("{:?}", event.params.players));
//! session.media().enable(&CancellationToken::new()).await?;
//! ```

#[macro_use]
mod macros;

pub mod dom_debugger;
pub mod events;
pub mod media;
pub mod runtime;
pub mod session;

pub use cdp_protocol::{ErrorPayload, Event, Response};
pub use cdp_runtime::{
	CancellationToken, Channel, Connection, ConnectionConfig, Error, MessageObserver, NoopObserver, Result, Subscription,
	TracingObserver,
};
pub use dom_debugger::DomDebugger;
pub use events::{EventEnvelope, ProtocolEvent, TypedEvents};
pub use media::Media;
pub use session::Session;
