//! The capability a host must provide to drive the correlator.
//!
//! A [`Target`] is deliberately narrow: an id source, a per-call deadline,
//! an outbound queue and a shutdown signal. [`Connection`](crate::Connection)
//! is the stock implementation; tests and embedders can supply their own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Sending half of a call's private, single-use delivery channel.
pub type ReplySlot = oneshot::Sender<InboundMessage>;

/// A serialized command on its way to the transport, together with the slot
/// its reply must be delivered into.
#[derive(Debug)]
pub struct OutboundMessage {
	pub id: i64,
	pub method: String,
	/// Encoded request frame.
	pub data: Arc<[u8]>,
	pub reply: ReplySlot,
}

/// A frame read from the transport.
///
/// `id` is `None` for events. `data` holds the raw frame bytes; an empty
/// payload means the target went away before answering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
	pub id: Option<i64>,
	pub method: Option<String>,
	pub data: Vec<u8>,
}

impl InboundMessage {
	pub fn reply(id: i64, data: impl Into<Vec<u8>>) -> Self {
		Self {
			id: Some(id),
			method: None,
			data: data.into(),
		}
	}

	pub fn event(method: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
		Self {
			id: None,
			method: Some(method.into()),
			data: data.into(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

/// Host contract consumed by [`Correlator`](crate::Correlator).
pub trait Target: Send + Sync {
	/// Returns an id unique among the calls currently in flight on this
	/// connection. Called concurrently.
	fn next_id(&self) -> i64;

	/// Deadline applied separately to the send phase and to the receive phase.
	fn call_timeout(&self) -> Duration;

	/// Bounded queue of outbound messages. A full queue holds callers in the
	/// send phase.
	fn outbound(&self) -> &mpsc::Sender<OutboundMessage>;

	/// Fires once, permanently, when the connection is torn down.
	fn shutdown_signal(&self) -> &CancellationToken;
}

impl<T: Target + ?Sized> Target for Arc<T> {
	fn next_id(&self) -> i64 {
		(**self).next_id()
	}

	fn call_timeout(&self) -> Duration {
		(**self).call_timeout()
	}

	fn outbound(&self) -> &mpsc::Sender<OutboundMessage> {
		(**self).outbound()
	}

	fn shutdown_signal(&self) -> &CancellationToken {
		(**self).shutdown_signal()
	}
}
