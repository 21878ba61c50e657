//! Inbound routing.
//!
//! The dispatcher owns the correlation table: call id to reply slot. The
//! connection's writer task registers a slot just before a request frame
//! goes out, and the reader task hands every inbound frame to
//! [`Dispatcher::dispatch`], which either fills the matching slot or fans
//! the frame out as an event.

use std::sync::Arc;

use cdp_protocol::{Event, peek_header};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace, warn};

use crate::events::EventRouter;
use crate::observer::MessageObserver;
use crate::target::{InboundMessage, ReplySlot};

struct PendingCall {
	method: String,
	reply: ReplySlot,
}

/// What [`Dispatcher::dispatch`] did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
	/// Delivered to the waiting call.
	Delivered(i64),
	/// Matched a call whose caller had already given up.
	Abandoned(i64),
	/// No call with this id is in flight. Late duplicates land here.
	Orphaned(i64),
	/// Routed to event handlers; carries the handler count.
	Event { method: String, handlers: usize },
	/// Neither a response nor an event.
	Unknown,
	/// Not valid JSON.
	Malformed,
}

/// Correlation table plus event fan-out.
pub struct Dispatcher {
	pending: DashMap<i64, PendingCall>,
	events: EventRouter,
	observer: Arc<dyn MessageObserver>,
}

impl Dispatcher {
	pub fn new(observer: Arc<dyn MessageObserver>) -> Self {
		Self {
			pending: DashMap::new(),
			events: EventRouter::new(),
			observer,
		}
	}

	pub fn events(&self) -> &EventRouter {
		&self.events
	}

	/// Records the reply slot for call `id`.
	///
	/// Returns `false` and drops `reply` if `id` is already in flight; the
	/// rejected caller then sees an empty response instead of someone else's.
	pub fn register(&self, id: i64, method: &str, reply: ReplySlot) -> bool {
		match self.pending.entry(id) {
			Entry::Occupied(existing) => {
				warn!(id, method, in_flight = %existing.get().method, "duplicate call id rejected");
				false
			}
			Entry::Vacant(slot) => {
				slot.insert(PendingCall {
					method: method.to_string(),
					reply,
				});
				true
			}
		}
	}

	/// Removes the slot for `id` without filling it.
	pub fn forget(&self, id: i64) -> bool {
		self.pending.remove(&id).is_some()
	}

	/// Routes one inbound frame.
	pub fn dispatch(&self, frame: Vec<u8>) -> Dispatched {
		let header = match peek_header(&frame) {
			Ok(header) => header,
			Err(error) => {
				warn!(%error, bytes = frame.len(), "dropping malformed frame");
				return Dispatched::Malformed;
			}
		};

		if let Some(id) = header.call_id() {
			return self.deliver(InboundMessage {
				id: Some(id),
				method: header.method,
				data: frame,
			});
		}

		let Some(method) = header.method else {
			debug!(bytes = frame.len(), "ignoring frame with neither id nor method");
			return Dispatched::Unknown;
		};

		self.observer.event(&method, &frame);
		match serde_json::from_slice::<Event>(&frame) {
			Ok(event) => {
				let handlers = self.events.emit(&event);
				trace!(method = %event.method, handlers, "event dispatched");
				Dispatched::Event {
					method: event.method,
					handlers,
				}
			}
			Err(error) => {
				warn!(%method, %error, "dropping undecodable event");
				Dispatched::Malformed
			}
		}
	}

	/// Fills the slot matching `message.id`. Each slot is filled at most once.
	pub fn deliver(&self, message: InboundMessage) -> Dispatched {
		let Some(id) = message.id else {
			return Dispatched::Unknown;
		};

		let Some((_, call)) = self.pending.remove(&id) else {
			warn!(id, "response for unknown call id");
			return Dispatched::Orphaned(id);
		};

		if call.reply.send(message).is_err() {
			debug!(id, method = %call.method, "caller gave up before the response arrived");
			return Dispatched::Abandoned(id);
		}
		Dispatched::Delivered(id)
	}

	/// Drops slots whose caller has stopped listening. Returns how many went.
	pub fn sweep(&self) -> usize {
		let before = self.pending.len();
		self.pending.retain(|_, call| !call.reply.is_closed());
		before.saturating_sub(self.pending.len())
	}

	/// Drops every slot, waking each waiting caller with an empty response.
	pub fn close_all(&self) -> usize {
		let count = self.pending.len();
		self.pending.clear();
		count
	}

	pub fn pending_count(&self) -> usize {
		self.pending.len()
	}
}

impl std::fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("pending", &self.pending.len())
			.field("events", &self.events)
			.finish()
	}
}
