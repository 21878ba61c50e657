//! Typed event decoding.

use std::marker::PhantomData;

use cdp_protocol::Event;
use cdp_runtime::{EventRouter, Result, Subscription};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

/// Params payload of one protocol event.
pub trait ProtocolEvent: DeserializeOwned + Send + 'static {
	/// `Domain.eventName` this payload belongs to.
	const METHOD: &'static str;
}

/// A decoded event together with its routing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope<P> {
	pub method: String,
	pub params: P,
	/// Set when the event came from a flattened child session.
	pub session_id: Option<String>,
}

impl<P: ProtocolEvent> EventEnvelope<P> {
	/// Decodes `event`, rejecting events whose method is not `P::METHOD`.
	pub fn decode(event: &Event) -> Result<Self> {
		if event.method != P::METHOD {
			let mismatch = <serde_json::Error as serde::de::Error>::custom(format_args!(
				"expected {} event, got {}",
				P::METHOD,
				event.method
			));
			return Err(mismatch.into());
		}
		Ok(Self {
			method: event.method.clone(),
			params: event.decode_params()?,
			session_id: event.session_id.clone(),
		})
	}
}

/// Stream of one event type. Unsubscribes when dropped.
pub struct TypedEvents<E> {
	rx: mpsc::UnboundedReceiver<Event>,
	_subscription: Subscription,
	_marker: PhantomData<fn() -> E>,
}

impl<E: ProtocolEvent> TypedEvents<E> {
	pub(crate) fn new(router: &EventRouter) -> Self {
		let (subscription, rx) = router.subscribe_channel(Some(E::METHOD));
		Self {
			rx,
			_subscription: subscription,
			_marker: PhantomData,
		}
	}

	/// Waits for the next event. `None` once the connection is gone.
	///
	/// A payload that fails to decode is returned as an error and does not
	/// end the stream.
	pub async fn recv(&mut self) -> Option<Result<EventEnvelope<E>>> {
		let event = self.rx.recv().await?;
		Some(EventEnvelope::decode(&event))
	}
}

impl<E> std::fmt::Debug for TypedEvents<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypedEvents")
			.field("method", &std::any::type_name::<E>())
			.finish()
	}
}
