//! Event fan-out.
//!
//! Handlers are stored in an [`IndexMap`] so they fire in registration order
//! and can be removed in O(1) by the [`Subscription`] handle returned at
//! registration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use cdp_protocol::Event;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Unique identifier for event handlers.
pub type HandlerId = u64;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique handler ID.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Handler function. Runs on the connection's reader task, so it must not block.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Clone)]
struct HandlerEntry {
	/// `None` matches every event.
	method: Option<String>,
	handler: EventHandler,
}

impl HandlerEntry {
	fn matches(&self, method: &str) -> bool {
		self.method.as_deref().is_none_or(|m| m == method)
	}
}

type HandlerMap = Arc<Mutex<IndexMap<HandlerId, HandlerEntry>>>;

/// Routes inbound events to subscribed handlers.
#[derive(Default)]
pub struct EventRouter {
	handlers: HandlerMap,
}

impl EventRouter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for events named `method`.
	pub fn subscribe<F>(&self, method: impl Into<String>, handler: F) -> Subscription
	where
		F: Fn(&Event) + Send + Sync + 'static,
	{
		self.insert(Some(method.into()), Arc::new(handler))
	}

	/// Registers `handler` for every event.
	pub fn subscribe_all<F>(&self, handler: F) -> Subscription
	where
		F: Fn(&Event) + Send + Sync + 'static,
	{
		self.insert(None, Arc::new(handler))
	}

	/// Streams matching events into a channel. The subscription ends when
	/// either the handle or the receiver is dropped.
	pub fn subscribe_channel(&self, method: Option<&str>) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let handler: EventHandler = Arc::new(move |event: &Event| {
			let _ = tx.send(event.clone());
		});
		(self.insert(method.map(str::to_string), handler), rx)
	}

	fn insert(&self, method: Option<String>, handler: EventHandler) -> Subscription {
		let id = next_handler_id();
		self.handlers.lock().insert(id, HandlerEntry { method, handler });
		Subscription::from_handler_map(id, &self.handlers)
	}

	/// Removes a handler by id. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, id: HandlerId) -> bool {
		self.handlers.lock().shift_remove(&id).is_some()
	}

	/// Invokes every matching handler in registration order and returns how
	/// many ran.
	///
	/// The handler list is snapshotted first, so handlers may subscribe or
	/// unsubscribe from inside a callback.
	pub fn emit(&self, event: &Event) -> usize {
		let matching: Vec<EventHandler> = self
			.handlers
			.lock()
			.values()
			.filter(|entry| entry.matches(&event.method))
			.map(|entry| Arc::clone(&entry.handler))
			.collect();

		for handler in &matching {
			handler(event);
		}
		matching.len()
	}

	/// Drops every handler. Channel subscribers see their stream end.
	pub fn clear(&self) -> usize {
		let mut handlers = self.handlers.lock();
		let count = handlers.len();
		handlers.clear();
		count
	}

	pub fn handler_count(&self) -> usize {
		self.handlers.lock().len()
	}
}

impl std::fmt::Debug for EventRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventRouter")
			.field("handlers", &self.handler_count())
			.finish()
	}
}

/// RAII handle that unregisters an event handler on drop.
///
/// Holds a weak reference to the handler map, so dropping after the owning
/// connection is gone is a no-op. Call [`Subscription::detach`] to keep the
/// handler for the lifetime of the connection.
pub struct Subscription {
	id: HandlerId,
	handlers: Option<Weak<Mutex<IndexMap<HandlerId, HandlerEntry>>>>,
}

impl Subscription {
	fn from_handler_map(id: HandlerId, handlers: &HandlerMap) -> Self {
		Self {
			id,
			handlers: Some(Arc::downgrade(handlers)),
		}
	}

	/// Returns this subscription's handler ID.
	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		self.remove();
	}

	/// Leaves the handler registered and returns its id.
	pub fn detach(mut self) -> HandlerId {
		self.handlers = None;
		self.id
	}

	fn remove(&mut self) {
		if let Some(map) = self.handlers.take().and_then(|weak| weak.upgrade()) {
			map.lock().shift_remove(&self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.remove();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.handlers.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use serde_json::json;

	use super::*;

	fn event(method: &str) -> Event {
		Event::new(method, json!({}))
	}

	#[test]
	fn test_handler_id_increments() {
		let id1 = next_handler_id();
		let id2 = next_handler_id();
		assert!(id2 > id1);
	}

	#[test]
	fn test_emit_filters_by_method() {
		let router = EventRouter::new();
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&hits);
		let _sub = router.subscribe("Media.playersCreated", move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		assert_eq!(router.emit(&event("Media.playersCreated")), 1);
		assert_eq!(router.emit(&event("Media.playerEventsAdded")), 0);
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_handlers_fire_in_registration_order() {
		let router = EventRouter::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		let first = Arc::clone(&order);
		let _a = router.subscribe_all(move |_| first.lock().push("all"));
		let second = Arc::clone(&order);
		let _b = router.subscribe("Media.playersCreated", move |_| second.lock().push("players"));

		router.emit(&event("Media.playersCreated"));
		assert_eq!(*order.lock(), vec!["all", "players"]);
	}

	#[test]
	fn test_subscription_drop_unregisters() {
		let router = EventRouter::new();
		{
			let _sub = router.subscribe_all(|_| {});
			assert_eq!(router.handler_count(), 1);
		}
		assert_eq!(router.handler_count(), 0);
	}

	#[test]
	fn test_subscription_detach_keeps_handler() {
		let router = EventRouter::new();
		let id = router.subscribe_all(|_| {}).detach();
		assert_eq!(router.handler_count(), 1);
		assert!(router.unsubscribe(id));
		assert!(!router.unsubscribe(id));
	}

	#[tokio::test]
	async fn test_clear_ends_channel_streams() {
		let router = EventRouter::new();
		let (sub, mut rx) = router.subscribe_channel(None);
		assert_eq!(router.clear(), 1);
		assert!(rx.recv().await.is_none());
		drop(sub);
	}

	#[test]
	fn test_subscription_outlives_router() {
		let router = EventRouter::new();
		let sub = router.subscribe_all(|_| {});
		drop(router);
		drop(sub);
	}

	#[test]
	fn test_handler_may_unsubscribe_itself() {
		let router = Arc::new(EventRouter::new());
		let slot: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));

		let weak = Arc::downgrade(&router);
		let own_id = Arc::clone(&slot);
		let id = router
			.subscribe_all(move |_| {
				if let (Some(router), Some(id)) = (weak.upgrade(), *own_id.lock()) {
					router.unsubscribe(id);
				}
			})
			.detach();
		*slot.lock() = Some(id);

		assert_eq!(router.emit(&event("Media.playersCreated")), 1);
		assert_eq!(router.emit(&event("Media.playersCreated")), 0);
	}

	#[tokio::test]
	async fn test_channel_subscription() {
		let router = EventRouter::new();
		let (_sub, mut rx) = router.subscribe_channel(Some("Media.playerErrorsRaised"));

		router.emit(&event("Media.playersCreated"));
		router.emit(&Event::new("Media.playerErrorsRaised", json!({"playerId": "p1"})));

		let received = rx.recv().await.unwrap();
		assert_eq!(received.method, "Media.playerErrorsRaised");
		assert_eq!(received.params["playerId"], "p1");
		assert!(rx.try_recv().is_err());
	}
}
