//! Instrumentation port.
//!
//! The correlator reports every phase of every call to a [`MessageObserver`]
//! and the dispatcher reports every event. Observers run inline on the
//! calling task, so a slow observer slows every call down.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;

/// Tracing target used by [`TracingObserver`].
pub const PROTOCOL_TARGET: &str = "cdp::protocol";

/// Receives request, response and event notifications.
///
/// Implementations must not block and must not panic.
pub trait MessageObserver: Send + Sync {
	/// A request was attempted. `error` is set when it never reached the outbound queue.
	fn request(&self, id: i64, method: &str, payload: &[u8], error: Option<&Error>);

	/// A response was awaited. `payload` is `None` when nothing (or nothing
	/// non-empty) was delivered.
	fn response(&self, id: i64, method: &str, payload: Option<&[u8]>, error: Option<&Error>);

	/// An event arrived from the target.
	fn event(&self, method: &str, payload: &[u8]);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MessageObserver for NoopObserver {
	fn request(&self, _id: i64, _method: &str, _payload: &[u8], _error: Option<&Error>) {}

	fn response(&self, _id: i64, _method: &str, _payload: Option<&[u8]>, _error: Option<&Error>) {}

	fn event(&self, _method: &str, _payload: &[u8]) {}
}

/// Observer that forwards notifications to `tracing` under [`PROTOCOL_TARGET`].
///
/// Lifecycle lines are logged at `debug`, frame bodies at `trace` and
/// failures at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MessageObserver for TracingObserver {
	fn request(&self, id: i64, method: &str, payload: &[u8], error: Option<&Error>) {
		match error {
			Some(error) => tracing::warn!(target: PROTOCOL_TARGET, id, method, %error, "request failed"),
			None => {
				tracing::debug!(target: PROTOCOL_TARGET, id, method, bytes = payload.len(), "request sent");
				tracing::trace!(target: PROTOCOL_TARGET, id, body = %String::from_utf8_lossy(payload), "request body");
			}
		}
	}

	fn response(&self, id: i64, method: &str, payload: Option<&[u8]>, error: Option<&Error>) {
		match (error, payload) {
			(Some(error), _) => tracing::warn!(target: PROTOCOL_TARGET, id, method, %error, "response failed"),
			(None, Some(payload)) => {
				tracing::debug!(target: PROTOCOL_TARGET, id, method, bytes = payload.len(), "response received");
				tracing::trace!(target: PROTOCOL_TARGET, id, body = %String::from_utf8_lossy(payload), "response body");
			}
			(None, None) => tracing::warn!(target: PROTOCOL_TARGET, id, method, "empty response received"),
		}
	}

	fn event(&self, method: &str, payload: &[u8]) {
		tracing::debug!(target: PROTOCOL_TARGET, method, bytes = payload.len(), "event received");
		tracing::trace!(target: PROTOCOL_TARGET, method, body = %String::from_utf8_lossy(payload), "event body");
	}
}

static GLOBAL: RwLock<Option<Arc<dyn MessageObserver>>> = parking_lot::const_rwlock(None);

/// The process-wide default observer, [`NoopObserver`] unless one was installed.
///
/// Only consulted when a correlator or connection is constructed without an
/// explicit observer.
pub fn global() -> Arc<dyn MessageObserver> {
	GLOBAL.read().clone().unwrap_or_else(|| Arc::new(NoopObserver))
}

/// Installs the process-wide default observer.
pub fn set_global(observer: Arc<dyn MessageObserver>) {
	*GLOBAL.write() = Some(observer);
}

/// Restores [`NoopObserver`] as the process-wide default.
pub fn reset_global() {
	*GLOBAL.write() = None;
}
