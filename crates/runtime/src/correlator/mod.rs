//! Request/response correlation.
//!
//! A call runs in two phases, each bounded by the target's call timeout:
//!
//! 1. **Send**: hand the encoded request and its private reply slot to the
//!    target's outbound queue.
//! 2. **Receive**: wait for the reply slot to be filled.
//!
//! Each phase races four outcomes. When several are ready at once they are
//! resolved in a fixed order: shutdown, caller cancellation, success,
//! timeout. Every call terminates with exactly one outcome and reports it to
//! the [`MessageObserver`] exactly once per phase reached.

use std::sync::Arc;

use cdp_protocol::{Response, decode_response, encode_request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::observer::{self, MessageObserver};
use crate::target::{OutboundMessage, Target};


/// Raw reply to a correlated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
	pub id: i64,
	pub method: String,
	/// Undecoded response frame, never empty.
	pub data: Vec<u8>,
}

impl Reply {
	/// Decodes the envelope, turning an error member into [`Error::Remote`].
	pub fn into_response(self) -> Result<Response> {
		let response = decode_response(&self.data)?;
		match response.error {
			Some(error) => Err(Error::Remote {
				id: self.id,
				code: error.code,
				message: error.message,
			}),
			None => Ok(response),
		}
	}

	/// Decodes the `result` member into `R` after checking for an error envelope.
	pub fn decode<R: DeserializeOwned>(self) -> Result<R> {
		Ok(self.into_response()?.decode_result()?)
	}
}

/// Sends commands through a [`Target`] and waits for their replies.
///
/// The correlator holds no per-call state; everything a call needs lives on
/// its own task, so any number of calls may run concurrently.
#[derive(Clone)]
pub struct Correlator {
	observer: Arc<dyn MessageObserver>,
}

impl Default for Correlator {
	fn default() -> Self {
		Self::new(observer::global())
	}
}

impl std::fmt::Debug for Correlator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Correlator").finish_non_exhaustive()
	}
}

impl Correlator {
	pub fn new(observer: Arc<dyn MessageObserver>) -> Self {
		Self { observer }
	}

	pub fn observer(&self) -> &Arc<dyn MessageObserver> {
		&self.observer
	}

	/// Sends `method` with `params` and returns the raw reply frame.
	///
	/// The caller decodes the reply; no envelope inspection happens here.
	pub async fn send_with_custom_decode<T, P>(
		&self,
		cancel: &CancellationToken,
		target: &T,
		method: &str,
		params: &P,
	) -> Result<Reply>
	where
		T: Target + ?Sized,
		P: Serialize + ?Sized,
	{
		let id = target.next_id();
		let timeout = target.call_timeout();
		let shutdown = target.shutdown_signal();

		let data: Arc<[u8]> = match encode_request(id, method, params) {
			Ok(data) => data.into(),
			Err(err) => {
				let err = Error::Codec(err);
				self.observer.request(id, method, &[], Some(&err));
				return Err(err);
			}
		};

		let (reply, delivery) = oneshot::channel();
		let message = OutboundMessage {
			id,
			method: method.to_string(),
			data: Arc::clone(&data),
			reply,
		};

		let sent = tokio::select! {
			biased;
			_ = shutdown.cancelled() => Err(shutdown_error(id, method)),
			_ = cancel.cancelled() => Err(cancelled_error(id, method)),
			queued = target.outbound().send(message) => queued.map_err(|_| shutdown_error(id, method)),
			_ = tokio::time::sleep(timeout) => Err(Error::CallTimeout {
				id,
				method: method.to_string(),
				timeout,
			}),
		};
		self.observer.request(id, method, &data, sent.as_ref().err());
		sent?;
		tracing::trace!(id, method, "request queued");

		let received = tokio::select! {
			biased;
			_ = shutdown.cancelled() => Err(shutdown_error(id, method)),
			_ = cancel.cancelled() => Err(cancelled_error(id, method)),
			delivered = delivery => Ok(delivered.ok().filter(|message| !message.is_empty())),
			_ = tokio::time::sleep(timeout) => Err(Error::CallTimeout {
				id,
				method: method.to_string(),
				timeout,
			}),
		};

		let delivered = match received {
			Ok(delivered) => delivered,
			Err(err) => {
				self.observer.response(id, method, None, Some(&err));
				return Err(err);
			}
		};
		self.observer
			.response(id, method, delivered.as_ref().map(|message| message.data.as_slice()), None);

		match delivered {
			Some(message) => Ok(Reply {
				id,
				method: method.to_string(),
				data: message.data,
			}),
			None => Err(Error::EmptyResponse {
				id,
				method: method.to_string(),
			}),
		}
	}

	/// Sends `method` and decodes the generic response envelope.
	///
	/// An error envelope becomes [`Error::Remote`] carrying the call id.
	pub async fn send_default<T, P>(
		&self,
		cancel: &CancellationToken,
		target: &T,
		method: &str,
		params: &P,
	) -> Result<Response>
	where
		T: Target + ?Sized,
		P: Serialize + ?Sized,
	{
		self.send_with_custom_decode(cancel, target, method, params)
			.await?
			.into_response()
	}

	/// Sends `method` and decodes `result` into `R`.
	pub async fn send_decoded<T, P, R>(
		&self,
		cancel: &CancellationToken,
		target: &T,
		method: &str,
		params: &P,
	) -> Result<R>
	where
		T: Target + ?Sized,
		P: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		self.send_with_custom_decode(cancel, target, method, params)
			.await?
			.decode()
	}
}

fn shutdown_error(id: i64, method: &str) -> Error {
	Error::TargetShutdown {
		id,
		method: method.to_string(),
	}
}

fn cancelled_error(id: i64, method: &str) -> Error {
	Error::ContextCancelled {
		id,
		method: method.to_string(),
	}
}
