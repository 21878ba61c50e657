//! A [`Target`] bound to a [`Correlator`].

use std::sync::Arc;

use cdp_protocol::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::correlator::{Correlator, Reply};
use crate::error::Result;
use crate::target::Target;

/// Cheaply clonable handle that issues commands against one target.
///
/// Domain command wrappers take a `&Channel` and pick the send flavour that
/// matches their result shape.
#[derive(Clone)]
pub struct Channel {
	target: Arc<dyn Target>,
	correlator: Arc<Correlator>,
}

impl Channel {
	pub fn new(target: Arc<dyn Target>, correlator: Arc<Correlator>) -> Self {
		Self { target, correlator }
	}

	pub fn target(&self) -> &Arc<dyn Target> {
		&self.target
	}

	pub fn correlator(&self) -> &Arc<Correlator> {
		&self.correlator
	}

	/// Sends a command and decodes the generic response envelope.
	pub async fn send_default<P>(&self, cancel: &CancellationToken, method: &str, params: &P) -> Result<Response>
	where
		P: Serialize + ?Sized,
	{
		self.correlator
			.send_default(cancel, &*self.target, method, params)
			.await
	}

	/// Sends a command and returns the undecoded reply.
	pub async fn send_with_custom_decode<P>(&self, cancel: &CancellationToken, method: &str, params: &P) -> Result<Reply>
	where
		P: Serialize + ?Sized,
	{
		self.correlator
			.send_with_custom_decode(cancel, &*self.target, method, params)
			.await
	}

	/// Sends a command and decodes its `result` member into `R`.
	pub async fn send<P, R>(&self, cancel: &CancellationToken, method: &str, params: &P) -> Result<R>
	where
		P: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		self.correlator
			.send_decoded(cancel, &*self.target, method, params)
			.await
	}

	/// Sends a command whose result carries nothing of interest.
	pub async fn send_no_result<P>(&self, cancel: &CancellationToken, method: &str, params: &P) -> Result<()>
	where
		P: Serialize + ?Sized,
	{
		self.send_default(cancel, method, params).await.map(|_| ())
	}
}

impl std::fmt::Debug for Channel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Channel")
			.field("call_timeout", &self.target.call_timeout())
			.field("closed", &self.target.shutdown_signal().is_cancelled())
			.finish()
	}
}
