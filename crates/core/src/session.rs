//! Entry point tying a [`Connection`] to the domain wrappers.

use std::sync::Arc;

use cdp_protocol::Response;
use cdp_runtime::{Connection, ConnectionConfig, MessageObserver, Subscription};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::events::{EventEnvelope, ProtocolEvent, TypedEvents};
use crate::{CancellationToken, Channel, DomDebugger, Media, Result};

/// A connected target plus a [`Channel`] onto it.
///
/// Cloning is cheap; clones share the connection. The connection shuts
/// down when [`Session::close`] is called or the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Session {
	connection: Arc<Connection>,
	channel: Channel,
}

impl Session {
	pub fn new(connection: Arc<Connection>) -> Self {
		let channel = connection.channel();
		Self { connection, channel }
	}

	/// Connects to a DevTools WebSocket endpoint.
	pub async fn connect(url: &str, config: ConnectionConfig) -> Result<Self> {
		Self::connect_with_observer(url, config, None).await
	}

	pub async fn connect_with_observer(
		url: &str,
		config: ConnectionConfig,
		observer: Option<Arc<dyn MessageObserver>>,
	) -> Result<Self> {
		let connection = Connection::connect_websocket(url, config, observer).await?;
		Ok(Self::new(connection))
	}

	/// Attaches to a browser started with `--remote-debugging-pipe`.
	pub fn connect_pipe<R, W>(reader: R, writer: W, config: ConnectionConfig) -> Result<Self>
	where
		R: AsyncRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let connection = Connection::connect_pipe(reader, writer, config, None)?;
		Ok(Self::new(connection))
	}

	pub fn connection(&self) -> &Arc<Connection> {
		&self.connection
	}

	pub fn channel(&self) -> &Channel {
		&self.channel
	}

	pub fn media(&self) -> Media {
		Media::new(self.channel.clone())
	}

	pub fn dom_debugger(&self) -> DomDebugger {
		DomDebugger::new(self.channel.clone())
	}

	/// Sends an arbitrary command and returns the decoded envelope.
	pub async fn call<P>(&self, cancel: &CancellationToken, method: &str, params: &P) -> Result<Response>
	where
		P: Serialize + ?Sized,
	{
		self.channel.send_default(cancel, method, params).await
	}

	/// Registers a typed handler for `E`. Payloads that fail to decode are
	/// logged and skipped.
	pub fn on<E, F>(&self, handler: F) -> Subscription
	where
		E: ProtocolEvent,
		F: Fn(EventEnvelope<E>) + Send + Sync + 'static,
	{
		self.connection
			.events()
			.subscribe(E::METHOD, move |event| match EventEnvelope::<E>::decode(event) {
				Ok(envelope) => handler(envelope),
				Err(error) => tracing::warn!(method = E::METHOD, %error, "failed to decode event"),
			})
	}

	/// Streams events of type `E` until the connection closes.
	pub fn events<E: ProtocolEvent>(&self) -> TypedEvents<E> {
		TypedEvents::new(self.connection.events())
	}

	/// Shuts the connection down; calls in flight fail with `TargetShutdown`.
	pub fn close(&self) {
		self.connection.close();
	}

	pub fn is_closed(&self) -> bool {
		self.connection.is_closed()
	}
}
