//! Connection host.
//!
//! A [`Connection`] is the stock [`Target`]: it hands out call ids, owns the
//! bounded outbound queue and the shutdown signal, and runs three background
//! tasks once a transport is attached:
//!
//! - **writer**: drains the outbound queue, registers each reply slot with
//!   the [`Dispatcher`] and writes the frame.
//! - **reader**: reads frames and hands them to the dispatcher.
//! - **sweeper**: periodically drops reply slots abandoned by their callers,
//!   and empties the correlation table and the event handlers once the
//!   connection shuts down.
//!
//! Transport failure on either side fires the shutdown signal, which fails
//! every in-flight call with [`Error::TargetShutdown`].

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channel::Channel;
use crate::config::ConnectionConfig;
use crate::correlator::Correlator;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::events::EventRouter;
use crate::observer::{self, MessageObserver};
use crate::target::{OutboundMessage, Target};
use crate::transport::{self, FrameReader, FrameWriter, TransportParts};


/// One live connection to a DevTools target.
pub struct Connection {
	last_id: AtomicI64,
	config: ConnectionConfig,
	outbound_tx: mpsc::Sender<OutboundMessage>,
	outbound_rx: Mutex<Option<mpsc::Receiver<OutboundMessage>>>,
	shutdown: CancellationToken,
	dispatcher: Arc<Dispatcher>,
	correlator: Arc<Correlator>,
}

impl Target for Connection {
	fn next_id(&self) -> i64 {
		self.last_id.fetch_add(1, Ordering::SeqCst) + 1
	}

	fn call_timeout(&self) -> Duration {
		self.config.call_timeout()
	}

	fn outbound(&self) -> &mpsc::Sender<OutboundMessage> {
		&self.outbound_tx
	}

	fn shutdown_signal(&self) -> &CancellationToken {
		&self.shutdown
	}
}

impl Connection {
	/// Creates a connection that is not yet attached to a transport.
	///
	/// Calls issued before [`Connection::run`] wait in the outbound queue.
	/// `observer` defaults to the process-wide one.
	pub fn new(config: ConnectionConfig, observer: Option<Arc<dyn MessageObserver>>) -> Result<Arc<Self>> {
		config.validate()?;
		let observer = observer.unwrap_or_else(observer::global);
		let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity);

		Ok(Arc::new(Self {
			last_id: AtomicI64::new(0),
			config,
			outbound_tx,
			outbound_rx: Mutex::new(Some(outbound_rx)),
			shutdown: CancellationToken::new(),
			dispatcher: Arc::new(Dispatcher::new(Arc::clone(&observer))),
			correlator: Arc::new(Correlator::new(observer)),
		}))
	}

	/// Connects over a DevTools WebSocket URL and starts the connection.
	pub async fn connect_websocket(
		url: &str,
		config: ConnectionConfig,
		observer: Option<Arc<dyn MessageObserver>>,
	) -> Result<Arc<Self>> {
		let connection = Self::new(config, observer)?;
		let parts = transport::websocket::connect(url).await?;
		connection.run(parts)?;
		info!(url, "connected to target");
		Ok(connection)
	}

	/// Starts a connection over a pipe pair (`--remote-debugging-pipe`).
	pub fn connect_pipe<R, W>(
		reader: R,
		writer: W,
		config: ConnectionConfig,
		observer: Option<Arc<dyn MessageObserver>>,
	) -> Result<Arc<Self>>
	where
		R: AsyncRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let connection = Self::new(config, observer)?;
		connection.run(transport::pipe_transport(reader, writer))?;
		Ok(connection)
	}

	/// Attaches a transport and spawns the writer, reader and sweeper tasks.
	///
	/// Fails if the connection is already running.
	pub fn run(&self, parts: TransportParts) -> Result<()> {
		let outbound_rx = self
			.outbound_rx
			.lock()
			.take()
			.ok_or_else(|| Error::Transport("connection is already running".into()))?;
		let TransportParts { writer, reader } = parts;

		tokio::spawn(write_loop(
			writer,
			outbound_rx,
			Arc::clone(&self.dispatcher),
			self.shutdown.clone(),
		));
		tokio::spawn(read_loop(reader, Arc::clone(&self.dispatcher), self.shutdown.clone()));
		tokio::spawn(sweep_loop(
			self.config.sweep_interval(),
			Arc::clone(&self.dispatcher),
			self.shutdown.clone(),
		));
		Ok(())
	}

	/// A [`Channel`] issuing commands over this connection.
	pub fn channel(self: &Arc<Self>) -> Channel {
		let target: Arc<dyn Target> = Arc::clone(self) as Arc<dyn Target>;
		Channel::new(target, Arc::clone(&self.correlator))
	}

	pub fn correlator(&self) -> &Arc<Correlator> {
		&self.correlator
	}

	pub fn dispatcher(&self) -> &Arc<Dispatcher> {
		&self.dispatcher
	}

	pub fn events(&self) -> &EventRouter {
		self.dispatcher.events()
	}

	pub fn config(&self) -> &ConnectionConfig {
		&self.config
	}

	/// Shuts the connection down. In-flight and future calls fail with
	/// [`Error::TargetShutdown`]. Idempotent.
	pub fn close(&self) {
		if !self.shutdown.is_cancelled() {
			debug!("closing connection");
			self.shutdown.cancel();
		}
	}

	pub fn is_closed(&self) -> bool {
		self.shutdown.is_cancelled()
	}

	/// Resolves once the connection has shut down for any reason.
	pub async fn closed(&self) {
		self.shutdown.cancelled().await
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		self.shutdown.cancel();
	}
}

impl std::fmt::Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("last_id", &self.last_id.load(Ordering::Relaxed))
			.field("config", &self.config)
			.field("closed", &self.shutdown.is_cancelled())
			.field("dispatcher", &self.dispatcher)
			.finish()
	}
}

async fn write_loop(
	mut writer: Box<dyn FrameWriter>,
	mut outbound_rx: mpsc::Receiver<OutboundMessage>,
	dispatcher: Arc<Dispatcher>,
	shutdown: CancellationToken,
) {
	loop {
		let message = tokio::select! {
			biased;
			_ = shutdown.cancelled() => break,
			message = outbound_rx.recv() => match message {
				Some(message) => message,
				None => break,
			},
		};

		let OutboundMessage { id, method, data, reply } = message;
		if reply.is_closed() {
			debug!(id, %method, "caller gave up before the request was written");
			continue;
		}
		// Registered first so a fast reply always finds its slot.
		if !dispatcher.register(id, &method, reply) {
			continue;
		}

		let written = tokio::select! {
			biased;
			_ = shutdown.cancelled() => break,
			written = writer.write_frame(&data) => written,
		};
		if let Err(err) = written {
			error!(id, %method, error = %err, "failed to write frame");
			dispatcher.forget(id);
			shutdown.cancel();
			break;
		}
	}

	if let Err(err) = writer.close().await {
		debug!(error = %err, "error closing transport writer");
	}
}

async fn read_loop(mut reader: Box<dyn FrameReader>, dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) {
	loop {
		let frame = tokio::select! {
			biased;
			_ = shutdown.cancelled() => return,
			frame = reader.read_frame() => frame,
		};

		match frame {
			Ok(Some(frame)) => {
				dispatcher.dispatch(frame);
			}
			Ok(None) => {
				info!("target closed the connection");
				break;
			}
			Err(err) => {
				warn!(error = %err, "transport read failed");
				break;
			}
		}
	}
	shutdown.cancel();
}

async fn sweep_loop(interval: Duration, dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) {
	let mut ticker = tokio::time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// First tick completes immediately.
	ticker.tick().await;

	loop {
		tokio::select! {
			biased;
			_ = shutdown.cancelled() => break,
			_ = ticker.tick() => {
				let swept = dispatcher.sweep();
				if swept > 0 {
					debug!(swept, "dropped abandoned reply slots");
				}
			}
		}
	}

	let dropped = dispatcher.close_all();
	let handlers = dispatcher.events().clear();
	debug!(dropped, handlers, "connection shut down");
}
