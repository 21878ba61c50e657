//! Frame transports.
//!
//! A transport moves whole JSON frames; it knows nothing about ids or
//! methods. [`pipe`] speaks the NUL-delimited framing browsers use with
//! `--remote-debugging-pipe`, [`websocket`] carries one frame per text message.

use async_trait::async_trait;

use crate::error::Result;

pub mod pipe;
pub mod websocket;

#[cfg(test)]
mod tests;

pub use pipe::{PipeReader, PipeWriter, pipe_transport};
pub use websocket::{WebSocketReader, WebSocketWriter, websocket_transport};

/// Outbound half of a transport.
#[async_trait]
pub trait FrameWriter: Send {
	/// Writes one complete frame.
	async fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

	/// Flushes and closes the underlying stream.
	async fn close(&mut self) -> Result<()> {
		Ok(())
	}
}

/// Inbound half of a transport.
#[async_trait]
pub trait FrameReader: Send {
	/// Reads the next frame. `Ok(None)` means the peer closed cleanly.
	async fn read_frame(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Both halves of a transport, ready to hand to a [`Connection`](crate::Connection).
pub struct TransportParts {
	pub writer: Box<dyn FrameWriter>,
	pub reader: Box<dyn FrameReader>,
}

impl TransportParts {
	pub fn new(writer: impl FrameWriter + 'static, reader: impl FrameReader + 'static) -> Self {
		Self {
			writer: Box::new(writer),
			reader: Box::new(reader),
		}
	}
}

impl std::fmt::Debug for TransportParts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransportParts").finish_non_exhaustive()
	}
}
