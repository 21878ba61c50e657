//! One frame per WebSocket text message.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use super::{FrameReader, FrameWriter, TransportParts};
use crate::error::{Error, Result};

pub struct WebSocketWriter<S> {
	sink: SplitSink<WebSocketStream<S>, WsMessage>,
}

#[async_trait]
impl<S> FrameWriter for WebSocketWriter<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send,
{
	async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
		let text = String::from_utf8(frame.to_vec()).map_err(|e| Error::Transport(format!("frame is not UTF-8: {e}")))?;
		self.sink
			.send(WsMessage::Text(text))
			.await
			.map_err(|e| Error::Transport(e.to_string()))
	}

	async fn close(&mut self) -> Result<()> {
		self.sink.close().await.map_err(|e| Error::Transport(e.to_string()))
	}
}

pub struct WebSocketReader<S> {
	stream: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> FrameReader for WebSocketReader<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send,
{
	async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
		while let Some(message) = self.stream.next().await {
			match message.map_err(|e| Error::Transport(e.to_string()))? {
				WsMessage::Text(text) => return Ok(Some(text.into_bytes())),
				WsMessage::Binary(data) => return Ok(Some(data)),
				WsMessage::Close(frame) => {
					tracing::debug!(?frame, "websocket closed by peer");
					return Ok(None);
				}
				WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
			}
		}
		Ok(None)
	}
}

/// Splits an established WebSocket into transport halves.
pub fn websocket_transport<S>(stream: WebSocketStream<S>) -> TransportParts
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	let (sink, stream) = stream.split();
	TransportParts::new(WebSocketWriter { sink }, WebSocketReader { stream })
}

/// Connects to a DevTools WebSocket endpoint such as
/// `ws://127.0.0.1:9222/devtools/browser/<id>`.
pub async fn connect(url: &str) -> Result<TransportParts> {
	let (stream, response) = tokio_tungstenite::connect_async(url)
		.await
		.map_err(|e| Error::ConnectionFailed(format!("{url}: {e}")))?;
	tracing::debug!(url, status = %response.status(), "websocket connected");
	Ok(websocket_transport(stream))
}
