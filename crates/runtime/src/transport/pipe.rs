//! NUL-delimited frames over a byte stream.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::{FrameReader, FrameWriter, TransportParts};
use crate::error::{Error, Result};

const DELIMITER: u8 = 0;

pub struct PipeWriter<W> {
	inner: W,
}

impl<W> PipeWriter<W> {
	pub fn new(inner: W) -> Self {
		Self { inner }
	}
}

#[async_trait]
impl<W> FrameWriter for PipeWriter<W>
where
	W: AsyncWrite + Unpin + Send,
{
	async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
		self.inner.write_all(frame).await?;
		self.inner.write_all(&[DELIMITER]).await?;
		self.inner.flush().await?;
		Ok(())
	}

	async fn close(&mut self) -> Result<()> {
		self.inner.shutdown().await?;
		Ok(())
	}
}

pub struct PipeReader<R> {
	inner: BufReader<R>,
	// Keeps partial frames across a cancelled read.
	buf: Vec<u8>,
}

impl<R: AsyncRead> PipeReader<R> {
	pub fn new(inner: R) -> Self {
		Self {
			inner: BufReader::new(inner),
			buf: Vec::new(),
		}
	}
}

#[async_trait]
impl<R> FrameReader for PipeReader<R>
where
	R: AsyncRead + Unpin + Send,
{
	async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
		loop {
			let read = self.inner.read_until(DELIMITER, &mut self.buf).await?;
			if read == 0 {
				if self.buf.is_empty() {
					return Ok(None);
				}
				let partial = self.buf.len();
				self.buf.clear();
				return Err(Error::Transport(format!("pipe closed mid-frame after {partial} bytes")));
			}
			if self.buf.last() != Some(&DELIMITER) {
				// EOF without a terminator; the next read reports it.
				continue;
			}
			self.buf.pop();
			if self.buf.is_empty() {
				continue;
			}
			return Ok(Some(std::mem::take(&mut self.buf)));
		}
	}
}

/// Builds a transport over a pair of byte streams, typically a browser's
/// fd 3 (its input) and fd 4 (its output).
pub fn pipe_transport<R, W>(reader: R, writer: W) -> TransportParts
where
	R: AsyncRead + Unpin + Send + 'static,
	W: AsyncWrite + Unpin + Send + 'static,
{
	TransportParts::new(PipeWriter::new(writer), PipeReader::new(reader))
}
