//! Async reading and writing of native messaging frames.

use anyhow::{Context, Result};
use linkmate_protocol::frame::{self, LENGTH_PREFIX_LEN, MAX_INBOUND_LEN, MAX_OUTBOUND_LEN};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one frame body.
///
/// Returns [`None`] when the stream ends cleanly between frames, which is
/// how the browser signals that the port was closed.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
	let mut prefix = [0u8; LENGTH_PREFIX_LEN];
	let read = reader.read(&mut prefix).await.context("Failed to read length prefix")?;
	if read == 0 {
		return Ok(None);
	}
	reader
		.read_exact(&mut prefix[read..])
		.await
		.context("Failed to read length prefix")?;

	let len = frame::body_len(prefix, MAX_INBOUND_LEN)?;
	let mut body = vec![0u8; len];
	reader
		.read_exact(&mut body)
		.await
		.with_context(|| format!("Failed to read {len} byte message body"))?;
	Ok(Some(body))
}

/// Writes one frame and flushes.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<()>
where
	W: AsyncWrite + Unpin,
	T: Serialize,
{
	let bytes = frame::encode(value, MAX_OUTBOUND_LEN)?;
	writer.write_all(&bytes).await.context("Failed to write frame")?;
	writer.flush().await.context("Failed to flush frame")?;
	Ok(())
}
