//! Native messaging frame codec.
//!
//! Each message on the host's stdin/stdout is a 4-byte little-endian length
//! followed by that many bytes of UTF-8 JSON. Browsers cap messages to the
//! host at 64 MiB and messages from the host at 1 MiB.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Largest message a browser will deliver to the host.
pub const MAX_INBOUND_LEN: usize = 64 * 1024 * 1024;

/// Largest message a host may send back to the browser.
pub const MAX_OUTBOUND_LEN: usize = 1024 * 1024;

/// Errors produced while framing or unframing messages.
#[derive(Debug, Error)]
pub enum FrameError {
	#[error("frame of {len} bytes exceeds the {max} byte limit")]
	TooLarge { len: usize, max: usize },

	#[error("frame JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Serializes `value` and prepends its length, enforcing `max`.
pub fn encode<T: Serialize>(value: &T, max: usize) -> Result<Vec<u8>, FrameError> {
	let body = serde_json::to_vec(value)?;
	if body.len() > max {
		return Err(FrameError::TooLarge { len: body.len(), max });
	}

	let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + body.len());
	frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
	frame.extend_from_slice(&body);
	Ok(frame)
}

/// Reads the body length from a length prefix, enforcing `max`.
pub fn body_len(prefix: [u8; LENGTH_PREFIX_LEN], max: usize) -> Result<usize, FrameError> {
	let len = u32::from_le_bytes(prefix) as usize;
	if len > max {
		return Err(FrameError::TooLarge { len, max });
	}
	Ok(len)
}

/// Parses a frame body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FrameError> {
	Ok(serde_json::from_slice(body)?)
}
