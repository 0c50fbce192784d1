//! Synchsafe integers and text helpers
//!
//! Every size in an ID3v2 tag (the tag size as well as each frame's body size) is stored
//! as a 4 byte synchsafe integer: only the low 7 bits of each byte are used, so no encoded
//! size can ever look like an MPEG frame sync. This leaves 28 bits, or a bit under 256 MiB.

pub mod text_utils;

use crate::error::{Id3Error, Result};

/// The largest value a 4 byte synchsafe integer can hold
pub const MAX_SYNCHSAFE: u32 = 0x0FFF_FFFF;

// https://github.com/polyfloyd/rust-id3/blob/e142ec656bf70a8153f6e5b34a37f26df144c3c1/src/stream/unsynch.rs#L18-L20
pub(crate) fn unsynch_u32(n: u32) -> u32 {
	n & 0xFF | (n & 0xFF00) >> 1 | (n & 0xFF_0000) >> 2 | (n & 0xFF00_0000) >> 3
}

// https://github.com/polyfloyd/rust-id3/blob/e142ec656bf70a8153f6e5b34a37f26df144c3c1/src/stream/unsynch.rs#L9-L15
pub(crate) fn synch_u32(n: u32) -> Result<u32> {
	if n > MAX_SYNCHSAFE {
		return Err(Id3Error::TooMuchData);
	}

	let mut x: u32 = n & 0x7F | (n & 0xFFFF_FF80) << 1;
	x = x & 0x7FFF | (x & 0xFFFF_8000) << 1;
	x = x & 0x7F_FFFF | (x & 0xFF80_0000) << 1;
	Ok(x)
}

/// Decode a 4 byte synchsafe size
///
/// # Errors
///
/// Any byte has its high bit set ([`Id3Error::InvalidSizeFormat`])
pub fn parse_size(bytes: [u8; 4]) -> Result<u32> {
	if bytes.iter().any(|b| b & 0x80 != 0) {
		return Err(Id3Error::InvalidSizeFormat);
	}

	Ok(unsynch_u32(u32::from_be_bytes(bytes)))
}

/// Encode a size as 4 synchsafe bytes
///
/// # Errors
///
/// `size` is larger than [`MAX_SYNCHSAFE`] ([`Id3Error::TooMuchData`])
pub fn size_bytes(size: u32) -> Result<[u8; 4]> {
	synch_u32(size).map(u32::to_be_bytes)
}

/// Same as [`size_bytes`], for sizes computed as `usize`
pub(crate) fn size_bytes_usize(size: usize) -> Result<[u8; 4]> {
	let size = u32::try_from(size).map_err(|_| Id3Error::TooMuchData)?;
	size_bytes(size)
}
