use crate::error::{Id3Error, Result};
use crate::pool::FrameWriter;
use crate::util::{parse_size, size_bytes_usize};

use std::io::{self, Read};

/// Size of a frame header: ID (4), synchsafe body size (4), flags (2)
pub const FRAME_HEADER_SIZE: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
	pub id: String,
	pub body_size: u32,
}

/// Parse the next frame header
///
/// The two flag bytes are read but not interpreted.
///
/// # Errors
///
/// * The source is empty (an end-of-stream `Io` error)
/// * The ID or the size are blank, meaning padding was reached ([`Id3Error::BlankFrame`])
/// * The size isn't synchsafe ([`Id3Error::InvalidSizeFormat`])
/// * Fewer than 10 bytes are left ([`Id3Error::TruncatedFrameHeader`])
///
/// The ID itself isn't validated. Vendor frames or IDs that weren't upgraded from ID3v2.2
/// are passed on, and end up kept verbatim.
pub fn parse_frame_header<R>(reader: &mut R) -> Result<FrameHeader>
where
	R: Read + ?Sized,
{
	let mut header = [0; FRAME_HEADER_SIZE as usize];

	match read_up_to(reader, &mut header)? {
		0 => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
		n if n < header.len() => return Err(Id3Error::TruncatedFrameHeader(n)),
		_ => {},
	}

	let body_size = parse_size([header[4], header[5], header[6], header[7]])?;
	let id = &header[..4];

	if body_size == 0 || id.iter().all(|b| *b == 0 || *b == b' ') {
		return Err(Id3Error::BlankFrame);
	}

	Ok(FrameHeader {
		id: id.iter().map(|b| char::from(*b)).collect(),
		body_size,
	})
}

/// Write a frame header with zeroed flags
///
/// Any 4 ASCII letters or digits are accepted, so frames read with an unusual ID can be
/// written back.
pub(crate) fn write_frame_header(
	writer: &mut FrameWriter,
	id: &str,
	body_size: usize,
) -> Result<()> {
	if !is_writable_id(id.as_bytes()) {
		return Err(Id3Error::InvalidFrameId(id.to_string()));
	}

	let size = size_bytes_usize(body_size)?;

	writer.write_bytes(id.as_bytes());
	writer.write_bytes(&size);
	writer.write_bytes(&[0, 0]);

	Ok(())
}

/// Whether `id` is a standard frame ID, 4 characters of `A-Z0-9`
pub(crate) fn is_valid_id(id: &[u8]) -> bool {
	id.len() == 4 && id.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn is_writable_id(id: &[u8]) -> bool {
	id.len() == 4 && id.iter().all(u8::is_ascii_alphanumeric)
}

// Like `read_exact`, but reports how much was read instead of failing on a short source
fn read_up_to<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
	R: Read + ?Sized,
{
	let mut filled = 0;

	while filled < buf.len() {
		match reader.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(n) => filled += n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
			Err(e) => return Err(e),
		}
	}

	Ok(filled)
}

#[cfg(test)]
mod tests {
	use super::{parse_frame_header, write_frame_header, FrameHeader};
	use crate::error::Id3Error;
	use crate::pool::FrameWriter;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse() {
		let mut data = &b"TIT2\x00\x00\x02\x01\x00\x00rest"[..];

		assert_eq!(
			parse_frame_header(&mut data).unwrap(),
			FrameHeader {
				id: String::from("TIT2"),
				body_size: 257,
			}
		);
		assert_eq!(data, b"rest");
	}

	#[test]
	fn blank_frames() {
		assert!(matches!(
			parse_frame_header(&mut &[0_u8; 10][..]),
			Err(Id3Error::BlankFrame)
		));
		assert!(matches!(
			parse_frame_header(&mut &b"TIT2\x00\x00\x00\x00\x00\x00"[..]),
			Err(Id3Error::BlankFrame)
		));
		assert!(matches!(
			parse_frame_header(&mut &b"    \x00\x00\x00\x05\x00\x00"[..]),
			Err(Id3Error::BlankFrame)
		));
	}

	#[test]
	fn end_of_stream() {
		assert!(parse_frame_header(&mut &b""[..]).unwrap_err().is_eof());
		assert!(matches!(
			parse_frame_header(&mut &b"TIT2\x00"[..]),
			Err(Id3Error::TruncatedFrameHeader(5))
		));
	}

	#[test]
	fn malformed_size() {
		assert!(matches!(
			parse_frame_header(&mut &b"TIT2\x00\x00\x81\x00\x00\x00"[..]),
			Err(Id3Error::InvalidSizeFormat)
		));
	}

	#[test]
	fn nonstandard_ids_are_accepted() {
		assert_eq!(
			parse_frame_header(&mut &b"XtRa\x00\x00\x00\x0B\x00\x00"[..]).unwrap(),
			FrameHeader {
				id: String::from("XtRa"),
				body_size: 11,
			}
		);
		assert_eq!(
			parse_frame_header(&mut &b"ti t\x00\x00\x00\x01\x00\x00"[..])
				.unwrap()
				.id,
			"ti t"
		);
	}

	#[test]
	fn write() {
		let mut writer = FrameWriter::default();
		write_frame_header(&mut writer, "COMM", 257).unwrap();

		let mut out = Vec::new();
		writer.flush_to(&mut out).unwrap();
		assert_eq!(out, b"COMM\x00\x00\x02\x01\x00\x00");

		assert!(matches!(
			write_frame_header(&mut writer, "TIT", 1),
			Err(Id3Error::InvalidFrameId(_))
		));
		assert!(matches!(
			write_frame_header(&mut writer, "ti t", 1),
			Err(Id3Error::InvalidFrameId(_))
		));
		write_frame_header(&mut writer, "XtRa", 1).unwrap();
		assert!(matches!(
			write_frame_header(&mut writer, "TIT2", 0x1000_0000),
			Err(Id3Error::TooMuchData)
		));
	}
}
