use crate::error::{Id3Error, Result};
use crate::pool::FrameWriter;
use crate::util::{parse_size, size_bytes_usize};

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};

/// Size of the tag header, which is not included in the tag's declared size
pub const TAG_HEADER_SIZE: u64 = 10;
/// The oldest major version this crate reads
pub const MIN_SUPPORTED_VERSION: u8 = 3;

const MAGIC: &[u8; 3] = b"ID3";

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
/// Flags that apply to the entire tag
pub struct TagFlags {
	/// Whether or not all frames are unsynchronised
	pub unsynchronisation: bool,
	/// An extended header follows the tag header
	pub extended_header: bool,
	/// Indicates if the tag is in an experimental stage
	pub experimental: bool,
	/// Indicates that the tag includes a footer
	pub footer: bool,
}

impl TagFlags {
	pub fn from_byte(flags: u8) -> Self {
		Self {
			unsynchronisation: flags & 0x80 == 0x80,
			extended_header: flags & 0x40 == 0x40,
			experimental: flags & 0x20 == 0x20,
			footer: flags & 0x10 == 0x10,
		}
	}

	/// The flags byte as it is written
	///
	/// Only `experimental` survives: extended headers, footers and unsynchronisation are
	/// never produced when writing.
	pub fn as_written_byte(self) -> u8 {
		if self.experimental {
			0x20
		} else {
			0
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The fixed 10 byte header at the start of a tag
pub struct TagHeader {
	/// Major version, 3 for ID3v2.3 and 4 for ID3v2.4
	pub version: u8,
	/// Ignored when reading, written as 0
	pub revision: u8,
	pub flags: TagFlags,
	/// Size of everything following the header
	pub frames_size: u32,
}

/// Parse the tag header at the start of `reader`
///
/// # Errors
///
/// * The source doesn't start with a tag ([`Id3Error::NoTag`])
/// * The major version is below 3 ([`Id3Error::UnsupportedVersion`])
/// * The size isn't synchsafe ([`Id3Error::InvalidSizeFormat`])
pub fn parse_header<R>(reader: &mut R) -> Result<TagHeader>
where
	R: Read + ?Sized,
{
	let mut header = [0; TAG_HEADER_SIZE as usize];
	match reader.read_exact(&mut header) {
		Ok(()) => {},
		Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(Id3Error::NoTag),
		Err(e) => return Err(e.into()),
	}

	if &header[..3] != MAGIC {
		return Err(Id3Error::NoTag);
	}

	// Version is stored as [major, revision], the revision is of no interest
	let version = header[3];
	if version < MIN_SUPPORTED_VERSION {
		return Err(Id3Error::UnsupportedVersion(version));
	}

	let frames_size = parse_size([header[6], header[7], header[8], header[9]])?;

	Ok(TagHeader {
		version,
		revision: header[4],
		flags: TagFlags::from_byte(header[5]),
		frames_size,
	})
}

/// Skip the extended header, returning the number of bytes consumed
///
/// ID3v2.4 stores a synchsafe size including the size field itself,
/// ID3v2.3 a plain size excluding it.
pub(crate) fn skip_extended_header<R>(reader: &mut R, version: u8) -> Result<u64>
where
	R: Read + ?Sized,
{
	let size_field = reader.read_u32::<BigEndian>()?;

	let remaining = if version >= 4 {
		u64::from(parse_size(size_field.to_be_bytes())?).saturating_sub(4)
	} else {
		u64::from(size_field)
	};

	let skipped = io::copy(&mut reader.take(remaining), &mut io::sink())?;
	if skipped < remaining {
		return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
	}

	Ok(4 + remaining)
}

/// Write a tag header declaring `frames_size` bytes of frames
pub(crate) fn write_header(
	writer: &mut FrameWriter,
	version: u8,
	flags: TagFlags,
	frames_size: usize,
) -> Result<()> {
	let size = size_bytes_usize(frames_size)?;

	writer.write_bytes(MAGIC);
	writer.write_bytes(&[version, 0, flags.as_written_byte()]);
	writer.write_bytes(&size);

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{parse_header, skip_extended_header, write_header, TagFlags, TagHeader};
	use crate::error::Id3Error;
	use crate::pool::FrameWriter;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_v4_header() {
		let header = parse_header(&mut &b"ID3\x04\x00\x40\x00\x00\x02\x01"[..]).unwrap();

		assert_eq!(
			header,
			TagHeader {
				version: 4,
				revision: 0,
				flags: TagFlags {
					extended_header: true,
					..TagFlags::default()
				},
				frames_size: 257,
			}
		);
	}

	#[test]
	fn missing_magic() {
		assert!(matches!(
			parse_header(&mut &b"RIFF\x04\x00\x00\x00\x00\x00"[..]),
			Err(Id3Error::NoTag)
		));
		assert!(matches!(
			parse_header(&mut &b"ID3"[..]),
			Err(Id3Error::NoTag)
		));
		assert!(matches!(parse_header(&mut &b""[..]), Err(Id3Error::NoTag)));
	}

	#[test]
	fn old_versions_are_rejected() {
		assert!(matches!(
			parse_header(&mut &b"ID3\x02\x00\x00\x00\x00\x00\x10"[..]),
			Err(Id3Error::UnsupportedVersion(2))
		));
	}

	#[test]
	fn invalid_size_is_a_hard_error() {
		assert!(matches!(
			parse_header(&mut &b"ID3\x03\x00\x00\x00\x00\x80\x00"[..]),
			Err(Id3Error::InvalidSizeFormat)
		));
	}

	#[test]
	fn extended_header_sizes() {
		// ID3v2.4, 6 bytes including the size field, then the first frame
		let mut data = &b"\x00\x00\x00\x06\x01\x00TIT2"[..];
		assert_eq!(skip_extended_header(&mut data, 4).unwrap(), 6);
		assert_eq!(data, b"TIT2");

		// ID3v2.3, 6 bytes excluding the size field
		let mut data = &b"\x00\x00\x00\x06\x00\x00\x00\x00\x00\x00TIT2"[..];
		assert_eq!(skip_extended_header(&mut data, 3).unwrap(), 10);
		assert_eq!(data, b"TIT2");

		let mut data = &b"\x00\x00\x00\x10\x00"[..];
		assert!(skip_extended_header(&mut data, 3).unwrap_err().is_eof());
	}

	#[test]
	fn written_header() {
		let mut writer = FrameWriter::default();
		let flags = TagFlags {
			experimental: true,
			footer: true,
			..TagFlags::default()
		};

		write_header(&mut writer, 3, flags, 257).unwrap();

		let mut out = Vec::new();
		writer.flush_to(&mut out).unwrap();
		assert_eq!(out, b"ID3\x03\x00\x20\x00\x00\x02\x01");
	}
}
