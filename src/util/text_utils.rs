/// The text encoding for use in ID3v2 frames
///
/// The discriminant is the key byte stored at the start of text-bearing frame bodies.
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash, Default)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	#[default]
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a TextEncoding from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	/// Like [`TextEncoding::from_u8`], but unknown keys are read as UTF-8
	pub(crate) fn from_u8_lossy(byte: u8) -> Self {
		Self::from_u8(byte).unwrap_or_else(|| {
			warn!("Unknown text encoding key {byte}, assuming UTF-8");
			Self::UTF8
		})
	}

	/// The key byte written before the text fields
	pub fn key(self) -> u8 {
		self as u8
	}

	/// The byte sequence ending a text field
	pub fn terminator(self) -> &'static [u8] {
		match self {
			Self::Latin1 | Self::UTF8 => &[0],
			Self::UTF16 | Self::UTF16BE => &[0, 0],
		}
	}
}

/// Splits off the bytes before the next terminator, consuming the terminator as well
///
/// Two byte terminators are only matched on code unit boundaries, a single zero byte
/// inside a UTF-16 code unit never ends the field. Without a terminator, everything left
/// in `content` makes up the field.
pub(crate) fn read_to_terminator<'a>(content: &mut &'a [u8], encoding: TextEncoding) -> &'a [u8] {
	let data: &'a [u8] = content;

	let end = match encoding.terminator() {
		[_] => data.iter().position(|b| *b == 0),
		_ => data
			.chunks_exact(2)
			.position(|unit| unit == [0, 0])
			.map(|unit| unit * 2),
	};

	match end {
		Some(end) => {
			*content = &data[end + encoding.terminator().len()..];
			&data[..end]
		},
		None => {
			*content = &[];
			data
		},
	}
}

/// Removes a single trailing terminator, if there is one
pub(crate) fn strip_terminator(content: &[u8], encoding: TextEncoding) -> &[u8] {
	let terminator = encoding.terminator();

	if content.len() % terminator.len() == 0 && content.ends_with(terminator) {
		&content[..content.len() - terminator.len()]
	} else {
		content
	}
}

/// Decodes a text field, invalid sequences are replaced rather than rejected
pub fn decode_text(content: &[u8], encoding: TextEncoding) -> String {
	match encoding {
		TextEncoding::Latin1 => content.iter().map(|c| char::from(*c)).collect(),
		TextEncoding::UTF16 => match content {
			[0xFF, 0xFE, rest @ ..] => utf16_decode(rest, u16::from_le_bytes),
			[0xFE, 0xFF, rest @ ..] => utf16_decode(rest, u16::from_be_bytes),
			// Without a BOM, ID3v2.4 says to assume big endian
			_ => utf16_decode(content, u16::from_be_bytes),
		},
		TextEncoding::UTF16BE => utf16_decode(content, u16::from_be_bytes),
		TextEncoding::UTF8 => String::from_utf8_lossy(content).into_owned(),
	}
}

pub(crate) fn utf16_decode(content: &[u8], endianness: fn([u8; 2]) -> u16) -> String {
	let units = content
		.chunks_exact(2)
		.map(|c| endianness([c[0], c[1]]))
		.collect::<Vec<u16>>();

	String::from_utf16_lossy(&units)
}

/// Appends `text` in the given encoding to `out`, without a terminator
pub fn encode_text(text: &str, encoding: TextEncoding, out: &mut Vec<u8>) {
	match encoding {
		TextEncoding::Latin1 => out.extend(text.chars().map(latin1_byte)),
		TextEncoding::UTF16 => {
			if !text.is_empty() {
				out.extend_from_slice(&[0xFF, 0xFE]);
			}

			for unit in text.encode_utf16() {
				out.extend_from_slice(&unit.to_le_bytes());
			}
		},
		TextEncoding::UTF16BE => {
			for unit in text.encode_utf16() {
				out.extend_from_slice(&unit.to_be_bytes());
			}
		},
		TextEncoding::UTF8 => out.extend_from_slice(text.as_bytes()),
	}
}

/// The number of bytes [`encode_text`] appends for `text`
pub fn encoded_size(text: &str, encoding: TextEncoding) -> usize {
	match encoding {
		TextEncoding::Latin1 => text.chars().count(),
		TextEncoding::UTF16 if text.is_empty() => 0,
		TextEncoding::UTF16 => 2 + text.encode_utf16().count() * 2,
		TextEncoding::UTF16BE => text.encode_utf16().count() * 2,
		TextEncoding::UTF8 => text.len(),
	}
}

// Characters outside of ISO-8859-1 can't be represented
fn latin1_byte(c: char) -> u8 {
	u8::try_from(u32::from(c)).unwrap_or(b'?')
}
