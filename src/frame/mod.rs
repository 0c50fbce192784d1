mod comment;
pub(crate) mod content;
pub(crate) mod header;
mod lyrics;
mod text;
mod unknown;

pub use comment::CommentFrame;
pub use header::{parse_frame_header, FrameHeader, FRAME_HEADER_SIZE};
pub use lyrics::UnsynchronisedLyricsFrame;
pub use text::TextFrame;
pub use unknown::UnknownFrame;

use crate::error::{Id3Error, Result};
use crate::pool::{self, FrameWriter};
use crate::util::text_utils::TextEncoding;

use std::io::{Read, Write};

/// Behaviour shared by every frame body
///
/// The frame header (ID, size, flags) is not part of the body, the [`Tag`](crate::Tag)
/// writes it using [`Framer::size`].
pub trait Framer {
	/// The exact number of bytes [`Framer::write_to`] emits for the current field values
	fn size(&self) -> usize;

	/// Serialize the body into `writer`
	///
	/// On error, part of the body may already be in `writer`.
	fn write_body(&self, writer: &mut FrameWriter) -> Result<()>;

	/// Key telling apart frames that may appear several times under one ID
	///
	/// Frames that don't repeat all share the empty key.
	fn unique_identifier(&self) -> String {
		String::new()
	}

	/// Write the body to `sink`, returning the number of bytes written
	///
	/// # Errors
	///
	/// * A field fails validation, for example a language that isn't 3 characters
	/// * `sink` fails
	///
	/// After an error, neither the state of `sink` nor the number of bytes it received
	/// should be relied upon.
	fn write_to(&self, sink: &mut dyn Write) -> Result<u64> {
		let mut writer = pool::frame_writer();

		self.write_body(&mut writer)?;
		debug_assert_eq!(writer.written(), self.size() as u64);

		let written = writer.written();
		writer.flush_to(sink)?;

		Ok(written)
	}
}

/// A frame body, one variant per modeled frame kind
///
/// Any frame ID without a dedicated parser ends up as [`Frame::Unknown`], keeping
/// the body byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
	/// `T...` frames, except `TXXX`
	Text(TextFrame),
	/// `COMM`
	Comment(CommentFrame),
	/// `USLT`
	UnsynchronisedLyrics(UnsynchronisedLyricsFrame),
	/// Everything else, including `TXXX`, which is kept verbatim
	Unknown(UnknownFrame),
}

macro_rules! delegate {
	($self:ident, $frame:ident => $expr:expr) => {
		match $self {
			Frame::Text($frame) => $expr,
			Frame::Comment($frame) => $expr,
			Frame::UnsynchronisedLyrics($frame) => $expr,
			Frame::Unknown($frame) => $expr,
		}
	};
}

impl Framer for Frame {
	fn size(&self) -> usize {
		delegate!(self, f => f.size())
	}

	fn write_body(&self, writer: &mut FrameWriter) -> Result<()> {
		delegate!(self, f => f.write_body(writer))
	}

	fn unique_identifier(&self) -> String {
		delegate!(self, f => f.unique_identifier())
	}
}

impl Frame {
	pub fn as_text(&self) -> Option<&TextFrame> {
		match self {
			Frame::Text(f) => Some(f),
			_ => None,
		}
	}

	pub fn as_comment(&self) -> Option<&CommentFrame> {
		match self {
			Frame::Comment(f) => Some(f),
			_ => None,
		}
	}

	pub fn as_unsynchronised_lyrics(&self) -> Option<&UnsynchronisedLyricsFrame> {
		match self {
			Frame::UnsynchronisedLyrics(f) => Some(f),
			_ => None,
		}
	}

	pub fn as_unknown(&self) -> Option<&UnknownFrame> {
		match self {
			Frame::Unknown(f) => Some(f),
			_ => None,
		}
	}
}

impl From<TextFrame> for Frame {
	fn from(frame: TextFrame) -> Self {
		Frame::Text(frame)
	}
}

impl From<CommentFrame> for Frame {
	fn from(frame: CommentFrame) -> Self {
		Frame::Comment(frame)
	}
}

impl From<UnsynchronisedLyricsFrame> for Frame {
	fn from(frame: UnsynchronisedLyricsFrame) -> Self {
		Frame::UnsynchronisedLyrics(frame)
	}
}

impl From<UnknownFrame> for Frame {
	fn from(frame: UnknownFrame) -> Self {
		Frame::Unknown(frame)
	}
}

/// Length of an ISO 639-2 language code
pub(crate) const LANGUAGE_SIZE: usize = 3;

// Languages are written as Latin-1, one byte per character
pub(crate) fn write_language(writer: &mut FrameWriter, language: &str) -> Result<()> {
	let valid = language.chars().count() == LANGUAGE_SIZE
		&& language.chars().all(|c| u32::from(c) <= 0xFF);

	if !valid {
		return Err(Id3Error::InvalidLanguage(language.to_string()));
	}

	writer.write_text(language, TextEncoding::Latin1);
	Ok(())
}

pub(crate) fn read_language(content: &mut &[u8]) -> Result<String> {
	let mut language = [0; LANGUAGE_SIZE];
	content.read_exact(&mut language)?;

	Ok(language.iter().map(|c| char::from(*c)).collect())
}
