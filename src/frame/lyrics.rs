use super::{read_language, write_language, Frame, Framer, LANGUAGE_SIZE};
use crate::error::Result;
use crate::pool::FrameWriter;
use crate::util::text_utils::{
	decode_text, encoded_size, read_to_terminator, strip_terminator, TextEncoding,
};

use byteorder::ReadBytesExt;

/// A `USLT` frame
///
/// Like comments, there may be several of these in a tag, but only one per language
/// and content descriptor.
///
/// `language` must be a three-letter code from ISO 639-2:
/// <https://www.loc.gov/standards/iso639-2/php/code_list.php>
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UnsynchronisedLyricsFrame {
	pub encoding: TextEncoding,
	pub language: String,
	pub content_descriptor: String,
	pub lyrics: String,
}

impl UnsynchronisedLyricsFrame {
	pub fn new(
		encoding: TextEncoding,
		language: impl Into<String>,
		content_descriptor: impl Into<String>,
		lyrics: impl Into<String>,
	) -> Self {
		Self {
			encoding,
			language: language.into(),
			content_descriptor: content_descriptor.into(),
			lyrics: lyrics.into(),
		}
	}
}

impl Framer for UnsynchronisedLyricsFrame {
	fn size(&self) -> usize {
		1 + LANGUAGE_SIZE
			+ encoded_size(&self.content_descriptor, self.encoding)
			+ self.encoding.terminator().len()
			+ encoded_size(&self.lyrics, self.encoding)
	}

	fn write_body(&self, writer: &mut FrameWriter) -> Result<()> {
		writer.write_u8(self.encoding.key());
		write_language(writer, &self.language)?;

		writer.write_text(&self.content_descriptor, self.encoding);
		writer.write_terminator(self.encoding);
		writer.write_text(&self.lyrics, self.encoding);

		Ok(())
	}

	fn unique_identifier(&self) -> String {
		format!("{}{}", self.language, self.content_descriptor)
	}
}

pub(super) fn parse_unsynchronised_lyrics_frame(content: &mut &[u8]) -> Result<Frame> {
	let encoding = TextEncoding::from_u8_lossy(content.read_u8()?);
	let language = read_language(content)?;

	let content_descriptor = decode_text(read_to_terminator(content, encoding), encoding);
	let lyrics = decode_text(strip_terminator(content, encoding), encoding);
	*content = &[];

	Ok(Frame::UnsynchronisedLyrics(UnsynchronisedLyricsFrame {
		encoding,
		language,
		content_descriptor,
		lyrics,
	}))
}
