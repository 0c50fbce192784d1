use super::{read_language, write_language, Frame, Framer, LANGUAGE_SIZE};
use crate::error::Result;
use crate::pool::FrameWriter;
use crate::util::text_utils::{
	decode_text, encoded_size, read_to_terminator, strip_terminator, TextEncoding,
};

use byteorder::ReadBytesExt;

/// A `COMM` frame
///
/// There may be more than one comment frame in a tag, but only one with the same
/// language and description. See [`Tag::add_comment_frame`](crate::Tag::add_comment_frame).
///
/// `language` must be a three-letter code from ISO 639-2:
/// <https://www.loc.gov/standards/iso639-2/php/code_list.php>
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CommentFrame {
	pub encoding: TextEncoding,
	pub language: String,
	pub description: String,
	pub text: String,
}

impl CommentFrame {
	pub fn new(
		encoding: TextEncoding,
		language: impl Into<String>,
		description: impl Into<String>,
		text: impl Into<String>,
	) -> Self {
		Self {
			encoding,
			language: language.into(),
			description: description.into(),
			text: text.into(),
		}
	}
}

impl Framer for CommentFrame {
	fn size(&self) -> usize {
		1 + LANGUAGE_SIZE
			+ encoded_size(&self.description, self.encoding)
			+ self.encoding.terminator().len()
			+ encoded_size(&self.text, self.encoding)
	}

	fn write_body(&self, writer: &mut FrameWriter) -> Result<()> {
		writer.write_u8(self.encoding.key());
		write_language(writer, &self.language)?;

		writer.write_text(&self.description, self.encoding);
		writer.write_terminator(self.encoding);
		writer.write_text(&self.text, self.encoding);

		Ok(())
	}

	fn unique_identifier(&self) -> String {
		format!("{}{}", self.language, self.description)
	}
}

pub(super) fn parse_comment_frame(content: &mut &[u8]) -> Result<Frame> {
	let encoding = TextEncoding::from_u8_lossy(content.read_u8()?);
	let language = read_language(content)?;

	let description = decode_text(read_to_terminator(content, encoding), encoding);
	let text = decode_text(strip_terminator(content, encoding), encoding);
	*content = &[];

	Ok(Frame::Comment(CommentFrame {
		encoding,
		language,
		description,
		text,
	}))
}

#[cfg(test)]
mod tests {
	use super::{parse_comment_frame, CommentFrame};
	use crate::error::Id3Error;
	use crate::frame::{Frame, Framer};
	use crate::util::text_utils::TextEncoding;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse() {
		let frame = parse_comment_frame(&mut &b"\x00engdesc\x00some text"[..]).unwrap();

		assert_eq!(
			frame,
			Frame::Comment(CommentFrame::new(
				TextEncoding::Latin1,
				"eng",
				"desc",
				"some text"
			))
		);
	}

	#[test]
	fn missing_text_is_empty() {
		let frame = parse_comment_frame(&mut &b"\x03deu\x00"[..]).unwrap();

		assert_eq!(
			frame,
			Frame::Comment(CommentFrame::new(TextEncoding::UTF8, "deu", "", ""))
		);
	}

	#[test]
	fn too_short_for_language() {
		assert!(parse_comment_frame(&mut &b"\x03en"[..]).unwrap_err().is_eof());
	}

	#[test]
	fn round_trip_every_encoding() {
		for encoding in [
			TextEncoding::Latin1,
			TextEncoding::UTF16,
			TextEncoding::UTF16BE,
			TextEncoding::UTF8,
		] {
			let frame = CommentFrame::new(encoding, "eng", "Description", "Comment text");

			let mut body = Vec::new();
			let written = frame.write_to(&mut body).unwrap();
			assert_eq!(written as usize, frame.size());

			assert_eq!(
				parse_comment_frame(&mut &body[..]).unwrap(),
				Frame::Comment(frame)
			);
		}
	}

	#[test]
	fn language_must_be_three_letters() {
		for language in ["", "en", "engl", "日本語"] {
			let frame = CommentFrame::new(TextEncoding::UTF8, language, "", "");

			let mut body = Vec::new();
			assert!(matches!(
				frame.write_to(&mut body),
				Err(Id3Error::InvalidLanguage(_))
			));
		}
	}

	#[test]
	fn unique_per_language_and_description() {
		let a = CommentFrame::new(TextEncoding::UTF8, "eng", "d", "a");
		let b = CommentFrame::new(TextEncoding::UTF8, "eng", "d", "b");
		let c = CommentFrame::new(TextEncoding::UTF8, "deu", "d", "a");

		assert_eq!(a.unique_identifier(), b.unique_identifier());
		assert_ne!(a.unique_identifier(), c.unique_identifier());
	}
}
