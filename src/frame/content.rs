use super::comment::parse_comment_frame;
use super::lyrics::parse_unsynchronised_lyrics_frame;
use super::text::parse_text_frame;
use super::{Frame, UnknownFrame};
use crate::error::Result;

type ParseFn = fn(&mut &[u8]) -> Result<Frame>;

/// Body parsers for frame IDs with a dedicated representation
///
/// Text frames are matched by their `T` prefix before this table is consulted.
static PARSERS: &[(&str, ParseFn)] = &[
	("COMM", parse_comment_frame),
	("USLT", parse_unsynchronised_lyrics_frame),
];

/// Route a frame body to its parser
///
/// `content` must hold exactly the frame's body. IDs without a parser produce
/// [`Frame::Unknown`].
pub(crate) fn parse_frame_body(id: &str, content: &[u8]) -> Result<Frame> {
	let content = &mut &*content;

	// TXXX carries a description in front of its value, it is kept verbatim
	if id.starts_with('T') && id != "TXXX" {
		return parse_text_frame(content);
	}

	if let Some((_, parse)) = PARSERS.iter().find(|(parser_id, _)| *parser_id == id) {
		return parse(content);
	}

	Ok(Frame::Unknown(UnknownFrame::new(content.to_vec())))
}

#[cfg(test)]
mod tests {
	use super::parse_frame_body;
	use crate::frame::{CommentFrame, Frame, TextFrame, UnknownFrame, UnsynchronisedLyricsFrame};
	use crate::util::text_utils::TextEncoding;
	use pretty_assertions::assert_eq;

	#[test]
	fn dispatch() {
		assert_eq!(
			parse_frame_body("TPE1", b"\x03Artist").unwrap(),
			Frame::Text(TextFrame::new(TextEncoding::UTF8, "Artist"))
		);
		assert_eq!(
			parse_frame_body("COMM", b"\x03engd\x00c").unwrap(),
			Frame::Comment(CommentFrame::new(TextEncoding::UTF8, "eng", "d", "c"))
		);
		assert_eq!(
			parse_frame_body("USLT", b"\x03engd\x00l").unwrap(),
			Frame::UnsynchronisedLyrics(UnsynchronisedLyricsFrame::new(
				TextEncoding::UTF8,
				"eng",
				"d",
				"l"
			))
		);
	}

	#[test]
	fn unknown_frames_are_verbatim() {
		let body = b"\x00\xFF\x00binary\x80";

		assert_eq!(
			parse_frame_body("PRIV", body).unwrap(),
			Frame::Unknown(UnknownFrame::new(body.to_vec()))
		);
		assert_eq!(
			parse_frame_body("TXXX", b"\x03desc\x00value").unwrap(),
			Frame::Unknown(UnknownFrame::new(b"\x03desc\x00value".to_vec()))
		);
	}
}
