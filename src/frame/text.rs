use super::{Frame, Framer};
use crate::error::Result;
use crate::pool::FrameWriter;
use crate::util::text_utils::{decode_text, encoded_size, strip_terminator, TextEncoding};

use byteorder::ReadBytesExt;

/// A text information frame (`TIT2`, `TPE1`, `TALB`, ...)
///
/// ID3v2.4 allows several values separated by the encoding's terminator, these are kept
/// as is inside `text`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TextFrame {
	pub encoding: TextEncoding,
	pub text: String,
}

impl TextFrame {
	pub fn new(encoding: TextEncoding, text: impl Into<String>) -> Self {
		Self {
			encoding,
			text: text.into(),
		}
	}
}

impl Framer for TextFrame {
	fn size(&self) -> usize {
		1 + encoded_size(&self.text, self.encoding)
	}

	fn write_body(&self, writer: &mut FrameWriter) -> Result<()> {
		writer.write_u8(self.encoding.key());
		writer.write_text(&self.text, self.encoding);

		Ok(())
	}
}

pub(super) fn parse_text_frame(content: &mut &[u8]) -> Result<Frame> {
	let encoding = TextEncoding::from_u8_lossy(content.read_u8()?);

	// The value runs to the end of the body, a trailing terminator is tolerated
	let text = decode_text(strip_terminator(content, encoding), encoding);
	*content = &[];

	Ok(Frame::Text(TextFrame { encoding, text }))
}
