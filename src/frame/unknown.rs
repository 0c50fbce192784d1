use super::Framer;
use crate::error::Result;
use crate::pool::FrameWriter;

/// A frame kind without a dedicated parser
///
/// The body is kept byte for byte, so writing the tag back reproduces it exactly.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UnknownFrame {
	pub body: Vec<u8>,
}

impl UnknownFrame {
	pub fn new(body: Vec<u8>) -> Self {
		Self { body }
	}
}

impl Framer for UnknownFrame {
	fn size(&self) -> usize {
		self.body.len()
	}

	fn write_body(&self, writer: &mut FrameWriter) -> Result<()> {
		writer.write_bytes(&self.body);
		Ok(())
	}
}
