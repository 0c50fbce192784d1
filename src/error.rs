use std::io::ErrorKind;

/// Errors that could occur while reading or writing an ID3v2 tag.
#[derive(thiserror::Error, Debug)]
pub enum Id3Error {
	// Tag header related errors
	/// The source does not start with an `ID3` magic
	///
	/// [`read_tag`](crate::read_tag) never returns this, an empty tag is produced instead.
	#[error("No ID3v2 tag found")]
	NoTag,
	/// The tag's major version is below 3
	#[error("Unsupported version of ID3 tag: {0}")]
	UnsupportedVersion(u8),

	// Size related errors
	/// A synchsafe size byte has its high bit set
	#[error("Size is not a valid synchsafe integer")]
	InvalidSizeFormat,
	/// Attempting to encode a size that does not fit into 28 bits
	#[error("An abnormally large amount of data was provided, and an overflow occurred")]
	TooMuchData,

	// Frame header related errors
	/// The frame ID or size is blank, marking the end of the frames
	#[error("ID or size of frame are blank")]
	BlankFrame,
	/// Fewer than 10 bytes were left for a frame header
	#[error("Frame header is truncated ({0} of 10 bytes)")]
	TruncatedFrameHeader(usize),
	/// Attempting to write a frame whose ID is not 4 ASCII letters or digits
	#[error("Frame ID must consist of 4 ASCII letters or digits: {0:?}")]
	InvalidFrameId(String),

	// Frame content related errors
	/// Attempting to write a language that isn't 3 characters
	#[error("Language code must consist of three letters according to ISO 639-2: {0:?}")]
	InvalidLanguage(String),

	/// Represents all cases of `std::io::Error`.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Id3Error {
	/// Whether the error means the source ran out of bytes
	pub fn is_eof(&self) -> bool {
		matches!(self, Id3Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof)
	}
}

/// Result of tag operations.
pub type Result<T> = std::result::Result<T, Id3Error>;

#[cfg(test)]
mod tests {
	use super::Id3Error;
	use std::io;

	#[test]
	fn eof_classification() {
		assert!(Id3Error::from(io::Error::from(io::ErrorKind::UnexpectedEof)).is_eof());
		assert!(!Id3Error::from(io::Error::from(io::ErrorKind::BrokenPipe)).is_eof());
		assert!(!Id3Error::BlankFrame.is_eof());
	}
}
