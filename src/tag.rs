use crate::error::Result;
use crate::frame::header::write_frame_header;
use crate::frame::{
	CommentFrame, Frame, Framer, TextFrame, UnsynchronisedLyricsFrame, FRAME_HEADER_SIZE,
};
use crate::header::{write_header, TagFlags, TAG_HEADER_SIZE};
use crate::ids::year_id;
use crate::pool;
use crate::sequence::{must_be_in_sequence, Sequence};
use crate::util::text_utils::TextEncoding;

use std::collections::BTreeMap;
use std::io::Write;

/// Buffered frames are pushed to the sink once they pass this size
const FLUSH_THRESHOLD: usize = 8 * 1024;

macro_rules! impl_accessor {
	($($name:ident, $setter:ident, $id:literal;)+) => {
		impl Tag {
			$(
				#[doc = concat!("The text of the `", $id, "` frame")]
				pub fn $name(&self) -> Option<&str> {
					self.get_text_frame($id).map(|f| f.text.as_str())
				}

				#[doc = concat!("Replace the `", $id, "` frame, encoded as UTF-8")]
				pub fn $setter(&mut self, value: impl Into<String>) {
					self.add_text_frame($id, TextEncoding::UTF8, value);
				}
			)+
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FrameSlot {
	Single(Frame),
	Sequence(Sequence),
}

impl FrameSlot {
	fn frames(&self) -> Box<dyn Iterator<Item = &Frame> + '_> {
		match self {
			FrameSlot::Single(frame) => Box::new(std::iter::once(frame)),
			FrameSlot::Sequence(sequence) => Box::new(sequence.frames()),
		}
	}

	fn count(&self) -> usize {
		match self {
			FrameSlot::Single(_) => 1,
			FrameSlot::Sequence(sequence) => sequence.count(),
		}
	}
}

/// An ID3v2 tag
///
/// Frames are stored per ID. Most IDs hold a single frame, adding another one replaces it.
/// `COMM` and `USLT` hold one frame per language and description instead, see [`Sequence`].
///
/// Frames are listed and written in ID order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
	version: u8,
	flags: TagFlags,
	pub(crate) original_size: u64,
	frames: BTreeMap<String, FrameSlot>,
}

impl_accessor!(
	title,  set_title,  "TIT2";
	artist, set_artist, "TPE1";
	album,  set_album,  "TALB";
	genre,  set_genre,  "TCON";
);

impl Default for Tag {
	fn default() -> Self {
		Self {
			version: 4,
			flags: TagFlags::default(),
			original_size: 0,
			frames: BTreeMap::new(),
		}
	}
}

impl Tag {
	/// Create an empty ID3v2.4 tag
	pub fn new() -> Self {
		Self::default()
	}

	/// The major version, 3 or 4
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Change the version written by [`Tag::write_to`]
	///
	/// Frames are not converted, a `TDRC` frame stays a `TDRC` frame.
	pub fn set_version(&mut self, version: u8) {
		self.version = version;
	}

	pub fn flags(&self) -> TagFlags {
		self.flags
	}

	pub fn set_flags(&mut self, flags: TagFlags) {
		self.flags = flags;
	}

	/// The size of the tag that was read, including its header
	///
	/// This is 0 for a tag created with [`Tag::new`], or when the source had no tag.
	pub fn original_size(&self) -> u64 {
		self.original_size
	}
}

impl Tag {
	/// Add a frame under `id`, returning the frame it replaced
	///
	/// For `COMM` and `USLT`, only a frame with the same language and description is replaced.
	pub fn add_frame(&mut self, id: &str, frame: impl Into<Frame>) -> Option<Frame> {
		let frame = frame.into();

		if must_be_in_sequence(id) {
			let slot = self
				.frames
				.entry(id.to_string())
				.or_insert_with(|| FrameSlot::Sequence(Sequence::new()));

			return match slot {
				FrameSlot::Sequence(sequence) => sequence.add(frame),
				FrameSlot::Single(existing) => Some(std::mem::replace(existing, frame)),
			};
		}

		match self.frames.insert(id.to_string(), FrameSlot::Single(frame)) {
			Some(FrameSlot::Single(replaced)) => Some(replaced),
			_ => None,
		}
	}

	pub fn add_text_frame(&mut self, id: &str, encoding: TextEncoding, text: impl Into<String>) {
		self.add_frame(id, TextFrame::new(encoding, text));
	}

	pub fn add_comment_frame(&mut self, frame: CommentFrame) {
		self.add_frame("COMM", frame);
	}

	pub fn add_unsynchronised_lyrics_frame(&mut self, frame: UnsynchronisedLyricsFrame) {
		self.add_frame("USLT", frame);
	}

	/// Every frame stored under `id`
	pub fn get_frames<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Frame> + 'a {
		self.frames.get(id).into_iter().flat_map(FrameSlot::frames)
	}

	/// The frame stored under `id`, or the last one for `COMM` and `USLT`
	pub fn get_last_frame(&self, id: &str) -> Option<&Frame> {
		self.get_frames(id).last()
	}

	/// The frame stored under `id`, if it is a text frame
	pub fn get_text_frame(&self, id: &str) -> Option<&TextFrame> {
		self.get_last_frame(id).and_then(Frame::as_text)
	}

	pub fn comment_frames(&self) -> impl Iterator<Item = &CommentFrame> + '_ {
		self.get_frames("COMM").filter_map(Frame::as_comment)
	}

	pub fn unsynchronised_lyrics_frames(
		&self,
	) -> impl Iterator<Item = &UnsynchronisedLyricsFrame> + '_ {
		self.get_frames("USLT")
			.filter_map(Frame::as_unsynchronised_lyrics)
	}

	/// Remove every frame stored under `id`, returning whether there were any
	pub fn delete_frames(&mut self, id: &str) -> bool {
		self.frames.remove(id).is_some()
	}

	pub fn delete_all_frames(&mut self) {
		self.frames.clear();
	}

	/// Whether anything is stored under `id`
	pub fn has_frames(&self, id: &str) -> bool {
		self.frames.get(id).map_or(false, |slot| slot.count() > 0)
	}

	/// The total number of frames
	pub fn count(&self) -> usize {
		self.frames.values().map(FrameSlot::count).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Every frame along with its ID, in ID order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Frame)> + '_ {
		self.frames
			.iter()
			.flat_map(|(id, slot)| slot.frames().map(move |frame| (id.as_str(), frame)))
	}

	/// The release year, `TYER` in ID3v2.3 and `TDRC` in ID3v2.4
	pub fn year(&self) -> Option<&str> {
		self.get_text_frame(year_id(self.version))
			.map(|f| f.text.as_str())
	}

	pub fn set_year(&mut self, value: impl Into<String>) {
		self.add_text_frame(year_id(self.version), TextEncoding::UTF8, value);
	}
}

impl Tag {
	/// The number of bytes [`Tag::write_to`] emits
	pub fn size(&self) -> u64 {
		match self.frames_size() {
			0 => 0,
			frames_size => TAG_HEADER_SIZE + frames_size as u64,
		}
	}

	// A zero size marks padding, so frames without a body can't be written
	fn written_frames(&self) -> impl Iterator<Item = (&str, &Frame)> + '_ {
		self.iter().filter(|(_, frame)| frame.size() > 0)
	}

	fn frames_size(&self) -> usize {
		self.written_frames()
			.map(|(_, frame)| FRAME_HEADER_SIZE as usize + frame.size())
			.sum()
	}

	/// Write the tag header followed by every frame, returning the number of bytes written
	///
	/// Nothing is written for a tag without frames. Frames with an empty body are skipped.
	///
	/// # Errors
	///
	/// * A frame ID isn't 4 characters of `A-Z0-9`
	/// * A frame or the whole tag is too large for a synchsafe size
	/// * A frame fails validation, see [`Framer::write_to`]
	/// * `sink` fails
	///
	/// On error, an unknown part of the tag may have reached `sink`.
	pub fn write_to<W>(&self, sink: &mut W) -> Result<u64>
	where
		W: Write + ?Sized,
	{
		let frames_size = self.frames_size();
		if frames_size == 0 {
			return Ok(0);
		}

		let mut writer = pool::frame_writer();
		write_header(&mut writer, self.version, self.flags, frames_size)?;

		for (id, frame) in self.written_frames() {
			write_frame_header(&mut writer, id, frame.size())?;
			frame.write_body(&mut writer)?;

			if writer.buffered() >= FLUSH_THRESHOLD {
				writer.flush_to(sink)?;
			}
		}

		writer.flush_to(sink)?;

		let written = writer.written();
		debug_assert_eq!(written, self.size());

		Ok(written)
	}
}
