use crate::error::{Id3Error, Result};
use crate::frame::content::parse_frame_body;
use crate::frame::{parse_frame_header, FRAME_HEADER_SIZE};
use crate::header::{parse_header, skip_extended_header, TAG_HEADER_SIZE};
use crate::ids::{CommonIds, FrameIdLookup};
use crate::options::Options;
use crate::pool;
use crate::tag::Tag;

use std::collections::HashSet;
use std::io::Read;

/// Read a tag from the start of `reader`
///
/// See [`read_tag_with`].
pub fn read_tag<R>(reader: &mut R, options: &Options) -> Result<Tag>
where
	R: Read + ?Sized,
{
	read_tag_with(reader, options, &CommonIds)
}

/// Read a tag from the start of `reader`, resolving [`Options::parse_frames`] with `lookup`
///
/// A source without a tag yields an empty tag with an [`original_size`](Tag::original_size) of 0.
/// Reading stops at padding, at the end of the source, at a frame with a malformed size, or once
/// the size declared by the tag header is used up. The frames found up to that point are kept.
///
/// `reader` is left right after the last byte consumed.
///
/// # Errors
///
/// * The tag is older than ID3v2.3 ([`Id3Error::UnsupportedVersion`])
/// * The tag size isn't synchsafe ([`Id3Error::InvalidSizeFormat`])
/// * A frame header is cut short
/// * A frame body is malformed
/// * `reader` fails
pub fn read_tag_with<R>(
	reader: &mut R,
	options: &Options,
	lookup: &dyn FrameIdLookup,
) -> Result<Tag>
where
	R: Read + ?Sized,
{
	let header = match parse_header(reader) {
		Ok(header) => header,
		Err(Id3Error::NoTag) => {
			debug!("No ID3v2 tag found");
			return Ok(Tag::new());
		},
		Err(e) => return Err(e),
	};

	debug!(
		"Found ID3v2.{} tag, {} bytes of frames",
		header.version, header.frames_size
	);

	let mut tag = Tag::new();
	tag.set_version(header.version);
	tag.set_flags(header.flags);
	tag.original_size = TAG_HEADER_SIZE + u64::from(header.frames_size);

	if !options.parse {
		return Ok(tag);
	}

	let mut budget = u64::from(header.frames_size);

	if header.flags.extended_header {
		match skip_extended_header(reader, header.version) {
			Ok(skipped) => budget = budget.saturating_sub(skipped),
			Err(e) if e.is_eof() || matches!(e, Id3Error::InvalidSizeFormat) => {
				debug!("Unable to skip the extended header: {e}");
				return Ok(tag);
			},
			Err(e) => return Err(e),
		}
	}

	let allowed = allow_list(options, header.version, lookup);
	parse_frames(reader, &mut tag, budget, allowed.as_ref())?;

	Ok(tag)
}

fn allow_list(
	options: &Options,
	version: u8,
	lookup: &dyn FrameIdLookup,
) -> Option<HashSet<String>> {
	if options.parse_frames.is_empty() {
		return None;
	}

	let mut allowed = HashSet::with_capacity(options.parse_frames.len());
	for description in &options.parse_frames {
		match lookup.common_id(description, version) {
			Some(id) => {
				allowed.insert(id.to_string());
			},
			None => warn!("No frame ID known for \"{description}\", ignoring"),
		}
	}

	Some(allowed)
}

fn parse_frames<R>(
	reader: &mut R,
	tag: &mut Tag,
	mut budget: u64,
	allowed: Option<&HashSet<String>>,
) -> Result<()>
where
	R: Read + ?Sized,
{
	while budget >= FRAME_HEADER_SIZE {
		let header = match parse_frame_header(reader) {
			Ok(header) => header,
			Err(Id3Error::BlankFrame) => {
				debug!("Reached padding, {budget} bytes left in the tag");
				break;
			},
			Err(Id3Error::InvalidSizeFormat) => {
				debug!("Found a frame size that isn't synchsafe, ending the frame list");
				break;
			},
			Err(e) if e.is_eof() => {
				debug!("Reached the end of the source, {budget} bytes left in the tag");
				break;
			},
			Err(e) => return Err(e),
		};

		budget -= FRAME_HEADER_SIZE;

		let declared = u64::from(header.body_size);
		let bound = declared.min(budget);
		budget -= bound;

		if bound < declared {
			warn!(
				"Frame \"{}\" declares {declared} bytes, only {bound} are left in the tag",
				header.id
			);
		}

		let mut limited = pool::limited_reader(bound);

		if allowed.map_or(false, |allowed| !allowed.contains(&header.id)) {
			let skipped = limited.discard(reader)?;
			trace!("Skipped frame \"{}\" ({skipped} bytes)", header.id);

			if skipped < bound {
				debug!("Reached the end of the source while skipping \"{}\"", header.id);
				break;
			}

			continue;
		}

		let mut body = pool::byte_buffer();
		limited.read_to_end(reader, &mut body)?;

		let complete = !limited.source_exhausted() && bound == declared;

		match parse_frame_body(&header.id, &body) {
			Ok(frame) => {
				trace!("Parsed frame \"{}\" ({} bytes)", header.id, body.len());
				tag.add_frame(&header.id, frame);
			},
			Err(e) if e.is_eof() => {
				warn!("Frame \"{}\" ends early, dropping it", header.id);
				break;
			},
			Err(e) => return Err(e),
		}

		if !complete {
			warn!(
				"Frame \"{}\" is incomplete, {} of {declared} bytes were read",
				header.id,
				body.len()
			);
			break;
		}
	}

	Ok(())
}
