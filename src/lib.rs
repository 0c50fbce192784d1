//! Read and write ID3v2.3 and ID3v2.4 tags at the frame level.
//!
//! A tag is a 10 byte header followed by frames, each one a 10 byte frame header and a body.
//! All sizes are stored as synchsafe integers, 7 bits per byte.
//!
//! Reading is tolerant of damaged input: padding, a source that ends early, or a frame with
//! a malformed size end the frame list, keeping what was read so far. Frames this crate
//! has no model for are kept byte for byte, so they are written back unchanged.
//!
//! ```
//! use id3v2_core::{read_tag, Options, Tag};
//!
//! let mut tag = Tag::new();
//! tag.set_title("Title");
//! tag.set_artist("Artist");
//!
//! let mut bytes = Vec::new();
//! tag.write_to(&mut bytes)?;
//!
//! let read = read_tag(&mut &bytes[..], &Options::default())?;
//! assert_eq!(read.title(), Some("Title"));
//! # Ok::<(), id3v2_core::Id3Error>(())
//! ```
//!
//! Parsing can be limited to a subset of frames. Bodies of every other frame are skipped
//! without being buffered:
//!
//! ```
//! use id3v2_core::{read_tag, Options};
//!
//! # let bytes: &[u8] = b"";
//! let options = Options::new().with_parse_frames(["Title", "Comments"]);
//! let tag = read_tag(&mut &bytes[..], &options)?;
//! # Ok::<(), id3v2_core::Id3Error>(())
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::correctness)]
#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(
	clippy::missing_errors_doc,
	clippy::must_use_candidate,
	clippy::module_name_repetitions,
	clippy::cast_possible_truncation
)]

mod error;
pub mod frame;
pub mod header;
mod ids;
mod options;
pub mod pool;
mod read;
mod sequence;
mod tag;
pub mod util;

pub use crate::error::{Id3Error, Result};
pub use crate::frame::{
	CommentFrame, Frame, Framer, TextFrame, UnknownFrame, UnsynchronisedLyricsFrame,
};
pub use crate::header::{TagFlags, TagHeader};
pub use crate::ids::{CommonIds, FrameIdLookup};
pub use crate::options::Options;
pub use crate::read::{read_tag, read_tag_with};
pub use crate::sequence::Sequence;
pub use crate::tag::Tag;
pub use crate::util::text_utils::TextEncoding;

#[macro_use]
extern crate log;
