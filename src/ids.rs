//! Mapping human readable frame descriptions to frame IDs
//!
//! Only used to build the allow-list of [`Options::parse_frames`](crate::Options::parse_frames).

use crate::frame::header::is_valid_id;

/// Resolves a frame description, such as `"Title"`, to its frame ID
pub trait FrameIdLookup {
	/// The ID for `description` in a tag of major version `version`
	///
	/// Returns `None` when the description is unknown.
	fn common_id<'a>(&'a self, description: &'a str, version: u8) -> Option<&'a str>;
}

/// The frame IDs of the most common descriptions
///
/// Descriptions are matched ignoring ASCII case. Anything that already is a
/// valid frame ID (`"TIT2"`) is returned as is.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommonIds;

const COMMON_IDS: &[(&str, &str)] = &[
	("Title/Songname/Content description", "TIT2"),
	("Title", "TIT2"),
	("Lead performer(s)/Soloist(s)", "TPE1"),
	("Artist", "TPE1"),
	("Album/Movie/Show title", "TALB"),
	("Album", "TALB"),
	("Band/Orchestra/Accompaniment", "TPE2"),
	("Album artist", "TPE2"),
	("Content type", "TCON"),
	("Genre", "TCON"),
	("Track number/Position in set", "TRCK"),
	("Track number", "TRCK"),
	("Comments", "COMM"),
	("Comment", "COMM"),
	("Unsynchronised lyrics/text transcription", "USLT"),
	("Lyrics", "USLT"),
];

/// The ID holding the release year, which moved to `TDRC` in ID3v2.4
pub(crate) fn year_id(version: u8) -> &'static str {
	if version >= 4 {
		"TDRC"
	} else {
		"TYER"
	}
}

impl FrameIdLookup for CommonIds {
	fn common_id<'a>(&'a self, description: &'a str, version: u8) -> Option<&'a str> {
		if is_valid_id(description.as_bytes()) {
			return Some(description);
		}

		if description.eq_ignore_ascii_case("Year")
			|| description.eq_ignore_ascii_case("Recording time")
		{
			return Some(year_id(version));
		}

		COMMON_IDS
			.iter()
			.find(|(desc, _)| desc.eq_ignore_ascii_case(description))
			.map(|(_, id)| *id)
	}
}
