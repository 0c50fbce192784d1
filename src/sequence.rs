use crate::frame::{Frame, Framer};

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

/// Frame IDs that may repeat within a tag, once per [`Framer::unique_identifier`]
///
/// ID3v2 documentation on `COMM`: "There may be more than one comment frame in each tag,
/// but only one with the same language and content descriptor." The same goes for `USLT`.
pub(crate) fn must_be_in_sequence(id: &str) -> bool {
	matches!(id, "COMM" | "USLT")
}

/// Stores frames of one ID, unique by their [`Framer::unique_identifier`]
///
/// Adding a frame whose key is already present replaces the stored frame.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
	frames: HashMap<String, Frame>,
	// Listing order, rebuilt on the first read after a change
	cache: OnceCell<Vec<String>>,
}

impl PartialEq for Sequence {
	fn eq(&self, other: &Self) -> bool {
		self.frames == other.frames
	}
}

impl Eq for Sequence {}

impl Sequence {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert `frame`, returning the frame it replaced
	pub fn add(&mut self, frame: Frame) -> Option<Frame> {
		self.cache.take();
		self.frames.insert(frame.unique_identifier(), frame)
	}

	/// Remove the frame stored under `unique_identifier`
	pub fn remove(&mut self, unique_identifier: &str) -> Option<Frame> {
		let removed = self.frames.remove(unique_identifier);
		if removed.is_some() {
			self.cache.take();
		}

		removed
	}

	/// The number of distinct keys
	pub fn count(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// The stored frames, ordered by key
	pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
		let keys = self.cache.get_or_init(|| {
			let mut keys = self.frames.keys().cloned().collect::<Vec<_>>();
			keys.sort_unstable();
			keys
		});

		keys.iter().filter_map(|key| self.frames.get(key))
	}
}
