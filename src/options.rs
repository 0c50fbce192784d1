use anyhow::Result;
use figment::{
	providers::{Env, Format, Toml},
	Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables overriding a config file
pub const ENV_PREFIX: &str = "ID3V2_";

/// Controls how much of a tag [`read_tag`](crate::read_tag) materializes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
	/// Parse frames at all, when `false` only the tag header is read
	pub parse: bool,
	/// Descriptions of the frames to keep, such as `"Title"` or `"COMM"`
	///
	/// Empty means every frame is kept. Bodies of other frames are skipped without
	/// being buffered.
	pub parse_frames: Vec<String>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			parse: true,
			parse_frames: Vec::new(),
		}
	}
}

impl Options {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_parse(mut self, parse: bool) -> Self {
		self.parse = parse;
		self
	}

	#[must_use]
	pub fn with_parse_frames<I, S>(mut self, descriptions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.parse_frames = descriptions.into_iter().map(Into::into).collect();
		self
	}

	/// Read options from a toml file, `ID3V2_`-prefixed environment variables take precedence
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let options = Figment::new()
			.merge(Toml::file(path))
			.merge(Env::prefixed(ENV_PREFIX))
			.extract()?;

		Ok(options)
	}

	/// Save the options as toml
	pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		std::fs::write(path, toml::to_string(self)?)?;

		Ok(())
	}
}
