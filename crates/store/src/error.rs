use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// A persisted snapshot document could not be read or written.
	#[error("snapshot serialization failed: {0}")]
	Serialization(#[from] serde_json::Error),

	/// A persisted snapshot document carries a version this build does
	/// not understand.
	#[error("unsupported snapshot version {version}")]
	UnsupportedVersion { version: u32 },
}
