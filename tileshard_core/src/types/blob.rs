//! This module provides the [`Blob`] struct, a wrapper around [`Vec<u8>`] holding one raw tile payload.
//!
//! # Examples
//!
//! ```rust
//! use tileshard_core::Blob;
//!
//! let blob = Blob::from("ABC");
//! assert_eq!(blob.len(), 3);
//! assert_eq!(blob.as_slice(), b"ABC");
//! assert_eq!(blob.crc32(), 0xa3830348);
//! ```

use std::{fmt::Debug, fs, ops::Range, path::Path};

/// A simple wrapper around [`Vec<u8>`] that provides additional methods for working with tile payloads.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Reads a whole file into a `Blob`.
	pub fn read_file(path: &Path) -> std::io::Result<Blob> {
		fs::read(path).map(Blob)
	}

	/// Returns the bytes in `range`, or `None` if the range exceeds the blob.
	#[must_use]
	pub fn get_range(&self, range: Range<usize>) -> Option<&[u8]> {
		self.0.get(range)
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_slice()
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// CRC-32 (IEEE) checksum of the payload.
	#[must_use]
	pub fn crc32(&self) -> u32 {
		crc32fast::hash(&self.0)
	}

	/// Hex dump of at most the first `max_len` bytes, used in diagnostics.
	#[must_use]
	pub fn hex_preview(&self, max_len: usize) -> String {
		let mut text: String = self.0.iter().take(max_len).map(|b| format!("{b:02x}")).collect();
		if self.0.len() > max_len {
			text.push_str("...");
		}
		text
	}
}

impl From<Vec<u8>> for Blob {
	fn from(value: Vec<u8>) -> Self {
		Blob(value)
	}
}

impl From<&[u8]> for Blob {
	fn from(value: &[u8]) -> Self {
		Blob(value.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(value: &[u8; N]) -> Self {
		Blob(value.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(value: &str) -> Self {
		Blob(value.as_bytes().to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Blob({}): {}", self.0.len(), self.hex_preview(32))
	}
}
