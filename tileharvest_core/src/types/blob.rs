//! This module provides the [`Blob`] struct, an owned byte buffer used for encoded tile payloads
//! and raw HTTP response bodies.
//!
//! # Examples
//!
//! ```rust
//! use tileharvest_core::Blob;
//!
//! let blob = Blob::from(vec![0x89, 0x50, 0x4e, 0x47]);
//! assert_eq!(blob.len(), 4);
//! assert_eq!(blob.as_slice()[1], 0x50);
//! ```

use std::fmt::Debug;

/// A wrapper around [`Vec<u8>`] holding encoded bytes, e.g. a PNG tile.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	pub fn as_slice(&self) -> &[u8] {
		self.0.as_slice()
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Interprets the bytes as UTF-8, replacing invalid sequences.
	pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
		String::from_utf8_lossy(&self.0)
	}

	/// Number of bytes.
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_fmt(format_args!("Blob({} bytes)", self.0.len()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_shows_length_only() {
		let blob = Blob::from(&[1u8, 2, 3][..]);
		assert_eq!(format!("{blob:?}"), "Blob(3 bytes)");
	}

	#[test]
	fn lossy_string() {
		let blob = Blob::from("<Capabilities/>");
		assert_eq!(blob.as_str_lossy(), "<Capabilities/>");
		assert!(!blob.is_empty());
		assert!(Blob::new_empty().is_empty());
	}
}
