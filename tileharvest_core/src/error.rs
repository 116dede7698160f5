//! Error taxonomy visible to callers of a harvest.
//!
//! Internals work with [`anyhow::Error`] and context chains. At the boundary every failure is
//! reduced to a [`HarvestError`], which only carries a category and a message.

use std::fmt::{self, Display};
use thiserror::Error;

pub type HarvestResult<T> = Result<T, HarvestError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	InvalidRequest,
	StoreIo,
	Internal,
}

impl Display for ErrorCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ErrorCategory::InvalidRequest => "invalid request",
			ErrorCategory::StoreIo => "store I/O",
			ErrorCategory::Internal => "internal",
		})
	}
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HarvestError {
	/// Unusable input: bad extent or SRS, unknown service type, unreachable or unparseable capabilities.
	#[error("invalid request: {0}")]
	InvalidRequest(String),

	/// The tile store could not be created, read, written or closed.
	#[error("tile store I/O failed: {0}")]
	StoreIo(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl HarvestError {
	pub fn category(&self) -> ErrorCategory {
		match self {
			HarvestError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
			HarvestError::StoreIo(_) => ErrorCategory::StoreIo,
			HarvestError::Internal(_) => ErrorCategory::Internal,
		}
	}

	pub fn message(&self) -> &str {
		match self {
			HarvestError::InvalidRequest(m) | HarvestError::StoreIo(m) | HarvestError::Internal(m) => m,
		}
	}

	pub fn new(category: ErrorCategory, message: String) -> HarvestError {
		match category {
			ErrorCategory::InvalidRequest => HarvestError::InvalidRequest(message),
			ErrorCategory::StoreIo => HarvestError::StoreIo(message),
			ErrorCategory::Internal => HarvestError::Internal(message),
		}
	}

	/// Converts an internal error chain. A `HarvestError` already inside the chain keeps its
	/// category, everything else is filed under `fallback`.
	pub fn from_anyhow(error: &anyhow::Error, fallback: ErrorCategory) -> HarvestError {
		if let Some(inner) = error.chain().find_map(|e| e.downcast_ref::<HarvestError>()) {
			if error.chain().count() == 1 {
				return inner.clone();
			}
			return HarvestError::new(inner.category(), format!("{error:#}"));
		}
		HarvestError::new(fallback, format!("{error:#}"))
	}
}

/// Extension to tag `anyhow` results with a boundary category.
pub trait CategorizeResult<T> {
	fn categorize(self, category: ErrorCategory) -> HarvestResult<T>;
}

impl<T> CategorizeResult<T> for anyhow::Result<T> {
	fn categorize(self, category: ErrorCategory) -> HarvestResult<T> {
		self.map_err(|e| HarvestError::from_anyhow(&e, category))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::{Context, anyhow};
	use pretty_assertions::assert_eq;

	#[test]
	fn fallback_category() {
		let err = anyhow!("disk full").context("writing tile");
		let h = HarvestError::from_anyhow(&err, ErrorCategory::StoreIo);
		assert_eq!(h, HarvestError::StoreIo(String::from("writing tile: disk full")));
		assert_eq!(h.category(), ErrorCategory::StoreIo);
	}

	#[test]
	fn inner_category_wins() {
		let result: anyhow::Result<()> =
			Err(anyhow::Error::new(HarvestError::InvalidRequest(String::from("unknown type 'TMS'"))))
				.context("resolving service 1");
		let h = result.categorize(ErrorCategory::Internal).unwrap_err();
		assert_eq!(h.category(), ErrorCategory::InvalidRequest);
		assert!(h.message().starts_with("resolving service 1: "));
	}

	#[test]
	fn bare_inner_error_is_kept() {
		let err = anyhow::Error::new(HarvestError::StoreIo(String::from("locked")));
		assert_eq!(
			HarvestError::from_anyhow(&err, ErrorCategory::Internal),
			HarvestError::StoreIo(String::from("locked"))
		);
	}

	#[test]
	fn display() {
		assert_eq!(
			HarvestError::Internal(String::from("boom")).to_string(),
			"internal error: boom"
		);
		assert_eq!(ErrorCategory::StoreIo.to_string(), "store I/O");
	}
}
