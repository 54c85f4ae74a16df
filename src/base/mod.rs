//! Foundation types for the xref engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Lightweight file identifiers
//! - [`Language`] - The source languages the engine understands
//! - [`LineCol`], [`TextSpan`], [`Location`] - Source positions
//!
//! This module has NO dependencies on other xref modules.

mod file_id;
mod span;

pub use file_id::{FileId, Language};
pub use span::{LineCol, Location, TextSpan};
