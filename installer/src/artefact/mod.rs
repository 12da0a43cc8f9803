//! Artefact retrieval and expansion.
//!
//! # Sub-modules
//!
//! - [`download`] - Artefact source trait, HTTP implementation, and the
//!   streaming fetch that installs downloads through a `.tmp` file.
//! - [`extraction`] - ZIP extraction with path traversal protection, plus
//!   the directory replacement and file counting helpers.

pub mod download;
pub mod extraction;
