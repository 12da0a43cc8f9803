//! Git LFS pointer handling for the SDK `packages/` directory.
//!
//! The SDK repository stores its component archives in Git LFS. Installing
//! the package without LFS support leaves small text pointers in place of
//! the archives; this module recognises those pointers and lists the files
//! that must be fetched from the release.
//!
//! # Sub-modules
//!
//! - [`pointer`] - Pointer file recognition.
//! - [`scan`] - Packages directory scanning and release URL construction.

pub mod pointer;
pub mod scan;
