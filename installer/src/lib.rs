//! Javonet PHP SDK installer library.
//!
//! Composer installs the Javonet PHP SDK from its Git repository without Git
//! LFS support, so the component archives arrive as small pointer files.
//! This crate replaces those pointers with the released archives and expands
//! the archives into the layout the PSR-4 autoloader expects. It backs the
//! `javonet-download-lfs` and `javonet-extract-packages` binaries.
//!
//! # Modules
//!
//! - [`artefact`] - Streaming downloads and ZIP extraction
//! - [`cli`] - Command-line argument definitions
//! - [`download_flow`] - Pointer detection and download driver
//! - [`error`] - Run-level error types
//! - [`extract_flow`] - Component extraction driver
//! - [`lfs`] - Git LFS pointer detection and package scanning
//! - [`lockfile`] - SDK version detection from `composer.lock`
//! - [`output`] - Console line writing and number formatting

pub mod artefact;
pub mod cli;
pub mod download_flow;
pub mod error;
pub mod extract_flow;
pub mod lfs;
pub mod lockfile;
pub mod output;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
