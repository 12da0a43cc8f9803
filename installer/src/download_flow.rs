//! Git LFS download flow.
//!
//! Resolves the installed SDK version, finds the pointer files in the
//! packages directory, and replaces each one with the released content.
//! A failed download is reported and the next file proceeds; only the
//! run-level preconditions abort the flow.

use camino::Utf8Path;
use log::{debug, info};
use std::io::Write;

use crate::artefact::download::{ArtefactSource, HttpSource, fetch_artefact};
use crate::error::{InstallerError, Result};
use crate::lfs::pointer::is_lfs_pointer;
use crate::lfs::scan::{LfsFileEntry, PACKAGES_DIR_NAME, ReleaseLocation, detect_lfs_files};
use crate::lockfile::{SDK_PACKAGE_NAME, resolve_version};
use crate::output::{format_bytes, write_line};

/// Configuration for a download run.
#[derive(Debug, Clone, Copy)]
pub struct DownloadConfig<'a> {
    /// Directory of the installed SDK package.
    pub package_dir: &'a Utf8Path,
    /// Composer lock file recording the SDK version.
    pub lock_file: &'a Utf8Path,
    /// Repository serving the released package files.
    pub repository_url: &'a str,
}

/// What a download run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Files that needed attention when the run started.
    pub candidates: usize,
    /// Files replaced with downloaded content.
    pub downloaded: usize,
    /// Files whose download failed.
    pub failed: usize,
    /// Candidates that turned out to hold real content already.
    pub already_present: usize,
}

/// Run the download flow against the public release over HTTP.
///
/// # Errors
///
/// Returns [`InstallerError::PackageDirNotFound`] when the package directory
/// is missing, [`InstallerError::Version`] when the SDK version cannot be
/// detected, and [`InstallerError::Io`] when the packages directory cannot
/// be listed. Individual download failures are counted, not returned.
pub fn run_download(config: &DownloadConfig<'_>, out: &mut dyn Write) -> Result<DownloadSummary> {
    run_download_with(config, &HttpSource::new(), out)
}

/// Testable inner function with an injected artefact source.
///
/// The production entry point [`run_download`] delegates here with the
/// HTTP source; tests inject stubs.
///
/// # Errors
///
/// See [`run_download`].
pub fn run_download_with(
    config: &DownloadConfig<'_>,
    source: &dyn ArtefactSource,
    out: &mut dyn Write,
) -> Result<DownloadSummary> {
    write_line(out, "Checking Git LFS files for Javonet SDK...");
    write_line(out, "");

    if !config.package_dir.is_dir() {
        return Err(InstallerError::PackageDirNotFound {
            path: config.package_dir.to_owned(),
        });
    }

    let version = resolve_version(config.lock_file, SDK_PACKAGE_NAME)?;
    write_line(out, format_args!("Detected package version: {version}"));
    write_line(out, "");

    let packages_dir = config.package_dir.join(PACKAGES_DIR_NAME);
    let location = ReleaseLocation::new(config.repository_url, &version);
    let entries = detect_lfs_files(&packages_dir, &location)?;

    if entries.is_empty() {
        write_line(out, "No Git LFS files detected that need downloading.");
        write_line(out, "");
        return Ok(DownloadSummary::default());
    }

    let mut summary = DownloadSummary {
        candidates: entries.len(),
        ..DownloadSummary::default()
    };

    for entry in &entries {
        download_entry(entry, &packages_dir, source, &mut summary, out);
    }

    if summary.downloaded > 0 {
        write_line(
            out,
            format_args!("Downloaded {} Git LFS file(s)!", summary.downloaded),
        );
    } else {
        write_line(out, "All Git LFS files are already available.");
    }
    write_line(out, "");

    report_final_status(&entries, &packages_dir, out);
    info!(
        "download run finished: {} downloaded, {} failed, {} already present",
        summary.downloaded, summary.failed, summary.already_present
    );

    Ok(summary)
}

fn download_entry(
    entry: &LfsFileEntry,
    packages_dir: &Utf8Path,
    source: &dyn ArtefactSource,
    summary: &mut DownloadSummary,
    out: &mut dyn Write,
) {
    let path = entry.path_in(packages_dir);
    write_line(out, format_args!("Checking: {}", entry.filename));

    if !is_lfs_pointer(&path) {
        write_line(out, "  File already exists with actual content");
        write_line(out, "");
        summary.already_present += 1;
        return;
    }

    write_line(out, "  Found Git LFS pointer file, downloading actual file...");

    match fetch_artefact(source, &entry.download_url, &path, out) {
        Ok(size) => {
            debug!("downloaded {} ({size} bytes)", entry.filename);
            write_line(
                out,
                format_args!("  Successfully downloaded {}", entry.filename),
            );
            summary.downloaded += 1;
        }
        Err(e) => {
            write_line(
                out,
                format_args!("  Failed to download {}: {e}", entry.filename),
            );
            summary.failed += 1;
        }
    }
    write_line(out, "");
}

fn report_final_status(entries: &[LfsFileEntry], packages_dir: &Utf8Path, out: &mut dyn Write) {
    write_line(out, "Final status:");
    for entry in entries {
        let path = entry.path_in(packages_dir);
        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() && !is_lfs_pointer(&path) => write_line(
                out,
                format_args!(
                    "  [ok] {} ({} bytes)",
                    entry.filename, format_bytes(metadata.len())
                ),
            ),
            _ => write_line(
                out,
                format_args!("  [missing] {} (still missing or LFS pointer)", entry.filename),
            ),
        }
    }
    write_line(out, "");
}

#[cfg(test)]
#[path = "download_flow_tests.rs"]
mod tests;
