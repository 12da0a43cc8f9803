//! Component archive extraction.
//!
//! Expands `.zip` archives into a freshly recreated destination directory,
//! rejecting entries whose names would escape it (zip-slip).

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs::File;
use walkdir::WalkDir;

/// Trait for extracting component archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use javonet_installer::artefact::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the number of entries in the archive.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Open`] if the archive cannot be read,
    /// [`ExtractionError::EmptyArchive`] if it has no entries,
    /// [`ExtractionError::PathTraversal`] if an entry escapes `dest_dir`,
    /// and [`ExtractionError::Io`] or [`ExtractionError::Entry`] on
    /// failures while writing entries.
    fn extract(&self, archive_path: &Utf8Path, dest_dir: &Utf8Path)
    -> Result<usize, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable ZIP archive.
    #[error("cannot open ZIP archive {archive}: {source}")]
    Open {
        /// Path to the archive.
        archive: Utf8PathBuf,
        /// The underlying ZIP error.
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry could not be read from the archive.
    #[error("cannot read archive entry: {0}")]
    Entry(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },

    /// The archive contains no entries.
    #[error("archive {archive} is empty")]
    EmptyArchive {
        /// Path to the archive.
        archive: Utf8PathBuf,
    },
}

/// Default extractor using the `zip` crate.
///
/// Entry names are resolved with [`zip::read::ZipFile::enclosed_name`], so
/// absolute names and `..` components are rejected before anything is
/// written.
pub struct ZipExtractor;

impl ArtefactExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Utf8Path,
        dest_dir: &Utf8Path,
    ) -> Result<usize, ExtractionError> {
        let file = File::open(archive_path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|source| ExtractionError::Open {
                archive: archive_path.to_owned(),
                source,
            })?;

        if archive.is_empty() {
            return Err(ExtractionError::EmptyArchive {
                archive: archive_path.to_owned(),
            });
        }

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let Some(relative) = entry.enclosed_name() else {
                return Err(ExtractionError::PathTraversal {
                    path: entry.name().to_owned(),
                });
            };
            let out_path = dest_dir.as_std_path().join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out_file)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    let permissions = std::fs::Permissions::from_mode(mode);
                    if let Err(e) = std::fs::set_permissions(&out_path, permissions) {
                        debug!("cannot set mode {mode:o} on {}: {e}", out_path.display());
                    }
                }
            }
        }

        Ok(archive.len())
    }
}

/// Result of expanding one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The archive file does not exist; nothing was touched.
    Missing,
    /// The archive was extracted into a fresh destination.
    Extracted {
        /// Number of regular files now present under the destination.
        files: usize,
    },
}

/// Expand `archive_path` into `dest_dir`, replacing any previous contents.
///
/// A missing archive is reported as [`Expansion::Missing`] without touching
/// the destination. Otherwise the destination is deleted, recreated, and the
/// archive extracted into it; the returned file count is taken from the
/// result on disk.
///
/// # Errors
///
/// Returns any [`ExtractionError`] raised while clearing the destination or
/// extracting. The destination may be left empty in that case.
pub fn expand_archive(
    extractor: &dyn ArtefactExtractor,
    archive_path: &Utf8Path,
    dest_dir: &Utf8Path,
) -> Result<Expansion, ExtractionError> {
    if !archive_path.exists() {
        debug!("expand_archive: {archive_path} does not exist");
        return Ok(Expansion::Missing);
    }

    if dest_dir.is_dir() {
        remove_directory(dest_dir)?;
    }
    std::fs::create_dir_all(dest_dir)?;

    let entries = extractor.extract(archive_path, dest_dir)?;
    let files = count_files(dest_dir);
    debug!("expand_archive: {entries} entries from {archive_path}, {files} files in {dest_dir}");

    Ok(Expansion::Extracted { files })
}

/// Recursively delete `dir` and everything below it.
///
/// A path that is not a directory is left alone.
///
/// # Errors
///
/// Returns the underlying I/O error if deletion fails.
pub fn remove_directory(dir: &Utf8Path) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    std::fs::remove_dir_all(dir)
}

/// Count regular files anywhere below `dir`.
///
/// Returns zero when `dir` is not a directory. Unreadable entries are
/// skipped.
#[must_use]
pub fn count_files(dir: &Utf8Path) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
