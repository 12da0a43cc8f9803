//! Packages directory scanning and release URL construction.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};

use crate::lfs::pointer::{MIN_ARTEFACT_SIZE, is_lfs_pointer};
use crate::lockfile::PackageVersion;

/// Public repository hosting the SDK releases.
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/Javonet/javonet-php-sdk";

/// Name of the directory holding the component archives.
pub const PACKAGES_DIR_NAME: &str = "packages";

/// Where the real content of a release's packages can be fetched from.
///
/// # Examples
///
/// ```
/// use javonet_installer::lfs::scan::{DEFAULT_REPOSITORY_URL, ReleaseLocation};
/// use javonet_installer::lockfile::PackageVersion;
///
/// let location = ReleaseLocation::new(DEFAULT_REPOSITORY_URL, &PackageVersion::new("2.3.1"));
/// assert_eq!(
///     location.file_url("javonet-sdk.zip"),
///     "https://github.com/Javonet/javonet-php-sdk/raw/v2.3.1/packages/javonet-sdk.zip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLocation {
    repository_url: String,
    release_ref: String,
}

impl ReleaseLocation {
    /// Build the location for `version` of the repository at `repository_url`.
    #[must_use]
    pub fn new(repository_url: &str, version: &PackageVersion) -> Self {
        Self {
            repository_url: repository_url.trim_end_matches('/').to_owned(),
            release_ref: version.release_ref(),
        }
    }

    /// Return the git ref the files are read from.
    #[must_use]
    pub fn release_ref(&self) -> &str {
        &self.release_ref
    }

    /// Return the raw download URL for `filename` under `packages/`.
    #[must_use]
    pub fn file_url(&self, filename: &str) -> String {
        format!(
            "{}/raw/{}/{PACKAGES_DIR_NAME}/{filename}",
            self.repository_url, self.release_ref
        )
    }
}

/// A file in the packages directory that needs its real content fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LfsFileEntry {
    /// File name within the packages directory.
    pub filename: String,
    /// URL serving the real content.
    pub download_url: String,
}

impl LfsFileEntry {
    /// Return the on-disk path of this entry inside `packages_dir`.
    #[must_use]
    pub fn path_in(&self, packages_dir: &Utf8Path) -> Utf8PathBuf {
        packages_dir.join(&self.filename)
    }
}

/// List the files in `packages_dir` whose real content must be downloaded.
///
/// A file qualifies when it is a Git LFS pointer, or when it is a `.zip`
/// smaller than [`MIN_ARTEFACT_SIZE`] bytes. Only regular files are
/// considered, in file-name order. A missing directory yields no entries.
///
/// # Errors
///
/// Returns an I/O error if the directory exists but cannot be listed.
pub fn detect_lfs_files(
    packages_dir: &Utf8Path,
    location: &ReleaseLocation,
) -> std::io::Result<Vec<LfsFileEntry>> {
    if !packages_dir.is_dir() {
        debug!("detect_lfs_files: {packages_dir} is not a directory");
        return Ok(Vec::new());
    }

    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(packages_dir)? {
        let entry = entry?;
        match entry.file_name().into_string() {
            Ok(name) => filenames.push(name),
            Err(name) => trace!("detect_lfs_files: skipping non-UTF-8 name {name:?}"),
        }
    }
    filenames.sort();

    let entries = filenames
        .into_iter()
        .filter(|name| needs_download(&packages_dir.join(name)))
        .map(|filename| LfsFileEntry {
            download_url: location.file_url(&filename),
            filename,
        })
        .collect::<Vec<_>>();

    debug!(
        "detect_lfs_files: {} candidate(s) in {packages_dir}",
        entries.len()
    );
    Ok(entries)
}

/// Return true for pointer files and undersized ZIP archives.
fn needs_download(path: &Utf8Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    is_lfs_pointer(path) || (path.extension() == Some("zip") && metadata.len() < MIN_ARTEFACT_SIZE)
}
