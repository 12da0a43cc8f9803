//! SDK version detection from the Composer lock file.
//!
//! The download tool needs the installed SDK version to build release URLs.
//! The version is read from the project's `composer.lock`, which pins the
//! exact version of every installed package.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::fmt;

/// Composer package name of the Javonet PHP SDK.
pub const SDK_PACKAGE_NAME: &str = "javonet/javonet-php-sdk";

/// Branch name used as a version when the SDK is installed from source.
pub const MAIN_BRANCH: &str = "main";

/// Lock file name written by Composer.
pub const LOCK_FILE_NAME: &str = "composer.lock";

/// The installed SDK version as recorded in the lock file.
///
/// Either a semantic version (`2.3.1`, `v2.3.1`) or the literal `main`.
///
/// # Examples
///
/// ```
/// use javonet_installer::lockfile::PackageVersion;
///
/// assert_eq!(PackageVersion::new("2.3.1").release_ref(), "v2.3.1");
/// assert_eq!(PackageVersion::new("v2.3.1").release_ref(), "v2.3.1");
/// assert_eq!(PackageVersion::new("main").release_ref(), "main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion(String);

impl PackageVersion {
    /// Wrap a version string taken from the lock file.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Return the version exactly as recorded.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the git ref the release is published under.
    ///
    /// Release tags carry a `v` prefix; `main` and versions that already
    /// start with `v` are used unchanged.
    #[must_use]
    pub fn release_ref(&self) -> String {
        if self.0 == MAIN_BRANCH || self.0.starts_with('v') {
            self.0.clone()
        } else {
            format!("v{}", self.0)
        }
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors arising from version detection.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// The lock file does not exist.
    #[error("lock file not found at {path}")]
    LockFileMissing {
        /// Where the lock file was expected.
        path: Utf8PathBuf,
    },

    /// The lock file exists but could not be read.
    #[error("failed to read lock file {path}: {source}")]
    LockFileRead {
        /// Path to the lock file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The lock file is not valid JSON of the expected shape.
    #[error("invalid lock file {path}: {source}")]
    LockFileParse {
        /// Path to the lock file.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// No record for the package exists in the lock file.
    #[error("package {package} not found in lock file")]
    PackageNotFound {
        /// The package that was searched for.
        package: String,
    },
}

#[derive(Debug, Deserialize)]
struct LockFile {
    #[serde(default)]
    packages: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl LockFile {
    fn version_of(&self, package: &str) -> Option<PackageVersion> {
        self.packages
            .iter()
            .find(|locked| locked.name.as_deref() == Some(package))
            .and_then(|locked| locked.version.as_deref())
            .filter(|version| !version.is_empty())
            .map(PackageVersion::new)
    }
}

/// Return the default lock file location for an SDK installed at
/// `package_dir`.
///
/// Composer installs the SDK under `vendor/javonet/javonet-php-sdk`, so the
/// project root holding `composer.lock` is three levels up.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use javonet_installer::lockfile::default_lock_file;
///
/// let path = default_lock_file(Utf8Path::new("/app/vendor/javonet/javonet-php-sdk"));
/// assert_eq!(path, "/app/vendor/javonet/javonet-php-sdk/../../../composer.lock");
/// ```
#[must_use]
pub fn default_lock_file(package_dir: &Utf8Path) -> Utf8PathBuf {
    package_dir.join("..").join("..").join("..").join(LOCK_FILE_NAME)
}

/// Resolve the version of `package` recorded in the lock file at `lock_file`.
///
/// The first record whose `name` equals `package` wins. Records without a
/// name or version are skipped.
///
/// # Errors
///
/// Returns [`VersionError::LockFileMissing`] when the file does not exist,
/// [`VersionError::LockFileRead`] or [`VersionError::LockFileParse`] when it
/// cannot be read or parsed, and [`VersionError::PackageNotFound`] when no
/// record matches.
pub fn resolve_version(
    lock_file: &Utf8Path,
    package: &str,
) -> Result<PackageVersion, VersionError> {
    if !lock_file.is_file() {
        return Err(VersionError::LockFileMissing {
            path: lock_file.to_owned(),
        });
    }

    let contents =
        std::fs::read_to_string(lock_file).map_err(|source| VersionError::LockFileRead {
            path: lock_file.to_owned(),
            source,
        })?;

    let parsed: LockFile =
        serde_json::from_str(&contents).map_err(|source| VersionError::LockFileParse {
            path: lock_file.to_owned(),
            source,
        })?;

    debug!(
        "resolve_version: {} package record(s) in {lock_file}",
        parsed.packages.len()
    );

    parsed
        .version_of(package)
        .ok_or_else(|| VersionError::PackageNotFound {
            package: package.to_owned(),
        })
}
