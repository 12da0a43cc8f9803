//! CLI argument definitions for the Javonet installer tools.
//!
//! Each binary parses its own argument struct. Every option can also be set
//! through an environment variable so the tools can run unattended from
//! Composer scripts.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use crate::lfs::scan::DEFAULT_REPOSITORY_URL;
use crate::lockfile::default_lock_file;

/// Download the real content of Git LFS pointer files in the SDK packages.
#[derive(Parser, Debug, Clone)]
#[command(name = "javonet-download-lfs")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download the real content of Git LFS pointer files in the SDK packages.\n\n",
    "Composer installs the Javonet PHP SDK without Git LFS support, leaving small ",
    "pointer files in place of the component archives. This tool detects those ",
    "pointers, resolves the installed SDK version from composer.lock, and replaces ",
    "each pointer with the file published for that version.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Run from the installed SDK directory:\n",
    "    $ cd vendor/javonet/javonet-php-sdk && javonet-download-lfs\n\n",
    "  Point at the SDK and lock file explicitly:\n",
    "    $ javonet-download-lfs --package-dir vendor/javonet/javonet-php-sdk \\\n",
    "        --lock-file composer.lock\n",
))]
pub struct DownloadCli {
    /// Directory of the installed SDK package.
    #[arg(long, env = "JAVONET_PACKAGE_DIR", value_name = "DIR", default_value = ".")]
    pub package_dir: Utf8PathBuf,

    /// Composer lock file [default: <package-dir>/../../../composer.lock].
    #[arg(long, env = "JAVONET_LOCK_FILE", value_name = "FILE")]
    pub lock_file: Option<Utf8PathBuf>,

    /// Repository serving the released package files.
    #[arg(
        long,
        env = "JAVONET_REPOSITORY_URL",
        value_name = "URL",
        default_value = DEFAULT_REPOSITORY_URL
    )]
    pub repository_url: String,
}

impl DownloadCli {
    /// Return the lock file to read, falling back to the project root above
    /// the package directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use javonet_installer::cli::DownloadCli;
    ///
    /// let cli = DownloadCli::parse_from([
    ///     "javonet-download-lfs",
    ///     "--lock-file",
    ///     "app/composer.lock",
    /// ]);
    /// assert_eq!(cli.lock_file_path(), "app/composer.lock");
    /// ```
    #[must_use]
    pub fn lock_file_path(&self) -> Utf8PathBuf {
        self.lock_file
            .clone()
            .unwrap_or_else(|| default_lock_file(&self.package_dir))
    }
}

/// Extract the SDK component archives for the PSR-4 autoloader.
#[derive(Parser, Debug, Clone)]
#[command(name = "javonet-extract-packages")]
#[command(version, about)]
#[command(long_about = concat!(
    "Extract the SDK component archives for the PSR-4 autoloader.\n\n",
    "Each archive under <package-dir>/packages is expanded into its own directory ",
    "under <package-dir>/javonet, replacing any previous contents. Missing archives ",
    "are skipped; the run fails only when no archive could be extracted.",
))]
pub struct ExtractCli {
    /// Directory of the installed SDK package.
    #[arg(long, env = "JAVONET_PACKAGE_DIR", value_name = "DIR", default_value = ".")]
    pub package_dir: Utf8PathBuf,
}

impl ExtractCli {
    /// Return the package directory to operate on.
    #[must_use]
    pub fn package_dir(&self) -> &Utf8Path {
        &self.package_dir
    }
}
