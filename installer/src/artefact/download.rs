//! Artefact download for Git LFS backed package files.
//!
//! Provides a trait-based abstraction over the HTTP transport, enabling
//! dependency injection for testing, and the streaming fetch that replaces a
//! pointer file with the real content through a sibling `.tmp` file.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::io::{ErrorKind, Read, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crate::lfs::pointer::MIN_ARTEFACT_SIZE;
use crate::output::{format_bytes, write_line};

/// User agent sent with every download request.
pub const USER_AGENT: &str = "Composer-Git-LFS-Downloader/1.0";

/// Accepted media type for downloaded artefacts.
const ACCEPT_OCTET_STREAM: &str = "application/octet-stream";

/// Time allowed to connect and to receive the response headers.
///
/// The body is not capped as a whole: a slow but steady transfer of a large
/// archive runs to completion.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Redirects followed before giving up (raw GitHub URLs redirect to the
/// media host).
const MAX_REDIRECTS: u32 = 10;

/// Read buffer size while streaming.
pub const CHUNK_SIZE: usize = 8192;

/// Progress is reported every time this many bytes have been received.
pub const PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Trait for opening a byte stream for a URL.
///
/// Abstractions allow tests to replace HTTP with in-memory readers.
///
/// # Examples
///
/// ```
/// use javonet_installer::artefact::download::HttpSource;
///
/// let source = HttpSource::new();
/// // Use source.open(url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactSource {
    /// Open a reader over the body served at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports an
    /// error status.
    fn open(&self, url: &str) -> Result<Box<dyn Read>, DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested artefact was not found (HTTP 404).
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The response body could not be read to the end.
    #[error("failed to read from {url}: {source}")]
    Read {
        /// The URL being streamed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error creating, writing, or installing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),

    /// The download finished but is too small to be real content.
    #[error("downloaded file seems too small ({size} bytes), might be another LFS pointer")]
    PointerPayload {
        /// Size of the rejected download.
        size: u64,
    },
}

/// HTTP-based source using `ureq`.
#[derive(Clone)]
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    /// Source using the shared agent and [`DOWNLOAD_TIMEOUT`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: shared_agent().clone(),
        }
    }

    /// Source whose connect and response-header phases time out after
    /// `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtefactSource for HttpSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read>, DownloadError> {
        let response = self
            .agent
            .get(url)
            .header("Accept", ACCEPT_OCTET_STREAM)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        Ok(Box::new(response.into_body().into_reader()))
    }
}

fn shared_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| build_agent(DOWNLOAD_TIMEOUT))
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(timeout))
        .timeout_recv_response(Some(timeout))
        .max_redirects(MAX_REDIRECTS)
        .user_agent(USER_AGENT)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Return the temporary download path used for `dest`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use javonet_installer::artefact::download::temp_path_for;
///
/// assert_eq!(temp_path_for(Utf8Path::new("packages/a.zip")), "packages/a.zip.tmp");
/// ```
#[must_use]
pub fn temp_path_for(dest: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{dest}.tmp"))
}

/// Download `url` and install the body at `dest`.
///
/// The body is streamed into `<dest>.tmp` (any stale temporary file is
/// removed first). A completed download smaller than
/// [`MIN_ARTEFACT_SIZE`] bytes is rejected as another placeholder and the
/// destination is left untouched. Otherwise the existing destination is
/// removed and the temporary file renamed into place.
///
/// Progress lines are written to `progress`. The temporary file never
/// outlives this call.
///
/// Returns the size of the installed file.
///
/// # Errors
///
/// Returns [`DownloadError::Http`] or [`DownloadError::NotFound`] when the
/// request fails, [`DownloadError::Read`] when the stream breaks,
/// [`DownloadError::Io`] on local file failures, and
/// [`DownloadError::PointerPayload`] for undersized downloads.
pub fn fetch_artefact(
    source: &dyn ArtefactSource,
    url: &str,
    dest: &Utf8Path,
    progress: &mut dyn Write,
) -> Result<u64, DownloadError> {
    write_line(progress, format_args!("  Downloading from: {url}"));

    let temp_path = temp_path_for(dest);
    remove_if_exists(&temp_path)?;

    let result = download_and_install(source, url, dest, &temp_path, progress);
    if result.is_err() {
        discard_temp(&temp_path);
    }
    result
}

fn download_and_install(
    source: &dyn ArtefactSource,
    url: &str,
    dest: &Utf8Path,
    temp_path: &Utf8Path,
    progress: &mut dyn Write,
) -> Result<u64, DownloadError> {
    let mut reader = source.open(url)?;
    let mut file = std::fs::File::create(temp_path)?;
    let streamed = stream_with_progress(&mut reader, &mut file, url, progress)?;
    file.flush()?;
    drop(file);
    drop(reader);

    let size = std::fs::metadata(temp_path)?.len();
    debug!("fetch_artefact: streamed {streamed} bytes, {size} on disk for {dest}");
    if size < MIN_ARTEFACT_SIZE {
        write_line(
            progress,
            format_args!(
                "  Downloaded file seems too small ({size} bytes), might be another LFS pointer"
            ),
        );
        return Err(DownloadError::PointerPayload { size });
    }

    remove_if_exists(dest)?;
    std::fs::rename(temp_path, dest)?;

    write_line(
        progress,
        format_args!("  Downloaded: {} bytes", format_bytes(size)),
    );
    Ok(size)
}

/// Copy `reader` into `writer` in [`CHUNK_SIZE`] chunks, reporting each
/// [`PROGRESS_INTERVAL`] boundary crossed.
fn stream_with_progress(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    url: &str,
    progress: &mut dyn Write,
) -> Result<u64, DownloadError> {
    let mut buffer = vec![0_u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                write_line(progress, "  Failed to read from URL");
                return Err(DownloadError::Read {
                    url: url.to_owned(),
                    source,
                });
            }
        };

        let Some(chunk) = buffer.get(..read) else {
            break;
        };
        if let Err(e) = writer.write_all(chunk) {
            write_line(progress, "  Failed to write to temporary file");
            return Err(DownloadError::Io(e));
        }

        let previous = total;
        total += read as u64;
        if total / PROGRESS_INTERVAL > previous / PROGRESS_INTERVAL {
            write_line(
                progress,
                format_args!("  Downloaded: {} bytes...", format_bytes(total)),
            );
        }
    }

    Ok(total)
}

fn remove_if_exists(path: &Utf8Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn discard_temp(temp_path: &Utf8Path) {
    if let Err(e) = remove_if_exists(temp_path) {
        warn!("failed to remove temporary file {temp_path}: {e}");
    }
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
