//! Git LFS pointer file recognition.
//!
//! A pointer is a short text file of the form:
//!
//! ```text
//! version https://git-lfs.github.com/spec/v1
//! oid sha256:4d7a2146...
//! size 12345
//! ```
//!
//! Recognition is a heuristic over size and content, not a parser: any file
//! of at most [`POINTER_MAX_SIZE`] bytes containing both markers is treated
//! as a pointer.

use camino::Utf8Path;
use log::trace;

/// Files larger than this are never treated as pointers.
pub const POINTER_MAX_SIZE: u64 = 500;

/// Smallest size accepted as real archive content.
///
/// Smaller `.zip` files are queued for download, and downloads that end
/// below this size are rejected as another placeholder.
pub const MIN_ARTEFACT_SIZE: u64 = 1000;

/// Host marker present in every pointer file.
pub const POINTER_HOST_MARKER: &str = "git-lfs.github.com";

/// Version line present in every pointer file.
pub const POINTER_VERSION_MARKER: &str = "version https://git-lfs.github.com/spec/v1";

/// Decide whether a file of `size` bytes with `content` is a pointer.
///
/// # Examples
///
/// ```
/// use javonet_installer::lfs::pointer::is_pointer_content;
///
/// let pointer = b"version https://git-lfs.github.com/spec/v1\noid sha256:abc\nsize 42\n";
/// assert!(is_pointer_content(pointer.len() as u64, pointer));
/// assert!(!is_pointer_content(4096, pointer));
/// assert!(!is_pointer_content(3, b"PK\x03"));
/// ```
#[must_use]
pub fn is_pointer_content(size: u64, content: &[u8]) -> bool {
    if size > POINTER_MAX_SIZE {
        return false;
    }
    let text = String::from_utf8_lossy(content);
    text.contains(POINTER_HOST_MARKER) && text.contains(POINTER_VERSION_MARKER)
}

/// Return true when the file at `path` is a Git LFS pointer.
///
/// Missing or unreadable files are not pointers. Content is only read for
/// files no larger than [`POINTER_MAX_SIZE`].
#[must_use]
pub fn is_lfs_pointer(path: &Utf8Path) -> bool {
    let size = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        Ok(_) => return false,
        Err(e) => {
            trace!("is_lfs_pointer: cannot stat {path}: {e}");
            return false;
        }
    };

    if size > POINTER_MAX_SIZE {
        return false;
    }

    match std::fs::read(path) {
        Ok(content) => is_pointer_content(size, &content),
        Err(e) => {
            trace!("is_lfs_pointer: cannot read {path}: {e}");
            false
        }
    }
}
