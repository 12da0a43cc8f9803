//! Unit tests for the streaming artefact fetch.

use super::*;
use crate::test_utils::{POINTER_CONTENT, write_pointer};
use rstest::{fixture, rstest};
use std::io::Cursor;

const URL: &str = "https://github.com/Javonet/javonet-php-sdk/raw/v2.3.1/packages/javonet-sdk.zip";

/// Yields `remaining` bytes of payload and then fails.
struct BrokenReader {
    remaining: usize,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::new(ErrorKind::ConnectionReset, "connection reset by peer"));
        }
        let n = self.remaining.min(buf.len());
        buf.iter_mut().take(n).for_each(|b| *b = b'x');
        self.remaining -= n;
        Ok(n)
    }
}

/// Accepts nothing; every write fails as on a full disk.
struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(ErrorKind::StorageFull, "no space left on device"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct Scratch {
    _temp: tempfile::TempDir,
    dest: Utf8PathBuf,
}

#[fixture]
fn scratch() -> Scratch {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    let dest = write_pointer(&dir, "javonet-sdk.zip");
    Scratch { _temp: temp, dest }
}

fn serving(body: Vec<u8>) -> MockArtefactSource {
    let mut source = MockArtefactSource::new();
    source.expect_open().times(1).returning(move |url| {
        assert_eq!(url, URL);
        Ok(Box::new(Cursor::new(body.clone())) as Box<dyn Read>)
    });
    source
}

fn assert_pointer_untouched(dest: &Utf8Path) {
    let contents = std::fs::read_to_string(dest).expect("read dest");
    assert_eq!(contents, POINTER_CONTENT);
}

#[rstest]
fn successful_download_replaces_pointer(scratch: Scratch) {
    let body = vec![7_u8; 4096];
    let source = serving(body.clone());
    let mut progress = Vec::new();

    let size = fetch_artefact(&source, URL, &scratch.dest, &mut progress).expect("fetch");

    assert_eq!(size, 4096);
    assert_eq!(std::fs::read(&scratch.dest).expect("read dest"), body);
    assert!(!temp_path_for(&scratch.dest).exists());
    let text = String::from_utf8(progress).expect("UTF-8");
    assert!(text.contains("Downloading from: "));
    assert!(text.contains("Downloaded: 4,096 bytes"));
}

#[rstest]
fn undersized_download_is_rejected(scratch: Scratch) {
    let source = serving(vec![0_u8; 800]);
    let mut progress = Vec::new();

    let err = fetch_artefact(&source, URL, &scratch.dest, &mut progress).expect_err("rejected");

    assert!(matches!(err, DownloadError::PointerPayload { size: 800 }));
    assert!(!temp_path_for(&scratch.dest).exists());
    assert_pointer_untouched(&scratch.dest);
}

#[rstest]
#[case::just_below(MIN_ARTEFACT_SIZE - 1, false)]
#[case::at_threshold(MIN_ARTEFACT_SIZE, true)]
fn size_threshold_is_inclusive(scratch: Scratch, #[case] size: u64, #[case] accepted: bool) {
    let len = usize::try_from(size).expect("size fits usize");
    let source = serving(vec![1_u8; len]);
    let result = fetch_artefact(&source, URL, &scratch.dest, &mut std::io::sink());
    assert_eq!(result.is_ok(), accepted);
    assert!(!temp_path_for(&scratch.dest).exists());
}

#[rstest]
fn broken_stream_discards_partial_file(scratch: Scratch) {
    let mut source = MockArtefactSource::new();
    source
        .expect_open()
        .returning(|_| Ok(Box::new(BrokenReader { remaining: 20_000 }) as Box<dyn Read>));
    let mut progress = Vec::new();

    let err = fetch_artefact(&source, URL, &scratch.dest, &mut progress).expect_err("broken");

    assert!(matches!(err, DownloadError::Read { .. }));
    assert!(!temp_path_for(&scratch.dest).exists());
    assert_pointer_untouched(&scratch.dest);
    let text = String::from_utf8(progress).expect("UTF-8");
    assert!(text.contains("Failed to read from URL"));
}

#[rstest]
fn open_failure_removes_stale_temp_file(scratch: Scratch) {
    let temp_path = temp_path_for(&scratch.dest);
    std::fs::write(&temp_path, b"left over from an earlier run").expect("write stale temp");

    let mut source = MockArtefactSource::new();
    source.expect_open().returning(|url| {
        Err(DownloadError::NotFound {
            url: url.to_owned(),
        })
    });

    let err = fetch_artefact(&source, URL, &scratch.dest, &mut std::io::sink()).expect_err("404");

    assert!(matches!(err, DownloadError::NotFound { .. }));
    assert!(!temp_path.exists());
    assert_pointer_untouched(&scratch.dest);
}

#[test]
fn write_failure_is_reported_while_streaming() {
    let mut reader = Cursor::new(vec![3_u8; 4096]);
    let mut progress = Vec::new();

    let err = stream_with_progress(&mut reader, &mut FullDisk, URL, &mut progress)
        .expect_err("write fails");

    assert!(matches!(err, DownloadError::Io(ref e) if e.kind() == ErrorKind::StorageFull));
    let text = String::from_utf8(progress).expect("UTF-8");
    assert_eq!(text, "  Failed to write to temporary file\n");
}

#[cfg(target_os = "linux")]
#[rstest]
fn write_failure_discards_temp_file(scratch: Scratch) {
    let temp_path = temp_path_for(&scratch.dest);
    let mut source = MockArtefactSource::new();
    let redirect = temp_path.clone();
    source.expect_open().times(1).returning(move |_| {
        // The temporary file is created after the source opens; route it to
        // a device that rejects every write.
        std::os::unix::fs::symlink("/dev/full", &redirect).expect("symlink temp to /dev/full");
        Ok(Box::new(Cursor::new(vec![5_u8; 4096])) as Box<dyn Read>)
    });
    let mut progress = Vec::new();

    let err = fetch_artefact(&source, URL, &scratch.dest, &mut progress).expect_err("disk full");

    assert!(matches!(err, DownloadError::Io(_)));
    assert!(std::fs::symlink_metadata(&temp_path).is_err(), "temp file left behind");
    assert_pointer_untouched(&scratch.dest);
    let text = String::from_utf8(progress).expect("UTF-8");
    assert!(text.contains("Failed to write to temporary file"));
}

#[test]
fn install_failure_cleans_up_temp_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    // A non-empty directory at the destination cannot be replaced by a file.
    let dest = dir.join("javonet-sdk.zip");
    std::fs::create_dir_all(dest.join("occupied")).expect("create blocking dir");

    let mut source = MockArtefactSource::new();
    source
        .expect_open()
        .returning(|_| Ok(Box::new(Cursor::new(vec![9_u8; 2048])) as Box<dyn Read>));

    let err = fetch_artefact(&source, URL, &dest, &mut std::io::sink()).expect_err("blocked");

    assert!(matches!(err, DownloadError::Io(_)));
    assert!(!temp_path_for(&dest).exists());
    assert!(dest.is_dir());
}

#[test]
fn progress_is_reported_at_each_mebibyte() {
    let body_len = usize::try_from(PROGRESS_INTERVAL * 5 / 2).expect("fits usize");
    let mut reader = Cursor::new(vec![0_u8; body_len]);
    let mut sink = Vec::new();
    let mut progress = Vec::new();

    let total = stream_with_progress(&mut reader, &mut sink, URL, &mut progress).expect("stream");

    assert_eq!(total, PROGRESS_INTERVAL * 5 / 2);
    let text = String::from_utf8(progress).expect("UTF-8");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "  Downloaded: 1,048,576 bytes...",
            "  Downloaded: 2,097,152 bytes..."
        ]
    );
}

#[test]
fn map_ureq_error_maps_404_to_not_found() {
    let err = ureq::Error::StatusCode(404);
    let mapped = map_ureq_error(URL, &err);
    assert!(matches!(mapped, DownloadError::NotFound { .. }));
}

#[test]
fn map_ureq_error_maps_other_status_to_http_error() {
    let err = ureq::Error::StatusCode(503);
    let mapped = map_ureq_error(URL, &err);
    assert!(matches!(mapped, DownloadError::Http { .. }));
}

#[test]
fn pointer_payload_error_mentions_size() {
    let err = DownloadError::PointerPayload { size: 133 };
    assert!(err.to_string().contains("133 bytes"));
}
