//! Test support utilities for installer behavioural tests.
//!
//! Provides a scratch SDK installation laid out the way Composer installs it
//! and a minimal HTTP/1.1 server that serves fixed bodies by request path.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use camino::{Utf8Path, Utf8PathBuf};
use javonet_installer::lfs::scan::PACKAGES_DIR_NAME;
use javonet_installer::lockfile::{LOCK_FILE_NAME, SDK_PACKAGE_NAME};
use javonet_installer::test_utils::lock_file_json;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// A project with the SDK installed under `vendor/javonet/javonet-php-sdk`.
pub struct SdkInstall {
    _temp: TempDir,
    /// Project root holding `composer.lock`.
    pub root: Utf8PathBuf,
    /// Installed SDK package directory.
    pub package_dir: Utf8PathBuf,
}

impl SdkInstall {
    /// Create an empty installation with a `packages/` directory.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp path");
        let package_dir = root.join("vendor/javonet/javonet-php-sdk");
        std::fs::create_dir_all(package_dir.join(PACKAGES_DIR_NAME))
            .expect("create packages dir");
        Self {
            _temp: temp,
            root,
            package_dir,
        }
    }

    /// Directory holding the component archives.
    pub fn packages_dir(&self) -> Utf8PathBuf {
        self.package_dir.join(PACKAGES_DIR_NAME)
    }

    /// Path of the project lock file.
    pub fn lock_file(&self) -> Utf8PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    /// Record `version` as the installed SDK version.
    pub fn lock_version(&self, version: &str) {
        std::fs::write(self.lock_file(), lock_file_json(SDK_PACKAGE_NAME, version))
            .expect("write lock file");
    }

    /// Path of `name` inside the packages directory.
    pub fn package_file(&self, name: &str) -> Utf8PathBuf {
        self.packages_dir().join(name)
    }
}

/// A request seen by [`FileServer`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// Request path, for example `/raw/v2.3.1/packages/javonet-sdk.zip`.
    pub path: String,
    /// Raw request head, lower-cased for header matching.
    pub head: String,
}

/// How a [`FileServer`] releases response bodies.
#[derive(Debug, Clone, Copy)]
pub enum Pacing {
    /// Write each body in one go.
    Immediate,
    /// Write `chunk` bytes, then wait `delay`, until the body is sent.
    Trickle {
        /// Bytes written per burst.
        chunk: usize,
        /// Pause between bursts.
        delay: Duration,
    },
}

/// Minimal HTTP server that answers `GET` with a fixed body per path.
///
/// Unknown paths get `404 Not Found`. The server runs on a background thread
/// until the test process exits.
pub struct FileServer {
    base_url: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FileServer {
    /// Start serving `files`, keyed by request path.
    pub fn start(files: HashMap<String, Vec<u8>>) -> Self {
        Self::start_paced(files, Pacing::Immediate)
    }

    /// Start serving `files`, releasing bodies according to `pacing`.
    pub fn start_paced(files: HashMap<String, Vec<u8>>, pacing: Pacing) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let files = Arc::new(files);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let files = Arc::clone(&files);
                let seen = Arc::clone(&seen);
                thread::spawn(move || handle(stream, &files, &seen, pacing));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            requests,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().expect("request log").clone()
    }
}

fn handle(
    mut stream: TcpStream,
    files: &HashMap<String, Vec<u8>>,
    seen: &Mutex<Vec<SeenRequest>>,
    pacing: Pacing,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    if let Ok(mut log) = seen.lock() {
        log.push(SeenRequest {
            path: path.clone(),
            head: head.to_ascii_lowercase(),
        });
    }

    let Some(body) = files.get(&path) else {
        let _ = stream.write_all(NOT_FOUND);
        return;
    };
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if stream.write_all(header.as_bytes()).is_err() {
        return;
    }
    match pacing {
        Pacing::Immediate => {
            let _ = stream.write_all(body);
        }
        Pacing::Trickle { chunk, delay } => {
            for piece in body.chunks(chunk.max(1)) {
                if stream.write_all(piece).and_then(|()| stream.flush()).is_err() {
                    return;
                }
                thread::sleep(delay);
            }
        }
    }
    let _ = stream.flush();
}

const NOT_FOUND: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Start a server that accepts connections but never answers.
///
/// Returns the base URL. Connections are held open for `hold`.
pub fn start_silent_server(hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || {
                thread::sleep(hold);
                drop(stream);
            });
        }
    });
    format!("http://127.0.0.1:{port}")
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(buf.get(..n)?);
    }
    String::from_utf8(head).ok()
}

/// Return the paths of every regular file below `dir`, relative to it.
pub fn relative_files(dir: &Utf8Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(dir.as_std_path())
                .ok()
                .and_then(|p| p.to_str())
                .map(str::to_owned)
        })
        .collect();
    files.sort();
    files
}
