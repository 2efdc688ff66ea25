//! Streaming HTTP downloads with per-block progress reports.

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::progress::Progress;

/// `User-Agent` sent with every request.
///
/// The LunarG download server rejects requests carrying the identifiers of
/// HTTP libraries, so a desktop browser is impersonated.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";

/// Size of the blocks progress is reported in.
pub const BLOCK_SIZE: usize = 8 * 1024;

/// A single file to fetch.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Download<'src> {
    /// Where to fetch the file from.
    pub url: &'src str,
    /// `User-Agent` header of the request.
    pub user_agent: &'src str,
}

impl<'src> Download<'src> {
    /// Creates a download of `url` identifying as a [browser](BROWSER_USER_AGENT).
    #[inline]
    #[must_use]
    pub const fn new(url: &'src str) -> Self {
        Self {
            url,
            user_agent: BROWSER_USER_AGENT,
        }
    }

    /// Replaces the `User-Agent` header of the request.
    #[inline]
    #[must_use]
    pub const fn user_agent(self, user_agent: &'src str) -> Self {
        Self {
            url: self.url,
            user_agent,
        }
    }

    /// Streams the response body into `dest`, calling `on_progress` before the
    /// first block and after every block. Returns the number of bytes written.
    ///
    /// Nothing is retried and a partially written file is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with an error
    /// status, the body is cut short or `dest` can't be written.
    #[inline]
    pub fn to_file<F>(&self, dest: &Path, on_progress: F) -> Result<u64, DownloadError>
    where
        F: FnMut(Progress) -> io::Result<()>,
    {
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent)
            .connect_timeout(Duration::from_secs(30))
            .timeout(None::<Duration>)
            .build()
            .map_err(DownloadError::Client)?;

        log::info!("downloading {} into {}", self.url, dest.display());
        let response = client
            .get(self.url)
            .send()
            .map_err(|source| DownloadError::Request {
                url: self.url.to_owned(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: self.url.to_owned(),
                status,
            });
        }
        let total = response.content_length();
        log::debug!("{} announced {total:?} bytes", self.url);

        let file = fs::File::create(dest).map_err(|source| DownloadError::CreateFile {
            path: dest.to_path_buf(),
            source,
        })?;
        let mut writer = io::BufWriter::new(file);
        let mut body = Received::new(response);
        let copied = copy_blocks(&mut body, &mut writer, BLOCK_SIZE, total, on_progress)
            .and_then(|written| writer.flush().map(|()| written));
        let written = match (copied, total) {
            (Ok(written), _) => written,
            (Err(source), Some(expected)) if is_truncated(&source) => {
                return Err(DownloadError::Incomplete {
                    url: self.url.to_owned(),
                    expected,
                    received: body.bytes,
                });
            }
            (Err(source), _) => {
                return Err(DownloadError::Transfer {
                    url: self.url.to_owned(),
                    source,
                });
            }
        };

        if let Some(expected) = total {
            if written < expected {
                return Err(DownloadError::Incomplete {
                    url: self.url.to_owned(),
                    expected,
                    received: written,
                });
            }
        }
        log::info!("downloaded {written} bytes from {}", self.url);
        Ok(written)
    }
}

/// Copies `reader` into `writer` in blocks of `block_size` bytes, reporting
/// [`Progress`] once up front and after every block. Returns the bytes copied.
///
/// # Errors
///
/// Returns an error if reading, writing or `on_progress` fails.
#[inline]
pub fn copy_blocks<R, W, F>(
    mut reader: R,
    mut writer: W,
    block_size: usize,
    total: Option<u64>,
    mut on_progress: F,
) -> io::Result<u64>
where
    R: Read,
    W: Write,
    F: FnMut(Progress) -> io::Result<()>,
{
    let block_size = block_size.max(1);
    let mut buffer = vec![0_u8; block_size];
    let mut progress = Progress {
        blocks: 0,
        block_size: block_size as u64,
        total,
    };
    let mut copied = 0_u64;

    on_progress(progress)?;
    loop {
        let len = read_block(&mut reader, &mut buffer)?;
        if len == 0 {
            break;
        }
        let block = buffer.get(..len).unwrap_or(&buffer);
        writer.write_all(block)?;
        copied += len as u64;
        progress.blocks += 1;
        on_progress(progress)?;
        if len < block_size {
            break;
        }
    }
    Ok(copied)
}

/// Counts the bytes coming out of a reader.
struct Received<R> {
    /// Inner reader.
    inner: R,
    /// Bytes read so far.
    bytes: u64,
}

impl<R> Received<R> {
    /// Starts counting at zero.
    const fn new(inner: R) -> Self {
        Self { inner, bytes: 0 }
    }
}

impl<R: Read> Read for Received<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.inner.read(buf)?;
        self.bytes += len as u64;
        Ok(len)
    }
}

/// Whether `err` means the connection ended before the announced length.
///
/// The HTTP client reports this as an `UnexpectedEof` buried in its own
/// error, which is wrapped in an [`io::Error`] again by the body reader.
fn is_truncated(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        return true;
    }
    let mut cause = err
        .get_ref()
        .map(|inner| inner as &(dyn std::error::Error + 'static));
    while let Some(current) = cause {
        if current
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::UnexpectedEof)
        {
            return true;
        }
        cause = current.source();
    }
    false
}

/// Fills `buffer` from `reader`, stopping early only at end of input.
fn read_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buffer.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(len) => filled += len,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// An error indicating a failed download.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DownloadError {
    /// The HTTP client could not be set up.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request could not be sent or answered.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Source of the error.
        source: reqwest::Error,
    },
    /// The server answered with an error status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status of the response.
        status: reqwest::StatusCode,
    },
    /// The destination file could not be created.
    #[error("failed to create {path}: {source}")]
    CreateFile {
        /// Path of the destination file.
        path: PathBuf,
        /// Source of the error.
        source: io::Error,
    },
    /// Receiving the body or writing it to disk failed.
    #[error("failed to download {url}: {source}")]
    Transfer {
        /// Requested URL.
        url: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The body ended before the announced length.
    #[error("download of {url} is incomplete: received {received} of {expected} bytes")]
    Incomplete {
        /// Requested URL.
        url: String,
        /// Announced length of the body.
        expected: u64,
        /// Bytes actually received.
        received: u64,
    },
}
