//! utilities for tests
#![cfg(test)]

use std::{
    collections::VecDeque,
    io::{self, Read as _, Write as _},
    net::TcpListener,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use crate::{
    command::CommandExecError,
    installer::Installer,
    prompt::{Choice as _, Confirmation, PromptError},
};

/// A single HTTP exchange served from a loopback port on its own thread.
///
/// The connection is closed right after the response, so a body shorter than
/// its `Content-Length` looks like a dropped connection to the client.
pub struct OneShotServer {
    /// URL to request.
    pub url: String,
    /// Yields the raw request head once the exchange is over.
    handle: JoinHandle<String>,
}

impl OneShotServer {
    /// Answers one request with `head` followed by `body`.
    pub fn start(path: &str, head: String, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}{path}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let len = stream.read(&mut buf).unwrap();
                if len == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..len]);
            }
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        Self { url, handle }
    }

    /// Serves all of `body` with a matching `Content-Length`.
    pub fn complete(path: &str, body: Vec<u8>) -> Self {
        Self::truncated(path, body.len(), body)
    }

    /// Announces `announced` bytes but sends only `body`.
    pub fn truncated(path: &str, announced: usize, body: Vec<u8>) -> Self {
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {announced}\r\nConnection: close\r\n\r\n"
        );
        Self::start(path, head, body)
    }

    /// Waits for the exchange to finish and returns the request head.
    pub fn request(self) -> String {
        self.handle.join().unwrap()
    }
}

/// Value of `name` in a raw request head, matched case-insensitively.
pub fn header<'req>(request: &'req str, name: &str) -> Option<&'req str> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Installer that exits immediately and records every launch.
#[derive(Default)]
pub struct InstantInstaller {
    /// Artifacts launched so far.
    pub launched: Vec<PathBuf>,
    /// How many runs were waited on.
    pub waited: usize,
}

impl Installer for InstantInstaller {
    type Running = usize;

    fn launch(&mut self, artifact: &Path) -> Result<usize, CommandExecError> {
        assert!(artifact.exists(), "artifact must exist while installing");
        self.launched.push(artifact.to_path_buf());
        Ok(self.launched.len())
    }

    fn wait(&mut self, running: usize) -> io::Result<Option<i32>> {
        assert_eq!(running, self.launched.len());
        self.waited += 1;
        Ok(Some(0))
    }
}

/// Operator giving `lines` as answers, then closing the input.
pub fn answers(lines: &[&str]) -> impl FnMut() -> Result<Confirmation, PromptError> {
    let mut lines = lines
        .iter()
        .map(|line| (*line).to_owned())
        .collect::<VecDeque<_>>();
    move || {
        let line = lines.pop_front().ok_or(PromptError::Closed)?;
        Ok(Confirmation::parse(&line).unwrap())
    }
}
