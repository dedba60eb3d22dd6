use std::{
    collections::VecDeque,
    io,
    os::unix::io::{AsRawFd, RawFd},
};

use log::warn;
use nix::{
    errno::Errno,
    poll::{PollFd, PollFlags, poll},
    unistd,
};

/// Source of online arrivals, one command per line.
pub trait InputSource {
    /// Next complete line if one is available right now. Never blocks.
    fn try_read_line(&mut self) -> Option<String>;

    /// No more lines will ever arrive.
    fn is_exhausted(&self) -> bool;
}

const READ_CHUNK: usize = 4096;

/// Reads lines from a file descriptor, checking readiness with a
/// zero-timeout `poll` before every read.
#[derive(Debug)]
pub struct FdInput {
    fd: RawFd,
    pending: Vec<u8>,
    lines: VecDeque<String>,
    closed: bool,
}

impl FdInput {
    pub fn new(fd: RawFd) -> Self {
        Self {
            fd,
            pending: Vec::new(),
            lines: VecDeque::new(),
            closed: false,
        }
    }

    pub fn stdin() -> Self {
        Self::new(io::stdin().as_raw_fd())
    }

    /// Whether a `read` would not block. A descriptor that can never yield
    /// more data is marked closed.
    fn readable(&mut self) -> bool {
        let mut fds = [PollFd::new(self.fd, PollFlags::POLLIN)];
        let revents = match poll(&mut fds, 0) {
            Ok(0) | Err(Errno::EINTR) => return false,
            Ok(_) => fds[0].revents().unwrap_or(PollFlags::empty()),
            Err(err) => {
                warn!("polling input failed, no further arrivals: {err}");
                self.closed = true;
                return false;
            }
        };

        if revents.contains(PollFlags::POLLNVAL) {
            warn!("input descriptor {} is not open, no further arrivals", self.fd);
            self.closed = true;
            return false;
        }
        if revents.contains(PollFlags::POLLERR) && !revents.contains(PollFlags::POLLIN) {
            warn!("input descriptor {} reported an error, no further arrivals", self.fd);
            self.closed = true;
            return false;
        }
        revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP)
    }

    fn fill(&mut self) {
        let mut chunk = [0u8; READ_CHUNK];
        match unistd::read(self.fd, &mut chunk) {
            Ok(0) => {
                self.closed = true;
                let rest = std::mem::take(&mut self.pending);
                self.push_line(&rest);
            }
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = self.pending.drain(..=newline).collect();
                    self.push_line(&line);
                }
            }
            Err(Errno::EINTR | Errno::EAGAIN) => {}
            Err(err) => {
                warn!("reading input failed, no further arrivals: {err}");
                self.closed = true;
            }
        }
    }

    fn push_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']).trim();
        if !line.is_empty() {
            self.lines.push_back(line.to_owned());
        }
    }
}

impl InputSource for FdInput {
    fn try_read_line(&mut self) -> Option<String> {
        while self.lines.is_empty() && !self.closed && self.readable() {
            self.fill();
        }
        self.lines.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.lines.is_empty()
    }
}

/// Lines known up front, delivered all at once.
#[derive(Debug, Default)]
pub struct LineQueue {
    lines: VecDeque<String>,
}

impl LineQueue {
    pub fn new<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for LineQueue {
    fn try_read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.lines.is_empty()
    }
}
