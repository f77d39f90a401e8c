//! Server-sent-events line framing.
//!
//! Streamed bodies arrive in arbitrary chunks. [`LineFramer`] reassembles
//! them into lines; [`classify_line`] decides whether a line is a `data: `
//! frame. Decoding the frame payload is the dispatcher's job.

use memchr::memchr;

/// Literal prefix that marks a frame line.
pub const FRAME_PREFIX: &[u8] = b"data: ";

/// What a single body line turned out to be.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// A `data: ` line; holds the payload after the prefix.
    Frame(&'a [u8]),
    /// Empty line (SSE event separator).
    Blank,
    /// Anything else: comments, `event:` fields, keep-alives.
    Other(&'a [u8]),
}

/// Classify one line (without its terminator).
pub fn classify_line(line: &[u8]) -> Line<'_> {
    if line.is_empty() {
        Line::Blank
    } else if let Some(payload) = line.strip_prefix(FRAME_PREFIX) {
        Line::Frame(payload)
    } else {
        Line::Other(line)
    }
}

/// Longest unterminated line a [`LineFramer`] holds before the stream is
/// treated as malformed.
pub const MAX_LINE_LEN: usize = 1 << 20;

/// Reassembles newline-terminated lines from a chunked byte stream.
///
/// Lines are yielded in arrival order with `\n` or `\r\n` removed. Consumed
/// bytes stay in the buffer until the next [`push`](Self::push), which drops
/// them in one move.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Start of the unconsumed bytes.
    start: usize,
    /// Everything before this index is known to hold no newline.
    scanned: usize,
    max_line: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_LEN)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            start: 0,
            scanned: 0,
            max_line,
        }
    }

    pub fn max_line(&self) -> usize {
        self.max_line
    }

    /// Append a chunk as received from the network.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete line, if the buffer holds one.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let Some(offset) = memchr(b'\n', &self.buffer[self.scanned..]) else {
            self.scanned = self.buffer.len();
            return None;
        };
        let newline_pos = self.scanned + offset;
        let line = strip_cr(&self.buffer[self.start..newline_pos]).to_vec();
        self.start = newline_pos + 1;
        self.scanned = self.start;
        Some(line)
    }

    /// True once the unterminated tail is longer than the line limit.
    pub fn overflowed(&self) -> bool {
        self.buffer.len() - self.start > self.max_line
    }

    /// Flush a trailing line left without a terminator when the body ends.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let line = (self.start < self.buffer.len())
            .then(|| strip_cr(&self.buffer[self.start..]).to_vec());
        self.buffer.clear();
        self.start = 0;
        self.scanned = 0;
        line
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
