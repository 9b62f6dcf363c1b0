//! Pattern buffer with tail-search optimization.
//!
//! Prompt patterns are only searched for in the last N bytes of the
//! buffer rather than the entire output. A full running-config can be
//! hundreds of kilobytes; the prompt is always at the end.

use regex::bytes::Regex;

/// Buffer for accumulating output and searching for a trailing prompt.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Find a match of `pattern` that terminates the buffer.
    ///
    /// Only the tail is searched. A match counts only when nothing but
    /// whitespace follows it, so a config line that happens to end in
    /// `#` or `>` earlier in the tail is not taken for the prompt.
    /// Returns the absolute `(start, end)` byte offsets of the match.
    pub fn find_trailing(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let offset = self.buffer.len().saturating_sub(self.search_depth);
        let tail = &self.buffer[offset..];
        let m = pattern.find_iter(tail).last()?;

        if tail[m.end()..].iter().all(u8::is_ascii_whitespace) {
            Some((offset + m.start(), offset + m.end()))
        } else {
            None
        }
    }

    /// Check if the buffer ends with a match of `pattern`.
    pub fn ends_with_match(&self, pattern: &Regex) -> bool {
        self.find_trailing(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
