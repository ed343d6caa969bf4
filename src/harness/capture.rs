//! Captured console output
//!
//! Guest output is uncontrolled bytes, so decoding is always permissive:
//! invalid sequences become U+FFFD instead of failing the capture.

/// Append-only accumulation of raw console bytes
#[derive(Debug, Default)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes read from the console
    pub fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Number of raw bytes captured so far
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Permissively decoded view of the full capture
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Bounded trailing window of the decoded text, at most `max_chars`
    /// characters
    pub fn tail(&self, max_chars: usize) -> String {
        let text = self.text();
        let total = text.chars().count();
        if total <= max_chars {
            text
        } else {
            text.chars().skip(total - max_chars).collect()
        }
    }
}
