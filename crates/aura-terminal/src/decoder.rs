//! Incremental UTF-8 decoding
//!
//! PTY reads can split a multi-byte sequence anywhere, so the decoder
//! carries the partial tail between calls. Malformed input becomes U+FFFD
//! instead of an error; the display pipeline never fails on bad bytes.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: [u8; 4],
    len: usize,
    expected: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, appending completed scalars to `out`.
    pub fn feed(&mut self, bytes: &[u8], out: &mut String) {
        for &byte in bytes {
            self.step(byte, out);
        }
    }

    /// Emit a replacement character for a dangling partial sequence. Only
    /// meaningful at end of stream.
    pub fn flush(&mut self, out: &mut String) {
        if self.expected > 0 {
            out.push(REPLACEMENT);
            self.len = 0;
            self.expected = 0;
        }
    }

    fn step(&mut self, byte: u8, out: &mut String) {
        if self.expected == 0 {
            match byte {
                0x00..=0x7F => out.push(byte as char),
                0xC2..=0xDF => self.begin(byte, 2),
                0xE0..=0xEF => self.begin(byte, 3),
                0xF0..=0xF4 => self.begin(byte, 4),
                // Stray continuation byte or invalid lead (0x80-0xC1, 0xF5-0xFF).
                _ => out.push(REPLACEMENT),
            }
        } else if byte & 0xC0 == 0x80 {
            self.pending[self.len] = byte;
            self.len += 1;
            if self.len == self.expected {
                match std::str::from_utf8(&self.pending[..self.len]) {
                    Ok(s) => out.push_str(s),
                    // Overlong or surrogate encoding.
                    Err(_) => out.push(REPLACEMENT),
                }
                self.len = 0;
                self.expected = 0;
            }
        } else {
            // Interrupted sequence: replace it and resynchronize on this byte.
            out.push(REPLACEMENT);
            self.len = 0;
            self.expected = 0;
            self.step(byte, out);
        }
    }

    fn begin(&mut self, byte: u8, expected: usize) {
        self.pending[0] = byte;
        self.len = 1;
        self.expected = expected;
    }
}
