//! Fixed-capacity text labels.

use std::fmt;

/// Capacity of a label buffer in bytes, including the reserved terminator slot.
pub const MAX_LABEL_LEN: usize = 1024;

/// A name stored in a fixed-size buffer with an explicit length.
///
/// Only `data[..length]` is meaningful. Bytes past the length are left over
/// from whatever was written before and must never be read as text.
#[derive(Clone)]
pub struct Label {
    length: usize,
    data: [u8; MAX_LABEL_LEN],
}

impl Label {
    /// Create a label, truncating at a char boundary to fit the buffer.
    pub fn new(text: &str) -> Self {
        let mut label = Self::default();
        label.set(text);
        label
    }

    /// Overwrite the label contents. The tail of the old contents stays in the
    /// buffer but falls outside the new length.
    pub fn set(&mut self, text: &str) {
        let mut end = text.len().min(MAX_LABEL_LEN - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.data[..end].copy_from_slice(&text.as_bytes()[..end]);
        self.length = end;
    }

    /// Declared length in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The meaningful bytes of the label.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// The label as text. Labels are always built from `&str`, so this only
    /// falls back to lossy decoding for buffers filled by hand.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl Default for Label {
    fn default() -> Self {
        Self {
            length: 0,
            data: [0; MAX_LABEL_LEN],
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Label {}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}
