use std::fmt;

use tracing::warn;

use crate::error::{AnnotationError, Result};
use crate::AUX_MAX_LEN;

/// Auxiliary text attached to an annotation
///
/// Holds at most one heap buffer, and none at all when the text is empty.
/// The text is ASCII and at most [`AUX_MAX_LEN`] bytes so that it always
/// fits the native length-prefixed form: one length byte followed by that
/// many bytes, with no terminator.
///
/// # Examples
///
/// ```rust
/// use wfdbannot::AuxText;
///
/// let aux = AuxText::new("(AFIB")?;
/// assert_eq!(aux.as_str(), "(AFIB");
/// assert_eq!(aux.to_prefixed(), b"\x05(AFIB");
///
/// let empty = AuxText::new("")?;
/// assert!(!empty.is_allocated());
///
/// assert!(AuxText::new(&"x".repeat(256)).is_err());
/// assert!(AuxText::new("µV").is_err());
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AuxText(Option<Box<str>>);

impl AuxText {
    pub const fn empty() -> Self {
        AuxText(None)
    }

    pub fn new(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(AuxText(None));
        }
        validate(text.as_bytes())?;
        Ok(AuxText(Some(Box::from(text))))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Whether a heap buffer is currently owned
    pub fn is_allocated(&self) -> bool {
        self.0.is_some()
    }

    /// Length-prefixed form, empty text encodes as a single zero byte
    pub fn to_prefixed(&self) -> Vec<u8> {
        let text = self.as_str();
        let mut out = Vec::with_capacity(text.len() + 1);
        // AuxText::new 已保证长度不超过 AUX_MAX_LEN
        out.push(text.len() as u8);
        out.extend_from_slice(text.as_bytes());
        out
    }

    /// Decodes a length-prefixed buffer
    ///
    /// Returns the text and the number of bytes consumed. The length byte is
    /// checked against the bytes actually available before anything is
    /// copied, so a foreign buffer cannot cause an out-of-bounds read.
    pub fn from_prefixed(buf: &[u8]) -> Result<(Self, usize)> {
        let (&len, rest) = buf.split_first().ok_or(AnnotationError::CorruptBuffer {
            stated: 1,
            available: 0,
        })?;
        let len = len as usize;
        if len > rest.len() {
            warn!(stated = len, available = rest.len(), "auxiliary buffer shorter than its length byte");
            return Err(AnnotationError::CorruptBuffer {
                stated: len,
                available: rest.len(),
            });
        }

        let payload = &rest[..len];
        validate(payload)?;
        let text = std::str::from_utf8(payload).map_err(|e| AnnotationError::NonAsciiText {
            position: e.valid_up_to(),
        })?;
        Ok((AuxText::new(text)?, len + 1))
    }
}

impl fmt::Display for AuxText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuxText {
    type Error = AnnotationError;

    fn try_from(text: &str) -> Result<Self> {
        AuxText::new(text)
    }
}

/// ASCII only, at most one length byte worth of data
fn validate(bytes: &[u8]) -> Result<()> {
    if bytes.len() > AUX_MAX_LEN {
        return Err(AnnotationError::OversizeText { len: bytes.len() });
    }
    if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(AnnotationError::NonAsciiText { position });
    }
    Ok(())
}
