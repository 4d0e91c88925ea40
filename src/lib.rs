//! # WFDB Annotation Records for Rust
//!
//! Annotation records as used by the WFDB library for annotated physiological
//! waveforms: an event (a beat label, a rhythm change, a comment) attached to
//! a sample of a record, with an optional short auxiliary text.
//!
//! ## Quick Start
//!
//! ### Building annotations
//!
//! ```rust
//! use wfdbannot::{Annotation, AnnotationCode, Result, Time};
//!
//! fn main() -> Result<()> {
//!     let mut rhythm = Annotation::new(Time::new(0), AnnotationCode::RHYTHM);
//!     rhythm.set_aux("(N")?;
//!
//!     let beat = Annotation::new(Time::new(250), AnnotationCode::NORMAL).with_chan(0);
//!
//!     println!("{}", rhythm);   // 0:00.000 - +, Rhythm change
//!     println!("{}", beat);     // 0:01.000 - N, Normal beat
//!     assert!(rhythm < beat);
//!     Ok(())
//! }
//! ```
//!
//! ### Auxiliary text
//!
//! Auxiliary text is ASCII and at most 255 bytes, the limit of the native
//! length-prefixed encoding. Writes outside those limits fail and leave the
//! annotation with no auxiliary text:
//!
//! ```rust
//! use wfdbannot::{Annotation, AnnotationError};
//!
//! let mut note = Annotation::default();
//! note.set_aux("lead off")?;
//!
//! let too_long = "x".repeat(256);
//! assert!(matches!(
//!     note.set_aux(&too_long),
//!     Err(AnnotationError::OversizeText { len: 256 })
//! ));
//! assert_eq!(note.aux(), "");
//! # Ok::<(), AnnotationError>(())
//! ```
//!
//! ### Sorting and deduplicating streams
//!
//! `==` compares time, type and annotator number only, while ordering looks at
//! time alone. Sort with [`Annotation::compare_by_time`] (or
//! [`stream::sort_by_time`]) and deduplicate with [`stream::dedup_events`]:
//!
//! ```rust
//! use wfdbannot::{stream, Annotation, AnnotationCode, Time};
//!
//! let mut anns = vec![
//!     Annotation::new(Time::new(500), AnnotationCode::PVC),
//!     Annotation::new(Time::new(250), AnnotationCode::NORMAL).with_num(1),
//!     Annotation::new(Time::new(250), AnnotationCode::NORMAL).with_num(1).with_chan(2),
//! ];
//! stream::sort_by_time(&mut anns);
//! stream::dedup_events(&mut anns);
//! assert_eq!(anns.len(), 2);
//! assert!(stream::is_time_ordered(&anns));
//! ```
//!
//! ### Native interchange
//!
//! [`layout::InterchangeLayout`] encodes annotations into the fixed-size
//! record shape of the native structure, with auxiliary text moved into a
//! pool of length-prefixed strings.

pub mod error;
pub mod utils;
pub mod time;
pub mod code;
pub mod aux_text;
pub mod annotation;
pub mod layout;
pub mod stream;

// Re-export main types for convenience
pub use error::{AnnotationError, Result};
pub use time::{SamplingFrequency, Time};
pub use code::{AnnotationCode, CodeTable};
pub use aux_text::AuxText;
pub use annotation::Annotation;
pub use layout::{ByteOrder, EncodedAnnotations, InterchangeLayout, PointerWidth};

// Important constants
pub const AUX_MAX_LEN: usize = 255; // one length byte
pub const ACMAX: u8 = 49;
pub const DEFAULT_FREQUENCY: f64 = 250.0; // Hz

/// Library version
///
/// ```rust
/// let version = wfdbannot::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_aux_limit_matches_length_byte() {
        assert_eq!(AUX_MAX_LEN, u8::MAX as usize);
    }
}
