use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Auxiliary text is {len} bytes long (max {max})", max = crate::AUX_MAX_LEN)]
    OversizeText { len: usize },

    #[error("Auxiliary text contains a non-ASCII byte at position {position}")]
    NonAsciiText { position: usize },

    #[error("Corrupt auxiliary buffer: length byte says {stated} bytes, {available} available")]
    CorruptBuffer { stated: usize, available: usize },

    #[error("Annotation code {0} out of range")]
    InvalidCode(u8),

    #[error("Invalid annotation mnemonic: {0:?}")]
    InvalidMnemonic(String),

    #[error("Invalid sampling frequency: {0}")]
    InvalidFrequency(f64),

    #[error("Invalid time string: {0:?}")]
    InvalidTimeString(String),

    #[error("Time {0} does not fit in a sample counter")]
    TimeOutOfRange(i64),

    #[error("Invalid interchange layout: {0}")]
    InvalidLayout(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
