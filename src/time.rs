use std::fmt;

use chrono::{Duration, NaiveDateTime};

use crate::error::{AnnotationError, Result};
use crate::utils::{parse_clock_seconds, parse_sample_form};
use crate::DEFAULT_FREQUENCY;

/// Sampling frequency of a record, in Hz
///
/// Always positive and finite. Converting between sample counts and
/// elapsed time goes through this value.
///
/// ```rust
/// use wfdbannot::SamplingFrequency;
///
/// let freq = SamplingFrequency::new(360.0)?;
/// assert_eq!(freq.hz(), 360.0);
/// assert!(SamplingFrequency::new(0.0).is_err());
/// assert_eq!(SamplingFrequency::default().hz(), 250.0);
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingFrequency(f64);

impl SamplingFrequency {
    pub fn new(hz: f64) -> Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(AnnotationError::InvalidFrequency(hz));
        }
        Ok(SamplingFrequency(hz))
    }

    pub fn hz(self) -> f64 {
        self.0
    }
}

impl Default for SamplingFrequency {
    fn default() -> Self {
        SamplingFrequency(DEFAULT_FREQUENCY)
    }
}

/// Annotation time, in sample intervals from the beginning of the record
///
/// Stored in 32 bits to match the native annotation structure. Times are
/// totally ordered by sample count.
///
/// # Examples
///
/// ```rust
/// use wfdbannot::{SamplingFrequency, Time};
///
/// let freq = SamplingFrequency::new(360.0)?;
/// let t = Time::from_seconds(61.5, freq)?;
/// assert_eq!(t.samples(), 22_140);
/// assert_eq!(t.to_ms_string(freq), "1:01.500");
/// assert_eq!(Time::parse("1:01.5", freq)?, t);
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i32);

impl Time {
    pub const ZERO: Time = Time(0);

    pub const fn new(samples: i32) -> Self {
        Time(samples)
    }

    pub const fn samples(self) -> i32 {
        self.0
    }

    /// Converts an elapsed time in seconds to the nearest sample
    pub fn from_seconds(seconds: f64, freq: SamplingFrequency) -> Result<Self> {
        let samples = (seconds * freq.hz()).round();
        if !samples.is_finite() || samples < i32::MIN as f64 || samples > i32::MAX as f64 {
            return Err(AnnotationError::TimeOutOfRange(samples as i64));
        }
        Ok(Time(samples as i32))
    }

    pub fn to_seconds(self, freq: SamplingFrequency) -> f64 {
        self.0 as f64 / freq.hz()
    }

    /// Formats the elapsed time with millisecond precision
    ///
    /// `m:ss.mmm` below one hour, `h:mm:ss.mmm` from one hour on. Negative
    /// times carry a leading `-`.
    pub fn to_ms_string(self, freq: SamplingFrequency) -> String {
        let total_ms = (self.0 as f64 * 1000.0 / freq.hz()).round() as i64;
        let sign = if total_ms < 0 { "-" } else { "" };
        let total_ms = total_ms.unsigned_abs();

        let ms = total_ms % 1000;
        let total_secs = total_ms / 1000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;

        if hours > 0 {
            format!("{sign}{hours}:{mins:02}:{secs:02}.{ms:03}")
        } else {
            format!("{sign}{mins}:{secs:02}.{ms:03}")
        }
    }

    /// Parses `[h:]m:ss[.fff]`, bare seconds, or `sNNN` (an explicit sample number)
    pub fn parse(text: &str, freq: SamplingFrequency) -> Result<Self> {
        if let Some(samples) = parse_sample_form(text) {
            return i32::try_from(samples)
                .map(Time)
                .map_err(|_| AnnotationError::TimeOutOfRange(samples));
        }
        let seconds = parse_clock_seconds(text)?;
        Self::from_seconds(seconds, freq)
    }

    /// Wall-clock time of this sample given the recording start
    pub fn to_datetime(self, start: NaiveDateTime, freq: SamplingFrequency) -> Result<NaiveDateTime> {
        let out_of_range = || AnnotationError::TimeOutOfRange(self.0 as i64);

        // 极小的采样频率会让偏移量超出 i64
        let offset_ms = (self.0 as f64 * 1000.0 / freq.hz()).round();
        if !offset_ms.is_finite() || offset_ms <= i64::MIN as f64 || offset_ms >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        let offset = Duration::try_milliseconds(offset_ms as i64).ok_or_else(out_of_range)?;
        start.checked_add_signed(offset).ok_or_else(out_of_range)
    }
}

impl From<i32> for Time {
    fn from(samples: i32) -> Self {
        Time(samples)
    }
}

impl From<Time> for i32 {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ms_string(SamplingFrequency::default()))
    }
}
