use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::warn;

use crate::aux_text::AuxText;
use crate::code::{standard_description, AnnotationCode, CodeTable};
use crate::error::Result;
use crate::time::{SamplingFrequency, Time};

/// One annotation: an event attached to a sample of a record
///
/// Field order follows the native annotation structure (time, type,
/// subtype, channel, annotator number, auxiliary text); see
/// [`crate::layout`] for the byte layout used at the interchange boundary.
///
/// # Equality and ordering
///
/// Two annotations are equal when they agree on time, type and annotator
/// number. Subtype, channel and auxiliary text take no part in `==` or
/// in hashing, so the same event reported with different auxiliary
/// details collapses to one key. Use [`Annotation::structural_eq`] when
/// every field must match.
///
/// `<` and `>` compare time only. Annotations at the same time that are not
/// equal are unordered (`partial_cmp` returns `None`). Sort with
/// [`Annotation::compare_by_time`], which is total on time and
/// deliberately not consistent with `==`.
///
/// # Examples
///
/// ```rust
/// use wfdbannot::{Annotation, AnnotationCode, Time};
///
/// let mut beat = Annotation::new(Time::new(100), AnnotationCode::NORMAL);
/// beat.set_aux("(N")?;
///
/// let other = Annotation::new(Time::new(100), AnnotationCode::NORMAL)
///     .with_subtype(5)
///     .with_chan(1);
///
/// assert_eq!(beat, other);
/// assert!(!beat.structural_eq(&other));
///
/// let later = Annotation::new(Time::new(200), AnnotationCode::PVC);
/// assert!(beat < later);
/// assert_eq!(beat.to_string(), "0:00.400 - N, Normal beat");
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    time: Time,
    code: AnnotationCode,
    subtype: u8,
    chan: u8,
    num: u8,
    aux: AuxText,
}

impl Annotation {
    /// Annotation with zero subtype, channel and annotator, and no aux text
    pub fn new(time: Time, code: AnnotationCode) -> Self {
        Annotation {
            time,
            code,
            ..Default::default()
        }
    }

    /// Builds an annotation from every field
    ///
    /// Fails only if `aux` is not valid auxiliary text. Codes are not range
    /// checked here; that belongs to [`CodeTable`] / [`AnnotationCode::checked`].
    pub fn from_parts(
        time: Time,
        code: AnnotationCode,
        subtype: u8,
        chan: u8,
        num: u8,
        aux: &str,
    ) -> Result<Self> {
        Ok(Annotation {
            time,
            code,
            subtype,
            chan,
            num,
            aux: AuxText::new(aux)?,
        })
    }

    pub fn with_subtype(mut self, subtype: u8) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn with_chan(mut self, chan: u8) -> Self {
        self.chan = chan;
        self
    }

    pub fn with_num(mut self, num: u8) -> Self {
        self.num = num;
        self
    }

    pub fn with_aux(mut self, aux: &str) -> Result<Self> {
        self.set_aux(aux)?;
        Ok(self)
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn set_time(&mut self, time: Time) {
        self.time = time;
    }

    /// Annotation type code
    pub fn code(&self) -> AnnotationCode {
        self.code
    }

    pub fn set_code(&mut self, code: AnnotationCode) {
        self.code = code;
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    pub fn set_subtype(&mut self, subtype: u8) {
        self.subtype = subtype;
    }

    /// Signal channel the annotation refers to
    pub fn chan(&self) -> u8 {
        self.chan
    }

    pub fn set_chan(&mut self, chan: u8) {
        self.chan = chan;
    }

    /// Annotator number
    pub fn num(&self) -> u8 {
        self.num
    }

    pub fn set_num(&mut self, num: u8) {
        self.num = num;
    }

    /// Auxiliary text, empty if none is attached
    pub fn aux(&self) -> &str {
        self.aux.as_str()
    }

    pub fn aux_text(&self) -> &AuxText {
        &self.aux
    }

    /// Replaces the auxiliary text
    ///
    /// The previous buffer is released first, on every call. An empty
    /// string leaves the annotation with no buffer at all. Text longer than
    /// 255 bytes or containing non-ASCII characters is rejected, and the
    /// annotation is then left with no auxiliary text.
    pub fn set_aux(&mut self, text: &str) -> Result<()> {
        self.aux = AuxText::empty();
        if text.is_empty() {
            return Ok(());
        }
        match AuxText::new(text) {
            Ok(aux) => {
                self.aux = aux;
                Ok(())
            }
            Err(e) => {
                warn!(time = self.time.samples(), error = %e, "rejected auxiliary text");
                Err(e)
            }
        }
    }

    /// Moves in text that was already validated
    pub(crate) fn set_aux_text(&mut self, aux: AuxText) {
        self.aux = aux;
    }

    pub fn clear_aux(&mut self) {
        self.aux = AuxText::empty();
    }

    /// Narrow equality on (time, type, annotator number), same as `==`
    pub fn equals(&self, other: &Annotation) -> bool {
        self.time == other.time && self.code == other.code && self.num == other.num
    }

    /// Equality on every field, auxiliary text included
    pub fn structural_eq(&self, other: &Annotation) -> bool {
        self.equals(other)
            && self.subtype == other.subtype
            && self.chan == other.chan
            && self.aux == other.aux
    }

    /// Total order on time alone, for sorting annotation streams
    pub fn compare_by_time(&self, other: &Annotation) -> Ordering {
        self.time.cmp(&other.time)
    }

    /// `"<time> - <mnemonic>, <description>"`
    ///
    /// Codes missing from `table` render as `[n]` with an empty description.
    pub fn to_display_string(&self, table: &CodeTable, freq: SamplingFrequency) -> String {
        format!(
            "{} - {}, {}",
            self.time.to_ms_string(freq),
            table.mnemonic(self.code),
            table.description(self.code).unwrap_or("")
        )
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Annotation {}

impl Hash for Annotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time.hash(state);
        self.code.hash(state);
        self.num.hash(state);
    }
}

impl PartialOrd for Annotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare_by_time(other) {
            Ordering::Equal if self.equals(other) => Some(Ordering::Equal),
            Ordering::Equal => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}, {}",
            self.time,
            self.code,
            standard_description(self.code).unwrap_or("")
        )
    }
}
