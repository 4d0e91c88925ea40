use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{AnnotationError, Result};
use crate::ACMAX;

/// Annotation type code
///
/// Valid codes run from 1 to [`ACMAX`]; 0 (`NOTQRS`) marks a non-annotation.
/// No range check happens on construction, see [`AnnotationCode::checked`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationCode(u8);

impl AnnotationCode {
    pub const NOTQRS: AnnotationCode = AnnotationCode(0);
    pub const NORMAL: AnnotationCode = AnnotationCode(1);
    pub const LBBB: AnnotationCode = AnnotationCode(2);
    pub const RBBB: AnnotationCode = AnnotationCode(3);
    pub const ABERR: AnnotationCode = AnnotationCode(4);
    pub const PVC: AnnotationCode = AnnotationCode(5);
    pub const FUSION: AnnotationCode = AnnotationCode(6);
    pub const NPC: AnnotationCode = AnnotationCode(7);
    pub const APC: AnnotationCode = AnnotationCode(8);
    pub const SVPB: AnnotationCode = AnnotationCode(9);
    pub const VESC: AnnotationCode = AnnotationCode(10);
    pub const NESC: AnnotationCode = AnnotationCode(11);
    pub const PACE: AnnotationCode = AnnotationCode(12);
    pub const UNKNOWN: AnnotationCode = AnnotationCode(13);
    pub const NOISE: AnnotationCode = AnnotationCode(14);
    pub const ARFCT: AnnotationCode = AnnotationCode(16);
    pub const STCH: AnnotationCode = AnnotationCode(18);
    pub const TCH: AnnotationCode = AnnotationCode(19);
    pub const SYSTOLE: AnnotationCode = AnnotationCode(20);
    pub const DIASTOLE: AnnotationCode = AnnotationCode(21);
    pub const NOTE: AnnotationCode = AnnotationCode(22);
    pub const MEASURE: AnnotationCode = AnnotationCode(23);
    pub const PWAVE: AnnotationCode = AnnotationCode(24);
    pub const BBB: AnnotationCode = AnnotationCode(25);
    pub const PACESP: AnnotationCode = AnnotationCode(26);
    pub const TWAVE: AnnotationCode = AnnotationCode(27);
    pub const RHYTHM: AnnotationCode = AnnotationCode(28);
    pub const UWAVE: AnnotationCode = AnnotationCode(29);
    pub const LEARN: AnnotationCode = AnnotationCode(30);
    pub const FLWAV: AnnotationCode = AnnotationCode(31);
    pub const VFON: AnnotationCode = AnnotationCode(32);
    pub const VFOFF: AnnotationCode = AnnotationCode(33);
    pub const AESC: AnnotationCode = AnnotationCode(34);
    pub const SVESC: AnnotationCode = AnnotationCode(35);
    pub const LINK: AnnotationCode = AnnotationCode(36);
    pub const NAPC: AnnotationCode = AnnotationCode(37);
    pub const PFUS: AnnotationCode = AnnotationCode(38);
    pub const WFON: AnnotationCode = AnnotationCode(39);
    pub const WFOFF: AnnotationCode = AnnotationCode(40);
    pub const RONT: AnnotationCode = AnnotationCode(41);

    pub const fn new(value: u8) -> Self {
        AnnotationCode(value)
    }

    /// Like [`AnnotationCode::new`] but rejects codes outside 1..=ACMAX
    pub fn checked(value: u8) -> Result<Self> {
        let code = AnnotationCode(value);
        if code.is_valid() {
            Ok(code)
        } else {
            Err(AnnotationError::InvalidCode(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 >= 1 && self.0 <= ACMAX
    }
}

impl From<u8> for AnnotationCode {
    fn from(value: u8) -> Self {
        AnnotationCode(value)
    }
}

impl From<AnnotationCode> for u8 {
    fn from(code: AnnotationCode) -> Self {
        code.0
    }
}

impl fmt::Display for AnnotationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match standard_entry(*self) {
            Some((mnemonic, _)) => f.write_str(mnemonic),
            None => write!(f, "[{}]", self.0),
        }
    }
}

fn standard_entry(code: AnnotationCode) -> Option<(&'static str, &'static str)> {
    STANDARD_CODES
        .iter()
        .find(|(value, _, _)| *value == code.0)
        .map(|&(_, mnemonic, description)| (mnemonic, description))
}

/// Description from the standard table, without building a [`CodeTable`]
pub(crate) fn standard_description(code: AnnotationCode) -> Option<&'static str> {
    standard_entry(code).map(|(_, description)| description)
}

/// Standard WFDB code table: (code, mnemonic, description)
const STANDARD_CODES: &[(u8, &str, &str)] = &[
    (1, "N", "Normal beat"),
    (2, "L", "Left bundle branch block beat"),
    (3, "R", "Right bundle branch block beat"),
    (4, "a", "Aberrated atrial premature beat"),
    (5, "V", "Premature ventricular contraction"),
    (6, "F", "Fusion of ventricular and normal beat"),
    (7, "J", "Nodal (junctional) premature beat"),
    (8, "A", "Atrial premature beat"),
    (9, "S", "Premature or ectopic supraventricular beat"),
    (10, "E", "Ventricular escape beat"),
    (11, "j", "Nodal (junctional) escape beat"),
    (12, "/", "Paced beat"),
    (13, "Q", "Unclassifiable beat"),
    (14, "~", "Change in signal quality"),
    (16, "|", "Isolated QRS-like artifact"),
    (18, "s", "ST change"),
    (19, "T", "T-wave change"),
    (20, "*", "Systole"),
    (21, "D", "Diastole"),
    (22, "\"", "Comment annotation"),
    (23, "=", "Measurement annotation"),
    (24, "p", "P-wave peak"),
    (25, "B", "Left or right bundle branch block"),
    (26, "^", "Non-conducted pacer spike"),
    (27, "t", "T-wave peak"),
    (28, "+", "Rhythm change"),
    (29, "u", "U-wave peak"),
    (30, "?", "Learning"),
    (31, "!", "Ventricular flutter wave"),
    (32, "[", "Start of ventricular flutter/fibrillation"),
    (33, "]", "End of ventricular flutter/fibrillation"),
    (34, "e", "Atrial escape beat"),
    (35, "n", "Supraventricular escape beat"),
    (36, "@", "Link to external data (aux contains URL)"),
    (37, "x", "Non-conducted P-wave (blocked APB)"),
    (38, "f", "Fusion of paced and normal beat"),
    (39, "(", "Waveform onset"),
    (40, ")", "Waveform end"),
    (41, "r", "R-on-T premature ventricular contraction"),
];

#[derive(Debug, Clone, PartialEq)]
struct CodeEntry {
    mnemonic: String,
    description: String,
}

/// Mnemonic and description lookup for annotation codes
///
/// Starts from the standard WFDB table. Individual codes can be redefined
/// or added, for example when an annotation file carries its own
/// definitions for codes the standard table leaves unused.
///
/// ```rust
/// use wfdbannot::{AnnotationCode, CodeTable};
///
/// let mut table = CodeTable::standard();
/// assert_eq!(table.mnemonic(AnnotationCode::NORMAL), "N");
/// assert_eq!(table.description(AnnotationCode::NORMAL), Some("Normal beat"));
///
/// table.define(AnnotationCode::new(42), "X", "Custom event")?;
/// assert_eq!(table.lookup("X"), Some(AnnotationCode::new(42)));
/// assert_eq!(table.mnemonic(AnnotationCode::new(43)), "[43]");
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CodeTable {
    entries: HashMap<u8, CodeEntry>,
}

impl CodeTable {
    /// Table with no codes defined
    pub fn empty() -> Self {
        CodeTable {
            entries: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        let entries = STANDARD_CODES
            .iter()
            .map(|&(code, mnemonic, description)| {
                (
                    code,
                    CodeEntry {
                        mnemonic: mnemonic.to_string(),
                        description: description.to_string(),
                    },
                )
            })
            .collect();
        CodeTable { entries }
    }

    /// Defines or redefines a code
    ///
    /// The mnemonic must be non-empty printable ASCII without whitespace so
    /// it can round-trip through text listings.
    pub fn define(&mut self, code: AnnotationCode, mnemonic: &str, description: &str) -> Result<()> {
        if !code.is_valid() {
            return Err(AnnotationError::InvalidCode(code.value()));
        }
        if mnemonic.is_empty() || !mnemonic.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(AnnotationError::InvalidMnemonic(mnemonic.to_string()));
        }

        debug!(code = code.value(), mnemonic, description, "defining annotation code");
        self.entries.insert(
            code.value(),
            CodeEntry {
                mnemonic: mnemonic.to_string(),
                description: description.to_string(),
            },
        );
        Ok(())
    }

    /// Mnemonic for `code`, or `[n]` if the code is undefined
    pub fn mnemonic(&self, code: AnnotationCode) -> Cow<'_, str> {
        match self.entries.get(&code.value()) {
            Some(entry) => Cow::Borrowed(entry.mnemonic.as_str()),
            None => Cow::Owned(format!("[{}]", code.value())),
        }
    }

    pub fn description(&self, code: AnnotationCode) -> Option<&str> {
        self.entries
            .get(&code.value())
            .map(|entry| entry.description.as_str())
    }

    /// Reverse lookup from mnemonic; lowest code wins if several share one
    pub fn lookup(&self, mnemonic: &str) -> Option<AnnotationCode> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.mnemonic == mnemonic)
            .map(|(&code, _)| AnnotationCode(code))
            .min()
    }

    pub fn is_defined(&self, code: AnnotationCode) -> bool {
        self.entries.contains_key(&code.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::standard()
    }
}
