//! Native interchange layout for annotation records
//!
//! The native annotation structure is a sequential, fixed-size record:
//!
//! | Offset | Width         | Field                    |
//! |--------|---------------|--------------------------|
//! | 0      | 4             | time (signed samples)    |
//! | 4      | 1             | type code                |
//! | 5      | 1             | subtype                  |
//! | 6      | 1             | channel                  |
//! | 7      | 1             | annotator number         |
//! | 8      | pointer width | auxiliary text reference |
//!
//! The 8-byte prefix keeps the reference naturally aligned, so a record is
//! 12 bytes with 4-byte pointers and 16 bytes with 8-byte pointers, with no
//! padding. Pointers cannot cross a process boundary, so the reference is
//! an offset into an auxiliary pool holding length-prefixed strings. Offset
//! 0 means "no auxiliary text"; the pool's first byte is reserved for it.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::annotation::Annotation;
use crate::aux_text::AuxText;
use crate::code::AnnotationCode;
use crate::error::{AnnotationError, Result};
use crate::time::Time;

pub const TIME_OFFSET: usize = 0;
pub const TYPE_OFFSET: usize = 4;
pub const SUBTYPE_OFFSET: usize = 5;
pub const CHAN_OFFSET: usize = 6;
pub const NUM_OFFSET: usize = 7;
pub const AUX_OFFSET: usize = 8;

/// Magic bytes of a serialized annotation block
pub const BLOCK_MAGIC: &[u8; 4] = b"WFAN";
const BLOCK_VERSION: u8 = 1;
const BLOCK_HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Four,
    Eight,
}

impl PointerWidth {
    /// Pointer width of the running process
    pub fn native() -> Self {
        if std::mem::size_of::<usize>() == 8 {
            PointerWidth::Eight
        } else {
            PointerWidth::Four
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            PointerWidth::Four => 4,
            PointerWidth::Eight => 8,
        }
    }

    fn from_bytes(n: u8) -> Result<Self> {
        match n {
            4 => Ok(PointerWidth::Four),
            8 => Ok(PointerWidth::Eight),
            other => Err(AnnotationError::InvalidLayout(format!(
                "unsupported pointer width {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn tag(self) -> u8 {
        match self {
            ByteOrder::Little => 0,
            ByteOrder::Big => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ByteOrder::Little),
            1 => Ok(ByteOrder::Big),
            other => Err(AnnotationError::InvalidLayout(format!(
                "unknown byte order tag {}",
                other
            ))),
        }
    }

    fn put_u32(self, value: u32, out: &mut Vec<u8>) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_u64(self, value: u64, out: &mut Vec<u8>) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn get_u32(self, b: &[u8]) -> u32 {
        let raw = [b[0], b[1], b[2], b[3]];
        match self {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        }
    }

    fn get_u64(self, b: &[u8]) -> u64 {
        let raw = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
        match self {
            ByteOrder::Little => u64::from_le_bytes(raw),
            ByteOrder::Big => u64::from_be_bytes(raw),
        }
    }
}

/// Shape of the fixed-size records exchanged with native code
///
/// ```rust
/// use wfdbannot::layout::{ByteOrder, InterchangeLayout, PointerWidth};
/// use wfdbannot::{Annotation, AnnotationCode, Time};
///
/// let layout = InterchangeLayout::new(PointerWidth::Eight, ByteOrder::Little);
/// assert_eq!(layout.record_size(), 16);
///
/// let beat = Annotation::new(Time::new(360), AnnotationCode::NORMAL).with_aux("(N")?;
/// let encoded = layout.encode(std::slice::from_ref(&beat))?;
/// assert_eq!(encoded.len(), 1);
///
/// let decoded = encoded.decode()?;
/// assert!(decoded[0].structural_eq(&beat));
/// # Ok::<(), wfdbannot::AnnotationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterchangeLayout {
    pub pointer_width: PointerWidth,
    pub byte_order: ByteOrder,
}

impl Default for InterchangeLayout {
    fn default() -> Self {
        InterchangeLayout {
            pointer_width: PointerWidth::native(),
            byte_order: ByteOrder::Little,
        }
    }
}

impl InterchangeLayout {
    pub fn new(pointer_width: PointerWidth, byte_order: ByteOrder) -> Self {
        InterchangeLayout {
            pointer_width,
            byte_order,
        }
    }

    pub fn record_size(&self) -> usize {
        AUX_OFFSET + self.pointer_width.bytes()
    }

    /// Encodes annotations into fixed-size records plus an auxiliary pool
    pub fn encode(&self, annotations: &[Annotation]) -> Result<EncodedAnnotations> {
        let mut records = Vec::with_capacity(annotations.len() * self.record_size());
        let mut aux_pool = vec![0u8];

        for annotation in annotations {
            let aux_ref = if annotation.aux_text().is_allocated() {
                let offset = aux_pool.len() as u64;
                aux_pool.extend_from_slice(&annotation.aux_text().to_prefixed());
                offset
            } else {
                0
            };
            self.encode_record(annotation, aux_ref, &mut records)?;
        }

        debug!(
            count = annotations.len(),
            record_size = self.record_size(),
            aux_pool_len = aux_pool.len(),
            "encoded annotations"
        );

        Ok(EncodedAnnotations {
            layout: *self,
            records,
            aux_pool,
        })
    }

    /// Appends one record with the given auxiliary reference
    pub fn encode_record(&self, annotation: &Annotation, aux_ref: u64, out: &mut Vec<u8>) -> Result<()> {
        self.byte_order
            .put_u32(annotation.time().samples() as u32, out);
        out.push(annotation.code().value());
        out.push(annotation.subtype());
        out.push(annotation.chan());
        out.push(annotation.num());

        match self.pointer_width {
            PointerWidth::Four => {
                let aux_ref = u32::try_from(aux_ref).map_err(|_| {
                    AnnotationError::InvalidLayout(format!(
                        "auxiliary offset {} exceeds a 4-byte reference",
                        aux_ref
                    ))
                })?;
                self.byte_order.put_u32(aux_ref, out);
            }
            PointerWidth::Eight => self.byte_order.put_u64(aux_ref, out),
        }
        Ok(())
    }

    /// Decodes a single record, returning its fields and auxiliary reference
    ///
    /// `record` must be exactly [`InterchangeLayout::record_size`] bytes.
    pub fn decode_record(&self, record: &[u8]) -> Result<(Annotation, u64)> {
        if record.len() != self.record_size() {
            return Err(AnnotationError::InvalidLayout(format!(
                "record is {} bytes, expected {}",
                record.len(),
                self.record_size()
            )));
        }

        let time = Time::new(self.byte_order.get_u32(&record[TIME_OFFSET..]) as i32);
        let annotation = Annotation::new(time, AnnotationCode::new(record[TYPE_OFFSET]))
            .with_subtype(record[SUBTYPE_OFFSET])
            .with_chan(record[CHAN_OFFSET])
            .with_num(record[NUM_OFFSET]);

        let aux_ref = match self.pointer_width {
            PointerWidth::Four => self.byte_order.get_u32(&record[AUX_OFFSET..]) as u64,
            PointerWidth::Eight => self.byte_order.get_u64(&record[AUX_OFFSET..]),
        };
        Ok((annotation, aux_ref))
    }
}

/// Encoded annotation records and the auxiliary pool they reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnnotations {
    pub layout: InterchangeLayout,
    pub records: Vec<u8>,
    pub aux_pool: Vec<u8>,
}

impl EncodedAnnotations {
    /// Number of whole records
    pub fn len(&self) -> usize {
        self.records.len() / self.layout.record_size()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decodes every record, validating each auxiliary reference against the pool
    pub fn decode(&self) -> Result<Vec<Annotation>> {
        let size = self.layout.record_size();
        if self.records.len() % size != 0 {
            return Err(AnnotationError::InvalidLayout(format!(
                "{} record bytes is not a multiple of the {}-byte record size",
                self.records.len(),
                size
            )));
        }

        let mut annotations = Vec::with_capacity(self.len());
        for record in self.records.chunks_exact(size) {
            let (mut annotation, aux_ref) = self.layout.decode_record(record)?;
            if aux_ref != 0 {
                annotation.set_aux_text(self.aux_at(aux_ref)?);
            }
            annotations.push(annotation);
        }

        debug!(count = annotations.len(), "decoded annotations");
        Ok(annotations)
    }

    fn aux_at(&self, aux_ref: u64) -> Result<AuxText> {
        let offset = usize::try_from(aux_ref).unwrap_or(usize::MAX);
        if offset >= self.aux_pool.len() {
            warn!(offset = aux_ref, pool_len = self.aux_pool.len(), "auxiliary reference outside pool");
            return Err(AnnotationError::InvalidLayout(format!(
                "auxiliary reference {} outside {}-byte pool",
                aux_ref,
                self.aux_pool.len()
            )));
        }
        let (aux, _) = AuxText::from_prefixed(&self.aux_pool[offset..])?;
        Ok(aux)
    }

    /// Writes a self-describing block: header, records, then the pool
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let order = self.layout.byte_order;
        let count = u32::try_from(self.len())
            .map_err(|_| AnnotationError::InvalidLayout("too many records".to_string()))?;
        let pool_len = u32::try_from(self.aux_pool.len())
            .map_err(|_| AnnotationError::InvalidLayout("auxiliary pool too large".to_string()))?;

        let mut header = Vec::with_capacity(BLOCK_HEADER_SIZE);
        header.extend_from_slice(BLOCK_MAGIC);
        header.push(BLOCK_VERSION);
        header.push(self.layout.pointer_width.bytes() as u8);
        header.push(order.tag());
        header.push(0); // 保留字节
        order.put_u32(count, &mut header);
        order.put_u32(pool_len, &mut header);

        writer.write_all(&header)?;
        writer.write_all(&self.records)?;
        writer.write_all(&self.aux_pool)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a block written by [`EncodedAnnotations::write_to`]
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut header = [0u8; BLOCK_HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != BLOCK_MAGIC {
            return Err(AnnotationError::InvalidLayout(format!(
                "bad magic {:?}",
                &header[0..4]
            )));
        }
        if header[4] != BLOCK_VERSION {
            return Err(AnnotationError::InvalidLayout(format!(
                "unsupported block version {}",
                header[4]
            )));
        }
        let pointer_width = PointerWidth::from_bytes(header[5])?;
        let byte_order = ByteOrder::from_tag(header[6])?;
        let layout = InterchangeLayout::new(pointer_width, byte_order);

        let count = byte_order.get_u32(&header[8..12]) as usize;
        let pool_len = byte_order.get_u32(&header[12..16]) as usize;

        let records_len = count
            .checked_mul(layout.record_size())
            .ok_or_else(|| AnnotationError::InvalidLayout(format!("record count {} too large", count)))?;
        let records = read_exactly(&mut reader, records_len)?;
        let aux_pool = read_exactly(&mut reader, pool_len)?;

        Ok(EncodedAnnotations {
            layout,
            records,
            aux_pool,
        })
    }
}

// 长度来自不可信的头部，按实际读到的数据增长缓冲区，不预先分配
fn read_exactly<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(AnnotationError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", len, buf.len()),
        )));
    }
    Ok(buf)
}
