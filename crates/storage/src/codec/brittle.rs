//! Brittle field codec
//!
//! Encodes the fixed-arity, statically typed field tuples carried by
//! structured semantic versions.
//!
//! # Format
//!
//! ```text
//! ┌──────────────────┬──────────────┬──────────────┬─────┐
//! │ Arity (u16 LE)   │ Field 0      │ Field 1      │ ... │
//! └──────────────────┴──────────────┴──────────────┴─────┘
//!
//! NID / INTEGER / FLOAT   4 bytes LE
//! LONG / INSTANT          8 bytes LE
//! BOOLEAN                 1 byte (0 or 1)
//! UUID                    16 bytes
//! STRING / BYTES          u32 LE length + bytes
//! ```
//!
//! Fields carry no type tags: the schema declared for the assemblage is the
//! only source of truth for how to read them. The arity header lets a decode
//! against the wrong schema fail loudly instead of misreading bytes.
//!
//! An arity mismatch on encode or decode means the assemblage definition and
//! its data disagree. It is returned as `ArityMismatch` and logged at error
//! level; nothing attempts a repair.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chronicle_core::{Error, FieldType, FieldValue, Nid, Result};
use std::io::{Cursor, Read};
use std::sync::Arc;
use uuid::Uuid;

/// Ordered field-type declaration of an assemblage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSchema {
    types: Vec<FieldType>,
}

impl FieldSchema {
    /// Create a schema from its ordered field types
    pub fn new(types: Vec<FieldType>) -> Self {
        Self { types }
    }

    /// Number of fields
    #[inline]
    pub fn arity(&self) -> usize {
        self.types.len()
    }

    /// Declared field types, in order
    pub fn types(&self) -> &[FieldType] {
        &self.types
    }

    /// Declared type of one position
    pub fn field_type(&self, index: usize) -> Option<FieldType> {
        self.types.get(index).copied()
    }

    /// Positions declared as NID
    pub fn nid_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == FieldType::Nid)
            .map(|(i, _)| i)
    }
}

fn arity_mismatch(declared: usize, actual: usize) -> Error {
    tracing::error!(declared, actual, "brittle field arity mismatch");
    Error::ArityMismatch { declared, actual }
}

fn truncated(e: std::io::Error) -> Error {
    Error::Corruption(format!("truncated brittle field tuple: {}", e))
}

/// Encode values against a schema
///
/// # Errors
///
/// - `ArityMismatch` if `values.len() != schema.arity()`
/// - `FieldTypeMismatch` if a value does not satisfy its declared type
pub fn encode(schema: &FieldSchema, values: &[FieldValue]) -> Result<Vec<u8>> {
    Ok(encode_with_offsets(schema, values)?.0)
}

fn encode_with_offsets(schema: &FieldSchema, values: &[FieldValue]) -> Result<(Vec<u8>, Vec<u32>)> {
    if schema.arity() != values.len() {
        return Err(arity_mismatch(schema.arity(), values.len()));
    }
    let arity = u16::try_from(values.len())
        .map_err(|_| Error::InvalidOperation(format!("{} fields exceed u16", values.len())))?;

    let mut bytes = Vec::with_capacity(2 + values.len() * 4);
    let mut offsets = Vec::with_capacity(values.len());
    bytes.write_u16::<LittleEndian>(arity)?;

    for (index, (declared, value)) in schema.types().iter().zip(values).enumerate() {
        if value.field_type() != *declared {
            tracing::error!(index, expected = %declared, actual = %value.field_type(), "brittle field type mismatch");
            return Err(Error::FieldTypeMismatch {
                index,
                expected: *declared,
                actual: value.field_type(),
            });
        }
        offsets.push(bytes.len() as u32);
        write_value(&mut bytes, value)?;
    }
    Ok((bytes, offsets))
}

fn write_value(bytes: &mut Vec<u8>, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Nid(nid) => bytes.write_i32::<LittleEndian>(nid.as_i32())?,
        FieldValue::Integer(v) => bytes.write_i32::<LittleEndian>(*v)?,
        FieldValue::Long(v) | FieldValue::Instant(v) => bytes.write_i64::<LittleEndian>(*v)?,
        FieldValue::Float(v) => bytes.write_f32::<LittleEndian>(*v)?,
        FieldValue::Boolean(v) => bytes.write_u8(u8::from(*v))?,
        FieldValue::Uuid(v) => bytes.extend_from_slice(v.as_bytes()),
        FieldValue::String(s) => write_prefixed(bytes, s.as_bytes())?,
        FieldValue::Bytes(b) => write_prefixed(bytes, b)?,
    }
    Ok(())
}

fn write_prefixed(bytes: &mut Vec<u8>, data: &[u8]) -> Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| Error::InvalidOperation(format!("field of {} bytes exceeds u32", data.len())))?;
    bytes.write_u32::<LittleEndian>(len)?;
    bytes.extend_from_slice(data);
    Ok(())
}

fn read_value(cursor: &mut Cursor<&[u8]>, field_type: FieldType) -> Result<FieldValue> {
    let value = match field_type {
        FieldType::Nid => FieldValue::Nid(Nid::new(
            cursor.read_i32::<LittleEndian>().map_err(truncated)?,
        )),
        FieldType::Integer => FieldValue::Integer(cursor.read_i32::<LittleEndian>().map_err(truncated)?),
        FieldType::Long => FieldValue::Long(cursor.read_i64::<LittleEndian>().map_err(truncated)?),
        FieldType::Instant => FieldValue::Instant(cursor.read_i64::<LittleEndian>().map_err(truncated)?),
        FieldType::Float => FieldValue::Float(cursor.read_f32::<LittleEndian>().map_err(truncated)?),
        FieldType::Boolean => match cursor.read_u8().map_err(truncated)? {
            0 => FieldValue::Boolean(false),
            1 => FieldValue::Boolean(true),
            other => {
                return Err(Error::Corruption(format!(
                    "invalid boolean byte 0x{:02x}",
                    other
                )))
            }
        },
        FieldType::Uuid => {
            let mut raw = [0u8; 16];
            cursor.read_exact(&mut raw).map_err(truncated)?;
            FieldValue::Uuid(Uuid::from_bytes(raw))
        }
        FieldType::String => {
            let raw = read_prefixed(cursor)?;
            FieldValue::String(
                String::from_utf8(raw)
                    .map_err(|e| Error::Corruption(format!("invalid UTF-8 in string field: {}", e)))?,
            )
        }
        FieldType::Bytes => FieldValue::Bytes(read_prefixed(cursor)?),
    };
    Ok(value)
}

fn read_prefixed(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(Error::Corruption(format!(
            "field length {} exceeds remaining {} bytes",
            len, remaining
        )));
    }
    let mut raw = vec![0u8; len];
    cursor.read_exact(&mut raw).map_err(truncated)?;
    Ok(raw)
}

/// Walk the encoded tuple once, validating it and recording field offsets
fn scan(bytes: &[u8], schema: &FieldSchema) -> Result<Vec<u32>> {
    let mut cursor = Cursor::new(bytes);
    let arity = cursor.read_u16::<LittleEndian>().map_err(truncated)? as usize;
    if arity != schema.arity() {
        return Err(arity_mismatch(schema.arity(), arity));
    }
    let mut offsets = Vec::with_capacity(arity);
    for field_type in schema.types() {
        offsets.push(cursor.position() as u32);
        read_value(&mut cursor, *field_type)?;
    }
    if cursor.position() as usize != bytes.len() {
        return Err(Error::Corruption(format!(
            "{} trailing bytes after brittle field tuple",
            bytes.len() - cursor.position() as usize
        )));
    }
    Ok(offsets)
}

/// Decode every value of an encoded tuple
///
/// # Errors
///
/// - `ArityMismatch` if the encoded arity differs from the schema
/// - `Corruption` if the bytes are truncated, padded or malformed
pub fn decode(bytes: &[u8], schema: &FieldSchema) -> Result<Vec<FieldValue>> {
    let mut cursor = Cursor::new(bytes);
    let arity = cursor.read_u16::<LittleEndian>().map_err(truncated)? as usize;
    if arity != schema.arity() {
        return Err(arity_mismatch(schema.arity(), arity));
    }
    let values = schema
        .types()
        .iter()
        .map(|t| read_value(&mut cursor, *t))
        .collect::<Result<Vec<_>>>()?;
    if cursor.position() as usize != bytes.len() {
        return Err(Error::Corruption(format!(
            "{} trailing bytes after brittle field tuple",
            bytes.len() - cursor.position() as usize
        )));
    }
    Ok(values)
}

/// Encoded field tuple with lazy per-field access
///
/// Stores the raw bytes plus the offset of every field, so reading one field
/// never decodes the others. Cloning is cheap (shared buffers), which keeps
/// copy-on-read snapshots of chronologies inexpensive.
#[derive(Debug, Clone, PartialEq)]
pub struct BrittleTuple {
    schema: Arc<FieldSchema>,
    bytes: Arc<[u8]>,
    offsets: Arc<[u32]>,
}

impl BrittleTuple {
    /// Encode values into a new tuple
    pub fn new(schema: Arc<FieldSchema>, values: &[FieldValue]) -> Result<Self> {
        let (bytes, offsets) = encode_with_offsets(&schema, values)?;
        Ok(Self {
            schema,
            bytes: bytes.into(),
            offsets: offsets.into(),
        })
    }

    /// Wrap previously encoded bytes, validating them against the schema
    pub fn from_bytes(schema: Arc<FieldSchema>, bytes: &[u8]) -> Result<Self> {
        let offsets = scan(bytes, &schema)?;
        Ok(Self {
            schema,
            bytes: bytes.into(),
            offsets: offsets.into(),
        })
    }

    /// Schema the tuple was encoded against
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Number of fields
    #[inline]
    pub fn arity(&self) -> usize {
        self.offsets.len()
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the field at `index`
    pub fn get(&self, index: usize) -> Result<FieldValue> {
        let (offset, field_type) = match (self.offsets.get(index), self.schema.field_type(index)) {
            (Some(offset), Some(field_type)) => (*offset, field_type),
            _ => {
                return Err(Error::InvalidOperation(format!(
                    "field {} out of range for arity {}",
                    index,
                    self.arity()
                )))
            }
        };
        let mut cursor = Cursor::new(&self.bytes[..]);
        cursor.set_position(u64::from(offset));
        read_value(&mut cursor, field_type)
    }

    /// The Nid stored at `index`, if that position is a NID field
    pub fn nid_at(&self, index: usize) -> Option<Nid> {
        match self.schema.field_type(index) {
            Some(FieldType::Nid) => self.get(index).ok().and_then(|v| v.as_nid()),
            _ => None,
        }
    }

    /// Every Nid stored in a NID-typed position
    pub fn referenced_nids(&self) -> Vec<Nid> {
        self.schema
            .nid_positions()
            .filter_map(|i| self.nid_at(i))
            .collect()
    }

    /// Decode all fields
    pub fn to_values(&self) -> Result<Vec<FieldValue>> {
        decode(&self.bytes, &self.schema)
    }
}
