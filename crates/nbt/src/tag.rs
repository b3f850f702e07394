//! NBT tag types and payload decoding.

use std::fmt;

use crate::cursor::Cursor;
use crate::error::{NbtError, Result};

/// Nesting limit for lists and compounds.
pub const MAX_DEPTH: usize = 512;

/// Tag type identifiers as stored in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagType {
    pub fn from_id(id: u8) -> Result<Self> {
        Ok(match id {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TagType::End => "End",
            TagType::Byte => "Byte",
            TagType::Short => "Short",
            TagType::Int => "Int",
            TagType::Long => "Long",
            TagType::Float => "Float",
            TagType::Double => "Double",
            TagType::ByteArray => "ByteArray",
            TagType::String => "String",
            TagType::List => "List",
            TagType::Compound => "Compound",
            TagType::IntArray => "IntArray",
            TagType::LongArray => "LongArray",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded tag payload.
///
/// Compounds keep their entries in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(TagType, Vec<Tag>),
    Compound(Vec<(String, Tag)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::End => TagType::End,
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::String(_) => TagType::String,
            Tag::List(..) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
        }
    }

    /// Decode one payload of type `ty` at the cursor.
    pub fn read_payload(ty: TagType, cursor: &mut Cursor<'_>) -> Result<Tag> {
        read_payload_at(ty, cursor, 0)
    }

    /// Look up an entry of a compound by name.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        match self {
            Tag::Compound(entries) => entries.iter().find(|(n, _)| n == name).map(|(_, t)| t),
            _ => None,
        }
    }

    /// Numeric value of any integer or floating point tag.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Tag::Byte(v) => Some(v as f64),
            Tag::Short(v) => Some(v as f64),
            Tag::Int(v) => Some(v as f64),
            Tag::Long(v) => Some(v as f64),
            Tag::Float(v) => Some(v as f64),
            Tag::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Value of any integer tag.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v as i64),
            Tag::Short(v) => Some(v as i64),
            Tag::Int(v) => Some(v as i64),
            Tag::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(_, items) => Some(items),
            _ => None,
        }
    }
}

/// Decode a named root tag: type id, name, payload.
///
/// The root of a well-formed document is always a compound.
pub fn read_named(cursor: &mut Cursor<'_>) -> Result<(String, Tag)> {
    let ty = TagType::from_id(cursor.read_u8()?)?;
    if ty != TagType::Compound {
        return Err(NbtError::RootNotCompound(ty.name()));
    }
    let name = cursor.read_string()?;
    let tag = Tag::read_payload(ty, cursor)?;
    Ok((name, tag))
}

fn read_payload_at(ty: TagType, cursor: &mut Cursor<'_>, depth: usize) -> Result<Tag> {
    Ok(match ty {
        TagType::End => Tag::End,
        TagType::Byte => Tag::Byte(cursor.read_i8()?),
        TagType::Short => Tag::Short(cursor.read_i16()?),
        TagType::Int => Tag::Int(cursor.read_i32()?),
        TagType::Long => Tag::Long(cursor.read_i64()?),
        TagType::Float => Tag::Float(cursor.read_f32()?),
        TagType::Double => Tag::Double(cursor.read_f64()?),
        TagType::ByteArray => {
            let len = cursor.read_len()?;
            Tag::ByteArray(cursor.take(len)?.iter().map(|&b| b as i8).collect())
        }
        TagType::String => Tag::String(cursor.read_string()?),
        TagType::IntArray => {
            let bytes = take_elements(cursor, 4)?;
            Tag::IntArray(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            )
        }
        TagType::LongArray => {
            let bytes = take_elements(cursor, 8)?;
            Tag::LongArray(
                bytes
                    .chunks_exact(8)
                    .map(|c| i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            )
        }
        TagType::List => {
            let depth = enter(depth)?;
            let element = TagType::from_id(cursor.read_u8()?)?;
            let len = cursor.read_len()?;
            // bound the preallocation by the input, not the declared length
            let mut items = Vec::with_capacity(len.min(cursor.remaining()));
            for _ in 0..len {
                items.push(read_payload_at(element, cursor, depth)?);
            }
            Tag::List(element, items)
        }
        TagType::Compound => {
            let depth = enter(depth)?;
            let mut entries = Vec::new();
            loop {
                let ty = TagType::from_id(cursor.read_u8()?)?;
                if ty == TagType::End {
                    break;
                }
                let name = cursor.read_string()?;
                entries.push((name, read_payload_at(ty, cursor, depth)?));
            }
            Tag::Compound(entries)
        }
    })
}

fn enter(depth: usize) -> Result<usize> {
    if depth >= MAX_DEPTH {
        return Err(NbtError::TooDeep(MAX_DEPTH));
    }
    Ok(depth + 1)
}

/// Take a length-prefixed array of fixed-size elements as raw bytes.
fn take_elements<'a>(cursor: &mut Cursor<'a>, size: usize) -> Result<&'a [u8]> {
    let len = cursor.read_len()?;
    let bytes = len.checked_mul(size).ok_or(NbtError::UnexpectedEof {
        needed: usize::MAX,
        remaining: cursor.remaining(),
    })?;
    cursor.take(bytes)
}
