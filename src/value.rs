//! Registry value data and the raw blob codec.
//!
//! Backends hand values over as a [`RawValue`]: a type tag plus the byte
//! buffer the registry stores. [`decode`] turns that into a typed
//! [`ValueData`] immediately so callers never inspect raw bytes, and
//! [`encode`] performs the reverse for the writable types.

use crate::error::{RegistryError, Result};
use crate::utils::{
    decode_utf16, exact_bytes, push_utf16, read_utf16_string, write_u32_le, write_utf16_string,
};
use crate::value_type::ValueType;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;

/// A value as the backend stores it: type tag plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Declared value type.
    pub value_type: ValueType,

    /// Raw value bytes.
    pub bytes: Vec<u8>,
}

impl RawValue {
    /// Creates a raw value.
    pub fn new(value_type: ValueType, bytes: Vec<u8>) -> Self {
        Self { value_type, bytes }
    }
}

/// Parsed registry value data.
///
/// The variant determines the value type, see [`ValueData::value_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    /// String value (`REG_SZ`).
    String(String),

    /// Expandable string value (`REG_EXPAND_SZ`), never expanded here.
    ExpandString(String),

    /// Binary data (`REG_BINARY`).
    Binary(Vec<u8>),

    /// 32-bit integer (`REG_DWORD`).
    Dword(u32),

    /// 32-bit big-endian integer (`REG_DWORD_BIG_ENDIAN`).
    DwordBigEndian(u32),

    /// Multiple strings (`REG_MULTI_SZ`).
    MultiString(Vec<String>),

    /// 64-bit integer (`REG_QWORD`).
    Qword(u64),

    /// Untyped data (`REG_NONE`).
    None(Vec<u8>),

    /// Symbolic link target (`REG_LINK`), kept as stored.
    Link(Vec<u8>),

    /// Resource list (`REG_RESOURCE_LIST`), kept as stored.
    ResourceList(Vec<u8>),

    /// Full resource descriptor (`REG_FULL_RESOURCE_DESCRIPTOR`), kept as
    /// stored.
    FullResourceDescriptor(Vec<u8>),

    /// Resource requirements list (`REG_RESOURCE_REQUIREMENTS_LIST`), kept
    /// as stored.
    ResourceRequirementsList(Vec<u8>),

    /// A type tag outside the known range. Always reports
    /// [`ValueType::Unknown`], whatever the tag.
    Unknown {
        /// Type tag as stored.
        tag: u32,
        /// Raw value bytes.
        bytes: Vec<u8>,
    },
}

impl ValueData {
    /// Returns the value type this data belongs to.
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueData::String(_) => ValueType::String,
            ValueData::ExpandString(_) => ValueType::ExpandString,
            ValueData::Binary(_) => ValueType::Binary,
            ValueData::Dword(_) => ValueType::Dword,
            ValueData::DwordBigEndian(_) => ValueType::DwordBigEndian,
            ValueData::MultiString(_) => ValueType::MultiString,
            ValueData::Qword(_) => ValueType::Qword,
            ValueData::None(_) => ValueType::None,
            ValueData::Link(_) => ValueType::Link,
            ValueData::ResourceList(_) => ValueType::ResourceList,
            ValueData::FullResourceDescriptor(_) => ValueType::FullResourceDescriptor,
            ValueData::ResourceRequirementsList(_) => ValueType::ResourceRequirementsList,
            ValueData::Unknown { tag, .. } => ValueType::Unknown(*tag),
        }
    }

    /// Returns the stored bytes of data without a structured decoding
    /// (`REG_BINARY`, `REG_NONE`, `REG_LINK`, resource lists, unknown tags).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ValueData::Binary(b)
            | ValueData::None(b)
            | ValueData::Link(b)
            | ValueData::ResourceList(b)
            | ValueData::FullResourceDescriptor(b)
            | ValueData::ResourceRequirementsList(b)
            | ValueData::Unknown { bytes: b, .. } => Some(b),
            _ => None,
        }
    }

    /// Converts host text into data of the given type.
    ///
    /// Strings are taken verbatim. `REG_DWORD` accepts a decimal number or
    /// a `0x`-prefixed hexadecimal one, with surrounding whitespace. Signs
    /// are rejected in both forms.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` for types outside the writable set,
    /// `InvalidHostValue` for text that does not convert.
    pub fn from_host_str(value_type: ValueType, text: &str) -> Result<Self> {
        match value_type {
            ValueType::String => Ok(ValueData::String(text.to_string())),
            ValueType::ExpandString => Ok(ValueData::ExpandString(text.to_string())),
            ValueType::Dword => {
                let trimmed = text.trim();
                let (digits, radix) = match trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                {
                    Some(hex) => (hex, 16),
                    None => (trimmed, 10),
                };
                // from_str_radix tolerates a leading '+'.
                if !digits.chars().all(|c| c.is_digit(radix)) {
                    return Err(RegistryError::invalid_host_value(
                        value_type,
                        text,
                        format!("not a base-{} number", radix),
                    ));
                }
                u32::from_str_radix(digits, radix)
                    .map(ValueData::Dword)
                    .map_err(|e| RegistryError::invalid_host_value(value_type, text, e.to_string()))
            }
            other => Err(RegistryError::UnsupportedType(other)),
        }
    }

    /// Returns the string payload of `REG_SZ` / `REG_EXPAND_SZ` data.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueData::String(s) | ValueData::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload of `REG_DWORD` data.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::String(s) | ValueData::ExpandString(s) => f.write_str(s),
            ValueData::Binary(b) => f.write_str(&hex::encode(b)),
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => write!(f, "{} (0x{:08X})", d, d),
            ValueData::Qword(q) => write!(f, "{} (0x{:016X})", q, q),
            ValueData::MultiString(strings) => f.write_str(&strings.join(", ")),
            other => match other.as_bytes() {
                Some([]) => f.write_str("(none)"),
                Some(bytes) => f.write_str(&hex::encode(bytes)),
                None => Ok(()),
            },
        }
    }
}

/// Serializes the payload only: text as a string, integers as numbers,
/// string lists as arrays and byte payloads as arrays of bytes.
#[cfg(feature = "serde")]
impl serde::Serialize for ValueData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ValueData::String(s) | ValueData::ExpandString(s) => serializer.serialize_str(s),
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => serializer.serialize_u32(*d),
            ValueData::Qword(q) => serializer.serialize_u64(*q),
            ValueData::MultiString(strings) => serializer.collect_seq(strings),
            other => serializer.collect_seq(other.as_bytes().unwrap_or_default()),
        }
    }
}

/// A named, typed value read from a key.
///
/// The type is derived from the data, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDescriptor {
    /// Value name. Empty for the key's default value.
    pub name: String,

    /// Decoded data.
    pub data: ValueData,
}

impl ValueDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, data: ValueData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Decodes a raw backend value into a descriptor.
    pub fn from_raw(name: impl Into<String>, raw: &RawValue) -> Result<Self> {
        Ok(Self::new(name, decode(raw)?))
    }

    /// Returns the value type.
    pub fn value_type(&self) -> ValueType {
        self.data.value_type()
    }

    /// Returns true for the key's default (unnamed) value.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }
}

/// Serializes as `{ "name": ..., "type": "REG_SZ", "data": ... }`.
#[cfg(feature = "serde")]
impl serde::Serialize for ValueDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValueDescriptor", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.value_type())?;
        state.serialize_field("data", &self.data)?;
        state.end()
    }
}

/// Decodes raw bytes according to their declared type.
///
/// # Errors
///
/// Returns `MalformedValue` when the bytes are inconsistent with the type:
/// a `REG_DWORD` that is not exactly 4 bytes, odd-length or invalid UTF-16
/// text, and so on. Data is never coerced into another type.
pub fn decode(raw: &RawValue) -> Result<ValueData> {
    let data = raw.bytes.as_slice();
    let value_type = raw.value_type;

    match value_type {
        ValueType::String => Ok(ValueData::String(read_utf16_string(data, value_type)?)),

        ValueType::ExpandString => Ok(ValueData::ExpandString(read_utf16_string(data, value_type)?)),

        ValueType::Binary => Ok(ValueData::Binary(data.to_vec())),

        ValueType::Dword => {
            let bytes = exact_bytes::<4>(data, value_type)?;
            Ok(ValueData::Dword(LittleEndian::read_u32(&bytes)))
        }

        ValueType::DwordBigEndian => {
            let bytes = exact_bytes::<4>(data, value_type)?;
            Ok(ValueData::DwordBigEndian(BigEndian::read_u32(&bytes)))
        }

        ValueType::Qword => {
            let bytes = exact_bytes::<8>(data, value_type)?;
            Ok(ValueData::Qword(LittleEndian::read_u64(&bytes)))
        }

        ValueType::MultiString => {
            let full_string = decode_utf16(data, value_type)?;
            // An empty string terminates the list; a missing final
            // terminator is tolerated.
            let strings = full_string
                .split('\0')
                .take_while(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            Ok(ValueData::MultiString(strings))
        }

        ValueType::None => Ok(ValueData::None(data.to_vec())),

        ValueType::Link => Ok(ValueData::Link(data.to_vec())),

        ValueType::ResourceList => Ok(ValueData::ResourceList(data.to_vec())),

        ValueType::FullResourceDescriptor => Ok(ValueData::FullResourceDescriptor(data.to_vec())),

        ValueType::ResourceRequirementsList => Ok(ValueData::ResourceRequirementsList(data.to_vec())),

        ValueType::Unknown(tag) => Ok(ValueData::Unknown {
            tag,
            bytes: data.to_vec(),
        }),
    }
}

/// Encodes data as the raw bytes of `value_type`.
///
/// Only the writable types (`REG_SZ`, `REG_EXPAND_SZ`, `REG_DWORD`) are
/// accepted.
///
/// # Errors
///
/// `UnsupportedType` outside the writable set; `InvalidHostValue` when the
/// data variant does not belong to `value_type` or a string contains an
/// embedded NUL (which would truncate it on read).
pub fn encode(value_type: ValueType, data: &ValueData) -> Result<RawValue> {
    if !value_type.is_writable() {
        return Err(RegistryError::UnsupportedType(value_type));
    }
    if data.value_type() != value_type {
        return Err(RegistryError::invalid_host_value(
            value_type,
            data.to_string(),
            format!("data is {}", data.value_type()),
        ));
    }

    let bytes = match data {
        ValueData::String(s) | ValueData::ExpandString(s) => {
            if s.contains('\0') {
                return Err(RegistryError::invalid_host_value(
                    value_type,
                    s.as_str(),
                    "embedded NUL character",
                ));
            }
            write_utf16_string(s)
        }
        ValueData::Dword(d) => write_u32_le(*d),
        _ => return Err(RegistryError::UnsupportedType(value_type)),
    };

    Ok(RawValue::new(value_type, bytes))
}

/// Encodes a string list in `REG_MULTI_SZ` layout.
///
/// Not part of the write path; backends and tests use it to seed values.
pub fn encode_multi_string<S: AsRef<str>>(strings: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for s in strings {
        push_utf16(&mut out, s.as_ref());
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&[0, 0]);
    out
}
