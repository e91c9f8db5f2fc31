//! Registry value type tags.
//!
//! Every registry value carries a numeric type tag (`REG_SZ` = 1,
//! `REG_DWORD` = 4, ...). Tags 0-11 are predefined, but the registry stores
//! any 32-bit number, so unknown tags are preserved rather than rejected.

use crate::error::{RegistryError, Result};
use std::fmt;
use std::str::FromStr;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with unexpanded environment variable references.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Unknown or non-standard value type.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Value types this layer knows how to write.
    pub const WRITABLE: [ValueType; 3] = [ValueType::String, ValueType::ExpandString, ValueType::Dword];

    /// Converts a numeric type tag into a value type. Never fails; unknown
    /// tags map to [`ValueType::Unknown`].
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ValueType::None,
            1 => ValueType::String,
            2 => ValueType::ExpandString,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiString,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            _ => ValueType::Unknown(value),
        }
    }

    /// Returns the numeric type tag.
    pub fn to_u32(self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(value) => value,
        }
    }

    /// Returns the name of this value type.
    pub fn name(&self) -> String {
        match self {
            ValueType::None => "REG_NONE".to_string(),
            ValueType::String => "REG_SZ".to_string(),
            ValueType::ExpandString => "REG_EXPAND_SZ".to_string(),
            ValueType::Binary => "REG_BINARY".to_string(),
            ValueType::Dword => "REG_DWORD".to_string(),
            ValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN".to_string(),
            ValueType::Link => "REG_LINK".to_string(),
            ValueType::MultiString => "REG_MULTI_SZ".to_string(),
            ValueType::ResourceList => "REG_RESOURCE_LIST".to_string(),
            ValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR".to_string(),
            ValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST".to_string(),
            ValueType::Qword => "REG_QWORD".to_string(),
            ValueType::Unknown(value) => format!("REG_UNKNOWN_{:#010x}", value),
        }
    }

    /// Returns true if values of this type can be written.
    pub fn is_writable(&self) -> bool {
        Self::WRITABLE.contains(self)
    }

    /// Returns true if the data is UTF-16 text (single string or list).
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ValueType::String | ValueType::ExpandString | ValueType::MultiString | ValueType::Link
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ValueType {
    type Err = RegistryError;

    /// Parses a `REG_*` name, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let value_type = match upper.as_str() {
            "REG_NONE" => ValueType::None,
            "REG_SZ" => ValueType::String,
            "REG_EXPAND_SZ" => ValueType::ExpandString,
            "REG_BINARY" => ValueType::Binary,
            "REG_DWORD" | "REG_DWORD_LITTLE_ENDIAN" => ValueType::Dword,
            "REG_DWORD_BIG_ENDIAN" => ValueType::DwordBigEndian,
            "REG_LINK" => ValueType::Link,
            "REG_MULTI_SZ" => ValueType::MultiString,
            "REG_RESOURCE_LIST" => ValueType::ResourceList,
            "REG_FULL_RESOURCE_DESCRIPTOR" => ValueType::FullResourceDescriptor,
            "REG_RESOURCE_REQUIREMENTS_LIST" => ValueType::ResourceRequirementsList,
            "REG_QWORD" | "REG_QWORD_LITTLE_ENDIAN" => ValueType::Qword,
            other => {
                let tag = other
                    .strip_prefix("REG_UNKNOWN_0X")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| RegistryError::not_found("value type", s))?;
                ValueType::from_u32(tag)
            }
        };
        Ok(value_type)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}
