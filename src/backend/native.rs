//! Windows registry backend built on the `winreg` crate.

use super::{Access, AccessMode, RegistryBackend, RegistryView};
use crate::error::{RegistryError, Result};
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::RawValue;
use crate::value_type::ValueType;
use std::io;
use std::ptr;
use tracing::debug;
use winreg::enums::{
    RegType, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
    HKEY_USERS, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY, KEY_WRITE,
};
use winreg::{RegKey, RegValue};
use windows_sys::Win32::Foundation::{ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{RegEnumKeyExW, RegEnumValueW};

// Win32 error codes that map onto the error taxonomy.
const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_PATH_NOT_FOUND: i32 = 3;
const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_INVALID_NAME: i32 = 123;
const ERROR_BAD_PATHNAME: i32 = 161;
const ERROR_KEY_DELETED: i32 = 1018;
const ERROR_CHILD_MUST_BE_VOLATILE: i32 = 1021;

/// Key names are at most 255 characters, plus the terminator.
const KEY_NAME_BUF: usize = 256;
/// Initial buffer sizes for value enumeration; grown on `ERROR_MORE_DATA`.
const VALUE_NAME_BUF: usize = 256;
const VALUE_DATA_BUF: usize = 1024;

/// The live Windows registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

fn predef(root: RootKey) -> RegKey {
    RegKey::predef(match root {
        RootKey::ClassesRoot => HKEY_CLASSES_ROOT,
        RootKey::CurrentUser => HKEY_CURRENT_USER,
        RootKey::LocalMachine => HKEY_LOCAL_MACHINE,
        RootKey::Users => HKEY_USERS,
        RootKey::CurrentConfig => HKEY_CURRENT_CONFIG,
    })
}

fn sam(access: Access) -> u32 {
    let mode = match access.mode {
        AccessMode::Read => KEY_READ,
        AccessMode::Write => KEY_READ | KEY_WRITE,
    };
    let view = match access.view {
        RegistryView::Default => 0,
        RegistryView::Force64 => KEY_WOW64_64KEY,
        RegistryView::Force32 => KEY_WOW64_32KEY,
    };
    mode | view
}

/// Maps a Win32 failure onto the error taxonomy.
fn translate(err: io::Error, root: RootKey, path: &KeyPath) -> RegistryError {
    let location = format!("{}\\{}", root, path);
    match err.raw_os_error() {
        Some(ERROR_FILE_NOT_FOUND) | Some(ERROR_PATH_NOT_FOUND) | Some(ERROR_KEY_DELETED) => {
            RegistryError::not_found("key", &location)
        }
        Some(ERROR_ACCESS_DENIED) => RegistryError::AccessDenied(location),
        Some(ERROR_INVALID_NAME) | Some(ERROR_BAD_PATHNAME) | Some(ERROR_CHILD_MUST_BE_VOLATILE) => {
            RegistryError::InvalidPath(format!("{}: {}", location, err))
        }
        _ => RegistryError::Io(err),
    }
}

fn status_error(status: u32) -> io::Error {
    io::Error::from_raw_os_error(status as i32)
}

fn to_reg_type(value_type: ValueType) -> Option<RegType> {
    Some(match value_type {
        ValueType::None => RegType::REG_NONE,
        ValueType::String => RegType::REG_SZ,
        ValueType::ExpandString => RegType::REG_EXPAND_SZ,
        ValueType::Binary => RegType::REG_BINARY,
        ValueType::Dword => RegType::REG_DWORD,
        ValueType::DwordBigEndian => RegType::REG_DWORD_BIG_ENDIAN,
        ValueType::Link => RegType::REG_LINK,
        ValueType::MultiString => RegType::REG_MULTI_SZ,
        ValueType::ResourceList => RegType::REG_RESOURCE_LIST,
        ValueType::FullResourceDescriptor => RegType::REG_FULL_RESOURCE_DESCRIPTOR,
        ValueType::ResourceRequirementsList => RegType::REG_RESOURCE_REQUIREMENTS_LIST,
        ValueType::Qword => RegType::REG_QWORD,
        ValueType::Unknown(_) => return None,
    })
}

/// Open key of a [`NativeBackend`]. Closed when dropped.
#[derive(Debug)]
pub struct NativeKey {
    key: RegKey,
    root: RootKey,
    path: KeyPath,
}

impl RegistryBackend for NativeBackend {
    type Key = NativeKey;

    fn open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<NativeKey> {
        let key = predef(root)
            .open_subkey_with_flags(path.to_string(), sam(access))
            .map_err(|e| translate(e, root, path))?;
        Ok(NativeKey {
            key,
            root,
            path: path.clone(),
        })
    }

    fn create_or_open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<NativeKey> {
        let (key, _disposition) = predef(root)
            .create_subkey_with_flags(path.to_string(), sam(access))
            .map_err(|e| translate(e, root, path))?;
        Ok(NativeKey {
            key,
            root,
            path: path.clone(),
        })
    }

    fn close_key(&self, key: NativeKey) {
        // RegKey closes its handle on drop.
        drop(key);
    }

    fn enum_key_at(&self, key: &NativeKey, index: u32) -> Result<Option<String>> {
        let mut name = [0u16; KEY_NAME_BUF];
        let mut name_len = KEY_NAME_BUF as u32;

        // SAFETY: `name_len` is the capacity of `name` in UTF-16 units; the
        // optional class and timestamp outputs are null.
        let status = unsafe {
            RegEnumKeyExW(
                key.key.raw_handle(),
                index,
                name.as_mut_ptr(),
                &mut name_len,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        match status {
            ERROR_SUCCESS => Ok(Some(String::from_utf16_lossy(&name[..name_len as usize]))),
            ERROR_NO_MORE_ITEMS => Ok(None),
            status => Err(translate(status_error(status), key.root, &key.path)),
        }
    }

    fn enum_value_at(&self, key: &NativeKey, index: u32) -> Result<Option<(String, RawValue)>> {
        let mut name = vec![0u16; VALUE_NAME_BUF];
        let mut data = vec![0u8; VALUE_DATA_BUF];

        loop {
            let mut name_len = name.len() as u32;
            let mut data_len = data.len() as u32;
            let mut vtype = 0u32;

            // SAFETY: both lengths are the capacities of their buffers
            // (UTF-16 units and bytes respectively).
            let status = unsafe {
                RegEnumValueW(
                    key.key.raw_handle(),
                    index,
                    name.as_mut_ptr(),
                    &mut name_len,
                    ptr::null_mut(),
                    &mut vtype,
                    data.as_mut_ptr(),
                    &mut data_len,
                )
            };

            match status {
                ERROR_SUCCESS => {
                    name.truncate(name_len as usize);
                    data.truncate(data_len as usize);
                    let raw = RawValue::new(ValueType::from_u32(vtype), data);
                    return Ok(Some((String::from_utf16_lossy(&name), raw)));
                }
                ERROR_NO_MORE_ITEMS => return Ok(None),
                ERROR_MORE_DATA => {
                    // The key's maxima size both buffers; retry if the
                    // value grew in between.
                    let info = key
                        .key
                        .query_info()
                        .map_err(|e| translate(e, key.root, &key.path))?;
                    let name_cap = (info.max_value_name_len as usize + 1).max(name.len());
                    let data_cap = (info.max_value_len as usize)
                        .max(data_len as usize)
                        .max(data.len() * 2);
                    debug!(index, name_cap, data_cap, "Growing value enumeration buffers");
                    name.resize(name_cap, 0);
                    data.resize(data_cap, 0);
                }
                status => return Err(translate(status_error(status), key.root, &key.path)),
            }
        }
    }

    fn set_raw_value(&self, key: &NativeKey, name: &str, value: &RawValue) -> Result<()> {
        let vtype = to_reg_type(value.value_type)
            .ok_or(RegistryError::UnsupportedType(value.value_type))?;
        let reg_value = RegValue {
            bytes: value.bytes.clone(),
            vtype,
        };
        key.key
            .set_raw_value(name, &reg_value)
            .map_err(|e| translate(e, key.root, &key.path))
    }
}
