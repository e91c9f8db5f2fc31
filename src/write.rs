//! Typed value writes and key creation.
//!
//! Expected rejections (a type outside the writable set, host text that
//! does not convert, a structurally invalid key path) come back as
//! `Ok(false)` and never touch the backend. Genuine backend failures
//! propagate as errors.

use crate::backend::{Access, KeyGuard, RegistryBackend, RegistryView};
use crate::error::{RegistryError, Result};
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::{encode, RawValue, ValueData};
use crate::value_type::ValueType;
use tracing::{debug, warn};

/// Validates and encodes `data` for `value_type`.
///
/// Returns `None` for expected rejections, after logging them.
fn prepare(value_type: ValueType, data: Result<ValueData>) -> Result<Option<RawValue>> {
    if !value_type.is_writable() {
        warn!(%value_type, "Rejected write of unsupported value type");
        return Ok(None);
    }
    match data.and_then(|data| encode(value_type, &data)) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.is_rejection() => {
            warn!(%value_type, error = %e, "Rejected write of unconvertible value");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn store<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    name: &str,
    raw: &RawValue,
    view: RegistryView,
) -> Result<()> {
    let guard = KeyGuard::create(backend, root, path, Access::write(view))?;
    backend.set_raw_value(guard.key(), name, raw)?;
    debug!(%root, %path, name, value_type = %raw.value_type, len = raw.bytes.len(), "Stored value");
    Ok(())
}

/// Writes a value given as host text.
///
/// `REG_SZ` and `REG_EXPAND_SZ` take the text verbatim; `REG_DWORD`
/// parses it as a number. The key is created if it does not exist.
///
/// Returns `Ok(false)`, without calling the backend, when `value_type` is
/// not writable or `value` does not convert.
///
/// # Errors
///
/// Failures opening or creating the key, or storing the value.
pub fn set_value<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    name: &str,
    value_type: ValueType,
    value: &str,
    view: RegistryView,
) -> Result<bool> {
    let Some(raw) = prepare(value_type, ValueData::from_host_str(value_type, value))? else {
        return Ok(false);
    };
    store(backend, root, path, name, &raw, view)?;
    Ok(true)
}

/// Writes typed data. Same rules as [`set_value`]; the type comes from
/// the data.
pub fn set_value_data<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    name: &str,
    data: &ValueData,
    view: RegistryView,
) -> Result<bool> {
    let Some(raw) = prepare(data.value_type(), Ok(data.clone()))? else {
        return Ok(false);
    };
    store(backend, root, path, name, &raw, view)?;
    Ok(true)
}

/// Creates `path` and any missing intermediate keys. Idempotent.
///
/// Returns `Ok(false)` when the path cannot name a key: an empty segment
/// or one longer than 255 UTF-16 units (checked before the backend is
/// called), or a backend `InvalidPath`.
///
/// # Errors
///
/// Other backend failures, e.g. access denied.
pub fn create_key<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    view: RegistryView,
) -> Result<bool> {
    if let Some(segment) = path.invalid_segment() {
        warn!(%root, %path, segment, "Key path has an invalid segment");
        return Ok(false);
    }
    match KeyGuard::create(backend, root, path, Access::write(view)) {
        Ok(_guard) => Ok(true),
        Err(RegistryError::InvalidPath(reason)) => {
            warn!(%root, %path, %reason, "Key path cannot be created");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::enumerate::{enumerate_keys, read_value};

    use std::cell::Cell;

    const VIEW: RegistryView = RegistryView::Default;

    /// Accepts every path and counts the calls that reach it.
    #[derive(Default)]
    struct CountingBackend {
        calls: Cell<usize>,
    }

    impl RegistryBackend for CountingBackend {
        type Key = ();

        fn open_key(&self, _: RootKey, _: &KeyPath, _: Access) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }

        fn create_or_open_key(&self, _: RootKey, _: &KeyPath, _: Access) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }

        fn close_key(&self, _: ()) {}

        fn enum_key_at(&self, _: &(), _: u32) -> Result<Option<String>> {
            Ok(None)
        }

        fn enum_value_at(&self, _: &(), _: u32) -> Result<Option<(String, RawValue)>> {
            Ok(None)
        }

        fn set_raw_value(&self, _: &(), _: &str, _: &RawValue) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_unsupported_type_makes_no_backend_call() {
        let backend = MemoryBackend::new();
        let path = KeyPath::from(r"SOFTWARE\Test");
        let written = set_value(&backend, RootKey::CurrentUser, &path, "ValueTest", ValueType::MultiString, "Value", VIEW)
            .unwrap();
        assert!(!written);
        // The key itself was not created either.
        assert!(enumerate_keys(&backend, RootKey::CurrentUser, &KeyPath::root(), VIEW).unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_dword_is_rejected() {
        let backend = MemoryBackend::new();
        let path = KeyPath::from("K");
        assert!(!set_value(&backend, RootKey::CurrentUser, &path, "d", ValueType::Dword, "one", VIEW).unwrap());
        assert!(!set_value(&backend, RootKey::CurrentUser, &path, "d", ValueType::Dword, "-1", VIEW).unwrap());
        assert_eq!(read_value(&backend, RootKey::CurrentUser, &path, "d", VIEW).unwrap(), None);
    }

    #[test]
    fn test_set_value_data() {
        let backend = MemoryBackend::new();
        let path = KeyPath::from("K");
        assert!(set_value_data(&backend, RootKey::CurrentUser, &path, "d", &ValueData::Dword(5), VIEW).unwrap());
        assert!(!set_value_data(&backend, RootKey::CurrentUser, &path, "b", &ValueData::Binary(vec![1]), VIEW).unwrap());

        let value = read_value(&backend, RootKey::CurrentUser, &path, "d", VIEW).unwrap().unwrap();
        assert_eq!(value.data, ValueData::Dword(5));
        assert_eq!(read_value(&backend, RootKey::CurrentUser, &path, "b", VIEW).unwrap(), None);
    }

    #[test]
    fn test_write_access_denied_propagates() {
        let backend = MemoryBackend::new();
        backend.restrict(RootKey::LocalMachine, "SYSTEM");
        let path = KeyPath::from(r"SYSTEM\CurrentControlSet");

        let result = set_value(&backend, RootKey::LocalMachine, &path, "v", ValueType::String, "x", VIEW);
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
        let result = create_key(&backend, RootKey::LocalMachine, &path, VIEW);
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
        assert_eq!(backend.open_handle_count(), 0);
    }

    #[test]
    fn test_create_key_validates_path_for_any_backend() {
        let backend = CountingBackend::default();
        let long = format!(r"SOFTWARE\{}", "n".repeat(300));
        for path in [r"SOFTWARE\\Broken", long.as_str(), r"SOFTWARE\"] {
            assert!(!create_key(&backend, RootKey::CurrentUser, &KeyPath::from(path), VIEW).unwrap());
        }
        assert_eq!(backend.calls.get(), 0);

        assert!(create_key(&backend, RootKey::CurrentUser, &KeyPath::from(r"SOFTWARE\Vendor"), VIEW).unwrap());
        assert!(create_key(&backend, RootKey::CurrentUser, &KeyPath::root(), VIEW).unwrap());
        assert_eq!(backend.calls.get(), 2);
    }

    #[test]
    fn test_create_key_invalid_path_is_false() {
        let backend = MemoryBackend::new();
        assert!(!create_key(&backend, RootKey::CurrentUser, &KeyPath::from(r"SOFTWARE\\Broken"), VIEW).unwrap());
        let long = format!(r"SOFTWARE\{}", "n".repeat(300));
        assert!(!create_key(&backend, RootKey::CurrentUser, &KeyPath::from(long.as_str()), VIEW).unwrap());
        assert_eq!(backend.open_handle_count(), 0);
    }
}
