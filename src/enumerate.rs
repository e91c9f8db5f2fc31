//! Key and value enumeration.
//!
//! Both operations open the target key read-only and call the backend's
//! indexed enumeration primitive with index 0, 1, 2, ... until it reports
//! no more items. Results are materialized eagerly in backend order. A
//! missing key is an expected outcome and yields an empty list.

use crate::backend::{Access, KeyGuard, RegistryBackend, RegistryView};
use crate::error::{RegistryError, Result};
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::ValueDescriptor;
use tracing::{debug, warn};

/// Opens `path` for reading, mapping `NotFound` to `None`.
fn open_existing<'a, B: RegistryBackend + ?Sized>(
    backend: &'a B,
    root: RootKey,
    path: &KeyPath,
    view: RegistryView,
) -> Result<Option<KeyGuard<'a, B>>> {
    match KeyGuard::open(backend, root, path, Access::read(view)) {
        Ok(guard) => Ok(Some(guard)),
        Err(RegistryError::NotFound(_)) => {
            debug!(%root, %path, "Key not found, nothing to enumerate");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Lists the names of the subkeys of `path`.
///
/// # Errors
///
/// Failures other than a missing key (access denied, backend I/O).
pub fn enumerate_keys<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    view: RegistryView,
) -> Result<Vec<String>> {
    let Some(guard) = open_existing(backend, root, path, view)? else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    let mut index = 0u32;
    while let Some(name) = backend.enum_key_at(guard.key(), index)? {
        names.push(name);
        index += 1;
    }

    debug!(%root, %path, count = names.len(), "Enumerated subkeys");
    Ok(names)
}

/// Lists the values of `path`, decoded.
///
/// A value whose bytes do not match its declared type is skipped and
/// logged; the rest of the key is still returned.
///
/// # Errors
///
/// Failures other than a missing key (access denied, backend I/O).
pub fn enumerate_values<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    view: RegistryView,
) -> Result<Vec<ValueDescriptor>> {
    let Some(guard) = open_existing(backend, root, path, view)? else {
        return Ok(Vec::new());
    };

    let mut values = Vec::new();
    let mut skipped = 0usize;
    let mut index = 0u32;
    while let Some((name, raw)) = backend.enum_value_at(guard.key(), index)? {
        index += 1;
        match ValueDescriptor::from_raw(name.as_str(), &raw) {
            Ok(descriptor) => values.push(descriptor),
            Err(e @ RegistryError::MalformedValue { .. }) => {
                warn!(%root, %path, value = %name, error = %e, "Skipping malformed value");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(%root, %path, count = values.len(), skipped, "Enumerated values");
    Ok(values)
}

/// Finds a single value by name (case-insensitive).
///
/// Returns `None` when the key or the value does not exist.
///
/// # Errors
///
/// Unlike [`enumerate_values`], a malformed target value is reported as
/// `MalformedValue`.
pub fn read_value<B: RegistryBackend + ?Sized>(
    backend: &B,
    root: RootKey,
    path: &KeyPath,
    name: &str,
    view: RegistryView,
) -> Result<Option<ValueDescriptor>> {
    let Some(guard) = open_existing(backend, root, path, view)? else {
        return Ok(None);
    };

    let wanted = name.to_lowercase();
    let mut index = 0u32;
    while let Some((value_name, raw)) = backend.enum_value_at(guard.key(), index)? {
        if value_name.to_lowercase() == wanted {
            return ValueDescriptor::from_raw(value_name, &raw).map(Some);
        }
        index += 1;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::value::{RawValue, ValueData};
    use crate::utils::write_utf16_string;
    use crate::ValueType;

    fn view() -> RegistryView {
        RegistryView::Default
    }

    #[test]
    fn test_missing_key_yields_empty() {
        let backend = MemoryBackend::new();
        let path = KeyPath::from("blahblahblah");
        assert!(enumerate_values(&backend, RootKey::LocalMachine, &path, view()).unwrap().is_empty());
        assert!(enumerate_keys(&backend, RootKey::LocalMachine, &path, view()).unwrap().is_empty());
        assert_eq!(read_value(&backend, RootKey::LocalMachine, &path, "x", view()).unwrap(), None);
    }

    #[test]
    fn test_values_keep_backend_order() {
        let backend = MemoryBackend::new();
        for (name, n) in [("b", 2u32), ("a", 1), ("c", 3)] {
            backend
                .seed_value(RootKey::CurrentUser, "K", name, RawValue::new(ValueType::Dword, n.to_le_bytes().to_vec()))
                .unwrap();
        }

        let values = enumerate_values(&backend, RootKey::CurrentUser, &KeyPath::from("K"), view()).unwrap();
        let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(backend.open_handle_count(), 0);
    }

    #[test]
    fn test_malformed_value_is_skipped() {
        let backend = MemoryBackend::new();
        backend
            .seed_value(RootKey::CurrentUser, "K", "good", RawValue::new(ValueType::String, write_utf16_string("ok")))
            .unwrap();
        backend
            .seed_value(RootKey::CurrentUser, "K", "bad", RawValue::new(ValueType::Dword, vec![1, 2, 3]))
            .unwrap();
        backend
            .seed_value(RootKey::CurrentUser, "K", "after", RawValue::new(ValueType::Dword, vec![9, 0, 0, 0]))
            .unwrap();

        let values = enumerate_values(&backend, RootKey::CurrentUser, &KeyPath::from("K"), view()).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].data, ValueData::String("ok".to_string()));
        assert_eq!(values[1].data, ValueData::Dword(9));

        let bad = read_value(&backend, RootKey::CurrentUser, &KeyPath::from("K"), "BAD", view());
        assert!(matches!(bad, Err(RegistryError::MalformedValue { .. })));
        assert_eq!(backend.open_handle_count(), 0);
    }

    #[test]
    fn test_access_denied_propagates() {
        let backend = MemoryBackend::new();
        backend
            .seed_value(RootKey::LocalMachine, "SAM", "v", RawValue::new(ValueType::Binary, vec![]))
            .unwrap();
        backend.restrict(RootKey::LocalMachine, "SAM");

        let result = enumerate_values(&backend, RootKey::LocalMachine, &KeyPath::from("SAM"), view());
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
        let result = enumerate_keys(&backend, RootKey::LocalMachine, &KeyPath::from(r"SAM\Domains"), view());
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
    }
}
