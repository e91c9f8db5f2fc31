//! High-level registry handle binding a backend and options.

use crate::backend::{RegistryBackend, RegistryView};
use crate::enumerate;
use crate::error::Result;
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::{ValueData, ValueDescriptor};
use crate::value_type::ValueType;
use crate::write;
use tracing::instrument;

/// Options applied to every operation of a [`Registry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Registry view to address.
    pub view: RegistryView,
}

/// Registry access over a backend.
///
/// Holds no state besides the backend and options: every call opens its
/// key, works, and closes it again, so two calls never share a handle.
///
/// # Examples
///
/// ```
/// use reg_access::{MemoryBackend, Registry, RootKey, ValueData, ValueType};
///
/// # fn main() -> reg_access::Result<()> {
/// let registry = Registry::new(MemoryBackend::new());
/// let path = Some(r"SOFTWARE\Microsoft\Windows\CurrentVersion");
///
/// assert!(registry.set_value(RootKey::CurrentUser, path, "ValueTestDword", ValueType::Dword, "1")?);
///
/// let values = registry.enumerate_values(RootKey::CurrentUser, path)?;
/// let value = values.iter().find(|v| v.name == "ValueTestDword").unwrap();
/// assert_eq!(value.value_type(), ValueType::Dword);
/// assert_eq!(value.data, ValueData::Dword(1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Registry<B> {
    backend: B,
    options: RegistryOptions,
}

impl<B: RegistryBackend> Registry<B> {
    /// Creates a registry with default options.
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, RegistryOptions::default())
    }

    /// Creates a registry with the given options.
    pub fn with_options(backend: B, options: RegistryOptions) -> Self {
        Self { backend, options }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the options.
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Lists the values of a key. A missing key yields an empty list.
    #[instrument(skip(self))]
    pub fn enumerate_values(&self, root: RootKey, path: Option<&str>) -> Result<Vec<ValueDescriptor>> {
        enumerate::enumerate_values(&self.backend, root, &KeyPath::parse(path), self.options.view)
    }

    /// Lists the subkey names of a key. A missing key yields an empty list.
    #[instrument(skip(self))]
    pub fn enumerate_keys(&self, root: RootKey, path: Option<&str>) -> Result<Vec<String>> {
        enumerate::enumerate_keys(&self.backend, root, &KeyPath::parse(path), self.options.view)
    }

    /// Reads a single value by name.
    #[instrument(skip(self))]
    pub fn read_value(&self, root: RootKey, path: Option<&str>, name: &str) -> Result<Option<ValueDescriptor>> {
        enumerate::read_value(&self.backend, root, &KeyPath::parse(path), name, self.options.view)
    }

    /// Writes a value given as text. `false` means the write was rejected.
    #[instrument(skip(self, value))]
    pub fn set_value(
        &self,
        root: RootKey,
        path: Option<&str>,
        name: &str,
        value_type: ValueType,
        value: &str,
    ) -> Result<bool> {
        write::set_value(
            &self.backend,
            root,
            &KeyPath::parse(path),
            name,
            value_type,
            value,
            self.options.view,
        )
    }

    /// Writes typed data. `false` means the write was rejected.
    #[instrument(skip(self, data))]
    pub fn set_value_data(&self, root: RootKey, path: Option<&str>, name: &str, data: &ValueData) -> Result<bool> {
        write::set_value_data(&self.backend, root, &KeyPath::parse(path), name, data, self.options.view)
    }

    /// Creates a key and its missing parents. `false` means the path
    /// cannot name a key.
    #[instrument(skip(self))]
    pub fn create_key(&self, root: RootKey, path: Option<&str>) -> Result<bool> {
        write::create_key(&self.backend, root, &KeyPath::parse(path), self.options.view)
    }
}

#[cfg(windows)]
mod system {
    use super::*;
    use crate::backend::NativeBackend;

    fn registry() -> Registry<NativeBackend> {
        Registry::new(NativeBackend)
    }

    /// Lists the values of a key in the Windows registry.
    pub fn enumerate_values(root: RootKey, path: Option<&str>) -> Result<Vec<ValueDescriptor>> {
        registry().enumerate_values(root, path)
    }

    /// Lists the subkey names of a key in the Windows registry.
    pub fn enumerate_keys(root: RootKey, path: Option<&str>) -> Result<Vec<String>> {
        registry().enumerate_keys(root, path)
    }

    /// Reads a single value from the Windows registry.
    pub fn read_value(root: RootKey, path: Option<&str>, name: &str) -> Result<Option<ValueDescriptor>> {
        registry().read_value(root, path, name)
    }

    /// Writes a value to the Windows registry.
    pub fn set_value(
        root: RootKey,
        path: Option<&str>,
        name: &str,
        value_type: ValueType,
        value: &str,
    ) -> Result<bool> {
        registry().set_value(root, path, name, value_type, value)
    }

    /// Creates a key in the Windows registry.
    pub fn create_key(root: RootKey, path: Option<&str>) -> Result<bool> {
        registry().create_key(root, path)
    }
}

#[cfg(windows)]
pub use system::{create_key, enumerate_keys, enumerate_values, read_value, set_value};
