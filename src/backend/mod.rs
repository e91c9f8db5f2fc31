//! Registry backends.
//!
//! A backend exposes the primitive operations the marshaling layer drives:
//! open, create-or-open, indexed enumeration of subkeys and values, raw
//! value writes and handle release. Two implementations ship with the
//! crate:
//!
//! - [`MemoryBackend`]: an in-process tree, platform independent.
//! - `NativeBackend`: the Windows registry (only on `cfg(windows)`).

pub mod memory;
#[cfg(windows)]
pub mod native;

pub use memory::MemoryBackend;
#[cfg(windows)]
pub use native::NativeBackend;

use crate::error::Result;
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::RawValue;
use tracing::debug;

/// Requested access rights for an open key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Query and enumerate only.
    Read,
    /// Read plus value writes and subkey creation.
    Write,
}

/// Which registry view a 64-bit aware backend should address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RegistryView {
    /// The view native to the calling process.
    #[default]
    Default,
    /// Force the 64-bit view (`KEY_WOW64_64KEY`).
    Force64,
    /// Force the 32-bit view (`KEY_WOW64_32KEY`).
    Force32,
}

/// Access passed to [`RegistryBackend::open_key`] and
/// [`RegistryBackend::create_or_open_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Access {
    /// Read or write.
    pub mode: AccessMode,
    /// Registry view.
    pub view: RegistryView,
}

impl Access {
    /// Read access in the given view.
    pub fn read(view: RegistryView) -> Self {
        Self {
            mode: AccessMode::Read,
            view,
        }
    }

    /// Write access in the given view.
    pub fn write(view: RegistryView) -> Self {
        Self {
            mode: AccessMode::Write,
            view,
        }
    }
}

/// Primitive registry operations.
///
/// Keys returned by `open_key` / `create_or_open_key` must be handed back
/// to `close_key`; [`KeyGuard`] does that on every exit path.
pub trait RegistryBackend {
    /// An open key handle.
    type Key;

    /// Opens an existing key.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key does not exist; any other error for genuine
    /// failures (access denied, invalid path, I/O).
    fn open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<Self::Key>;

    /// Opens a key, creating it and any missing intermediate keys first.
    fn create_or_open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<Self::Key>;

    /// Releases a key handle.
    fn close_key(&self, key: Self::Key);

    /// Returns the subkey name at `index`, or `None` once past the last one.
    fn enum_key_at(&self, key: &Self::Key, index: u32) -> Result<Option<String>>;

    /// Returns the value at `index`, or `None` once past the last one.
    fn enum_value_at(&self, key: &Self::Key, index: u32) -> Result<Option<(String, RawValue)>>;

    /// Stores a raw value under `name`, replacing any existing value.
    fn set_raw_value(&self, key: &Self::Key, name: &str, value: &RawValue) -> Result<()>;
}

/// Scoped key handle that closes itself on drop.
pub struct KeyGuard<'a, B: RegistryBackend + ?Sized> {
    backend: &'a B,
    key: Option<B::Key>,
}

impl<'a, B: RegistryBackend + ?Sized> KeyGuard<'a, B> {
    /// Opens an existing key.
    pub fn open(backend: &'a B, root: RootKey, path: &KeyPath, access: Access) -> Result<Self> {
        let key = backend.open_key(root, path, access)?;
        debug!(%root, %path, ?access, "Opened key");
        Ok(Self {
            backend,
            key: Some(key),
        })
    }

    /// Opens a key, creating it first if necessary.
    pub fn create(backend: &'a B, root: RootKey, path: &KeyPath, access: Access) -> Result<Self> {
        let key = backend.create_or_open_key(root, path, access)?;
        debug!(%root, %path, ?access, "Created or opened key");
        Ok(Self {
            backend,
            key: Some(key),
        })
    }

    /// Returns the open handle.
    pub fn key(&self) -> &B::Key {
        // Only `drop` takes the key out.
        self.key.as_ref().expect("key guard already closed")
    }
}

impl<B: RegistryBackend + ?Sized> Drop for KeyGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.backend.close_key(key);
        }
    }
}
