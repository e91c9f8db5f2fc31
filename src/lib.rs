//! # Windows Registry Access
//!
//! Typed access to the Windows registry: enumerate subkeys and values, read
//! values decoded into Rust types, write typed values and create keys.
//!
//! ## Features
//!
//! - **Typed values**: raw registry blobs are decoded into [`ValueData`]
//!   immediately, so calling code never inspects bytes
//! - **Forgiving reads**: enumerating a key that does not exist yields an
//!   empty list instead of an error
//! - **Checked writes**: writes of unsupported types or unconvertible values
//!   return `false` and never reach the registry
//! - **Pluggable backends**: the live registry on Windows, or an in-memory
//!   registry anywhere (handy for tests)
//!
//! ## Architecture
//!
//! The crate is built in layers:
//!
//! 1. **Value codec** ([`value`]): raw blob (type tag + bytes) to and from
//!    [`ValueData`]
//! 2. **Enumeration** ([`enumerate`]): indexed backend enumeration collected
//!    into lists, missing keys collapsed into empty results
//! 3. **Writes** ([`write`]): writable-type validation, encoding, key creation
//! 4. **Backends** ([`backend`]): open/create/enumerate/set primitives
//! 5. **Facade** ([`Registry`]): binds a backend and [`RegistryOptions`]
//!
//! ## Value Encoding
//!
//! ```text
//! REG_SZ / REG_EXPAND_SZ   UTF-16LE text, NUL terminated
//! REG_DWORD                4 bytes, little-endian
//! REG_DWORD_BIG_ENDIAN     4 bytes, big-endian
//! REG_QWORD                8 bytes, little-endian
//! REG_MULTI_SZ             UTF-16LE strings, each NUL terminated, then one more NUL
//! REG_BINARY and others    bytes as stored
//! ```
//!
//! Only `REG_SZ`, `REG_EXPAND_SZ` and `REG_DWORD` can be written.
//! Environment references in `REG_EXPAND_SZ` data (`%ProgramFiles%`) are
//! never expanded.
//!
//! ## Examples
//!
//! ### Reading
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> reg_access::Result<()> {
//! use reg_access::{enumerate_values, RootKey, ValueData};
//!
//! let values = enumerate_values(
//!     RootKey::LocalMachine,
//!     Some(r"SOFTWARE\Microsoft\Windows\CurrentVersion"),
//! )?;
//!
//! for value in &values {
//!     println!("{} ({}) = {}", value.name, value.value_type(), value.data);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! ### Writing
//!
//! ```
//! use reg_access::{MemoryBackend, Registry, RootKey, ValueType};
//!
//! # fn main() -> reg_access::Result<()> {
//! let registry = Registry::new(MemoryBackend::new());
//!
//! assert!(registry.create_key(RootKey::CurrentUser, Some(r"SOFTWARE\Vendor\App"))?);
//! assert!(registry.set_value(
//!     RootKey::CurrentUser,
//!     Some(r"SOFTWARE\Vendor\App"),
//!     "Path",
//!     ValueType::ExpandString,
//!     r"%NVM_HOME%;%NVM_SYMLINK%",
//! )?);
//!
//! // Multi-string writes are not supported: rejected, not an error.
//! assert!(!registry.set_value(
//!     RootKey::CurrentUser,
//!     Some(r"SOFTWARE\Vendor\App"),
//!     "List",
//!     ValueType::MultiString,
//!     "a",
//! )?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod enumerate;
pub mod error;
pub mod path;
pub mod registry;
pub mod root;
pub mod utils;
pub mod value;
pub mod value_type;
pub mod write;

// Python bindings (only compiled when python feature is enabled)
#[cfg(all(feature = "python", windows))]
pub mod python;

// Re-export main types for convenience
pub use backend::{Access, AccessMode, KeyGuard, MemoryBackend, RegistryBackend, RegistryView};
#[cfg(windows)]
pub use backend::NativeBackend;
pub use error::{RegistryError, Result};
pub use path::KeyPath;
pub use registry::{Registry, RegistryOptions};
#[cfg(windows)]
pub use registry::{create_key, enumerate_keys, enumerate_values, read_value, set_value};
pub use root::RootKey;
pub use value::{decode, encode, RawValue, ValueData, ValueDescriptor};
pub use value_type::ValueType;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
