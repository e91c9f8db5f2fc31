//! In-process registry backend.
//!
//! Keys live in an ordered tree per root. Names compare case-insensitively
//! but keep the case they were created with, and enumeration yields keys
//! and values in insertion order, like the native registry does for a
//! freshly written key. The registry view is ignored: both views address
//! the same tree.

use super::{Access, AccessMode, RegistryBackend};
use crate::error::{RegistryError, Result};
use crate::path::KeyPath;
use crate::root::RootKey;
use crate::value::RawValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// A key in the in-memory tree.
#[derive(Debug, Default)]
struct Node {
    name: String,
    subkeys: Vec<Node>,
    values: Vec<(String, RawValue)>,
}

impl Node {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.subkeys.iter().find(|n| same_name(&n.name, name))
    }

    fn find(&self, segments: &[String]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    fn find_mut(&mut self, segments: &[String]) -> Option<&mut Node> {
        let mut node = self;
        for segment in segments {
            node = node.subkeys.iter_mut().find(|n| same_name(&n.name, segment))?;
        }
        Some(node)
    }

    /// Walks `segments`, creating missing keys. Returns the canonical
    /// (stored-case) names of the walked path.
    fn find_or_create(&mut self, segments: &[String]) -> (&mut Node, Vec<String>) {
        let mut node = self;
        let mut canonical = Vec::with_capacity(segments.len());
        for segment in segments {
            let index = match node.subkeys.iter().position(|n| same_name(&n.name, segment)) {
                Some(index) => index,
                None => {
                    node.subkeys.push(Node::named(segment));
                    node.subkeys.len() - 1
                }
            };
            node = &mut node.subkeys[index];
            canonical.push(node.name.clone());
        }
        (node, canonical)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Handle to a key of a [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryKey {
    root: RootKey,
    segments: Vec<String>,
    mode: AccessMode,
}

impl MemoryKey {
    /// Root the key lives under.
    pub fn root(&self) -> RootKey {
        self.root
    }

    /// Path of the key, in the case it was created with.
    pub fn path(&self) -> KeyPath {
        KeyPath::from_segments(self.segments.clone())
    }
}

/// An in-memory registry.
///
/// Thread-safe: the tree sits behind a `RwLock`, so a shared reference can
/// be used from several threads.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    roots: RwLock<HashMap<RootKey, Node>>,
    restricted: RwLock<Vec<(RootKey, Vec<String>)>>,
    open_handles: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value directly, creating the key path as needed.
    ///
    /// Bypasses type validation so callers can seed any blob, including
    /// ones the codec would reject.
    pub fn seed_value(
        &self,
        root: RootKey,
        path: impl Into<KeyPath>,
        name: &str,
        value: RawValue,
    ) -> Result<()> {
        let path = path.into();
        if let Some(segment) = path.invalid_segment() {
            return Err(RegistryError::InvalidPath(format!("{}\\{} ({:?})", root, path, segment)));
        }
        let mut roots = self.roots.write().expect("registry lock poisoned");
        let root_node = roots.entry(root).or_default();
        let (node, _) = root_node.find_or_create(path.segments());
        store_value(node, name, value);
        Ok(())
    }

    /// Denies every access to `path` and everything below it.
    pub fn restrict(&self, root: RootKey, path: impl Into<KeyPath>) {
        let path = path.into();
        let lowered = path.segments().iter().map(|s| s.to_lowercase()).collect();
        self.restricted
            .write()
            .expect("restriction lock poisoned")
            .push((root, lowered));
    }

    /// Number of handles opened and not yet closed.
    pub fn open_handle_count(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn check_access(&self, root: RootKey, path: &KeyPath) -> Result<()> {
        let restricted = self.restricted.read().expect("restriction lock poisoned");
        let denied = restricted.iter().any(|(r, prefix)| {
            *r == root
                && prefix.len() <= path.segments().len()
                && prefix
                    .iter()
                    .zip(path.segments())
                    .all(|(p, s)| *p == s.to_lowercase())
        });
        if denied {
            return Err(RegistryError::AccessDenied(format!("{}\\{}", root, path)));
        }
        Ok(())
    }

    fn hand_out(&self, root: RootKey, segments: Vec<String>, access: Access) -> MemoryKey {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        MemoryKey {
            root,
            segments,
            mode: access.mode,
        }
    }

    fn key_gone(key: &MemoryKey) -> RegistryError {
        RegistryError::not_found("key", &format!("{}\\{}", key.root, key.path()))
    }
}

fn store_value(node: &mut Node, name: &str, value: RawValue) {
    match node.values.iter_mut().find(|(n, _)| same_name(n, name)) {
        Some(slot) => slot.1 = value,
        None => node.values.push((name.to_string(), value)),
    }
}

impl RegistryBackend for MemoryBackend {
    type Key = MemoryKey;

    fn open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<MemoryKey> {
        self.check_access(root, path)?;
        let roots = self.roots.read().expect("registry lock poisoned");

        let segments = if path.is_root() {
            Vec::new()
        } else {
            // Walk with canonical names so enumeration later finds the same node.
            let mut node = roots
                .get(&root)
                .ok_or_else(|| RegistryError::not_found("key", &format!("{}\\{}", root, path)))?;
            let mut canonical = Vec::with_capacity(path.segments().len());
            for segment in path.segments() {
                node = node
                    .child(segment)
                    .ok_or_else(|| RegistryError::not_found("key", &format!("{}\\{}", root, path)))?;
                canonical.push(node.name.clone());
            }
            canonical
        };

        Ok(self.hand_out(root, segments, access))
    }

    fn create_or_open_key(&self, root: RootKey, path: &KeyPath, access: Access) -> Result<MemoryKey> {
        if let Some(segment) = path.invalid_segment() {
            return Err(RegistryError::InvalidPath(format!(
                "{}\\{} has invalid segment {:?}",
                root, path, segment
            )));
        }
        self.check_access(root, path)?;

        let mut roots = self.roots.write().expect("registry lock poisoned");
        let root_node = roots.entry(root).or_default();
        let (_, canonical) = root_node.find_or_create(path.segments());
        debug!(%root, %path, "Key present after create");

        Ok(self.hand_out(root, canonical, access))
    }

    fn close_key(&self, key: MemoryKey) {
        drop(key);
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }

    fn enum_key_at(&self, key: &MemoryKey, index: u32) -> Result<Option<String>> {
        let roots = self.roots.read().expect("registry lock poisoned");
        let node = match roots.get(&key.root) {
            Some(root_node) => root_node.find(&key.segments).ok_or_else(|| Self::key_gone(key))?,
            None if key.segments.is_empty() => return Ok(None),
            None => return Err(Self::key_gone(key)),
        };
        Ok(node.subkeys.get(index as usize).map(|n| n.name.clone()))
    }

    fn enum_value_at(&self, key: &MemoryKey, index: u32) -> Result<Option<(String, RawValue)>> {
        let roots = self.roots.read().expect("registry lock poisoned");
        let node = match roots.get(&key.root) {
            Some(root_node) => root_node.find(&key.segments).ok_or_else(|| Self::key_gone(key))?,
            None if key.segments.is_empty() => return Ok(None),
            None => return Err(Self::key_gone(key)),
        };
        Ok(node.values.get(index as usize).cloned())
    }

    fn set_raw_value(&self, key: &MemoryKey, name: &str, value: &RawValue) -> Result<()> {
        if key.mode != AccessMode::Write {
            return Err(RegistryError::AccessDenied(format!(
                "{}\\{} was opened read-only",
                key.root,
                key.path()
            )));
        }
        let mut roots = self.roots.write().expect("registry lock poisoned");
        let node = roots
            .get_mut(&key.root)
            .and_then(|root_node| root_node.find_mut(&key.segments))
            .ok_or_else(|| Self::key_gone(key))?;
        store_value(node, name, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RegistryView;
    use crate::value::ValueData;
    use crate::ValueType;

    fn read() -> Access {
        Access::read(RegistryView::Default)
    }

    fn write() -> Access {
        Access::write(RegistryView::Default)
    }

    #[test]
    fn test_open_missing_key_is_not_found() {
        let backend = MemoryBackend::new();
        let result = backend.open_key(RootKey::LocalMachine, &KeyPath::from("SOFTWARE"), read());
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
        assert_eq!(backend.open_handle_count(), 0);
    }

    #[test]
    fn test_open_root_of_empty_registry() {
        let backend = MemoryBackend::new();
        let key = backend.open_key(RootKey::Users, &KeyPath::root(), read()).unwrap();
        assert_eq!(backend.enum_key_at(&key, 0).unwrap(), None);
        assert_eq!(backend.enum_value_at(&key, 0).unwrap(), None);
        backend.close_key(key);
        assert_eq!(backend.open_handle_count(), 0);
    }

    #[test]
    fn test_create_is_case_insensitive_and_case_preserving() {
        let backend = MemoryBackend::new();
        let key = backend
            .create_or_open_key(RootKey::CurrentUser, &KeyPath::from(r"Software\Vendor"), write())
            .unwrap();
        backend.close_key(key);

        let key = backend
            .create_or_open_key(RootKey::CurrentUser, &KeyPath::from(r"SOFTWARE\VENDOR\App"), write())
            .unwrap();
        assert_eq!(key.path().to_string(), r"Software\Vendor\App");
        backend.close_key(key);

        let root = backend.open_key(RootKey::CurrentUser, &KeyPath::root(), read()).unwrap();
        assert_eq!(backend.enum_key_at(&root, 0).unwrap().as_deref(), Some("Software"));
        assert_eq!(backend.enum_key_at(&root, 1).unwrap(), None);
        backend.close_key(root);
    }

    #[test]
    fn test_set_value_replaces_existing() {
        let backend = MemoryBackend::new();
        let key = backend.create_or_open_key(RootKey::CurrentUser, &KeyPath::from("K"), write()).unwrap();
        backend.set_raw_value(&key, "v", &RawValue::new(ValueType::Dword, vec![1, 0, 0, 0])).unwrap();
        backend.set_raw_value(&key, "V", &RawValue::new(ValueType::Dword, vec![2, 0, 0, 0])).unwrap();

        let (name, raw) = backend.enum_value_at(&key, 0).unwrap().unwrap();
        assert_eq!(name, "v");
        assert_eq!(crate::value::decode(&raw).unwrap(), ValueData::Dword(2));
        assert_eq!(backend.enum_value_at(&key, 1).unwrap(), None);
        backend.close_key(key);
    }

    #[test]
    fn test_read_only_handle_rejects_writes() {
        let backend = MemoryBackend::new();
        backend
            .seed_value(RootKey::CurrentUser, "K", "v", RawValue::new(ValueType::Binary, vec![]))
            .unwrap();
        let key = backend.open_key(RootKey::CurrentUser, &KeyPath::from("K"), read()).unwrap();
        let result = backend.set_raw_value(&key, "v", &RawValue::new(ValueType::Binary, vec![1]));
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
        backend.close_key(key);
    }

    #[test]
    fn test_restricted_subtree() {
        let backend = MemoryBackend::new();
        backend.restrict(RootKey::LocalMachine, r"SECURITY");
        let result = backend.create_or_open_key(RootKey::LocalMachine, &KeyPath::from(r"Security\Policy"), write());
        assert!(matches!(result, Err(RegistryError::AccessDenied(_))));
        assert!(backend
            .create_or_open_key(RootKey::CurrentUser, &KeyPath::from("SECURITY"), write())
            .is_ok());
    }

    #[test]
    fn test_create_rejects_invalid_segments() {
        let backend = MemoryBackend::new();
        let result = backend.create_or_open_key(RootKey::CurrentUser, &KeyPath::from(r"a\\b"), write());
        assert!(matches!(result, Err(RegistryError::InvalidPath(_))));
        assert_eq!(backend.open_handle_count(), 0);
    }
}
