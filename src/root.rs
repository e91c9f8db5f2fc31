//! Predefined registry root keys.

use crate::error::{RegistryError, Result};
use std::fmt;
use std::str::FromStr;

/// One of the fixed top-level registry namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKey {
    /// `HKEY_CLASSES_ROOT` - file associations and COM registration.
    ClassesRoot,

    /// `HKEY_CURRENT_USER` - per-user settings.
    CurrentUser,

    /// `HKEY_LOCAL_MACHINE` - machine-wide settings.
    LocalMachine,

    /// `HKEY_USERS` - all loaded user profiles.
    Users,

    /// `HKEY_CURRENT_CONFIG` - current hardware profile.
    CurrentConfig,
}

impl RootKey {
    /// All predefined roots.
    pub const ALL: [RootKey; 5] = [
        RootKey::ClassesRoot,
        RootKey::CurrentUser,
        RootKey::LocalMachine,
        RootKey::Users,
        RootKey::CurrentConfig,
    ];

    /// Returns the canonical name, e.g. `HKEY_LOCAL_MACHINE`.
    pub fn name(&self) -> &'static str {
        match self {
            RootKey::ClassesRoot => "HKEY_CLASSES_ROOT",
            RootKey::CurrentUser => "HKEY_CURRENT_USER",
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE",
            RootKey::Users => "HKEY_USERS",
            RootKey::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    /// Returns the short alias, e.g. `HKLM`.
    pub fn short_name(&self) -> &'static str {
        match self {
            RootKey::ClassesRoot => "HKCR",
            RootKey::CurrentUser => "HKCU",
            RootKey::LocalMachine => "HKLM",
            RootKey::Users => "HKU",
            RootKey::CurrentConfig => "HKCC",
        }
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RootKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        RootKey::ALL
            .into_iter()
            .find(|root| s.eq_ignore_ascii_case(root.name()) || s.eq_ignore_ascii_case(root.short_name()))
            .ok_or_else(|| RegistryError::not_found("root key", s))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RootKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("HKEY_LOCAL_MACHINE".parse::<RootKey>().unwrap(), RootKey::LocalMachine);
        assert_eq!("hkcu".parse::<RootKey>().unwrap(), RootKey::CurrentUser);
        assert!("HKEY_DYN_DATA".parse::<RootKey>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RootKey::Users.to_string(), "HKEY_USERS");
    }
}
