//! Backslash-delimited key paths.

use std::fmt;

/// Path separator used by the registry.
pub const SEPARATOR: char = '\\';

/// Maximum length of a single key name, in UTF-16 code units.
pub const MAX_KEY_NAME_LEN: usize = 255;

/// A path below a root key.
///
/// Segments are kept verbatim: `"a\\\\b"` has an empty middle segment,
/// which backends reject as an invalid path. The empty path denotes the
/// root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a textual path. `None` and `""` both denote the root.
    pub fn parse(path: Option<&str>) -> Self {
        match path {
            None | Some("") => Self::root(),
            Some(text) => Self {
                segments: text.split(SEPARATOR).map(str::to_string).collect(),
            },
        }
    }

    /// Builds a path from already split segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true if this path denotes the root itself.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `name` appended.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(KeyPath::parse(Some(name)).segments);
        Self { segments }
    }

    /// Returns the first segment that cannot name a key, if any.
    ///
    /// A segment is invalid when it is empty or longer than
    /// [`MAX_KEY_NAME_LEN`] UTF-16 code units.
    pub fn invalid_segment(&self) -> Option<&str> {
        self.segments
            .iter()
            .find(|segment| segment.is_empty() || segment.encode_utf16().count() > MAX_KEY_NAME_LEN)
            .map(String::as_str)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("\\"))
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        KeyPath::parse(Some(path))
    }
}

impl From<Option<&str>> for KeyPath {
    fn from(path: Option<&str>) -> Self {
        KeyPath::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_are_root() {
        assert!(KeyPath::parse(None).is_root());
        assert!(KeyPath::parse(Some("")).is_root());
        assert_eq!(KeyPath::parse(None), KeyPath::parse(Some("")));
    }

    #[test]
    fn test_segments_and_display() {
        let path = KeyPath::from(r"SOFTWARE\Microsoft\Windows");
        assert_eq!(path.segments(), ["SOFTWARE", "Microsoft", "Windows"]);
        assert_eq!(path.to_string(), r"SOFTWARE\Microsoft\Windows");
        assert_eq!(path.join(r"CurrentVersion\Run").segments().len(), 5);
    }

    #[test]
    fn test_invalid_segments() {
        assert_eq!(KeyPath::from(r"a\\b").invalid_segment(), Some(""));
        assert_eq!(KeyPath::from(r"trailing\").invalid_segment(), Some(""));
        let long = "x".repeat(MAX_KEY_NAME_LEN + 1);
        assert!(KeyPath::from(long.as_str()).invalid_segment().is_some());
        assert!(KeyPath::from(r"SOFTWARE\Valid Name").invalid_segment().is_none());
    }
}
