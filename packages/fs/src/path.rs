//! Absolute paths in the unified namespace.

use std::fmt;

use serde::{Deserialize, Serialize};

use unifs_backing_store::RawPath;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A path segment is not a valid file name.
    #[error("invalid path segment '{segment}' at position {position}: {message}")]
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
}

/// A validated absolute path in the unified namespace.
///
/// Paths use `/` as the separator; the empty segment list is the namespace
/// root `/`. Segments are plain ASCII file names - no separators, no `.`
/// or `..`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The namespace root `/`.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    /// Parse a path string, validating segments.
    ///
    /// # Path Syntax
    ///
    /// - Segments are separated by `/`
    /// - Empty segments are ignored (normalizes `//`, leading and trailing `/`)
    /// - Each segment must be a plain ASCII file name
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unifs_fs::Path;
    ///
    /// let path = Path::parse("/users/alice/notes.txt").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// // Trailing slashes are normalized
    /// assert_eq!(Path::parse("/a/b/").unwrap(), Path::parse("/a/b").unwrap());
    ///
    /// // The root is the empty path
    /// assert!(Path::parse("/").unwrap().is_root());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let segments: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        for (i, segment) in segments.iter().enumerate() {
            Self::validate_segment(segment, i)?;
        }

        Ok(Path { segments })
    }

    fn validate_segment(segment: &str, position: usize) -> Result<(), PathError> {
        if segment == "." || segment == ".." {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                position,
                message: "relative segments are not allowed".to_string(),
            });
        }

        for c in segment.chars() {
            if !c.is_ascii() || c.is_ascii_control() {
                return Err(PathError::InvalidSegment {
                    segment: segment.to_string(),
                    position,
                    message: format!("invalid character {:?} in file name", c),
                });
            }
        }

        Ok(())
    }

    /// Whether this is the namespace root `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments (same as [`is_root`](Self::is_root)).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.segments.iter()
    }

    /// The final segment, if any. The root has no name.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path without its final segment. `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Extend this path with one child segment.
    pub fn child(&self, name: &str) -> Result<Path, PathError> {
        Self::validate_segment(name, self.segments.len())?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Path { segments })
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// The path made of segments `[start..]`.
    ///
    /// Used by mount resolution to rewrite `/mnt/<name>/rest` to `/rest`.
    #[must_use]
    pub fn slice_from(&self, start: usize) -> Path {
        Path {
            segments: self.segments[start.min(self.segments.len())..].to_vec(),
        }
    }

    /// Whether `prefix`'s segments are a leading run of this path's.
    ///
    /// Every path starts with the root; a path starts with itself.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Convert to the raw segment list handed to backing stores.
    pub fn to_raw(&self) -> RawPath {
        self.segments.clone()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use unifs_fs::path;
///
/// let p = path!("/users/alice");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(Path::parse("/").unwrap().len(), 0);
        assert_eq!(Path::parse("/foo").unwrap().len(), 1);
        assert_eq!(Path::parse("/foo/bar.txt").unwrap().len(), 2);
    }

    #[test]
    fn root_is_empty() {
        assert!(Path::root().is_root());
        assert!(Path::parse("/").unwrap().is_root());
        assert!(Path::parse("").unwrap().is_root());
    }

    #[test]
    fn normalize_slashes() {
        assert_eq!(Path::parse("/a/b/").unwrap(), Path::parse("/a/b").unwrap());
        assert_eq!(Path::parse("a//b").unwrap(), Path::parse("/a/b").unwrap());
    }

    #[test]
    fn file_names_with_dots_allowed() {
        let p = path!("/docs/report.final.pdf");
        assert_eq!(p.name(), Some("report.final.pdf"));
    }

    #[test]
    fn relative_segments_rejected() {
        assert!(Path::parse("/a/./b").is_err());
        assert!(Path::parse("/a/../b").is_err());
    }

    #[test]
    fn non_ascii_rejected() {
        assert!(Path::parse("/docs/名前").is_err());
        assert!(Path::parse("/a\u{0007}b").is_err());
    }

    #[test]
    fn spaces_allowed() {
        let p = Path::parse("/My Documents/new file.txt").unwrap();
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn name_and_parent() {
        let p = path!("/a/b/c.txt");
        assert_eq!(p.name(), Some("c.txt"));
        assert_eq!(p.parent(), Some(path!("/a/b")));
        assert_eq!(Path::root().name(), None);
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn child_extends() {
        let p = path!("/a").child("b.txt").unwrap();
        assert_eq!(p, path!("/a/b.txt"));
        assert!(path!("/a").child("..").is_err());
    }

    #[test]
    fn join_paths() {
        assert_eq!(path!("/a/b").join(&path!("/c/d")), path!("/a/b/c/d"));
        assert_eq!(path!("/a").join(&Path::root()), path!("/a"));
        assert_eq!(Path::root().join(&path!("/a")), path!("/a"));
    }

    #[test]
    fn slice_from_rewrites() {
        let p = path!("/mnt/backup/docs/a.txt");
        assert_eq!(p.slice_from(2), path!("/docs/a.txt"));
        assert_eq!(p.slice_from(4), Path::root());
        assert_eq!(p.slice_from(10), Path::root());
    }

    #[test]
    fn starts_with_prefixes() {
        assert!(path!("/a/b/c").starts_with(&path!("/a/b")));
        assert!(path!("/a/b").starts_with(&path!("/a/b")));
        assert!(path!("/a/b").starts_with(&Path::root()));
        assert!(!path!("/a/b").starts_with(&path!("/a/b/c")));
        assert!(!path!("/ab/c").starts_with(&path!("/a")));
    }

    #[test]
    fn display_impl() {
        assert_eq!(format!("{}", path!("/a/b")), "/a/b");
        assert_eq!(format!("{}", Path::root()), "/");
    }

    #[test]
    fn to_raw_segments() {
        let raw = path!("/a/b.txt").to_raw();
        assert_eq!(raw, vec!["a".to_string(), "b.txt".to_string()]);
        assert!(Path::root().to_raw().is_empty());
    }

    #[test]
    fn index_trait() {
        let p = path!("/mnt/backup");
        assert_eq!(&p[0], "mnt");
        assert_eq!(&p[1], "backup");
    }

    #[test]
    fn path_hash_and_ord() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(path!("/a"));
        set.insert(path!("/b"));
        set.insert(path!("/a"));
        assert_eq!(set.len(), 2);
        assert!(path!("/a/b") < path!("/a/c"));
    }

    #[test]
    fn error_display() {
        let err = Path::parse("/a/../b").unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains(".."));
        assert!(display.contains("position 1"));
    }
}
