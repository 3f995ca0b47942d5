//! Archive entries and entry-name sanitation.

use std::path::{Component, Path};
use time::Date;

/// A single file unpacked from a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Normalized, `/`-separated path relative to the archive root.
    pub path: String,
    /// Uncompressed file contents.
    pub data: Vec<u8>,
    /// Modification date recorded by the archive, if any.
    pub modified: Option<Date>,
}

impl Entry {
    /// The last path segment (`Maps/DM-Foo.unr` → `DM-Foo.unr`).
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Normalizes an archive entry name into a relative `/`-separated path.
///
/// Archives built on Windows frequently use backslashes, so both separators
/// are accepted. Returns `None` for names that would escape the archive root,
/// that contain null bytes, or that are empty once normalized.
///
/// ```
/// use ua_archive::normalize_entry_name;
/// assert_eq!(normalize_entry_name("Maps\\DM-Foo.unr").as_deref(), Some("Maps/DM-Foo.unr"));
/// assert_eq!(normalize_entry_name("../../etc/passwd"), None);
/// ```
pub fn normalize_entry_name(name: &str) -> Option<String> {
    if name.contains('\0') {
        return None;
    }
    let unified = name.replace('\\', "/");
    let mut components: Vec<&str> = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(s) => components.push(s.to_str()?),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return None,
            Component::ParentDir => {
                components.pop()?;
            },
        }
    }
    match components.is_empty() {
        true => None,
        false => Some(components.join("/")),
    }
}
