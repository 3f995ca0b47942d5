use std::fmt;
use ua_package::PackageHeader;

/// What part a file plays in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileRole {
    Map,
    /// Compiled script package (`.u`).
    Code,
    /// Texture, sound, music, static mesh and similar resource packages.
    Package,
    /// Engine metadata descriptors (`.int`, `.ucl`, `.upl`).
    Int,
    Image,
    Text,
    Html,
    /// Any file another package may import from: the union of
    /// [`Map`](Self::Map), [`Code`](Self::Code), [`Package`](Self::Package)
    /// and [`Int`](Self::Int).
    Important,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Map => "map",
            FileRole::Code => "code",
            FileRole::Package => "package",
            FileRole::Int => "int",
            FileRole::Image => "image",
            FileRole::Text => "text",
            FileRole::Html => "html",
            FileRole::Important => "important",
        }
    }

    /// Roles for a file, derived from its extension and, for unknown
    /// extensions, from a package signature at the start of `data`.
    ///
    /// ```
    /// use ua_index::FileRole;
    /// assert_eq!(FileRole::detect("Maps/DM-Foo.UNR", b""), vec![FileRole::Map, FileRole::Important]);
    /// assert_eq!(FileRole::detect("Readme.txt", b""), vec![FileRole::Text]);
    /// assert!(FileRole::detect("setup.exe", b"MZ").is_empty());
    /// ```
    pub fn detect(path: &str, data: &[u8]) -> Vec<FileRole> {
        let ext = extension(path).to_ascii_lowercase();
        let primary = match ext.as_str() {
            "unr" | "ut2" | "ut3" | "un2" => Some(FileRole::Map),
            "u" => Some(FileRole::Code),
            "utx" | "uax" | "umx" | "usx" | "ukx" | "upx" => Some(FileRole::Package),
            "int" | "ucl" | "upl" => Some(FileRole::Int),
            "png" | "bmp" | "jpg" | "jpeg" | "gif" | "pcx" | "tga" => Some(FileRole::Image),
            "txt" | "nfo" => Some(FileRole::Text),
            "htm" | "html" => Some(FileRole::Html),
            _ if PackageHeader::is_package(data) => Some(FileRole::Package),
            _ => None,
        };
        match primary {
            Some(role @ (FileRole::Map | FileRole::Code | FileRole::Package | FileRole::Int)) => {
                vec![role, FileRole::Important]
            },
            Some(role) => vec![role],
            None => vec![],
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extension of the last path segment, without the dot. Empty when there is
/// none.
pub(crate) fn extension(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}
