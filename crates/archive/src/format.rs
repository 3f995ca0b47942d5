use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
const RAR_MAGIC: [u8; 6] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07];
const SEVEN_ZIP_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// A supported submission container.
///
/// Submissions arrive either as a multi-file archive (zip, RAR, 7z), a single
/// compressed file (`DM-Foo.unr.gz`), or a bare file. Defaults to
/// [`Plain`](Self::Plain).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Not an archive; the file itself is the only entry.
    #[default]
    Plain,
    /// Zip archive (.zip)
    Zip,
    /// Single gzip-compressed file (.gz)
    Gzip,
    /// Single bzip2-compressed file (.bz2)
    Bzip2,
    /// RAR archive, versions 1.5 through 5 (.rar)
    Rar,
    /// 7-Zip archive (.7z)
    SevenZip,
}

impl ArchiveFormat {
    /// Returns the short name (for displaying to user).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Plain => "plain",
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Gzip => "gzip",
            ArchiveFormat::Bzip2 => "bzip2",
            ArchiveFormat::Rar => "rar",
            ArchiveFormat::SevenZip => "7z",
        }
    }

    /// Returns the file extension (including the dot) for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Plain => "",
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Gzip => ".gz",
            ArchiveFormat::Bzip2 => ".bz2",
            ArchiveFormat::Rar => ".rar",
            ArchiveFormat::SevenZip => ".7z",
        }
    }

    /// Detect the container from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| match ext.to_lowercase().as_str() {
                "zip" => ArchiveFormat::Zip,
                "gz" => ArchiveFormat::Gzip,
                "bz2" => ArchiveFormat::Bzip2,
                "rar" => ArchiveFormat::Rar,
                "7z" => ArchiveFormat::SevenZip,
                _ => ArchiveFormat::Plain,
            })
            .unwrap_or(ArchiveFormat::Plain)
    }

    /// Detect the container from magic bytes.
    pub fn from_magic_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
            return Ok(ArchiveFormat::Zip);
        }
        if bytes.starts_with(&GZIP_MAGIC) {
            return Ok(ArchiveFormat::Gzip);
        }
        if bytes.starts_with(&BZIP2_MAGIC) {
            return Ok(ArchiveFormat::Bzip2);
        }
        if bytes.starts_with(&RAR_MAGIC) {
            return Ok(ArchiveFormat::Rar);
        }
        if bytes.starts_with(&SEVEN_ZIP_MAGIC) {
            return Ok(ArchiveFormat::SevenZip);
        }
        Ok(ArchiveFormat::Plain)
    }

    /// Detect the container, trusting content over the file name.
    ///
    /// Magic bytes win whenever they identify a container. A file whose
    /// extension claims a container that its bytes don't carry is treated
    /// as plain, since a mislabelled map is still a map.
    pub fn detect(path: impl AsRef<Path>, bytes: &[u8]) -> Result<Self> {
        let by_content = Self::from_magic_bytes(bytes)?;
        let by_name = Self::from_path(path.as_ref());
        if by_content == ArchiveFormat::Plain && by_name != ArchiveFormat::Plain {
            tracing::debug!(
                path = %path.as_ref().display(),
                claimed = %by_name,
                "Archive extension does not match content; treating as plain file"
            );
        }
        Ok(by_content)
    }
}

impl Display for ArchiveFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "none" => Ok(ArchiveFormat::Plain),
            "zip" => Ok(ArchiveFormat::Zip),
            "gz" | "gzip" => Ok(ArchiveFormat::Gzip),
            "bz2" | "bzip2" => Ok(ArchiveFormat::Bzip2),
            "rar" => Ok(ArchiveFormat::Rar),
            "7z" | "7zip" => Ok(ArchiveFormat::SevenZip),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}
