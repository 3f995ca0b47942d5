//! Unpacking of user-submitted content archives.
//!
//! Submissions are small, so everything is unpacked into memory up front:
//!
//! - **Format detection** from magic bytes ([`ArchiveFormat::from_magic_bytes`])
//!   with the file extension as a hint ([`ArchiveFormat::from_path`])
//! - **Zip**, **RAR** and **7z** archives yield every file entry, with the
//!   archive's timestamps
//! - **Gzip/Bzip2** single-file submissions yield one entry named after the
//!   archive minus its compression extension
//! - Anything else is passed through as a single entry
//!
//! Entry names are normalized with [`normalize_entry_name`]; entries that try
//! to escape the archive root are dropped.

mod entry;
pub mod error;
mod format;
mod unpack;

pub use crate::entry::{Entry, normalize_entry_name};
pub use crate::format::ArchiveFormat;
pub use crate::unpack::{DEFAULT_MAX_ENTRY_SIZE, Unpacker};
