//! Archive Unpacking

use crate::entry::{Entry, normalize_entry_name};
use crate::error::{ErrorKind, Result};
use crate::format::ArchiveFormat;
use bzip2::read::BzDecoder;
use exn::ResultExt;
use flate2::read::MultiGzDecoder;
use sevenz_rust::{Password, SevenZReader};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use time::{Date, Month, OffsetDateTime};
use tracing::instrument;
use zip::ZipArchive;

/// Seconds between the Windows epoch (1601) and the Unix epoch.
const WINDOWS_EPOCH_OFFSET: i64 = 11_644_473_600;

/// Default upper bound for a single uncompressed entry (256 MiB). Legacy
/// content is tiny by modern standards; anything larger is either a
/// decompression bomb or not something we can index.
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Unpacks submissions into memory.
#[derive(Debug, Clone, Copy)]
pub struct Unpacker {
    max_entry_size: u64,
}

impl Default for Unpacker {
    fn default() -> Self {
        Self { max_entry_size: DEFAULT_MAX_ENTRY_SIZE }
    }
}

impl Unpacker {
    pub fn new(max_entry_size: u64) -> Self {
        Self { max_entry_size }
    }

    /// Reads and unpacks the archive at `path`.
    pub fn unpack_path(&self, path: impl AsRef<Path>) -> Result<Vec<Entry>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io)?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.unpack(name, bytes)
    }

    /// Unpacks in-memory archive bytes. `name` is the archive's file name,
    /// used to name the single entry of compressed or plain submissions.
    ///
    /// Entries are returned in archive order. Directories, entries with
    /// unsafe names, and entries over the size limit are skipped.
    #[instrument(skip(self, bytes), fields(archive_size = bytes.len(), format, entries))]
    pub fn unpack(&self, name: &str, bytes: Vec<u8>) -> Result<Vec<Entry>> {
        let format = ArchiveFormat::detect(name, &bytes)?;
        tracing::Span::current().record("format", format.as_str());
        let entries = match format {
            ArchiveFormat::Zip => self.unpack_zip(&bytes)?,
            ArchiveFormat::Rar => self.unpack_rar(&bytes)?,
            ArchiveFormat::SevenZip => self.unpack_7z(bytes)?,
            ArchiveFormat::Gzip => self.unpack_single(name, format, MultiGzDecoder::new(Cursor::new(bytes)))?,
            ArchiveFormat::Bzip2 => self.unpack_single(name, format, BzDecoder::new(Cursor::new(bytes)))?,
            ArchiveFormat::Plain => match normalize_entry_name(name) {
                Some(path) if (bytes.len() as u64) <= self.max_entry_size => {
                    vec![Entry { path, data: bytes, modified: None }]
                },
                _ => {
                    tracing::warn!(name, "Plain submission skipped; unusable name or too large");
                    vec![]
                },
            },
        };
        tracing::Span::current().record("entries", entries.len());
        Ok(entries)
    }

    fn unpack_zip(&self, bytes: &[u8]) -> Result<Vec<Entry>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).or_raise(|| ErrorKind::InvalidData)?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).or_raise(|| ErrorKind::InvalidData)?;
            if file.is_dir() {
                continue;
            }
            let Some(path) = normalize_entry_name(file.name()) else {
                tracing::warn!(name = file.name(), "Skipping archive entry with unsafe name");
                continue;
            };
            if file.size() > self.max_entry_size {
                tracing::warn!(%path, size = file.size(), "Skipping oversized archive entry");
                continue;
            }
            let modified = file.last_modified().and_then(|dt| zip_date(dt.year(), dt.month(), dt.day()));
            let data = self.read_limited(&mut file)?;
            entries.push(Entry { path, data, modified });
        }
        Ok(entries)
    }

    /// The RAR library only reads from disk, so the bytes are spilled to a
    /// temporary file first.
    fn unpack_rar(&self, bytes: &[u8]) -> Result<Vec<Entry>> {
        let mut spill = tempfile::NamedTempFile::new().or_raise(|| ErrorKind::Io)?;
        spill.write_all(bytes).or_raise(|| ErrorKind::Io)?;
        spill.flush().or_raise(|| ErrorKind::Io)?;

        let mut entries = Vec::new();
        let mut archive =
            unrar::Archive::new(spill.path()).open_for_processing().or_raise(|| ErrorKind::InvalidData)?;
        while let Some(header) = archive.read_header().or_raise(|| ErrorKind::InvalidData)? {
            let entry = header.entry();
            let name = entry.filename.to_string_lossy().into_owned();
            let skip = if entry.is_directory() {
                true
            } else if entry.unpacked_size > self.max_entry_size {
                tracing::warn!(%name, size = entry.unpacked_size, "Skipping oversized archive entry");
                true
            } else {
                false
            };
            let path = normalize_entry_name(&name);
            if path.is_none() && !skip {
                tracing::warn!(%name, "Skipping archive entry with unsafe name");
            }
            archive = match path {
                Some(path) if !skip => {
                    let modified = dos_date(entry.file_time);
                    let (data, rest) = header.read().or_raise(|| ErrorKind::InvalidData)?;
                    entries.push(Entry { path, data, modified });
                    rest
                },
                _ => header.skip().or_raise(|| ErrorKind::InvalidData)?,
            };
        }
        Ok(entries)
    }

    fn unpack_7z(&self, bytes: Vec<u8>) -> Result<Vec<Entry>> {
        let len = bytes.len() as u64;
        let mut archive =
            SevenZReader::new(Cursor::new(bytes), len, Password::empty()).or_raise(|| ErrorKind::InvalidData)?;
        let mut entries = Vec::new();
        let mut oversized = false;
        archive
            .for_each_entries(|entry, reader| {
                let path = normalize_entry_name(&entry.name);
                let drain = match &path {
                    _ if entry.is_directory => true,
                    None => {
                        tracing::warn!(name = %entry.name, "Skipping archive entry with unsafe name");
                        true
                    },
                    Some(path) if entry.size > self.max_entry_size => {
                        tracing::warn!(%path, size = entry.size, "Skipping oversized archive entry");
                        true
                    },
                    Some(_) => false,
                };
                // Solid archives decode entries in sequence, so skipped ones are still read through.
                if drain {
                    std::io::copy(reader, &mut std::io::sink())?;
                    return Ok(true);
                }
                let mut data = Vec::new();
                Read::take(reader, self.max_entry_size.saturating_add(1)).read_to_end(&mut data)?;
                if data.len() as u64 > self.max_entry_size {
                    oversized = true;
                    return Ok(false);
                }
                let modified = entry.has_last_modified_date.then(|| u64::from(entry.last_modified_date));
                entries.extend(path.map(|path| Entry { path, data, modified: modified.and_then(windows_date) }));
                Ok(true)
            })
            .or_raise(|| ErrorKind::InvalidData)?;
        if oversized {
            exn::bail!(ErrorKind::InvalidData);
        }
        Ok(entries)
    }

    fn unpack_single<R: Read>(&self, name: &str, format: ArchiveFormat, mut reader: R) -> Result<Vec<Entry>> {
        // `DM-Foo.unr.gz` unpacks to `DM-Foo.unr`.
        let ext = format.extension();
        let inner = match name.len().checked_sub(ext.len()) {
            Some(end) if end > 0 && name.get(end..).is_some_and(|tail| tail.eq_ignore_ascii_case(ext)) => &name[..end],
            _ => name,
        };
        let Some(path) = normalize_entry_name(inner) else {
            tracing::warn!(name, "Compressed submission has an unusable name");
            return Ok(vec![]);
        };
        let data = self.read_limited(&mut reader)?;
        Ok(vec![Entry { path, data, modified: None }])
    }

    /// Reads at most `max_entry_size` bytes; anything beyond is treated as
    /// corrupt input rather than being truncated silently.
    fn read_limited<R: Read>(&self, reader: &mut R) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        Read::take(reader, self.max_entry_size.saturating_add(1))
            .read_to_end(&mut data)
            .or_raise(|| ErrorKind::InvalidData)?;
        if data.len() as u64 > self.max_entry_size {
            exn::bail!(ErrorKind::InvalidData);
        }
        Ok(data)
    }
}

/// Zip timestamps are MS-DOS dates; the all-zero "no date" value and
/// other impossible dates become `None`.
fn zip_date(year: u16, month: u8, day: u8) -> Option<Date> {
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(i32::from(year), month, day).ok()
}

/// RAR headers carry MS-DOS timestamps: the date lives in the high 16 bits.
fn dos_date(timestamp: u32) -> Option<Date> {
    let year = ((timestamp >> 25) & 0x7F) as u16 + 1980;
    zip_date(year, ((timestamp >> 21) & 0x0F) as u8, ((timestamp >> 16) & 0x1F) as u8)
}

/// 7z timestamps count 100ns intervals since 1601-01-01 UTC.
fn windows_date(ticks: u64) -> Option<Date> {
    let seconds = i64::try_from(ticks / 10_000_000).ok()? - WINDOWS_EPOCH_OFFSET;
    OffsetDateTime::from_unix_timestamp(seconds).ok().map(|dt| dt.date())
}
