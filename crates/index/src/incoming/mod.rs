//! Unpacked submissions and their files.

mod role;
mod text;

pub use self::role::FileRole;
pub(crate) use self::role::extension;
pub(crate) use self::text::{decode_text, decode_utf16le};

use crate::error::{ErrorKind, Result};
use crate::log::{IndexLog, Severity};
use crate::submission::Submission;
use exn::ResultExt;
use std::io::Cursor;
use std::sync::Arc;
use time::Date;
use tracing::instrument;
use ua_archive::{Entry, Unpacker};
use ua_content::ReleaseDate;

/// A single file from an unpacked submission.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Normalized path inside the archive.
    pub path: String,
    data: Arc<[u8]>,
    pub modified: Option<Date>,
    roles: Vec<FileRole>,
}

impl IncomingFile {
    pub fn new(path: impl Into<String>, data: impl Into<Arc<[u8]>>, modified: Option<Date>) -> Self {
        let path = path.into();
        let data = data.into();
        let roles = FileRole::detect(&path, &data);
        Self { path, data, modified, roles }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its extension; `DM-Foo` for `Maps/DM-Foo.unr`.
    pub fn base_name(&self) -> &str {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }

    /// Lower-case extension, empty if there is none.
    pub fn extension(&self) -> String {
        extension(&self.path).to_ascii_lowercase()
    }

    pub fn roles(&self) -> &[FileRole] {
        &self.roles
    }

    pub fn has_role(&self, role: FileRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the contents, for handing to a package loader.
    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&*self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Entry> for IncomingFile {
    fn from(entry: Entry) -> Self {
        Self::new(entry.path, entry.data, entry.modified)
    }
}

/// The files of a submission, in archive order.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<IncomingFile>,
}

impl FileSet {
    pub fn new(files: Vec<IncomingFile>) -> Self {
        Self { files }
    }

    pub fn all(&self) -> &[IncomingFile] {
        &self.files
    }

    /// Files holding any of `roles`, in archive order, each at most once.
    pub fn of(&self, roles: &[FileRole]) -> Vec<&IncomingFile> {
        self.files.iter().filter(|f| roles.iter().any(|r| f.has_role(*r))).collect()
    }

    /// Looks up an importable package by base name, case-insensitively.
    pub fn find_package(&self, name: &str) -> Option<&IncomingFile> {
        self.files
            .iter()
            .filter(|f| f.has_role(FileRole::Important))
            .find(|f| f.base_name().eq_ignore_ascii_case(name))
    }

    /// Earliest timestamp among importable files, or among all files when
    /// none of those carry one.
    pub fn release_date(&self) -> Option<ReleaseDate> {
        earliest(self.files.iter().filter(|f| f.has_role(FileRole::Important)))
            .or_else(|| earliest(self.files.iter()))
            .map(ReleaseDate::from)
    }

    /// Every line of every text and HTML file. Files that are not UTF-8 are
    /// read as ISO-8859-1, with an INFO entry.
    pub fn text_lines(&self, log: &mut IndexLog) -> Vec<String> {
        let mut lines = Vec::new();
        for file in self.of(&[FileRole::Text, FileRole::Html]) {
            let (text, fallback) = decode_text(file.bytes());
            if fallback {
                log.log(Severity::Info, format!("Could not read {} as UTF-8, read as ISO-8859-1", file.path));
            }
            lines.extend(text.lines().map(str::to_string));
        }
        lines
    }
}

fn earliest<'a>(files: impl Iterator<Item = &'a IncomingFile>) -> Option<Date> {
    files.filter_map(|f| f.modified).min()
}

/// A submission being indexed: its unpacked files plus the log of what has
/// happened to it so far.
///
/// Fields are public so steps can borrow the files while appending to the
/// log.
#[derive(Debug)]
pub struct Incoming {
    pub submission: Submission,
    pub files: FileSet,
    pub log: IndexLog,
}

impl Incoming {
    /// Unpacks the submission archive.
    #[instrument(skip_all, fields(path = %submission.path.display(), files))]
    pub fn prepare(submission: Submission, unpacker: &Unpacker) -> Result<Self> {
        let entries = unpacker.unpack_path(&submission.path).or_raise(|| ErrorKind::Archive)?;
        tracing::Span::current().record("files", entries.len());
        Ok(Self::from_entries(submission, entries))
    }

    pub fn from_entries(submission: Submission, entries: Vec<Entry>) -> Self {
        Self::new(submission, entries.into_iter().map(IncomingFile::from).collect())
    }

    pub fn new(submission: Submission, files: Vec<IncomingFile>) -> Self {
        Self { submission, files: FileSet::new(files), log: IndexLog::new() }
    }
}
