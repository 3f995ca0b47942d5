use std::fmt;

/// How bad a logged event is for the submission being indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational; nothing was lost.
    Info,
    /// A step failed, the pipeline carried on with partial results.
    Continue,
    /// The whole submission was aborted.
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Continue => "CONTINUE",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    /// Rendered cause, when the entry was logged for an error.
    pub cause: Option<String>,
}

/// Append-only record of what happened while indexing one submission.
///
/// Every entry is mirrored to `tracing` as it is recorded, so hosts that
/// install a subscriber see the same events live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexLog {
    entries: Vec<LogEntry>,
}

impl IndexLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        self.push(LogEntry { severity, message: message.into(), cause: None });
    }

    pub fn log_with(&mut self, severity: Severity, message: impl Into<String>, cause: impl fmt::Debug) {
        self.push(LogEntry { severity, message: message.into(), cause: Some(format!("{cause:?}")) });
    }

    fn push(&mut self, entry: LogEntry) {
        let cause = entry.cause.as_deref().unwrap_or_default();
        match entry.severity {
            Severity::Info => tracing::info!(cause, "{}", entry.message),
            Severity::Continue => tracing::warn!(cause, "{}", entry.message),
            Severity::Fatal => tracing::error!(cause, "{}", entry.message),
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Number of entries at or above `severity`.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity >= severity).count()
    }

    pub fn is_fatal(&self) -> bool {
        self.count(Severity::Fatal) > 0
    }
}
