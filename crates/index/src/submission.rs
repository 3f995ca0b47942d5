use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use ua_content::{ContentType, Game};

/// Override key forcing the game.
pub const OVERRIDE_GAME: &str = "game";
/// Override key forcing the game mode.
pub const OVERRIDE_GAMETYPE: &str = "gameType";
/// Override key forcing the content type.
pub const OVERRIDE_CONTENT_TYPE: &str = "contentType";
/// Override key forcing the author.
pub const OVERRIDE_AUTHOR: &str = "author";
/// Override key forcing the title.
pub const OVERRIDE_TITLE: &str = "title";

/// A file submitted for indexing, with submitter-provided overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub path: PathBuf,
    pub overrides: Overrides,
}

impl Submission {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), overrides: Overrides::default() }
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key, value);
        self
    }

    /// Archive file name without any extensions, e.g. `MyPack` for
    /// `uploads/MyPack.zip`.
    pub fn base_name(&self) -> String {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match name.split_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl AsRef<Path> for Submission {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Submitter overrides. Keys match case-insensitively; blank values are
/// treated as absent. Unrecognised keys are kept but never consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(BTreeMap<String, String>);

impl Overrides {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The overridden game, kept as given. See [`Game::from_exact`].
    pub fn game(&self) -> Option<Game> {
        self.get(OVERRIDE_GAME).map(Game::from_exact)
    }

    pub fn gametype(&self) -> Option<&str> {
        self.get(OVERRIDE_GAMETYPE)
    }

    /// Unparseable content types are ignored with a warning.
    pub fn content_type(&self) -> Option<ContentType> {
        let value = self.get(OVERRIDE_CONTENT_TYPE)?;
        match value.parse() {
            Ok(content_type) => Some(content_type),
            Err(err) => {
                tracing::warn!(value, error = ?err, "Ignoring unrecognised content type override");
                None
            },
        }
    }

    pub fn author(&self) -> Option<&str> {
        self.get(OVERRIDE_AUTHOR)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(OVERRIDE_TITLE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
