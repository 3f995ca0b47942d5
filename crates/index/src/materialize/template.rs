//! Attachment directory templating.
//!
//! Converts [`Content`] into the store-relative directory its attachments
//! are written to, using a user-configured [upon] template. The template
//! syntax follows upon's Mustache-like conventions (`{{ variable }}`,
//! `{{ value|formatter }}`), extended with:
//!
//! - **`slug`**: converts strings to URL-safe slugs, stripping quotation
//!   marks first to avoid artifacts like leading/trailing hyphens.
//! - **`truncate`**: truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable   | Type             | Description                                 |
//! |------------|------------------|---------------------------------------------|
//! | `game`     | `String`         | Game name, e.g. `"Unreal Tournament"`       |
//! | `type`     | `String`         | Content type, e.g. `"Map Pack"`             |
//! | `name`     | `String`         | Content name                                |
//! | `title`    | `String`         | Display title                               |
//! | `author`   | `String`         | Author, `"Unknown"` when not known          |
//! | `gametype` | `Option<String>` | Game mode of maps and map packs             |
//! | `year`     | `Option<i64>`    | Release year                                |
//!
//! # Example
//!
//! ```
//! use ua_content::{Content, ContentType, Game};
//! use ua_index::PathGenerator;
//!
//! let mut content = Content::new("DM-Deck16][");
//! content.game = Game::UnrealTournament;
//! content.content_type = ContentType::Map;
//!
//! let generator: PathGenerator = "{{ game|slug }}/{{ type|slug }}/{{ name|slug }}".parse().unwrap();
//! assert_eq!(generator.generate(&content).unwrap(), "unreal-tournament/map/dm-deck16");
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::str::FromStr;
use tracing::instrument;
use ua_content::Content;
use upon::{Engine, Template};

/// Generates deterministic attachment directories from [`Content`] and a
/// user-defined template string.
///
/// Parsing compiles the template, so syntax errors show up before any
/// content is indexed.
///
/// Rendered paths are trimmed per segment and never leave the store root.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(source.to_owned()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}

impl std::fmt::Debug for PathGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGenerator").finish_non_exhaustive()
    }
}

impl PathGenerator {
    /// Renders the template for `content`, returning a normalized,
    /// `/`-separated relative directory.
    #[instrument(skip_all, fields(name = %content.name))]
    pub fn generate(&self, content: &Content) -> Result<String> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(content))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        normalize(&path)
    }

    fn parameters(content: &Content) -> upon::Value {
        upon::value! {
            game: content.game.as_str(),
            type: content.content_type.as_str(),
            name: content.name.as_str(),
            title: content.title.as_str(),
            author: content.author.as_str(),
            gametype: content.gametype(),
            year: content.release_date.map(|d| i64::from(d.year())),
        }
    }
}

/// Trims every segment and resolves `.` and `..`. Fails when nothing is
/// left, when `..` would climb above the store root, or when a segment holds
/// a NUL byte or a backslash.
fn normalize(rendered: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in rendered.split('/').map(str::trim) {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop().ok_or_raise(|| ErrorKind::Template)?;
            },
            s if s.contains(['\0', '\\']) => exn::bail!(ErrorKind::Template),
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        exn::bail!(ErrorKind::Template);
    }
    Ok(segments.join("/"))
}

mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::fmt::{Formatter, Result};
    use upon::{Engine, Value};

    /// Straight, curly and angled quotes. Slugged as-is they leave stray
    /// hyphens (`"Hello"` becomes `-hello-`).
    const QUOTES: &[char] = &[
        '\'', '"', '`', '\u{2018}', '\u{2019}', '\u{201B}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}',
        '\u{00BB}', '\u{2039}', '\u{203A}',
    ];

    fn slug(f: &mut Formatter<'_>, value: &Value) -> Result {
        let Value::String(s) = value else {
            return upon::fmt::default(f, value);
        };
        let unquoted = s.replace(QUOTES, "");
        write!(f, "{}", slugify!(&unquoted))?;
        Ok(())
    }

    /// At most `max_bytes` of `s`, cut back to a character boundary.
    fn truncate(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_owned()
    }

    pub(super) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug);
        engine.add_function("truncate", truncate);
    }
}
