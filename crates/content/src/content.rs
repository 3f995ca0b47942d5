use crate::{ContentType, Game, PlayerCount, ReleaseDate};

/// Author recorded when nothing better is known.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Game mode recorded when nothing better is known.
pub const UNKNOWN_GAMETYPE: &str = "Unknown";

/// The record produced for one indexed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Content {
    /// Primary name, usually the main file's base name.
    pub name: String,
    /// Display title; defaults to the name.
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub game: Game,
    pub content_type: ContentType,
    /// Derived from archive entry timestamps, never from the clock.
    pub release_date: Option<ReleaseDate>,
    /// Lower-case, deduplicated, in insertion order.
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub details: Details,
}

impl Content {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            author: UNKNOWN_AUTHOR.to_string(),
            description: None,
            game: Game::Unknown,
            content_type: ContentType::Unknown,
            release_date: None,
            tags: Vec::new(),
            attachments: Vec::new(),
            details: Details::None,
        }
    }

    /// Adds a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// The game mode for maps and map packs.
    pub fn gametype(&self) -> Option<&str> {
        match &self.details {
            Details::Map(map) => Some(&map.gametype),
            Details::MapPack(pack) => Some(&pack.gametype),
            _ => None,
        }
    }
}

/// Type-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Details {
    #[default]
    None,
    Map(MapDetails),
    MapPack(MapPackDetails),
    Mutator(MutatorDetails),
    Voice(VoiceDetails),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDetails {
    pub gametype: String,
    pub player_count: Option<PlayerCount>,
}

impl Default for MapDetails {
    fn default() -> Self {
        Self { gametype: UNKNOWN_GAMETYPE.to_string(), player_count: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapPackDetails {
    /// The shared game mode of all maps, or `"Mixed"`.
    pub gametype: String,
    pub maps: Vec<PackMap>,
}

/// One map inside a map pack.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackMap {
    pub name: String,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutatorDetails {
    pub mutators: Vec<MutatorInfo>,
}

/// A mutator declared in an `.int` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutatorInfo {
    /// Fully qualified class, e.g. `MyMod.MyMutator`.
    pub class: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoiceDetails {
    /// Voice pack class names.
    pub voices: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachmentKind {
    Image,
}

/// A file derived from the submission and written to the attachment store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// File name, e.g. `DM-Foo_shot_1.png`.
    pub name: String,
    /// Store-relative path the bytes were written to.
    pub path: String,
    /// BLAKE3 hex digest of the written bytes.
    pub hash: String,
}

impl Attachment {
    pub fn image(name: impl Into<String>, path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            kind: AttachmentKind::Image,
            name: name.into(),
            path: path.into(),
            hash: blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_content_defaults() {
        let content = Content::new("DM-Foo");
        assert_eq!(content.title, "DM-Foo");
        assert_eq!(content.author, UNKNOWN_AUTHOR);
        assert_eq!(content.game, Game::Unknown);
        assert_eq!(content.details, Details::None);
        assert_eq!(content.gametype(), None);
    }

    #[test]
    fn test_add_tag_dedupes_in_order() {
        let mut content = Content::new("DM-Foo");
        for tag in ["DeathMatch", "dm", "deathmatch", " ", "foo"] {
            content.add_tag(tag);
        }
        assert_eq!(content.tags, vec!["deathmatch", "dm", "foo"]);
    }

    #[test]
    fn test_attachment_hash() {
        let a = Attachment::image("DM-Foo_shot_1.png", "ut/map/dm-foo/DM-Foo_shot_1.png", b"png");
        let b = Attachment::image("DM-Foo_shot_2.png", "ut/map/dm-foo/DM-Foo_shot_2.png", b"png");
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 64);
        assert_eq!(a.kind, AttachmentKind::Image);
    }

    #[test]
    fn test_serde_shape() {
        let mut content = Content::new("DM-Foo");
        content.game = Game::UnrealTournament;
        content.release_date = Some("1999-12".parse().unwrap());
        content.details =
            Details::Map(MapDetails { gametype: "DeathMatch".into(), player_count: Some(PlayerCount::Range(4, 8)) });
        #[cfg(feature = "serde")]
        {
            let json = serde_json::to_value(&content).unwrap();
            assert_eq!(json["game"], "Unreal Tournament");
            assert_eq!(json["release_date"], "1999-12");
            assert_eq!(json["details"]["Map"]["player_count"], "4-8");
            let back: Content = serde_json::from_value(json).unwrap();
            assert_eq!(back, content);
        }
        assert_eq!(content.gametype(), Some("DeathMatch"));
    }
}
