//! Records produced by the indexer.
//!
//! [`Content`] is the best-effort description of a single submission: what
//! it is ([`ContentType`]), which game it targets ([`Game`]), type-specific
//! [`Details`] and the [`Attachment`]s derived from it. Enable the `serde`
//! feature to (de)serialize records.

mod content;
mod content_type;
pub mod error;
mod game;
mod player_count;
mod release;

pub use crate::content::{
    Attachment, AttachmentKind, Content, Details, MapDetails, MapPackDetails, MutatorDetails, MutatorInfo, PackMap,
    UNKNOWN_AUTHOR, UNKNOWN_GAMETYPE, VoiceDetails,
};
pub use crate::content_type::ContentType;
pub use crate::game::Game;
pub use crate::player_count::PlayerCount;
pub use crate::release::ReleaseDate;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['/', '-', '_', ' ', ':', '.'], "")
}
