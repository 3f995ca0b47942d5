//! Content type, game and game mode detection.
//!
//! Classification is a pure function of the unpacked files and the
//! submitter's overrides. It never fails: anything that cannot be worked out
//! is reported as unknown. Refinements that need an open package live in
//! [`refine`] and are applied by the handlers.

mod consts;
pub(crate) mod refine;

pub(crate) use self::consts::{PREVIEW_DIMENSIONS, PREVIEW_NAME_HINTS};

use self::consts::{GAMETYPE_PREFIXES, SINGLE_PLAYER, SINGLE_PLAYER_PATH_HINTS, SINGLE_PLAYER_REGEX};
use crate::descriptor;
use crate::incoming::{FileRole, FileSet, Incoming, IncomingFile};
use crate::log::IndexLog;
use crate::submission::Submission;
use tracing::instrument;
use ua_content::{ContentType, Game, UNKNOWN_GAMETYPE};

/// What a submission is, before any package has been opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub content_type: ContentType,
    pub game: Game,
    /// Game mode name, [`UNKNOWN_GAMETYPE`] when undetermined.
    pub gametype: String,
}

/// Classifies a submission. Overrides win field by field.
#[instrument(skip_all, fields(path = %incoming.submission.path.display(), content_type, game, gametype))]
pub fn classify(incoming: &mut Incoming) -> Classification {
    let Incoming { submission, files, log } = incoming;
    let overrides = &submission.overrides;

    let content_type = overrides.content_type().unwrap_or_else(|| detect_content_type(files));
    let game = overrides.game().unwrap_or_else(|| detect_game(files, content_type));
    let gametype = match overrides.gametype() {
        Some(gametype) => gametype.to_string(),
        None => detect_gametype(submission, files, log),
    };

    let span = tracing::Span::current();
    span.record("content_type", content_type.as_str());
    span.record("game", game.as_str());
    span.record("gametype", gametype.as_str());
    Classification { content_type, game, gametype }
}

fn detect_content_type(files: &FileSet) -> ContentType {
    match files.of(&[FileRole::Map]).len() {
        0 => {},
        1 => return ContentType::Map,
        _ => return ContentType::MapPack,
    }
    let declarations = descriptor::declarations(files);
    if declarations.iter().any(|d| d.voice().is_some()) {
        ContentType::Voice
    } else if declarations.iter().any(|d| d.mutator().is_some()) {
        ContentType::Mutator
    } else {
        ContentType::Unknown
    }
}

fn detect_game(files: &FileSet, content_type: ContentType) -> Game {
    let candidates = match content_type {
        ContentType::Map | ContentType::MapPack => files.of(&[FileRole::Map]),
        _ => files.of(&[FileRole::Important]),
    };
    candidates.iter().find_map(|f| game_for_extension(&f.extension())).unwrap_or_default()
}

fn game_for_extension(ext: &str) -> Option<Game> {
    match ext {
        "unr" | "u" | "int" => Some(Game::UnrealTournament),
        "ut2" | "ucl" | "upl" => Some(Game::UnrealTournament2004),
        "ut3" => Some(Game::UnrealTournament3),
        "un2" => Some(Game::Unreal2),
        _ => None,
    }
}

/// The map a single-map submission is about: the one with the shortest file
/// name, first in archive order on ties.
pub(crate) fn primary_map(files: &FileSet) -> Option<&IncomingFile> {
    files.of(&[FileRole::Map]).into_iter().min_by_key(|f| f.file_name().len())
}

/// Game mode denoted by a map name prefix, if any.
///
/// ```
/// assert_eq!(ua_index::gametype_for_map("CTF-BT-Foo"), Some("BunnyTrack"));
/// assert_eq!(ua_index::gametype_for_map("Unnamed"), None);
/// ```
pub fn gametype_for_map(name: &str) -> Option<&'static str> {
    let name = name.to_ascii_lowercase();
    GAMETYPE_PREFIXES.iter().find(|(prefix, _)| name.starts_with(prefix)).map(|(_, gametype)| *gametype)
}

fn detect_gametype(submission: &Submission, files: &FileSet, log: &mut IndexLog) -> String {
    if let Some(map) = primary_map(files)
        && let Some(gametype) = gametype_for_map(map.base_name())
    {
        return gametype.to_string();
    }
    if is_single_player(submission, files, log) {
        tracing::debug!("Detected single player content");
        return SINGLE_PLAYER.to_string();
    }
    UNKNOWN_GAMETYPE.to_string()
}

fn is_single_player(submission: &Submission, files: &FileSet, log: &mut IndexLog) -> bool {
    let path = submission.path_str().to_lowercase();
    if SINGLE_PLAYER_PATH_HINTS.iter().any(|hint| path.contains(hint)) {
        return true;
    }
    files.text_lines(log).iter().any(|line| SINGLE_PLAYER_REGEX.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Severity;
    use crate::submission::{OVERRIDE_CONTENT_TYPE, OVERRIDE_GAME, OVERRIDE_GAMETYPE};
    use rstest::rstest;

    fn incoming(path: &str, files: &[(&str, &[u8])]) -> Incoming {
        let files = files.iter().map(|(name, data)| IncomingFile::new(*name, *data, None)).collect();
        Incoming::new(Submission::new(path), files)
    }

    #[rstest]
    #[case::bunny_track("CTF-BT-x", "BunnyTrack")]
    #[case::multi_team_4("CTF4-x", "Multi-team Capture The Flag")]
    #[case::multi_team_m("CTFM-x", "Multi-team Capture The Flag")]
    #[case::capture_the_flag("CTF-x", "Capture The Flag")]
    #[case::deathmatch("DM-Deck16", "DeathMatch")]
    #[case::vehicle_ctf("VCTF-Suntemple", "Vehicle Capture The Flag")]
    #[case::team_monster_arena("TMH-Arena", "Team Monster Arena")]
    #[case::xmp("XMP-Garden", "XMP")]
    fn test_prefix_ordering(#[case] map: &str, #[case] expected: &str) {
        let name = format!("Maps/{map}.unr");
        let mut incoming = incoming("upload.zip", &[(name.as_str(), b"")]);
        assert_eq!(classify(&mut incoming).gametype, expected);
    }

    #[rstest]
    #[case(&[("DM-A.unr", b"".as_slice())], ContentType::Map, Game::UnrealTournament)]
    #[case(&[("DM-A.ut2", b"".as_slice()), ("DM-B.ut2", b"".as_slice())], ContentType::MapPack, Game::UnrealTournament2004)]
    #[case(&[("XMP-A.un2", b"".as_slice())], ContentType::Map, Game::Unreal2)]
    #[case(
        &[("System/Vamp.u", b"".as_slice()), ("System/Vamp.int", b"Object=(Name=Vamp.Vamp,MetaClass=Engine.Mutator)".as_slice())],
        ContentType::Mutator,
        Game::UnrealTournament
    )]
    #[case(
        &[("System/Boss.ucl", b"Object=(Name=X.Boss,MetaClass=XGame.xVoicePack)".as_slice())],
        ContentType::Voice,
        Game::UnrealTournament2004
    )]
    #[case(&[("readme.txt", b"hi".as_slice())], ContentType::Unknown, Game::Unknown)]
    fn test_content_type_and_game(
        #[case] files: &[(&str, &[u8])],
        #[case] content_type: ContentType,
        #[case] game: Game,
    ) {
        let classification = classify(&mut incoming("upload.zip", files));
        assert_eq!(classification.content_type, content_type);
        assert_eq!(classification.game, game);
    }

    #[test]
    fn test_primary_map_is_shortest_name() {
        let mut incoming = incoming("pack.zip", &[("DM-FooBar.unr", b""), ("CTF-Foo.unr", b""), ("DM-BarFoo.unr", b"")]);
        assert_eq!(primary_map(&incoming.files).map(|f| f.file_name()), Some("CTF-Foo.unr"));
        assert_eq!(classify(&mut incoming).gametype, "Capture The Flag");
    }

    #[test]
    fn test_overrides_win() {
        let mut incoming = incoming("DM-Foo.zip", &[("DM-Foo.unr", b"")]);
        incoming.submission = Submission::new("DM-Foo.zip")
            .with_override(OVERRIDE_GAME, "Unreal")
            .with_override(OVERRIDE_GAMETYPE, "Capture The Flag")
            .with_override(OVERRIDE_CONTENT_TYPE, "Map Pack");
        let classification = classify(&mut incoming);
        assert_eq!(classification.game, Game::Unreal);
        assert_eq!(classification.gametype, "Capture The Flag");
        assert_eq!(classification.content_type, ContentType::MapPack);
    }

    #[rstest]
    #[case("Unreal Tournament 2003")]
    #[case("UT2003")]
    #[case("ut")]
    #[case("unknown")]
    #[case("Unreal Tournament 2004")]
    fn test_game_override_kept_as_given(#[case] game: &str) {
        let mut incoming = incoming("DM-Foo.zip", &[("DM-Foo.unr", b"")]);
        incoming.submission = Submission::new("DM-Foo.zip").with_override(OVERRIDE_GAME, game);
        assert_eq!(classify(&mut incoming).game.as_str(), game);
    }

    #[rstest]
    #[case::path_hint("uploads/SinglePlayer/Unnamed.zip", &[("Unnamed.unr", b"".as_slice())])]
    #[case::coop_path("coop/Unnamed.zip", &[("Unnamed.unr", b"".as_slice())])]
    #[case::readme("Unnamed.zip", &[("Unnamed.unr", b"".as_slice()), ("readme.txt", b"Title: x\r\nSingle Player: Yes\r\n".as_slice())])]
    fn test_single_player(#[case] path: &str, #[case] files: &[(&str, &[u8])]) {
        assert_eq!(classify(&mut incoming(path, files)).gametype, SINGLE_PLAYER);
    }

    #[test]
    fn test_unknown_gametype_logs_text_fallback() {
        let mut incoming = incoming("Unnamed.zip", &[("Unnamed.unr", b""), ("readme.txt", b"caf\xE9")]);
        assert_eq!(classify(&mut incoming).gametype, UNKNOWN_GAMETYPE);
        assert_eq!(incoming.log.count(Severity::Info), 1);
    }

    #[test]
    fn test_deterministic() {
        let files: &[(&str, &[u8])] = &[("b/DM-Two.unr", b""), ("a/CTF-One.unr", b""), ("readme.txt", b"x")];
        let first = classify(&mut incoming("pack.zip", files));
        for _ in 0..3 {
            assert_eq!(classify(&mut incoming("pack.zip", files)), first);
        }
    }
}
