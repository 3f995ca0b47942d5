use super::{Context, Handler, Indexed, base_content, loose_images};
use crate::classify::refine::{PackageFacts, refine_by_structure, refine_by_version};
use crate::classify::{Classification, primary_map};
use crate::error::{ErrorKind, Result};
use crate::incoming::Incoming;
use crate::introspect::{read_level_info, resolve_screenshot};
use crate::log::Severity;
use exn::OptionExt;
use tracing::instrument;
use ua_content::{Details, MapDetails, UNKNOWN_GAMETYPE};

/// Indexes a single map.
///
/// The map package is opened once. Game refinement, `LevelInfo` metadata and
/// the screenshot all come from it; each of those steps can fail on its own
/// without losing what the others found.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapHandler;

impl Handler for MapHandler {
    #[instrument(skip_all, fields(map))]
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed> {
        let Incoming { submission, files, log } = incoming;
        let map_file = primary_map(files).ok_or_raise(|| ErrorKind::MissingStructure("map file"))?;
        tracing::Span::current().record("map", map_file.path.as_str());

        let mut content = base_content(submission, files, map_file.base_name(), classification);
        let mut details = MapDetails { gametype: classification.gametype.clone(), player_count: None };
        let mut images = Vec::new();
        let game_overridden = submission.overrides.game().is_some();

        match ctx.loader.open_scoped(&map_file.path, map_file.data()) {
            Err(err) => log.log_with(Severity::Continue, "Failed to read map package", err),
            Ok(package) => {
                let facts = PackageFacts::inspect(&*package);
                if !game_overridden {
                    content.game = refine_by_version(content.game, content.release_date, &facts);
                }
                match read_level_info(&*package) {
                    Err(err) => log.log_with(Severity::Continue, "Failed to read level information", err),
                    Ok(meta) => {
                        if let Some(title) = meta.title {
                            content.title = title;
                        }
                        if let Some(author) = meta.author {
                            content.author = author;
                        }
                        content.description = meta.description;
                        details.player_count = meta.player_count;
                        if !game_overridden {
                            content.game =
                                refine_by_structure(content.game, &details.gametype, meta.screenshot.is_some(), &facts);
                        }
                        if let Some(reference) = meta.screenshot {
                            images.extend(resolve_screenshot(&*package, reference, files, ctx.loader, log));
                        }
                    },
                }
                if let Err(err) = package.close() {
                    log.log_with(Severity::Info, "Failed to close map package", err);
                }
            },
        }

        images.extend(loose_images(ctx, files, log));
        if details.gametype != UNKNOWN_GAMETYPE {
            content.add_tag(&details.gametype);
        }
        content.details = Details::Map(details);
        Ok(Indexed { content, images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::handler::run;
    use crate::incoming::IncomingFile;
    use crate::submission::{OVERRIDE_GAME, Submission};
    use crate::testutil::{level_info, map_package, png, texture};
    use rstest::rstest;
    use ua_content::{Game, PlayerCount, UNKNOWN_AUTHOR};
    use ua_package::Object;
    use ua_package::mock::{MockLoader, MockPackage};

    fn index(loader: &MockLoader, submission: Submission, files: Vec<IncomingFile>) -> (Result<Indexed>, Incoming) {
        let mut incoming = Incoming::new(submission, files);
        let classification = classify(&mut incoming);
        let ctx = Context { loader, loose_images: true };
        let result = MapHandler.index(&ctx, &mut incoming, &classification);
        (result, incoming)
    }

    #[test]
    fn test_full_map() {
        let mut package = map_package("DM-Foo", 68, true);
        let shot = package.add_export(Object::new("Shot", "Texture").with_texture(texture(4, 4)));
        package.add_export(level_info("  Foo Arena ", "Somebody", Some(shot)));
        let files = vec![
            IncomingFile::new("Maps/DM-Foo.unr", package.header_bytes(), None),
            IncomingFile::new("DM-Foo.png", png(2, 2), None),
        ];
        let loader = MockLoader::new().with_package("DM-Foo.unr", package);

        let (result, incoming) = index(&loader, Submission::new("DM-Foo.zip"), files);
        let indexed = result.unwrap();
        assert_eq!(indexed.content.name, "DM-Foo");
        assert_eq!(indexed.content.title, "Foo Arena");
        assert_eq!(indexed.content.author, "Somebody");
        assert_eq!(indexed.content.game, Game::UnrealTournament);
        assert_eq!(indexed.content.tags, vec!["deathmatch"]);
        assert_eq!(
            indexed.content.details,
            Details::Map(MapDetails { gametype: "DeathMatch".into(), player_count: Some(PlayerCount::Range(4, 8)) })
        );
        // Package screenshot first, then loose images.
        let sizes: Vec<_> = indexed.images.iter().map(|i| i.dimensions()).collect();
        assert_eq!(sizes, vec![(4, 4), (2, 2)]);
        assert!(incoming.log.is_empty());
        assert_eq!(loader.package("DM-Foo.unr").unwrap().closes(), 1);
    }

    #[test]
    fn test_earlier_generation() {
        let mut package = map_package("DM-Old", 61, false);
        package.add_export(level_info("Old", "Someone", None));
        let files = vec![IncomingFile::new("DM-Old.unr", package.header_bytes(), None)];
        let loader = MockLoader::new().with_package("DM-Old.unr", package);

        let (result, _) = index(&loader, Submission::new("DM-Old.zip"), files);
        let content = result.unwrap().content;
        assert_eq!(content.game, Game::Unreal);
        assert_eq!(content.gametype(), Some("DeathMatch"));
    }

    #[test]
    fn test_game_override_skips_refinement() {
        let mut package = map_package("DM-Old", 61, false);
        package.add_export(level_info("Old", "Someone", None));
        let files = vec![IncomingFile::new("DM-Old.unr", package.header_bytes(), None)];
        let loader = MockLoader::new().with_package("DM-Old.unr", package);
        let submission = Submission::new("DM-Old.zip").with_override(OVERRIDE_GAME, "Unreal Tournament 2004");

        let (result, _) = index(&loader, submission, files);
        assert_eq!(result.unwrap().content.game, Game::UnrealTournament2004);
    }

    #[rstest]
    #[case("Unreal Tournament 2003")]
    #[case("ut")]
    #[case("unknown")]
    fn test_game_override_kept_verbatim(#[case] game: &str) {
        let mut package = map_package("DM-Old", 61, false);
        package.add_export(level_info("Old", "Someone", None));
        let files = vec![IncomingFile::new("DM-Old.unr", package.header_bytes(), None)];
        let loader = MockLoader::new().with_package("DM-Old.unr", package);
        let submission = Submission::new("DM-Old.zip").with_override(OVERRIDE_GAME, game);

        let (result, _) = index(&loader, submission, files);
        assert_eq!(result.unwrap().content.game.as_str(), game);
    }

    #[test]
    fn test_xmp_map_is_unreal_2() {
        let mut package = MockPackage::new("XMP-Garden", 126);
        package.add_export(Object::new("DeploymentPoint0", "DeploymentPoint"));
        package.add_export(level_info("Garden", "Someone", None));
        // Saved with a UT extension, as some XMP maps were.
        let files = vec![IncomingFile::new("XMP-Garden.unr", package.header_bytes(), None)];
        let loader = MockLoader::new().with_package("XMP-Garden.unr", package);

        let (result, _) = index(&loader, Submission::new("XMP-Garden.zip"), files);
        assert_eq!(result.unwrap().content.game, Game::Unreal2);
    }

    #[test]
    fn test_corrupt_package() {
        let files = vec![
            IncomingFile::new("CTF-Broken.unr", b"definitely not a package".as_slice(), None),
            IncomingFile::new("shot.png", png(2, 2), None),
        ];
        let (result, incoming) = index(&MockLoader::new(), Submission::new("CTF-Broken.zip"), files);
        let indexed = result.unwrap();
        assert_eq!(indexed.content.title, "CTF-Broken");
        assert_eq!(indexed.content.gametype(), Some("Capture The Flag"));
        assert_eq!(indexed.images.len(), 1);
        assert_eq!(incoming.log.count(Severity::Continue), 1);
        assert_eq!(incoming.log.entries()[0].message, "Failed to read map package");
    }

    #[test]
    fn test_corrupt_package_without_images() {
        let files = vec![IncomingFile::new("DM-Broken.unr", b"\xC1\x83\x2A\x9E garbage".as_slice(), None)];
        let (result, incoming) = index(&MockLoader::new(), Submission::new("DM-Broken.zip"), files);
        let indexed = result.unwrap();
        assert!(indexed.images.is_empty());
        assert_eq!(indexed.content.title, "DM-Broken");
        assert_eq!(indexed.content.author, UNKNOWN_AUTHOR);
        assert_eq!(indexed.content.description, None);
        assert_eq!(indexed.content.gametype(), Some("DeathMatch"));
        assert_eq!(incoming.log.len(), 1);
        assert_eq!(incoming.log.count(Severity::Continue), 1);
    }

    #[test]
    fn test_missing_level_info_keeps_defaults() {
        let package = map_package("DM-Empty", 68, true);
        let files = vec![IncomingFile::new("DM-Empty.unr", package.header_bytes(), None)];
        let loader = MockLoader::new().with_package("DM-Empty.unr", package);

        let mut incoming = Incoming::new(Submission::new("DM-Empty.zip"), files);
        let classification = classify(&mut incoming);
        let step = run(&Context { loader: &loader, loose_images: true }, &mut incoming, &classification);
        assert!(step.is_degraded());
        let indexed = step.into_result().unwrap();
        assert_eq!(indexed.content.title, "DM-Empty");
        assert_eq!(indexed.content.author, "Unknown");
        assert_eq!(loader.package("DM-Empty.unr").unwrap().closes(), 1);
    }

    #[test]
    fn test_no_map_file_is_fatal() {
        let mut incoming = Incoming::new(Submission::new("x.zip"), vec![]);
        let classification = classify(&mut incoming);
        let loader = MockLoader::new();
        let err = MapHandler
            .index(&Context { loader: &loader, loose_images: true }, &mut incoming, &classification)
            .unwrap_err();
        assert_eq!(*err, ErrorKind::MissingStructure("map file"));
    }
}
