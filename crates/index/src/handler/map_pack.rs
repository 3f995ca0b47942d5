use super::{Context, Handler, Indexed, base_content, loose_images};
use crate::classify::refine::{PackageFacts, refine_by_version};
use crate::classify::{Classification, gametype_for_map};
use crate::error::{ErrorKind, Result};
use crate::incoming::{FileRole, Incoming};
use crate::introspect::{read_level_info, resolve_screenshot};
use crate::log::Severity;
use tracing::instrument;
use ua_content::{Details, MapPackDetails, PackMap, UNKNOWN_AUTHOR, UNKNOWN_GAMETYPE};

/// Game mode of a pack whose maps do not share one.
pub const MIXED_GAMETYPE: &str = "Mixed";
/// Author of a pack whose maps were made by different people.
pub const VARIOUS_AUTHORS: &str = "Various";

/// Indexes an archive holding several maps.
///
/// Every map is opened in turn for its title and author. The first map that
/// yields a screenshot provides the pack's preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapPackHandler;

impl Handler for MapPackHandler {
    #[instrument(skip_all, fields(maps))]
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed> {
        let Incoming { submission, files, log } = incoming;
        let map_files = files.of(&[FileRole::Map]);
        if map_files.is_empty() {
            exn::bail!(ErrorKind::MissingStructure("map files"));
        }
        tracing::Span::current().record("maps", map_files.len());

        let mut content = base_content(submission, files, submission.base_name(), classification);
        let game_overridden = submission.overrides.game().is_some();
        let mut refined = game_overridden;
        let mut maps = Vec::with_capacity(map_files.len());
        let mut images = Vec::new();

        for file in &map_files {
            let name = file.base_name().to_string();
            let mut map = PackMap { title: name.clone(), name, author: UNKNOWN_AUTHOR.to_string() };
            let package = match ctx.loader.open_scoped(&file.path, file.data()) {
                Ok(package) => package,
                Err(err) => {
                    log.log_with(Severity::Continue, format!("Failed to read map package {}", file.path), err);
                    maps.push(map);
                    continue;
                },
            };
            // The first readable map stands in for the pack's engine generation.
            if !refined {
                content.game = refine_by_version(content.game, content.release_date, &PackageFacts::inspect(&*package));
                refined = true;
            }
            match read_level_info(&*package) {
                Ok(meta) => {
                    map.title = meta.title.unwrap_or(map.title);
                    map.author = meta.author.unwrap_or(map.author);
                    if images.is_empty()
                        && let Some(reference) = meta.screenshot
                    {
                        images.extend(resolve_screenshot(&*package, reference, files, ctx.loader, log));
                    }
                },
                Err(err) => {
                    let message = format!("Failed to read level information from {}", file.path);
                    log.log_with(Severity::Continue, message, err);
                },
            }
            if let Err(err) = package.close() {
                log.log_with(Severity::Info, "Failed to close map package", err);
            }
            maps.push(map);
        }
        maps.sort_by_key(|m| m.name.to_lowercase());

        let gametype = match submission.overrides.gametype() {
            Some(gametype) => gametype.to_string(),
            None => common_gametype(&maps),
        };
        content.author = common_author(&maps);
        images.extend(loose_images(ctx, files, log));

        if gametype != UNKNOWN_GAMETYPE {
            content.add_tag(&gametype);
        }
        for tag in name_tags(&maps) {
            content.add_tag(&tag);
        }
        content.details = Details::MapPack(MapPackDetails { gametype, maps });
        Ok(Indexed { content, images })
    }
}

/// The game mode all maps share, or [`MIXED_GAMETYPE`].
fn common_gametype(maps: &[PackMap]) -> String {
    let mut gametypes = maps.iter().map(|m| gametype_for_map(&m.name).unwrap_or(UNKNOWN_GAMETYPE));
    match gametypes.next() {
        Some(first) if gametypes.all(|g| g == first) => first.to_string(),
        _ => MIXED_GAMETYPE.to_string(),
    }
}

/// The author all maps with a known author share, or [`VARIOUS_AUTHORS`].
/// Authors are compared case-insensitively.
fn common_author(maps: &[PackMap]) -> String {
    let mut authors = maps.iter().map(|m| m.author.as_str()).filter(|a| !a.eq_ignore_ascii_case(UNKNOWN_AUTHOR));
    match authors.next() {
        None => UNKNOWN_AUTHOR.to_string(),
        Some(first) if authors.all(|a| a.eq_ignore_ascii_case(first)) => first.to_string(),
        Some(_) => VARIOUS_AUTHORS.to_string(),
    }
}

/// Map name prefixes (`dm` for `DM-Deck16`), then the words after them
/// (`deck16`), each in map order.
fn name_tags(maps: &[PackMap]) -> Vec<String> {
    let parts: Vec<Vec<String>> =
        maps.iter().map(|m| m.name.to_lowercase().split('-').map(str::to_string).collect()).collect();
    let prefixes = parts.iter().filter(|p| p.len() > 1).map(|p| p[0].clone());
    let suffixes = parts.iter().filter_map(|p| p.get(1).cloned());
    prefixes.chain(suffixes).collect()
}
