//! Game refinement from facts only visible once a map package is open.

use super::consts::UT99_RELEASE;
use ua_content::{Game, ReleaseDate};
use ua_package::Package;

/// Package version written by the Unreal Tournament release build.
const UT99_VERSION: u16 = 68;
/// First version written by UT2003 and later engines.
const UT2003_VERSION: u16 = 117;
/// First version written by the Unreal 2 engine.
const UNREAL2_VERSION: u16 = 126;

/// Structural facts about an open map package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PackageFacts {
    pub version: u16,
    pub has_level_summary: bool,
    pub has_deployment_point: bool,
}

impl PackageFacts {
    pub fn inspect(package: &dyn Package) -> Self {
        Self {
            version: package.version(),
            has_level_summary: !package.exports_by_class("LevelSummary").is_empty(),
            has_deployment_point: !package.exports_by_class("DeploymentPoint").is_empty(),
        }
    }
}

/// Corrects the guess for maps saved by earlier engine generations.
pub(crate) fn refine_by_version(game: Game, release: Option<ReleaseDate>, facts: &PackageFacts) -> Game {
    let pre_ut_release = release.is_some_and(|r| r < UT99_RELEASE);
    if facts.version < UT99_VERSION || (pre_ut_release && game == Game::UnrealTournament) {
        return Game::Unreal;
    }
    if facts.version == UT99_VERSION && !facts.has_level_summary {
        return Game::Unreal;
    }
    game
}

/// Corrects the guess using the structures only certain games write. Applied
/// after level metadata has been read successfully.
pub(crate) fn refine_by_structure(game: Game, gametype: &str, has_screenshot: bool, facts: &PackageFacts) -> Game {
    if has_screenshot && facts.version < UT2003_VERSION && facts.has_level_summary {
        return Game::UnrealTournament;
    }
    if gametype.eq_ignore_ascii_case("XMP")
        && facts.version >= UNREAL2_VERSION
        && facts.has_deployment_point
        && game == Game::UnrealTournament
    {
        return Game::Unreal2;
    }
    game
}
