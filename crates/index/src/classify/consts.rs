use regex::Regex;
use std::sync::LazyLock;
use ua_content::ReleaseDate;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// A whole line of a readme declaring single player or co-op support, e.g.
// "Single Player: Yes" or "cooperative yes".
regex!(SINGLE_PLAYER_REGEX, r"(?i)^(.+)?(single ?player|cooperative)([\s:]+)?yes(\s+)?$");

/// Packages saved before Unreal Tournament shipped are Unreal content.
pub(crate) const UT99_RELEASE: ReleaseDate = ReleaseDate::new(1999, time::Month::November);

/// Map name prefixes and the game mode they denote.
///
/// Order matters: the first prefix that matches wins, so the longer `ctf`
/// variants come before `ctf` itself. Kept as a slice so the order can never
/// be lost.
pub(crate) const GAMETYPE_PREFIXES: &[(&str, &str)] = &[
    ("sp", "Single Player"),
    ("dm", "DeathMatch"),
    ("ctf-bt", "BunnyTrack"),
    ("ctf4", "Multi-team Capture The Flag"),
    ("ctfm", "Multi-team Capture The Flag"),
    ("ctf", "Capture The Flag"),
    ("dom", "Domination"),
    ("as", "Assault"),
    ("br", "Bombing Run"),
    ("ons", "Onslaught"),
    ("vctf", "Vehicle Capture The Flag"),
    ("mh", "Monster Hunt"),
    ("ma", "Monster Arena"),
    ("tmh", "Team Monster Arena"),
    ("ra", "Rocket Arena"),
    ("jb", "Jailbreak"),
    ("to", "Tactical Ops"),
    ("inf", "Infiltration"),
    ("bt", "BunnyTrack"),
    ("uw", "UnWheel"),
    ("scr", "Soccer"),
    ("th", "Thievery"),
    ("u4e", "Unreal4Ever"),
    ("unf", "Unreal Fortress"),
    ("xmp", "XMP"),
];

/// Game mode assigned by the single player heuristics.
pub(crate) const SINGLE_PLAYER: &str = "Single Player";
/// Path fragments that mark a submission as single player content.
pub(crate) const SINGLE_PLAYER_PATH_HINTS: &[&str] = &["singleplayer", "coop"];

/// Texture name fragments that suggest a preview image.
pub(crate) const PREVIEW_NAME_HINTS: &[&str] = &["shot", "screen", "preview"];
/// Typical dimensions of a UT2003/4 map preview.
pub(crate) const PREVIEW_DIMENSIONS: (u32, u32) = (512, 256);
