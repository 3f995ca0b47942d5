//! Reading metadata and preview images out of opened packages.

mod screenshot;

pub(crate) use self::screenshot::resolve_screenshot;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use tracing::instrument;
use ua_content::PlayerCount;
use ua_package::{ObjectRef, Package};

/// Versions below this store the recommended player count as free text.
const STRUCTURED_PLAYER_COUNT_VERSION: u16 = 117;

/// Metadata from a map's `LevelInfo` object. Every field is optional; absent
/// values leave the caller's defaults in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LevelMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub player_count: Option<PlayerCount>,
    /// Unresolved `Screenshot` reference.
    pub screenshot: Option<ObjectRef>,
}

/// Reads the first `LevelInfo` export of a map package.
#[instrument(skip_all, fields(package = package.name(), version = package.version()))]
pub(crate) fn read_level_info(package: &dyn Package) -> Result<LevelMetadata> {
    let export = package
        .exports_by_class("LevelInfo")
        .into_iter()
        .next()
        .ok_or_raise(|| ErrorKind::MissingStructure("LevelInfo"))?;
    let info = package.decode(&export).or_raise(|| ErrorKind::Decode)?;

    let text = |name: &str| info.string(name).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    let player_count = if package.version() < STRUCTURED_PLAYER_COUNT_VERSION {
        info.string("IdealPlayerCount").and_then(PlayerCount::parse_loose)
    } else {
        PlayerCount::from_bounds(
            info.int("IdealPlayerCountMin").unwrap_or_default(),
            info.int("IdealPlayerCountMax").unwrap_or_default(),
        )
    };

    Ok(LevelMetadata {
        title: text("Title"),
        author: text("Author"),
        description: text("Description"),
        player_count,
        screenshot: info.object("Screenshot"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ua_package::mock::MockPackage;
    use ua_package::{Object, Property};

    fn str(value: &str) -> Property {
        Property::Str(value.to_string())
    }

    #[test]
    fn test_legacy_level_info() {
        let mut package = MockPackage::new("DM-Foo", 68);
        package.add_export(Object::new("LevelSummary", "LevelSummary"));
        let shot = package.add_export(Object::new("Shot", "Texture"));
        package.add_export(
            Object::new("LevelInfo0", "LevelInfo")
                .with_property("Title", str("  The Foo  "))
                .with_property("Author", str(""))
                .with_property("IdealPlayerCount", str("4 to 8 players"))
                .with_property("Screenshot", Property::Object(shot)),
        );

        let meta = read_level_info(&package).unwrap();
        assert_eq!(meta.title.as_deref(), Some("The Foo"));
        assert_eq!(meta.author, None);
        assert_eq!(meta.player_count, Some(PlayerCount::Range(4, 8)));
        assert_eq!(meta.screenshot, Some(shot));
    }

    #[rstest]
    #[case(8, 8, Some("8"))]
    #[case(4, 8, Some("4-8"))]
    #[case(0, 6, Some("6"))]
    #[case(0, 0, None)]
    fn test_structured_player_count(#[case] min: i32, #[case] max: i32, #[case] expected: Option<&str>) {
        let mut package = MockPackage::new("DM-Foo", 128);
        package.add_export(
            Object::new("LevelInfo0", "LevelInfo")
                .with_property("IdealPlayerCountMin", Property::Int(min))
                .with_property("IdealPlayerCountMax", Property::Int(max))
                .with_property("IdealPlayerCount", str("32")),
        );
        let meta = read_level_info(&package).unwrap();
        assert_eq!(meta.player_count.map(|p| p.to_string()).as_deref(), expected);
        assert_eq!(meta.screenshot, None);
    }

    #[test]
    fn test_missing_level_info() {
        let package = MockPackage::new("DM-Foo", 68);
        let err = read_level_info(&package).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingStructure("LevelInfo"));
    }

    #[test]
    fn test_corrupt_level_info() {
        let mut package = MockPackage::new("DM-Foo", 68);
        package.add_export(Object::new("LevelInfo0", "LevelInfo"));
        package.break_export("LevelInfo0");
        assert_eq!(*read_level_info(&package).unwrap_err(), ErrorKind::Decode);
    }
}
