use crate::classify::{PREVIEW_DIMENSIONS, PREVIEW_NAME_HINTS};
use crate::error::{ErrorKind, Result};
use crate::incoming::FileSet;
use crate::log::{IndexLog, Severity};
use exn::{OptionExt, ResultExt};
use image::RgbaImage;
use tracing::instrument;
use ua_package::{Named, Object, ObjectRef, Package, PackageHandle, PackageLoader};

/// Outcome of one way of picking a texture out of a material sequence.
enum Pick {
    Found(Object),
    /// The strategy applied but led nowhere; stop looking.
    NotFound,
    /// The strategy does not apply; try the next one.
    Skip,
}

type Strategy = fn(&dyn Package, &Object) -> Result<Pick>;

/// Tried in order; the first strategy that does not skip decides.
const SEQUENCE_STRATEGIES: &[(&str, Strategy)] = &[
    ("fallback material", fallback_material),
    ("named texture", named_texture),
    ("preview sized texture", preview_sized_texture),
];

/// Follows a map's `Screenshot` reference to an image.
///
/// Failures are logged at CONTINUE and yield `None`. A sibling package
/// opened along the way is always closed before returning; a failing close
/// is logged at INFO.
#[instrument(skip_all, fields(package = package.name(), %reference))]
pub(crate) fn resolve_screenshot(
    package: &dyn Package,
    reference: ObjectRef,
    files: &FileSet,
    loader: &dyn PackageLoader,
    log: &mut IndexLog,
) -> Option<RgbaImage> {
    let mut secondary = None;
    let found = find_image(package, reference, files, loader, &mut secondary);
    if let Some(handle) = secondary.take()
        && let Err(err) = handle.close()
    {
        log.log_with(Severity::Info, "Screenshot cleanup failed", err);
    }
    match found {
        Ok(image) => image,
        Err(err) => {
            log.log_with(Severity::Continue, "Failed to read screenshot from packages", err);
            None
        },
    }
}

fn find_image(
    package: &dyn Package,
    reference: ObjectRef,
    files: &FileSet,
    loader: &dyn PackageLoader,
    secondary: &mut Option<PackageHandle>,
) -> Result<Option<RgbaImage>> {
    let resolved = package.resolve(reference).or_raise(|| ErrorKind::ReferenceResolution(reference.to_string()))?;
    let object = match resolved {
        Named::Export(export) => package.decode(&export).or_raise(|| ErrorKind::Decode)?,
        Named::Import(import) => {
            let name = import
                .package()
                .ok_or_raise(|| ErrorKind::ReferenceResolution(format!("{} has no outer package", import.name)))?;
            let file = files
                .find_package(name)
                .ok_or_raise(|| ErrorKind::ReferenceResolution(format!("package {name} is not in the submission")))?;
            tracing::debug!(file = %file.path, "Opening sibling package");
            let handle = secondary.insert(loader.open_scoped(&file.path, file.data()).or_raise(|| ErrorKind::Decode)?);
            let export = handle
                .export_by_name(&import.name)
                .or_raise(|| ErrorKind::ReferenceResolution(format!("{name}.{}", import.name)))?;
            handle.decode(&export).or_raise(|| ErrorKind::Decode)?
        },
    };

    // Sequence members live next to the sequence itself.
    let owner: &dyn Package = match secondary.as_ref() {
        Some(handle) => &**handle,
        None => package,
    };
    let object = if object.class.eq_ignore_ascii_case("MaterialSequence") {
        match pick_from_sequence(owner, &object)? {
            Some(texture) => texture,
            None => return Ok(None),
        }
    } else {
        object
    };

    let Some(texture) = object.texture.as_ref() else {
        tracing::debug!(object = %object.name, class = %object.class, "Screenshot is not a texture");
        return Ok(None);
    };
    let mip = texture
        .first_mip()
        .ok_or_raise(|| ErrorKind::ReferenceResolution(format!("{} has no mipmaps", object.name)))?;
    mip.decode().or_raise(|| ErrorKind::Image).map(Some)
}

fn pick_from_sequence(package: &dyn Package, sequence: &Object) -> Result<Option<Object>> {
    for (name, strategy) in SEQUENCE_STRATEGIES {
        match strategy(package, sequence)? {
            Pick::Found(object) => {
                tracing::debug!(strategy = name, texture = %object.name, "Picked texture from material sequence");
                return Ok(Some(object));
            },
            Pick::NotFound => return Ok(None),
            Pick::Skip => {},
        }
    }
    Ok(None)
}

fn fallback_material(package: &dyn Package, sequence: &Object) -> Result<Pick> {
    let Some(reference) = sequence.object("FallbackMaterial") else {
        return Ok(Pick::Skip);
    };
    let export = match package.resolve(reference).or_raise(|| ErrorKind::ReferenceResolution(reference.to_string()))? {
        Named::Export(export) => export,
        Named::Import(import) => {
            exn::bail!(ErrorKind::ReferenceResolution(format!("fallback material {} is imported", import.name)))
        },
    };
    let object = package.decode(&export).or_raise(|| ErrorKind::Decode)?;
    Ok(if object.texture.is_some() { Pick::Found(object) } else { Pick::NotFound })
}

fn named_texture(package: &dyn Package, _: &Object) -> Result<Pick> {
    for export in package.exports_by_class("Texture") {
        let name = export.name.to_ascii_lowercase();
        if PREVIEW_NAME_HINTS.iter().any(|hint| name.contains(hint)) {
            return package.decode(&export).or_raise(|| ErrorKind::Decode).map(Pick::Found);
        }
    }
    Ok(Pick::Skip)
}

fn preview_sized_texture(package: &dyn Package, _: &Object) -> Result<Pick> {
    for export in package.exports_by_class("Texture") {
        let object = package.decode(&export).or_raise(|| ErrorKind::Decode)?;
        let size = object.texture.as_ref().and_then(|t| t.first_mip()).map(|m| (m.width, m.height));
        if size == Some(PREVIEW_DIMENSIONS) {
            return Ok(Pick::Found(object));
        }
    }
    Ok(Pick::Skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incoming::IncomingFile;
    use crate::testutil::texture;
    use ua_package::Property;
    use ua_package::mock::{MockLoader, MockPackage};

    const SHOTS_FILE: &str = "Textures/DM-FooShots.utx";

    fn shots_package() -> MockPackage {
        let mut shots = MockPackage::new("DM-FooShots", 68);
        shots.add_export(Object::new("Shot", "Texture").with_texture(texture(4, 2)));
        shots
    }

    fn map_with_import() -> (MockPackage, ObjectRef) {
        let mut map = MockPackage::new("DM-Foo", 68);
        let shot = map.add_import("DM-FooShots", "Shot", "Texture");
        (map, shot)
    }

    fn files_with(package: &MockPackage) -> FileSet {
        FileSet::new(vec![IncomingFile::new(SHOTS_FILE, package.header_bytes(), None)])
    }

    #[test]
    fn test_direct_export() {
        let mut map = MockPackage::new("DM-Foo", 68);
        let shot = map.add_export(Object::new("Shot", "Texture").with_texture(texture(4, 2)));
        let mut log = IndexLog::new();
        let image = resolve_screenshot(&map, shot, &FileSet::default(), &MockLoader::new(), &mut log).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert!(log.is_empty());
    }

    #[test]
    fn test_non_texture_yields_nothing() {
        let mut map = MockPackage::new("DM-Foo", 68);
        let brush = map.add_export(Object::new("Brush0", "Brush"));
        let mut log = IndexLog::new();
        assert!(resolve_screenshot(&map, brush, &FileSet::default(), &MockLoader::new(), &mut log).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_sibling_import() {
        let (map, shot) = map_with_import();
        let shots = shots_package();
        let files = files_with(&shots);
        let loader = MockLoader::new().with_package("DM-FooShots.utx", shots);
        let mut log = IndexLog::new();

        let image = resolve_screenshot(&map, shot, &files, &loader, &mut log);
        assert!(image.is_some());
        assert!(log.is_empty());
        let template = loader.package("DM-FooShots.utx").unwrap();
        assert_eq!((template.opens(), template.closes()), (1, 1));
    }

    #[test]
    fn test_absent_sibling() {
        let (map, shot) = map_with_import();
        let mut log = IndexLog::new();
        assert!(resolve_screenshot(&map, shot, &FileSet::default(), &MockLoader::new(), &mut log).is_none());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].severity, Severity::Continue);
        assert_eq!(log.entries()[0].message, "Failed to read screenshot from packages");
    }

    #[test]
    fn test_sibling_closed_once_when_lookup_fails() {
        let mut map = MockPackage::new("DM-Foo", 68);
        let shot = map.add_import("DM-FooShots", "Missing", "Texture");
        let shots = shots_package();
        let files = files_with(&shots);
        let loader = MockLoader::new().with_package("DM-FooShots.utx", shots);
        let mut log = IndexLog::new();

        assert!(resolve_screenshot(&map, shot, &files, &loader, &mut log).is_none());
        assert_eq!(log.count(Severity::Continue), 1);
        assert_eq!(loader.package("DM-FooShots.utx").unwrap().closes(), 1);
    }

    #[test]
    fn test_failing_close_is_informational() {
        let (map, shot) = map_with_import();
        let mut shots = shots_package();
        shots.fail_close();
        let files = files_with(&shots);
        let loader = MockLoader::new().with_package("DM-FooShots.utx", shots);
        let mut log = IndexLog::new();

        assert!(resolve_screenshot(&map, shot, &files, &loader, &mut log).is_some());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].severity, Severity::Info);
        assert_eq!(log.entries()[0].message, "Screenshot cleanup failed");
        assert_eq!(loader.package("DM-FooShots.utx").unwrap().closes(), 1);
    }

    #[test]
    fn test_sequence_fallback_material() {
        let mut map = MockPackage::new("DM-Foo", 128);
        map.add_export(Object::new("ScreenA", "Texture").with_texture(texture(2, 2)));
        let fallback = map.add_export(Object::new("Plain", "Texture").with_texture(texture(8, 4)));
        let sequence = map.add_export(
            Object::new("Shots", "MaterialSequence").with_property("FallbackMaterial", Property::Object(fallback)),
        );
        let image = resolve_screenshot(&map, sequence, &FileSet::default(), &MockLoader::new(), &mut IndexLog::new());
        assert_eq!(image.map(|i| i.dimensions()), Some((8, 4)));
    }

    #[test]
    fn test_sequence_imported_fallback_is_logged() {
        let mut map = MockPackage::new("DM-Foo", 128);
        map.add_export(Object::new("LevelPreview", "Texture").with_texture(texture(2, 2)));
        let fallback = map.add_import("OtherShots", "Plain", "Texture");
        let sequence = map.add_export(
            Object::new("Shots", "MaterialSequence").with_property("FallbackMaterial", Property::Object(fallback)),
        );
        let mut log = IndexLog::new();
        assert!(resolve_screenshot(&map, sequence, &FileSet::default(), &MockLoader::new(), &mut log).is_none());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].severity, Severity::Continue);
    }

    #[test]
    fn test_sequence_named_texture() {
        let mut map = MockPackage::new("DM-Foo", 128);
        map.add_export(Object::new("Wall", "Texture").with_texture(texture(512, 256)));
        map.add_export(Object::new("LevelPreview2", "Texture").with_texture(texture(2, 2)));
        let sequence = map.add_export(Object::new("Shots", "MaterialSequence"));
        let image = resolve_screenshot(&map, sequence, &FileSet::default(), &MockLoader::new(), &mut IndexLog::new());
        assert_eq!(image.map(|i| i.dimensions()), Some((2, 2)));
    }

    #[test]
    fn test_sequence_preview_sized_texture() {
        let mut map = MockPackage::new("DM-Foo", 128);
        map.add_export(Object::new("Wall", "Texture").with_texture(texture(2, 2)));
        map.add_export(Object::new("Floor", "Texture").with_texture(texture(512, 256)));
        let sequence = map.add_export(Object::new("Shots", "MaterialSequence"));
        let image = resolve_screenshot(&map, sequence, &FileSet::default(), &MockLoader::new(), &mut IndexLog::new());
        assert_eq!(image.map(|i| i.dimensions()), Some((512, 256)));
    }

    #[test]
    fn test_sequence_without_candidates() {
        let mut map = MockPackage::new("DM-Foo", 128);
        map.add_export(Object::new("Wall", "Texture").with_texture(texture(2, 2)));
        let sequence = map.add_export(Object::new("Shots", "MaterialSequence"));
        let mut log = IndexLog::new();
        assert!(resolve_screenshot(&map, sequence, &FileSet::default(), &MockLoader::new(), &mut log).is_none());
        assert!(log.is_empty());
    }
}
