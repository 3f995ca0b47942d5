//! In-memory package doubles for tests.

use crate::error::{ErrorKind, Result};
use crate::header::PackageHeader;
use crate::object::{Export, Import, Named, Object, ObjectRef};
use crate::package::{Package, PackageLoader};
use exn::OptionExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A package built from fixture objects.
///
/// Clones share their open/close counters, so a template registered with a
/// [`MockLoader`] reports on every package opened from it.
#[derive(Debug, Clone, Default)]
pub struct MockPackage {
    name: String,
    version: u16,
    exports: Vec<Object>,
    imports: Vec<Import>,
    broken: HashSet<String>,
    fail_close: bool,
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl MockPackage {
    pub fn new(name: impl Into<String>, version: u16) -> Self {
        Self { name: name.into(), version, ..Default::default() }
    }

    pub fn add_export(&mut self, object: Object) -> ObjectRef {
        self.exports.push(object);
        ObjectRef::export(self.exports.len() - 1)
    }

    /// Adds an import of `outer.name`, where `outer` is the dotted chain of
    /// enclosing objects (`"MyLevelShots"` or `"MyLevelShots.Group"`).
    pub fn add_import(&mut self, outer: &str, name: &str, class: &str) -> ObjectRef {
        let reference = ObjectRef::import(self.imports.len());
        self.imports.push(Import {
            reference,
            name: name.to_string(),
            class: class.to_string(),
            outer: outer.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect(),
        });
        reference
    }

    /// Makes decoding the named export fail as if its data were corrupt.
    pub fn break_export(&mut self, name: &str) {
        self.broken.insert(name.to_ascii_lowercase());
    }

    pub fn fail_close(&mut self) {
        self.fail_close = true;
    }

    /// Header bytes that a [`MockLoader`] accepts for this package.
    pub fn header_bytes(&self) -> Vec<u8> {
        PackageHeader::new(self.version, 0).to_bytes().to_vec()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn export_at(&self, index: usize) -> Option<Export> {
        self.exports.get(index).map(|o| Export {
            reference: ObjectRef::export(index),
            name: o.name.clone(),
            class: o.class.clone(),
        })
    }
}

impl Package for MockPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u16 {
        self.version
    }

    fn exports_by_class(&self, class: &str) -> Vec<Export> {
        (0..self.exports.len())
            .filter_map(|i| self.export_at(i))
            .filter(|e| e.class.eq_ignore_ascii_case(class))
            .collect()
    }

    fn resolve(&self, reference: ObjectRef) -> Result<Named> {
        if let Some(index) = reference.export_index() {
            return self.export_at(index).map(Named::Export).ok_or_raise(|| ErrorKind::InvalidReference(reference.0));
        }
        if let Some(index) = reference.import_index() {
            return self
                .imports
                .get(index)
                .cloned()
                .map(Named::Import)
                .ok_or_raise(|| ErrorKind::InvalidReference(reference.0));
        }
        exn::bail!(ErrorKind::InvalidReference(reference.0))
    }

    fn export_by_name(&self, name: &str) -> Result<Export> {
        self.exports
            .iter()
            .position(|o| o.name.eq_ignore_ascii_case(name))
            .and_then(|i| self.export_at(i))
            .ok_or_raise(|| ErrorKind::ObjectNotFound(name.to_string()))
    }

    fn decode(&self, export: &Export) -> Result<Object> {
        if self.broken.contains(&export.name.to_ascii_lowercase()) {
            exn::bail!(ErrorKind::Malformed(format!("corrupt export {}", export.name)));
        }
        export
            .reference
            .export_index()
            .and_then(|i| self.exports.get(i))
            .cloned()
            .ok_or_raise(|| ErrorKind::ObjectNotFound(export.name.clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            exn::bail!(ErrorKind::Close);
        }
        Ok(())
    }
}

/// Serves [`MockPackage`] templates by file name.
///
/// Opening checks the header signature first, so arbitrary bytes behave like
/// a corrupt package.
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    packages: HashMap<String, MockPackage>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, file_name: &str, package: MockPackage) -> Self {
        self.packages.insert(file_name.to_ascii_lowercase(), package);
        self
    }

    /// The registered template for `file_name`, for inspecting counters.
    pub fn package(&self, file_name: &str) -> Option<&MockPackage> {
        self.packages.get(&file_name.to_ascii_lowercase())
    }
}

impl PackageLoader for MockLoader {
    fn open(&self, name: &str, data: Arc<[u8]>) -> Result<Box<dyn Package>> {
        PackageHeader::sniff(&data)?;
        let file_name = name.rsplit('/').next().unwrap_or(name);
        let package = self
            .packages
            .get(&file_name.to_ascii_lowercase())
            .ok_or_raise(|| ErrorKind::Malformed(format!("no fixture registered for {file_name}")))?;
        package.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(package.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Property;

    fn level_package() -> MockPackage {
        let mut package = MockPackage::new("DM-Foo", 68);
        let shot = package.add_import("DM-FooShots", "Shot", "Texture");
        package.add_export(
            Object::new("LevelInfo0", "LevelInfo")
                .with_property("Title", Property::Str("Foo".into()))
                .with_property("Screenshot", Property::Object(shot)),
        );
        package.add_export(Object::new("LevelSummary", "LevelSummary"));
        package
    }

    #[test]
    fn test_exports_and_resolution() {
        let package = level_package();
        let infos = package.exports_by_class("levelinfo");
        assert_eq!(infos.len(), 1);
        let info = package.decode(&infos[0]).unwrap();
        let Named::Import(import) = package.resolve(info.object("Screenshot").unwrap()).unwrap() else {
            panic!("expected import");
        };
        assert_eq!(import.package(), Some("DM-FooShots"));
        assert_eq!(package.export_by_name("levelsummary").unwrap().reference, ObjectRef(2));
        assert!(package.resolve(ObjectRef(-9)).is_err());
        assert!(package.resolve(ObjectRef::NONE).is_err());
    }

    #[test]
    fn test_broken_export() {
        let mut package = level_package();
        package.break_export("LevelInfo0");
        let info = package.exports_by_class("LevelInfo").remove(0);
        assert!(matches!(*package.decode(&info).unwrap_err(), ErrorKind::Malformed(_)));
    }

    #[test]
    fn test_loader_requires_signature() {
        let package = level_package();
        let bytes: Arc<[u8]> = package.header_bytes().into();
        let loader = MockLoader::new().with_package("DM-Foo.unr", package);
        assert!(loader.open("DM-Foo.unr", Arc::from(b"garbage!".as_slice())).is_err());
        assert!(loader.open("Maps/dm-foo.UNR", bytes.clone()).is_ok());
        assert!(loader.open("Other.unr", bytes).is_err());
        assert_eq!(loader.package("DM-Foo.unr").unwrap().opens(), 1);
    }
}
