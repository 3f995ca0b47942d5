//! Fixtures shared by the tests in this crate.

use crate::error::{ErrorKind, Result};
use crate::materialize::AttachmentStore;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use ua_package::{MipMap, Object, ObjectRef, Property, Texture};
use ua_package::mock::MockPackage;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(crate) fn rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]))
}

pub(crate) fn texture(width: u32, height: u32) -> Texture {
    let data = rgba(width, height).into_raw();
    Texture { mips: vec![MipMap::rgba(width, height, data)] }
}

pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    rgba(width, height).write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Writes a zip with every entry dated June 2001, after UT's release.
pub(crate) fn zip_archive(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let options = SimpleFileOptions::default()
        .last_modified_time(zip::DateTime::from_date_and_time(2001, 6, 1, 12, 0, 0).unwrap());
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (entry, data) in files {
        writer.start_file(*entry, options).unwrap();
        writer.write_all(data).unwrap();
    }
    let path = dir.join(name);
    std::fs::write(&path, writer.finish().unwrap().into_inner()).unwrap();
    path
}

/// An empty map package, with a `LevelSummary` export when `summary` is set.
/// Callers add a [`level_info`] export.
pub(crate) fn map_package(name: &str, version: u16, summary: bool) -> MockPackage {
    let mut package = MockPackage::new(name, version);
    if summary {
        package.add_export(Object::new("LevelSummary", "LevelSummary"));
    }
    package
}

pub(crate) fn level_info(title: &str, author: &str, screenshot: Option<ObjectRef>) -> Object {
    let mut info = Object::new("LevelInfo0", "LevelInfo")
        .with_property("Title", Property::Str(title.to_string()))
        .with_property("Author", Property::Str(author.to_string()))
        .with_property("IdealPlayerCount", Property::Str("4-8".to_string()));
    if let Some(shot) = screenshot {
        info = info.with_property("Screenshot", Property::Object(shot));
    }
    info
}

/// Rejects every write.
pub(crate) struct FailingStore;

impl AttachmentStore for FailingStore {
    fn write(&self, _: &str, _: &str, _: &[u8]) -> Result<String> {
        exn::bail!(ErrorKind::Io)
    }
}
