use crate::texture::Texture;
use std::fmt;

/// A raw object reference as stored in package property data.
///
/// Positive values index the export table (1-based), negative values index
/// the import table (`-1` is the first import) and zero is "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectRef(pub i32);

impl ObjectRef {
    pub const NONE: Self = Self(0);

    pub fn export(index: usize) -> Self {
        Self(i32::try_from(index).map_or(0, |i| i.saturating_add(1)))
    }

    pub fn import(index: usize) -> Self {
        Self(i32::try_from(index).map_or(0, |i| -(i.saturating_add(1))))
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Zero-based export table index, if this refers to an export.
    pub fn export_index(&self) -> Option<usize> {
        (self.0 > 0).then(|| (self.0 - 1) as usize)
    }

    /// Zero-based import table index, if this refers to an import.
    pub fn import_index(&self) -> Option<usize> {
        (self.0 < 0).then(|| (-(self.0 as i64) - 1) as usize)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An object defined in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub reference: ObjectRef,
    pub name: String,
    pub class: String,
}

/// An object referenced by a package but defined in another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub reference: ObjectRef,
    pub name: String,
    pub class: String,
    /// Chain of enclosing object names, outermost first. For
    /// `MyLevelShots.Group.Shot` this is `["MyLevelShots", "Group"]`.
    pub outer: Vec<String>,
}

impl Import {
    /// Name of the package file that defines this object, ignoring any
    /// groups in between.
    ///
    /// ```
    /// use ua_package::{Import, ObjectRef};
    /// let import = Import {
    ///     reference: ObjectRef(-1),
    ///     name: "Shot".into(),
    ///     class: "Texture".into(),
    ///     outer: vec!["MyLevelShots".into(), "Screens".into()],
    /// };
    /// assert_eq!(import.package(), Some("MyLevelShots"));
    /// ```
    pub fn package(&self) -> Option<&str> {
        self.outer.first().map(String::as_str)
    }
}

/// A resolved object reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Named {
    Export(Export),
    Import(Import),
}

impl Named {
    pub fn name(&self) -> &str {
        match self {
            Named::Export(e) => &e.name,
            Named::Import(i) => &i.name,
        }
    }

    pub fn class(&self) -> &str {
        match self {
            Named::Export(e) => &e.class,
            Named::Import(i) => &i.class,
        }
    }
}

/// A decoded property value.
///
/// Only the shapes the indexer inspects get their own variant; every other
/// property type (floats, structs, arrays...) collapses into [`Property::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Str(String),
    Int(i32),
    Object(ObjectRef),
    Other,
}

impl Property {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Property::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// A "none" reference reads as absent.
    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Property::Object(r) if !r.is_none() => Some(*r),
            _ => None,
        }
    }
}

/// A decoded export: its properties plus raster data for textures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    pub name: String,
    pub class: String,
    properties: Vec<(String, Property)>,
    pub texture: Option<Texture>,
}

impl Object {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self { name: name.into(), class: class.into(), properties: Vec::new(), texture: None }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Property) -> Self {
        self.properties.push((name.into(), value));
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Property names are case-insensitive, like everything else in the
    /// engine's name table. When a property repeats, the last value wins.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().rev().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v)
    }

    /// String value of `name`; absent or differently typed properties read
    /// as `None`.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.property(name)?.as_str()
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        self.property(name)?.as_int()
    }

    /// Object reference stored in `name`. A "none" reference reads as `None`.
    pub fn object(&self, name: &str) -> Option<ObjectRef> {
        self.property(name)?.as_object()
    }
}
