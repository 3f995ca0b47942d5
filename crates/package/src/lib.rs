//! Contract between the indexer and an Unreal package decoder.
//!
//! The binary format itself is decoded elsewhere; this crate defines what
//! the indexer can ask of an opened package:
//!
//! - the header version and exports grouped by class
//! - resolution of raw object references to exports or imports
//! - decoded objects with total property accessors ([`Object::string`],
//!   [`Object::int`], [`Object::object`])
//! - texture mips that convert to RGBA images ([`MipMap::decode`])
//!
//! Packages are closed exactly once through [`PackageHandle`], including on
//! early return. Enable the `mock` feature for in-memory test doubles.

pub mod error;
mod header;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod object;
mod package;
mod texture;

pub use crate::header::{PACKAGE_MAGIC, PackageHeader};
pub use crate::object::{Export, Import, Named, Object, ObjectRef, Property};
pub use crate::package::{Package, PackageHandle, PackageLoader};
pub use crate::texture::{MipMap, Texture, TextureFormat};
