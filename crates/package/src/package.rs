use crate::error::Result;
use crate::object::{Export, Named, Object, ObjectRef};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An opened Unreal package.
///
/// Implementations are provided by the decoder; the indexer only ever reads
/// through this interface.
pub trait Package: Send {
    /// Package name as it appears in references (file name without extension).
    fn name(&self) -> &str;

    /// File format version from the package header.
    fn version(&self) -> u16;

    /// All exports whose class name matches `class`, case-insensitively, in
    /// export table order.
    fn exports_by_class(&self, class: &str) -> Vec<Export>;

    /// Resolves a raw reference against the import/export tables.
    fn resolve(&self, reference: ObjectRef) -> Result<Named>;

    /// Looks up an export by object name, case-insensitively.
    fn export_by_name(&self, name: &str) -> Result<Export>;

    /// Decodes the properties (and raster data for textures) of `export`.
    fn decode(&self, export: &Export) -> Result<Object>;

    /// Releases the package's resources. Called at most once, by
    /// [`PackageHandle`].
    fn close(&mut self) -> Result<()>;
}

/// Opens packages from raw bytes.
pub trait PackageLoader: Send + Sync {
    /// `name` is the package file name, used for diagnostics and for naming
    /// the resulting package.
    fn open(&self, name: &str, data: Arc<[u8]>) -> Result<Box<dyn Package>>;

    /// Opens a package wrapped in a [`PackageHandle`].
    fn open_scoped(&self, name: &str, data: Arc<[u8]>) -> Result<PackageHandle> {
        self.open(name, data).map(PackageHandle::new)
    }
}

/// Owns an open package and guarantees it is closed exactly once, either via
/// [`PackageHandle::close`] or when the handle is dropped.
pub struct PackageHandle {
    package: Box<dyn Package>,
    closed: bool,
}

impl PackageHandle {
    pub fn new(package: Box<dyn Package>) -> Self {
        Self { package, closed: false }
    }

    /// Closes the package, surfacing any error to the caller.
    pub fn close(mut self) -> Result<()> {
        self.close_once()
    }

    fn close_once(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.package.close()
    }
}

impl Deref for PackageHandle {
    type Target = dyn Package;

    fn deref(&self) -> &Self::Target {
        self.package.as_ref()
    }
}

impl Drop for PackageHandle {
    fn drop(&mut self) {
        if let Err(err) = self.close_once() {
            tracing::info!(package = self.package.name(), error = ?err, "Failed to close package");
        }
    }
}

impl fmt::Debug for PackageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageHandle")
            .field("name", &self.package.name())
            .field("version", &self.package.version())
            .field("closed", &self.closed)
            .finish()
    }
}
