//! Indexing of user-submitted content for the Unreal engine family.
//!
//! A [`Submission`] (an archive plus optional overrides) goes through four
//! steps, driven by [`Indexer`]:
//!
//! 1. **Prepare**: the archive is unpacked into an [`Incoming`] and every file
//!    is tagged with its [`FileRole`]s.
//! 2. **Classify**: [`classify`] decides the content type, game and game mode
//!    from file names, extensions and descriptors.
//! 3. **Index**: the [`Handler`] for the content type reads package metadata
//!    and preview images through a [`PackageLoader`](ua_package::PackageLoader).
//! 4. **Materialize**: images are written as PNG attachments to an
//!    [`AttachmentStore`] below a templated directory ([`PathGenerator`]).
//!
//! Indexing is best effort. Problems that only cost some metadata are
//! recorded in the submission's [`IndexLog`] and the record is still
//! produced; only an unreadable archive, a missing required structure or a
//! failed attachment write abort the submission. Use [`index_all`] to index
//! many submissions concurrently.

mod batch;
mod classify;
mod descriptor;
pub mod error;
mod handler;
mod incoming;
mod indexer;
mod introspect;
mod log;
mod materialize;
mod step;
mod submission;
#[cfg(test)]
mod testutil;

pub use crate::batch::{IndexEvent, index_all};
pub use crate::classify::{Classification, classify, gametype_for_map};
pub use crate::handler::{
    Context, Handler, Indexed, MapHandler, MapPackHandler, MutatorHandler, UnknownHandler, VoiceHandler, handler_for,
    run,
};
pub use crate::incoming::{FileRole, FileSet, Incoming, IncomingFile};
pub use crate::indexer::{IndexResult, Indexer};
pub use crate::log::{IndexLog, LogEntry, Severity};
pub use crate::materialize::{AttachmentStore, LocalStore, MemoryStore, PathGenerator, materialize, shot_name};
pub use crate::step::Step;
pub use crate::submission::{
    OVERRIDE_AUTHOR, OVERRIDE_CONTENT_TYPE, OVERRIDE_GAME, OVERRIDE_GAMETYPE, OVERRIDE_TITLE, Overrides, Submission,
};
