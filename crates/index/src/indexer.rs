use crate::classify::classify;
use crate::error::{ErrorKind, Result};
use crate::handler::{self, Context};
use crate::incoming::Incoming;
use crate::log::{IndexLog, Severity};
use crate::materialize::{AttachmentStore, PathGenerator, materialize};
use crate::step::Step;
use crate::submission::Submission;
use exn::{OptionExt, ResultExt};
use std::sync::Arc;
use tracing::instrument;
use ua_archive::Unpacker;
use ua_config::{Config, DEFAULT_ATTACHMENT_TEMPLATE};
use ua_content::{Attachment, Content};
use ua_package::PackageLoader;

/// Everything produced for one submission.
#[derive(Debug, Clone)]
pub struct IndexResult {
    /// The record, with [`new_attachments`](Self::new_attachments) already
    /// listed in its attachments.
    pub content: Content,
    /// Attachments written to the store while indexing this submission.
    pub new_attachments: Vec<Attachment>,
    pub log: IndexLog,
}

/// Runs submissions through the whole pipeline: unpack, classify, index with
/// the handler for the content type, then write preview attachments.
///
/// An `Indexer` holds no per-submission state and can be shared between
/// threads.
pub struct Indexer {
    loader: Arc<dyn PackageLoader>,
    store: Arc<dyn AttachmentStore>,
    paths: PathGenerator,
    unpacker: Unpacker,
    loose_images: bool,
}

impl Indexer {
    /// An indexer with the default attachment layout and archive limits.
    pub fn new(loader: Arc<dyn PackageLoader>, store: Arc<dyn AttachmentStore>) -> Result<Self> {
        Ok(Self {
            loader,
            store,
            paths: DEFAULT_ATTACHMENT_TEMPLATE.parse()?,
            unpacker: Unpacker::default(),
            loose_images: true,
        })
    }

    pub fn with_config(
        config: &Config,
        loader: Arc<dyn PackageLoader>,
        store: Arc<dyn AttachmentStore>,
    ) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        Ok(Self {
            loader,
            store,
            paths: config.attachments.template.parse()?,
            unpacker: Unpacker::new(config.archive.max_entry_size),
            loose_images: config.index.loose_images,
        })
    }

    /// Indexes one submission and returns its result.
    ///
    /// Errors only when the submission could not be indexed at all: the
    /// archive is unreadable, the content type's required structure is
    /// missing, or attachments could not be written.
    pub fn index_one(&self, submission: Submission) -> Result<IndexResult> {
        let mut result = None;
        self.index(submission, |r| result = Some(r))?;
        result.ok_or_raise(|| ErrorKind::Task)
    }

    /// Indexes one submission, handing the result to `completed`.
    ///
    /// `completed` is not called when an error is returned.
    #[instrument(skip_all, fields(path = %submission.path.display(), content_type, degraded))]
    pub fn index(&self, submission: Submission, completed: impl FnOnce(IndexResult)) -> Result<()> {
        let mut incoming = match Incoming::prepare(submission, &self.unpacker) {
            Ok(incoming) => incoming,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to read submission archive");
                return Err(err);
            },
        };

        let classification = classify(&mut incoming);
        tracing::Span::current().record("content_type", classification.content_type.as_str());

        let ctx = Context { loader: self.loader.as_ref(), loose_images: self.loose_images };
        let step = handler::run(&ctx, &mut incoming, &classification);
        tracing::Span::current().record("degraded", step.is_degraded());
        let indexed = match step {
            Step::Done(indexed) | Step::Degraded(indexed) => indexed,
            Step::Fatal(err) => {
                incoming.log.log_with(Severity::Fatal, "Indexing failed", &err);
                return Err(err);
            },
        };

        let mut content = indexed.content;
        let new_attachments = match materialize(&content, &indexed.images, &self.paths, self.store.as_ref()) {
            Ok(attachments) => attachments,
            Err(err) => {
                incoming.log.log_with(Severity::Fatal, "Failed to write attachments", &err);
                return Err(err);
            },
        };
        content.attachments.extend(new_attachments.iter().cloned());

        tracing::info!(
            name = %content.name,
            game = content.game.as_str(),
            attachments = new_attachments.len(),
            "Indexed"
        );
        completed(IndexResult { content, new_attachments, log: incoming.log });
        Ok(())
    }
}
