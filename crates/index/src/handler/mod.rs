//! Per content type indexing.
//!
//! Each [`ContentType`] has a [`Handler`] that turns a classified submission
//! into a [`Content`] record plus the preview images to attach to it.
//! Recoverable problems are written to the submission's log; only a missing
//! structure the content type cannot do without is returned as an error.

mod map;
mod map_pack;
mod mutator;
mod voice;

pub use self::map::MapHandler;
pub use self::map_pack::MapPackHandler;
pub use self::mutator::MutatorHandler;
pub use self::voice::VoiceHandler;

use crate::classify::Classification;
use crate::error::Result;
use crate::incoming::{FileRole, FileSet, Incoming};
use crate::log::{IndexLog, Severity};
use crate::step::Step;
use crate::submission::Submission;
use image::{ImageReader, RgbaImage};
use tracing::instrument;
use ua_content::{Content, ContentType};
use ua_package::PackageLoader;

/// What handlers need besides the submission itself.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub loader: &'a dyn PackageLoader,
    /// Attach images found loose in the archive.
    pub loose_images: bool,
}

/// A handler's output: the record plus images still to be materialized, in
/// attachment order.
#[derive(Debug, Clone)]
pub struct Indexed {
    pub content: Content,
    pub images: Vec<RgbaImage>,
}

pub trait Handler: Send + Sync {
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed>;
}

/// Handles submissions whose content type could not be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownHandler;

impl Handler for UnknownHandler {
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed> {
        let Incoming { submission, files, log } = incoming;
        log.log(Severity::Info, "Content type could not be determined");
        let content = base_content(submission, files, submission.base_name(), classification);
        let images = loose_images(ctx, files, log);
        Ok(Indexed { content, images })
    }
}

pub fn handler_for(content_type: ContentType) -> &'static dyn Handler {
    match content_type {
        ContentType::Map => &MapHandler,
        ContentType::MapPack => &MapPackHandler,
        ContentType::Mutator => &MutatorHandler,
        ContentType::Voice => &VoiceHandler,
        ContentType::Unknown => &UnknownHandler,
    }
}

/// Runs the handler for the classified content type, then applies author
/// and title overrides, which always win over anything read from the files.
///
/// The step is degraded when the handler logged CONTINUE entries.
#[instrument(skip_all, fields(content_type = %classification.content_type))]
pub fn run(ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Step<Indexed> {
    let before = incoming.log.count(Severity::Continue);
    let indexed = match handler_for(classification.content_type).index(ctx, incoming, classification) {
        Ok(indexed) => indexed,
        Err(err) => return Step::Fatal(err),
    };
    let failures = incoming.log.count(Severity::Continue) - before;
    Step::from_failures(indexed, failures).map(|mut indexed| {
        let overrides = &incoming.submission.overrides;
        if let Some(author) = overrides.author() {
            indexed.content.author = author.to_string();
        }
        if let Some(title) = overrides.title() {
            indexed.content.title = title.to_string();
        }
        indexed
    })
}

/// A record carrying everything known before any package is read.
pub(crate) fn base_content(
    submission: &Submission,
    files: &FileSet,
    name: impl Into<String>,
    classification: &Classification,
) -> Content {
    let mut content = Content::new(name);
    content.content_type = classification.content_type;
    content.game = classification.game.clone();
    content.release_date = files.release_date();
    tracing::debug!(path = %submission.path.display(), name = %content.name, "Indexing");
    content
}

/// Decodes every image file in the archive, in archive order. Unreadable
/// images are logged at CONTINUE and skipped.
pub(crate) fn loose_images(ctx: &Context<'_>, files: &FileSet, log: &mut IndexLog) -> Vec<RgbaImage> {
    if !ctx.loose_images {
        return Vec::new();
    }
    let mut images = Vec::new();
    for file in files.of(&[FileRole::Image]) {
        let decoded = ImageReader::new(file.reader()).with_guessed_format().map_err(image::ImageError::IoError);
        match decoded.and_then(|reader| reader.decode()) {
            Ok(image) => images.push(image.to_rgba8()),
            Err(err) => log.log_with(Severity::Continue, "Failed to load image from archive", err),
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incoming::IncomingFile;
    use crate::submission::{OVERRIDE_AUTHOR, OVERRIDE_TITLE};
    use crate::testutil::png;
    use ua_content::Game;
    use ua_package::mock::MockLoader;

    fn classification(content_type: ContentType) -> Classification {
        Classification { content_type, game: Game::Unknown, gametype: "Unknown".to_string() }
    }

    #[test]
    fn test_loose_images() {
        let files = FileSet::new(vec![
            IncomingFile::new("shot1.png", png(3, 2), None),
            IncomingFile::new("broken.jpg", b"not a jpeg".as_slice(), None),
            IncomingFile::new("readme.txt", b"hi".as_slice(), None),
        ]);
        let loader = MockLoader::new();
        let mut log = IndexLog::new();
        let images = loose_images(&Context { loader: &loader, loose_images: true }, &files, &mut log);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].dimensions(), (3, 2));
        assert_eq!(log.count(Severity::Continue), 1);

        let disabled = loose_images(&Context { loader: &loader, loose_images: false }, &files, &mut log);
        assert!(disabled.is_empty());
    }

    #[test]
    fn test_unknown_content() {
        let loader = MockLoader::new();
        let ctx = Context { loader: &loader, loose_images: true };
        let submission = Submission::new("uploads/Stuff.zip")
            .with_override(OVERRIDE_AUTHOR, "Someone")
            .with_override(OVERRIDE_TITLE, "Some Stuff");
        let mut incoming = Incoming::new(submission, vec![IncomingFile::new("shot.png", png(1, 1), None)]);

        let step = run(&ctx, &mut incoming, &classification(ContentType::Unknown));
        assert!(matches!(step, Step::Done(_)));
        let indexed = step.into_result().unwrap();
        assert_eq!(indexed.content.name, "Stuff");
        assert_eq!(indexed.content.title, "Some Stuff");
        assert_eq!(indexed.content.author, "Someone");
        assert_eq!(indexed.images.len(), 1);
        assert_eq!(incoming.log.count(Severity::Info), 1);
    }
}
