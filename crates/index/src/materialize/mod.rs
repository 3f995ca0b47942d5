//! Turning extracted images into stored attachments.

mod store;
mod template;

pub use self::store::{AttachmentStore, LocalStore, MemoryStore};
pub use self::template::PathGenerator;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::instrument;
use ua_content::{Attachment, Content};

/// File name of the `n`th (1-based) preview of `name`.
///
/// ```
/// assert_eq!(ua_index::shot_name("DM-Foo", 1), "DM-Foo_shot_1.png");
/// assert_eq!(ua_index::shot_name("My Pack", 2), "My_Pack_shot_2.png");
/// ```
pub fn shot_name(name: &str, n: usize) -> String {
    format!("{}_shot_{n}.png", name.replace(' ', "_"))
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).or_raise(|| ErrorKind::Image)?;
    Ok(buf.into_inner())
}

/// Encodes each image as PNG and writes it to the store, in order, below the
/// directory generated for `content`. Any failure aborts the whole batch.
#[instrument(skip_all, fields(name = %content.name, images = images.len()))]
pub fn materialize(
    content: &Content,
    images: &[RgbaImage],
    paths: &PathGenerator,
    store: &dyn AttachmentStore,
) -> Result<Vec<Attachment>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let dir = paths.generate(content)?;
    images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let name = shot_name(&content.name, i + 1);
            let bytes = encode_png(image)?;
            let path = store.write(&dir, &name, &bytes)?;
            Ok(Attachment::image(name, path, &bytes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FailingStore, rgba};
    use ua_content::{AttachmentKind, ContentType, Game};

    fn content() -> Content {
        let mut content = Content::new("CTF Face");
        content.game = Game::UnrealTournament;
        content.content_type = ContentType::Map;
        content
    }

    fn generator() -> PathGenerator {
        "{{ game|slug }}/{{ type|slug }}/{{ name|slug }}".parse().unwrap()
    }

    #[test]
    fn test_materialize_names_and_paths() {
        let store = MemoryStore::new();
        let attachments = materialize(&content(), &[rgba(2, 2), rgba(3, 1)], &generator(), &store).unwrap();

        let names: Vec<_> = attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["CTF_Face_shot_1.png", "CTF_Face_shot_2.png"]);
        assert_eq!(attachments[0].path, "unreal-tournament/map/ctf-face/CTF_Face_shot_1.png");
        assert_eq!(attachments[0].kind, AttachmentKind::Image);

        let stored = store.get(&attachments[1].path).unwrap();
        let decoded = image::load_from_memory_with_format(&stored, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 1));
        assert_eq!(attachments[1].hash, Attachment::image("", "", &stored).hash);
    }

    #[test]
    fn test_nothing_to_write() {
        let store = FailingStore;
        assert!(materialize(&content(), &[], &generator(), &store).unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_propagates() {
        let err = materialize(&content(), &[rgba(1, 1)], &generator(), &FailingStore).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }
}
