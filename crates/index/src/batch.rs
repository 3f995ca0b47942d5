use crate::error::{Error, ErrorKind};
use crate::indexer::{IndexResult, Indexer};
use crate::submission::Submission;
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;

/// Progress events emitted by [`index_all`].
///
/// [`Started`](Self::Started) comes first and [`Complete`](Self::Complete)
/// last, each exactly once. In between there is one
/// [`Indexed`](Self::Indexed) or [`Failed`](Self::Failed) per submission, in
/// completion order.
#[derive(Debug)]
pub enum IndexEvent {
    Started { total: usize },
    Indexed(Box<IndexResult>),
    Failed { path: PathBuf, error: Error },
    Complete { indexed: usize, failed: usize },
}

/// Streams [`IndexEvent`]s while indexing `submissions`, up to `concurrency`
/// at a time.
///
/// Indexing is blocking work, so each submission runs on
/// [`spawn_blocking`](tokio::task::spawn_blocking); the stream must be polled
/// inside a Tokio runtime. A failed submission never ends the stream early.
pub fn index_all(
    indexer: Arc<Indexer>,
    submissions: Vec<Submission>,
    concurrency: usize,
) -> impl Stream<Item = IndexEvent> {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield IndexEvent::Started { total: submissions.len() };

        let tasks = submissions.into_iter().map(|submission| {
            let indexer = Arc::clone(&indexer);
            async move {
                let path = submission.path.clone();
                let result = tokio::task::spawn_blocking(move || indexer.index_one(submission))
                    .await
                    .or_raise(|| ErrorKind::Task)
                    .and_then(|result| result);
                (path, result)
            }
        });
        let mut processing = futures::stream::iter(tasks).buffer_unordered(concurrency.max(1));

        let (mut indexed, mut failed) = (0, 0);
        while let Some((path, result)) = processing.next().await {
            match result {
                Ok(result) => {
                    indexed += 1;
                    yield IndexEvent::Indexed(Box::new(result));
                },
                Err(error) => {
                    failed += 1;
                    tracing::warn!(path = %path.display(), error = ?error, "Submission could not be indexed");
                    yield IndexEvent::Failed { path, error };
                },
            }
        }

        yield IndexEvent::Complete { indexed, failed };
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::MemoryStore;
    use crate::testutil::{png, zip_archive};
    use tempfile::TempDir;
    use ua_package::mock::MockLoader;

    #[tokio::test]
    async fn test_index_all() {
        let dir = TempDir::new().unwrap();
        let shot = png(2, 2);
        let good =
            zip_archive(dir.path(), "DM-Foo.zip", &[("DM-Foo.unr", b"junk".as_slice()), ("shot.png", shot.as_slice())]);
        let missing = dir.path().join("missing.zip");
        let store = Arc::new(MemoryStore::new());
        let indexer = Arc::new(Indexer::new(Arc::new(MockLoader::new()), store.clone()).unwrap());

        let submissions = vec![Submission::new(&good), Submission::new(&missing)];
        let events: Vec<_> = index_all(indexer, submissions, 2).collect().await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], IndexEvent::Started { total: 2 }));
        assert!(matches!(events[3], IndexEvent::Complete { indexed: 1, failed: 1 }));

        for event in &events[1..3] {
            match event {
                IndexEvent::Indexed(result) => {
                    assert_eq!(result.content.name, "DM-Foo");
                    assert_eq!(result.new_attachments.len(), 1);
                },
                IndexEvent::Failed { path, error } => {
                    assert_eq!(path, &missing);
                    assert_eq!(**error, ErrorKind::Archive);
                },
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let indexer = Arc::new(Indexer::new(Arc::new(MockLoader::new()), Arc::new(MemoryStore::new())).unwrap());
        let events: Vec<_> = index_all(indexer, Vec::new(), 4).collect().await;
        assert!(matches!(
            events[..],
            [IndexEvent::Started { total: 0 }, IndexEvent::Complete { indexed: 0, failed: 0 }]
        ));
    }
}
