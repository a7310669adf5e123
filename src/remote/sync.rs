use tokio::sync::mpsc;

use crate::event::Event;
use crate::remote::cache::DocIdCache;
use crate::remote::client::DocumentClient;
use crate::remote::{ChecklistDocument, RemoteError, RemoteEvent, RemoteOp};
use crate::tree::{TreeChange, TreeNode, TreeObserver};

/// Work for the persistence task.
#[derive(Debug)]
pub enum SyncRequest {
    /// Open the cached document, or create one from `initial`.
    Open { initial: Vec<TreeNode> },
    /// Overwrite the remote document with this snapshot.
    Replace { items: Vec<TreeNode> },
}

/// Sending side of the persistence task. Requests are handled one at a time,
/// in the order they were issued; callers never wait for them.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncRequest>,
}

impl SyncHandle {
    pub fn open(&self, initial: Vec<TreeNode>) {
        self.send(SyncRequest::Open { initial });
    }

    pub fn replace(&self, items: Vec<TreeNode>) {
        self.send(SyncRequest::Replace { items });
    }

    fn send(&self, request: SyncRequest) {
        if self.tx.send(request).is_err() {
            tracing::warn!("persistence task has stopped; request dropped");
        }
    }
}

/// Spawn the persistence task. Results come back as [`Event::Remote`].
pub fn spawn(
    client: DocumentClient,
    cache: DocIdCache,
    event_tx: mpsc::UnboundedSender<Event>,
) -> SyncHandle {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut worker = SyncWorker {
        client,
        cache,
        doc_id: None,
        event_tx,
    };
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                SyncRequest::Open { initial } => worker.open(initial).await,
                SyncRequest::Replace { items } => worker.replace(items).await,
            }
        }
    });
    SyncHandle { tx }
}

struct SyncWorker {
    client: DocumentClient,
    cache: DocIdCache,
    doc_id: Option<String>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl SyncWorker {
    async fn open(&mut self, initial: Vec<TreeNode>) {
        if let Some(id) = self.cache.load() {
            match self.client.fetch(&id).await {
                Ok(doc) => {
                    tracing::info!(document = %id, "opened remote checklist");
                    self.doc_id = Some(id);
                    self.emit(RemoteEvent::Loaded(doc.items));
                    return;
                }
                Err(RemoteError::NotFound(_)) => {
                    tracing::warn!(document = %id, "cached document is gone; creating a new one");
                    if let Err(e) = self.cache.clear() {
                        self.fail(RemoteOp::Fetch, e);
                    }
                }
                Err(e) => {
                    self.fail(RemoteOp::Fetch, e);
                    return;
                }
            }
        }

        let id = match self
            .client
            .create(&ChecklistDocument { items: initial })
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.fail(RemoteOp::Create, e);
                return;
            }
        };
        tracing::info!(document = %id, "created remote checklist");
        if let Err(e) = self.cache.store(&id) {
            // The document exists either way; only the next session loses it.
            self.fail(RemoteOp::Create, e);
        }
        self.doc_id = Some(id.clone());

        // Re-fetch so the tree carries whatever the store made canonical.
        match self.client.fetch(&id).await {
            Ok(doc) => self.emit(RemoteEvent::Loaded(doc.items)),
            Err(e) => self.fail(RemoteOp::Fetch, e),
        }
    }

    async fn replace(&mut self, items: Vec<TreeNode>) {
        let Some(id) = &self.doc_id else {
            self.fail(RemoteOp::Replace, RemoteError::NoDocument);
            return;
        };
        match self
            .client
            .replace(id, &ChecklistDocument { items })
            .await
        {
            Ok(()) => {
                tracing::debug!(document = %id, "saved remote checklist");
                self.emit(RemoteEvent::Saved);
            }
            Err(e) => self.fail(RemoteOp::Replace, e),
        }
    }

    fn fail(&self, op: RemoteOp, error: RemoteError) {
        tracing::warn!(op = op.label(), error = %error, "remote operation failed");
        self.emit(RemoteEvent::Failed {
            op,
            message: error.to_string(),
        });
    }

    fn emit(&self, event: RemoteEvent) {
        let _ = self.event_tx.send(Event::Remote(event));
    }
}

/// Store observer issuing a full-document replace after every edit. Loads
/// (`Initial`, `Replaced`) are not written back.
pub struct PersistenceObserver {
    sync: SyncHandle,
}

impl PersistenceObserver {
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }
}

impl TreeObserver for PersistenceObserver {
    fn tree_changed(&mut self, change: &TreeChange, roots: &[TreeNode]) {
        if change.is_edit() {
            tracing::debug!(%change, "queueing remote save");
            self.sync.replace(roots.to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::remote::testing::FakeStore;
    use crate::tree::{sample_checklist, TreeStore};

    async fn next_remote(rx: &mut mpsc::UnboundedReceiver<Event>) -> RemoteEvent {
        loop {
            match rx.recv().await.expect("event channel open") {
                Event::Remote(event) => return event,
                _ => continue,
            }
        }
    }

    fn setup(server: &FakeStore, dir: &tempfile::TempDir) -> (SyncHandle, DocIdCache, mpsc::UnboundedReceiver<Event>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cache = DocIdCache::new(dir.path().join("state.json"));
        let handle = spawn(
            DocumentClient::new(server.base_url(), None),
            cache.clone(),
            event_tx,
        );
        (handle, cache, event_rx)
    }

    #[tokio::test]
    async fn first_open_creates_document_and_caches_id() {
        let server = FakeStore::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, cache, mut events) = setup(&server, &dir);

        sync.open(sample_checklist());
        match next_remote(&mut events).await {
            RemoteEvent::Loaded(items) => assert_eq!(items, sample_checklist()),
            other => panic!("unexpected event: {:?}", other),
        }
        let id = cache.load().expect("id cached");
        assert!(server.document(&id).is_some());
    }

    #[tokio::test]
    async fn later_open_fetches_cached_document() {
        let server = FakeStore::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, _, mut events) = setup(&server, &dir);
        sync.open(sample_checklist());
        next_remote(&mut events).await;
        sync.replace(vec![TreeNode::leaf("Edited")]);
        assert!(matches!(next_remote(&mut events).await, RemoteEvent::Saved));

        // A new session with the same cache opens the same document.
        let (sync, _, mut events) = setup(&server, &dir);
        sync.open(sample_checklist());
        match next_remote(&mut events).await {
            RemoteEvent::Loaded(items) => assert_eq!(items, vec![TreeNode::leaf("Edited")]),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(server.document_count(), 1);
    }

    #[tokio::test]
    async fn vanished_document_is_recreated() {
        let server = FakeStore::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, cache, mut events) = setup(&server, &dir);
        cache.store("doc-404").unwrap();

        sync.open(sample_checklist());
        assert!(matches!(next_remote(&mut events).await, RemoteEvent::Loaded(_)));
        assert_ne!(cache.load().as_deref(), Some("doc-404"));
    }

    #[tokio::test]
    async fn replace_before_open_reports_missing_document() {
        let server = FakeStore::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, _, mut events) = setup(&server, &dir);
        sync.replace(sample_checklist());
        match next_remote(&mut events).await {
            RemoteEvent::Failed { op, message } => {
                assert_eq!(op, RemoteOp::Replace);
                assert!(message.contains("No remote document"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_failure_is_reported_not_fatal() {
        let server = FakeStore::start_with_key("secret").await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, _, mut events) = setup(&server, &dir);
        sync.open(sample_checklist());
        match next_remote(&mut events).await {
            RemoteEvent::Failed { op, .. } => assert_eq!(op, RemoteOp::Create),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn observer_saves_edits_but_not_loads() {
        let server = FakeStore::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let (sync, cache, mut events) = setup(&server, &dir);
        sync.open(vec![TreeNode::leaf("A")]);
        next_remote(&mut events).await;

        let mut store = TreeStore::new(vec![TreeNode::leaf("A")], true);
        store.subscribe(Rc::new(RefCell::new(PersistenceObserver::new(sync.clone()))));
        store.replace_all(vec![TreeNode::leaf("A")]);

        let a = store.roots()[0].handle();
        store.rename(a, "Renamed").unwrap();
        assert!(matches!(next_remote(&mut events).await, RemoteEvent::Saved));

        let doc = server.document(&cache.load().unwrap()).unwrap();
        assert_eq!(doc["items"][0]["name"], "Renamed");
        assert!(doc["items"][0]["id"].is_u64());
        assert!(events.try_recv().is_err());
    }
}
