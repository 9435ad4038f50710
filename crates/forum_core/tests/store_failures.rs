use forum_core::db::open_db_in_memory;
use forum_core::{
    reconcile_topic_counts, Collection, CommentService, Document, DocumentId, DocumentStore,
    EmbeddedRef, Filter, ForumError, NewComment, NewNode, NewTopic, NewUser, NodeService,
    ReconcileReport, SqliteDocumentStore, StoreError, StoreResult, TopicService, Update,
    UserService,
};
use std::cell::Cell;

/// Delegates to SQLite but fails selected operations on demand.
struct FaultyStore<'conn> {
    inner: SqliteDocumentStore<'conn>,
    fail_delete_many: Cell<bool>,
    fail_find_by_id: Cell<bool>,
}

impl<'conn> FaultyStore<'conn> {
    fn new(inner: SqliteDocumentStore<'conn>) -> Self {
        Self {
            inner,
            fail_delete_many: Cell::new(false),
            fail_find_by_id: Cell::new(false),
        }
    }
}

fn injected() -> StoreError {
    StoreError::InvalidData("injected failure".to_string())
}

impl DocumentStore for FaultyStore<'_> {
    fn insert(&self, collection: Collection, doc: &Document) -> StoreResult<DocumentId> {
        self.inner.insert(collection, doc)
    }

    fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        if self.fail_find_by_id.get() {
            return Err(injected());
        }
        self.inner.find_by_id(collection, id)
    }

    fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.inner.find(collection, filter)
    }

    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        self.inner.count(collection, filter)
    }

    fn update_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
        delta: &Update,
    ) -> StoreResult<bool> {
        self.inner.update_by_id(collection, id, delta)
    }

    fn delete_by_id(&self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        self.inner.delete_by_id(collection, id)
    }

    fn delete_many(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        if self.fail_delete_many.get() {
            return Err(injected());
        }
        self.inner.delete_many(collection, filter)
    }
}

struct Seeded {
    user: DocumentId,
    node: DocumentId,
    topic: DocumentId,
    comment: DocumentId,
}

fn seed<S: DocumentStore>(store: S) -> Seeded {
    let user = UserService::new(&store).create(NewUser::new("heroic")).unwrap();
    let node = NodeService::new(&store).create(NewNode::new("rust")).unwrap();
    let topic = TopicService::new(&store)
        .create(NewTopic::new(
            "valid title",
            "body",
            EmbeddedRef::from(&node.id),
            EmbeddedRef::from(&user.id),
        ))
        .unwrap();
    let comment = CommentService::new(&store)
        .create(NewComment::new(
            topic.id.as_str(),
            "first",
            EmbeddedRef::from(&user.id),
        ))
        .unwrap();
    Seeded {
        user: user.id,
        node: node.id,
        topic: topic.id,
        comment: comment.id,
    }
}

fn topic_counts<S: DocumentStore>(store: S, seeded: &Seeded) -> (i64, i64) {
    let user = UserService::new(&store)
        .find_by_id(&seeded.user)
        .unwrap()
        .unwrap();
    let node = NodeService::new(&store)
        .find_by_id(&seeded.node)
        .unwrap()
        .unwrap();
    (user.topic_count, node.topic_count)
}

#[test]
fn comment_removal_failure_aborts_the_cascade() {
    let conn = open_db_in_memory().unwrap();
    let store = FaultyStore::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let seeded = seed(&store);

    store.fail_delete_many.set(true);
    let err = TopicService::new(&store).destroy(&seeded.topic).unwrap_err();
    assert!(matches!(err, ForumError::Store(StoreError::InvalidData(_))));
    store.fail_delete_many.set(false);

    assert!(TopicService::new(&store)
        .find_by_id(&seeded.topic)
        .unwrap()
        .is_some());
    assert!(CommentService::new(&store)
        .find_by_id(&seeded.comment)
        .unwrap()
        .is_some());
    assert_eq!(topic_counts(&store, &seeded), (1, 1));

    assert!(TopicService::new(&store).destroy(&seeded.topic).unwrap());
    assert_eq!(topic_counts(&store, &seeded), (0, 0));
}

#[test]
fn reference_lookup_failure_is_a_store_error_not_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let store = FaultyStore::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let seeded = seed(&store);

    store.fail_find_by_id.set(true);
    let err = TopicService::new(&store)
        .create(NewTopic::new(
            "another title",
            "body",
            EmbeddedRef::new(seeded.node.as_str()),
            EmbeddedRef::new(seeded.user.as_str()),
        ))
        .unwrap_err();
    store.fail_find_by_id.set(false);

    assert!(err.as_validation().is_none());
    assert!(matches!(err, ForumError::Store(_)));
    assert_eq!(store.count(Collection::Topic, &Filter::all()).unwrap(), 1);
    assert_eq!(topic_counts(&store, &seeded), (1, 1));
}

#[test]
fn destroy_tolerates_a_vanished_author() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let seeded = seed(store);

    assert!(UserService::new(store).destroy(&seeded.user).unwrap());
    assert!(TopicService::new(store).destroy(&seeded.topic).unwrap());

    let node = NodeService::new(store)
        .find_by_id(&seeded.node)
        .unwrap()
        .unwrap();
    assert_eq!(node.topic_count, 0);
}

#[test]
fn reconcile_repairs_drifted_counters() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let seeded = seed(store);

    store
        .update_by_id(
            Collection::User,
            &seeded.user,
            &Update::new().set("topicCount", 7),
        )
        .unwrap();

    let report = reconcile_topic_counts(&store).unwrap();
    assert_eq!(
        report,
        ReconcileReport {
            users_fixed: 1,
            nodes_fixed: 0
        }
    );
    assert_eq!(topic_counts(store, &seeded), (1, 1));

    let again = reconcile_topic_counts(&store).unwrap();
    assert_eq!(again, ReconcileReport::default());
}
