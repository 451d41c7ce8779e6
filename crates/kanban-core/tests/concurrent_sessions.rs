//! Two sessions over one file-backed store.

use chrono::Utc;
use kanban_core::db::DEFAULT_BUSY_TIMEOUT;
use kanban_core::dto::WorkItemCreate;
use kanban_core::model::{NewUser, State};
use kanban_core::repository::WorkItemRepository;
use kanban_core::response::Response;
use kanban_core::session::{
    ChangeSet, Session, SqliteSession, StoreError, WorkItemFilter, WorkItemRecord,
};
use kanban_core::tags::TagResolver;
use kanban_core::users::create_user;
use tempfile::TempDir;

fn open(dir: &TempDir) -> SqliteSession {
    SqliteSession::open(&dir.path().join("kanban.sqlite3"), DEFAULT_BUSY_TIMEOUT)
        .expect("open file-backed store")
}

#[test]
fn racing_writers_creating_one_tag_name_conflict() {
    let dir = TempDir::new().unwrap();
    let mut first = open(&dir);
    let adrian = create_user(&mut first, NewUser::new("Adrian", "adrian@example.com")).unwrap();

    // The first writer resolves "Fresh" while it does not exist yet.
    let mut changes = ChangeSet::new();
    let tags = TagResolver::new(&first)
        .resolve(&mut changes, ["Fresh"])
        .unwrap();
    assert!(changes.is_tag_staged("Fresh"));
    let now = Utc::now();
    changes.insert_work_item(WorkItemRecord {
        title: "Slow Writer".into(),
        description: None,
        assigned_to: adrian,
        tags,
        state: State::New,
        created_at: now,
        state_updated_at: now,
    });

    // A second writer commits the same new tag name first.
    let mut second = WorkItemRepository::new(open(&dir));
    let (response, _) = second
        .create(WorkItemCreate::new("Fast Writer", adrian, None, ["Fresh"]))
        .unwrap();
    assert_eq!(response, Response::Created);

    let err = first.commit(changes).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");

    // The losing commit left nothing behind.
    let items = first.work_items(&WorkItemFilter::all()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Fast Writer");
    let fresh: Vec<_> = first
        .tags()
        .unwrap()
        .into_iter()
        .filter(|t| t.name == "Fresh")
        .collect();
    assert_eq!(fresh.len(), 1);
}

#[test]
fn delete_racing_another_delete_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let mut first = open(&dir);
    let adrian = create_user(&mut first, NewUser::new("Adrian", "adrian@example.com")).unwrap();
    let (_, id) = WorkItemRepository::new(open(&dir))
        .create(WorkItemCreate::new("Make Rice", adrian, None, ["To Do"]))
        .unwrap();

    // The first writer has seen the item and staged its removal.
    assert!(first.work_item(id).unwrap().is_some());
    let mut changes = ChangeSet::new();
    changes.remove_work_item(id);

    let mut second = WorkItemRepository::new(open(&dir));
    assert_eq!(second.delete(id).unwrap(), Response::Deleted);

    let err = first.commit(changes).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
    assert!(first.work_item(id).unwrap().is_none());
}

#[test]
fn second_session_sees_committed_work() {
    let dir = TempDir::new().unwrap();
    let mut writer = WorkItemRepository::new(open(&dir));
    let anna = create_user(writer.session_mut(), NewUser::new("Anna", "anna@example.com")).unwrap();
    let (_, id) = writer
        .create(WorkItemCreate::new("Make Rice", anna, None, ["To Do"]))
        .unwrap();

    let reader = WorkItemRepository::new(open(&dir));
    let item = reader.read(id).unwrap().unwrap();
    assert_eq!(item.title, "Make Rice");
    assert_eq!(item.assignee_name(), Some("Anna"));
    assert_eq!(reader.read_all_by_tag("To Do").unwrap().len(), 1);
}

#[test]
fn reopening_a_store_keeps_its_data() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut repo = WorkItemRepository::new(open(&dir));
        let user = create_user(repo.session_mut(), NewUser::new("Adrian", "a@example.com")).unwrap();
        repo.create(WorkItemCreate::new("Make Pasta", user, None, ["Doing"]))
            .unwrap()
            .1
    };

    let repo = WorkItemRepository::new(open(&dir));
    assert_eq!(repo.read(id).unwrap().unwrap().tag_names(), vec!["Doing"]);
}
