use storage::blob::{PROGRESS_SCHEMA_VERSION, PROGRESS_STORAGE_KEY, StoredProgress, encode};
use storage::repository::{ProgressRepository, Storage};
use storage::sqlite::SqliteRepository;
use tutorial_core::model::{LayerId, ProgressState};

#[tokio::test]
async fn sqlite_roundtrip_persists_progress_blob() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_blob(PROGRESS_STORAGE_KEY).await.unwrap().is_none());

    let mut state = ProgressState::entry_only();
    state.unlock(LayerId::new(1));
    state.unlock(LayerId::new(2));
    state.set_current(LayerId::new(1));
    let blob = encode(&state, PROGRESS_SCHEMA_VERSION).unwrap();
    repo.save_blob(PROGRESS_STORAGE_KEY, &blob).await.unwrap();

    let raw = repo.load_blob(PROGRESS_STORAGE_KEY).await.unwrap();
    let restored = StoredProgress::decode(raw.as_deref(), PROGRESS_SCHEMA_VERSION)
        .unwrap()
        .resolve(&ProgressState::fully_unlocked());
    assert_eq!(restored, state);
}

#[tokio::test]
async fn sqlite_upsert_overwrites_existing_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_blob(PROGRESS_STORAGE_KEY, "first").await.unwrap();
    repo.save_blob(PROGRESS_STORAGE_KEY, "second").await.unwrap();
    repo.save_blob("unrelated", "other").await.unwrap();

    let raw = repo.load_blob(PROGRESS_STORAGE_KEY).await.unwrap();
    assert_eq!(raw.as_deref(), Some("second"));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn sqlite_stale_blob_resolves_to_fully_unlocked() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_stale?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage
        .progress
        .save_blob(
            PROGRESS_STORAGE_KEY,
            r#"{"state":{"unlockedLayers":[0],"currentLayer":0},"version":1}"#,
        )
        .await
        .unwrap();

    let raw = storage.progress.load_blob(PROGRESS_STORAGE_KEY).await.unwrap();
    let state = StoredProgress::decode(raw.as_deref(), PROGRESS_SCHEMA_VERSION)
        .unwrap()
        .resolve(&ProgressState::entry_only());
    assert!(state.is_fully_unlocked());
    assert_eq!(state.current(), LayerId::new(0));
}
