use chrono::Duration;
use literacy_core::model::{LevelId, Progress};
use literacy_core::time::fixed_now;
use storage::repository::{ProgressRecord, ProgressRepository, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_progress_starts_empty() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_empty?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.get_progress().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_progress_upserts_single_slot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = ProgressRecord::from_progress(Progress::new(LevelId::new(2).unwrap()), fixed_now());
    repo.save_progress(&first).await.unwrap();

    let later = fixed_now() + Duration::minutes(5);
    let second = ProgressRecord::from_progress(Progress::new(LevelId::new(3).unwrap()), later);
    repo.save_progress(&second).await.unwrap();

    let stored = repo.get_progress().await.unwrap().expect("progress stored");
    assert_eq!(stored.raw_value, "3");
    assert_eq!(stored.updated_at, later);
    assert_eq!(stored.progress().max_unlocked(), LevelId::new(3).unwrap());
}

#[tokio::test]
async fn sqlite_unparseable_value_reads_as_first_level() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_garbage?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_progress(&ProgressRecord {
        raw_value: "nível três".into(),
        updated_at: fixed_now(),
    })
    .await
    .unwrap();

    let stored = repo.get_progress().await.unwrap().unwrap();
    assert_eq!(stored.raw_value, "nível três");
    assert_eq!(stored.progress(), Progress::default());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_facade_uses_sqlite_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    let record = ProgressRecord::from_progress(Progress::new(LevelId::new(5).unwrap()), fixed_now());
    storage.progress.save_progress(&record).await.unwrap();

    let stored = storage.progress.get_progress().await.unwrap();
    assert_eq!(stored, Some(record));
}
