use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use literacy_core::model::{LevelId, Question, QuestionDraft, SessionStatus};
use literacy_core::time::fixed_now;
use services::{
    AppServices, Clock, GameHandle, GameHandleError, GenerationError, NarrationQueue,
    QuestionSource,
};
use storage::repository::Storage;

/// The first request is slow; later ones answer at once.
#[derive(Default)]
struct SlowFirstSource {
    calls: AtomicUsize,
}

#[async_trait]
impl QuestionSource for SlowFirstSource {
    async fn fetch(&self, _prompt_context: &str) -> Result<Question, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == 1 {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Ok(QuestionDraft::new(
            format!("Pergunta {call}"),
            ["A", "B", "C"],
            "A",
            "A vem primeiro.",
        )
        .validate()?)
    }
}

async fn services(source: Arc<dyn QuestionSource>) -> AppServices {
    AppServices::from_storage(Storage::in_memory(), Clock::fixed(fixed_now()), source)
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn handle_drives_a_level_to_completion() {
    let services = services(Arc::new(SlowFirstSource::default())).await;
    let (handle, _task) = GameHandle::spawn(services.game_engine(NarrationQueue::silent()));
    let mut snapshots = handle.subscribe();

    handle.start_level(LevelId::FIRST).await.unwrap();
    for index in 1..=7 {
        snapshots
            .wait_for(|s| {
                s.as_ref().is_some_and(|s| {
                    s.question_index.value() == index && s.status == SessionStatus::AwaitingAnswer
                })
            })
            .await
            .unwrap();

        handle.submit_answer("C").await.unwrap();
        snapshots
            .wait_for(|s| s.as_ref().is_some_and(|s| s.status == SessionStatus::Incorrect))
            .await
            .unwrap();

        handle.submit_answer("A").await.unwrap();
        if index < 7 {
            snapshots
                .wait_for(|s| s.as_ref().is_some_and(|s| s.can_advance()))
                .await
                .unwrap();
            assert_eq!(handle.snapshot().unwrap().feedback, "A vem primeiro.");
            handle.advance_question().await.unwrap();
        }
    }

    snapshots
        .wait_for(|s| s.as_ref().is_some_and(|s| s.is_level_complete()))
        .await
        .unwrap();
    assert_eq!(
        services.progress().current().await.max_unlocked(),
        LevelId::new(2).unwrap()
    );

    handle.end_session().await.unwrap();
    snapshots.wait_for(Option::is_none).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_question_from_an_abandoned_session_is_ignored() {
    let services = services(Arc::new(SlowFirstSource::default())).await;
    let (handle, _task) = GameHandle::spawn(services.game_engine(NarrationQueue::silent()));
    let mut snapshots = handle.subscribe();

    handle.start_level(LevelId::FIRST).await.unwrap();
    snapshots
        .wait_for(|s| s.as_ref().is_some_and(|s| s.status == SessionStatus::Loading))
        .await
        .unwrap();
    handle.end_session().await.unwrap();
    handle.start_level(LevelId::FIRST).await.unwrap();

    let snapshot = snapshots
        .wait_for(|s| s.as_ref().is_some_and(|s| s.status == SessionStatus::AwaitingAnswer))
        .await
        .unwrap()
        .clone()
        .unwrap();
    assert_eq!(snapshot.question.as_ref().unwrap().text(), "Pergunta 2");

    // Let the first request finish.
    tokio::time::sleep(Duration::from_secs(20)).await;
    let snapshot = handle.snapshot().unwrap();
    assert_eq!(snapshot.question.unwrap().text(), "Pergunta 2");
    assert_eq!(snapshot.status, SessionStatus::AwaitingAnswer);
}

#[tokio::test]
async fn locked_level_keeps_the_handle_idle() {
    let services = services(Arc::new(SlowFirstSource::default())).await;
    let (handle, _task) = GameHandle::spawn(services.game_engine(NarrationQueue::silent()));
    let mut snapshots = handle.subscribe();

    handle.start_level(LevelId::new(4).unwrap()).await.unwrap();
    handle.repeat_question().await.unwrap();
    handle.advance_question().await.unwrap();
    handle.reset_progress().await.unwrap();
    assert!(handle.snapshot().is_none());

    // Commands are applied in order, so the first session seen is level 1.
    handle.start_level(LevelId::FIRST).await.unwrap();
    let snapshot = snapshots
        .wait_for(Option::is_some)
        .await
        .unwrap()
        .clone()
        .unwrap();
    assert_eq!(snapshot.level.id(), LevelId::FIRST);
}

#[tokio::test]
async fn handle_reports_a_stopped_engine() {
    let services = services(Arc::new(SlowFirstSource::default())).await;
    let (handle, task) = GameHandle::spawn(services.game_engine(NarrationQueue::silent()));
    task.abort();
    let _ = task.await;

    assert_eq!(
        handle.start_level(LevelId::FIRST).await,
        Err(GameHandleError::Closed)
    );
}
