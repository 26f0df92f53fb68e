//! Spoken output, one utterance at a time.
//!
//! Every `speak`, `enqueue_batch` and `cancel_all` starts a new batch. Delayed
//! utterances remember the batch they belong to and re-check it under the queue
//! lock right before speaking, so nothing from a superseded batch can play.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use literacy_core::model::Question;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::SpeechError;

/// Raw text-to-speech capability.
///
/// `speak` should return quickly (queue the audio, do not block until it has
/// played). `stop` silences whatever is currently audible.
pub trait SpeechSynthesizer: Send + Sync {
    /// # Errors
    ///
    /// Returns `SpeechError` if the utterance cannot be voiced.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;

    fn stop(&self);
}

/// One entry of a narration batch.
///
/// `delay_from_previous` is measured between scheduled start times, not from
/// when the previous utterance finished playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub delay_from_previous: Duration,
}

impl Utterance {
    #[must_use]
    pub fn immediate(text: impl Into<String>) -> Self {
        Self::after(Duration::ZERO, text)
    }

    #[must_use]
    pub fn after(delay_from_previous: Duration, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay_from_previous,
        }
    }
}

/// Fixed pacing for reading a question aloud. Independent of how long each
/// utterance takes to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationPacing {
    /// Pause between the question text and the first option.
    pub options_lead_in: Duration,
    /// Pause between consecutive options.
    pub option_spacing: Duration,
}

impl Default for NarrationPacing {
    fn default() -> Self {
        Self {
            options_lead_in: Duration::from_millis(500),
            option_spacing: Duration::from_millis(1000),
        }
    }
}

impl NarrationPacing {
    /// Question text now, then each option in presentation order.
    #[must_use]
    pub fn question_batch(&self, question: &Question) -> Vec<Utterance> {
        let mut batch = Vec::with_capacity(question.options().len() + 1);
        batch.push(Utterance::immediate(question.text()));
        for (i, option) in question.options().iter().enumerate() {
            let delay = if i == 0 {
                self.options_lead_in
            } else {
                self.option_spacing
            };
            batch.push(Utterance::after(delay, option.as_str()));
        }
        batch
    }
}

#[derive(Default)]
struct QueueState {
    batch: u64,
    timer: Option<JoinHandle<()>>,
}

impl QueueState {
    /// Invalidate everything scheduled so far and return the new batch id.
    fn supersede(&mut self) -> u64 {
        self.batch = self.batch.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.batch
    }
}

/// Serializes narration so that at most one batch is ever live.
pub struct NarrationQueue {
    synth: Option<Arc<dyn SpeechSynthesizer>>,
    state: Arc<Mutex<QueueState>>,
}

impl NarrationQueue {
    #[must_use]
    pub fn new(synth: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synth: Some(synth),
            state: Arc::default(),
        }
    }

    /// A queue with no voice; every call is a no-op.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            synth: None,
            state: Arc::default(),
        }
    }

    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.synth.is_none()
    }

    /// Drop anything pending or playing and say `text` right away.
    pub fn speak(&self, text: &str) {
        let Some(synth) = &self.synth else {
            return;
        };
        let mut state = lock(&self.state);
        state.supersede();
        synth.stop();
        say(synth.as_ref(), text);
    }

    /// Replace the queue with `utterances`. Entries due immediately are spoken
    /// before this returns; the rest are timed from this call.
    pub fn enqueue_batch(&self, utterances: Vec<Utterance>) {
        let Some(synth) = &self.synth else {
            return;
        };
        let start = Instant::now();
        let mut state = lock(&self.state);
        let batch = state.supersede();
        synth.stop();

        let mut offset = Duration::ZERO;
        let mut delayed = Vec::new();
        for utterance in utterances {
            offset += utterance.delay_from_previous;
            if offset.is_zero() {
                say(synth.as_ref(), &utterance.text);
            } else {
                delayed.push((offset, utterance.text));
            }
        }
        if delayed.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(dropped = delayed.len(), "no async runtime, delayed narration skipped");
            return;
        };
        let synth = Arc::clone(synth);
        let shared = Arc::clone(&self.state);
        state.timer = Some(runtime.spawn(async move {
            for (offset, text) in delayed {
                tokio::time::sleep_until(start + offset).await;
                let state = lock(&shared);
                if state.batch != batch {
                    debug!(batch, "narration batch superseded");
                    return;
                }
                say(synth.as_ref(), &text);
            }
        }));
    }

    /// Discard everything pending or playing.
    pub fn cancel_all(&self) {
        let Some(synth) = &self.synth else {
            return;
        };
        let mut state = lock(&self.state);
        state.supersede();
        synth.stop();
    }
}

impl Drop for NarrationQueue {
    fn drop(&mut self) {
        lock(&self.state).supersede();
    }
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn say(synth: &dyn SpeechSynthesizer, text: &str) {
    if let Err(err) = synth.speak(text) {
        debug!(%err, "narration skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literacy_core::model::QuestionDraft;

    #[derive(Default)]
    struct Recorder {
        spoken: Mutex<Vec<(String, Instant)>>,
        stops: Mutex<usize>,
    }

    impl Recorder {
        fn texts(&self) -> Vec<String> {
            self.spoken.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
        }
    }

    impl SpeechSynthesizer for Recorder {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push((text.to_string(), Instant::now()));
            Ok(())
        }

        fn stop(&self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    struct Mute;

    impl SpeechSynthesizer for Mute {
        fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            Err(SpeechError::Unavailable)
        }

        fn stop(&self) {}
    }

    fn question() -> Question {
        QuestionDraft::new("Qual letra vem depois do A?", ["C", "B", "D"], "B", "")
            .validate()
            .unwrap()
    }

    #[test]
    fn question_batch_reads_text_then_options() {
        let batch = NarrationPacing::default().question_batch(&question());
        let texts: Vec<_> = batch.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, ["Qual letra vem depois do A?", "C", "B", "D"]);
        let delays: Vec<_> = batch.iter().map(|u| u.delay_from_previous.as_millis()).collect();
        assert_eq!(delays, [0, 500, 1000, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_is_time_sliced_from_enqueue() {
        let recorder = Arc::new(Recorder::default());
        let queue = NarrationQueue::new(recorder.clone());
        let start = Instant::now();

        queue.enqueue_batch(NarrationPacing::default().question_batch(&question()));
        assert_eq!(recorder.texts(), ["Qual letra vem depois do A?"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let spoken = recorder.spoken.lock().unwrap().clone();
        let offsets: Vec<_> = spoken
            .iter()
            .map(|(_, at)| at.duration_since(start).as_millis())
            .collect();
        assert_eq!(offsets, [0, 500, 1500, 2500]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_silences_pending_entries() {
        let recorder = Arc::new(Recorder::default());
        let queue = NarrationQueue::new(recorder.clone());

        queue.enqueue_batch(NarrationPacing::default().question_batch(&question()));
        tokio::time::sleep(Duration::from_millis(600)).await;
        queue.cancel_all();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(recorder.texts(), ["Qual letra vem depois do A?", "C"]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_batch_replaces_the_old_one() {
        let recorder = Arc::new(Recorder::default());
        let queue = NarrationQueue::new(recorder.clone());

        queue.enqueue_batch(vec![
            Utterance::immediate("primeira"),
            Utterance::after(Duration::from_secs(1), "velha"),
        ]);
        queue.enqueue_batch(vec![
            Utterance::immediate("segunda"),
            Utterance::after(Duration::from_secs(2), "nova"),
        ]);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(recorder.texts(), ["primeira", "segunda", "nova"]);
    }

    #[tokio::test(start_paused = true)]
    async fn speak_preempts_a_running_batch() {
        let recorder = Arc::new(Recorder::default());
        let queue = NarrationQueue::new(recorder.clone());

        queue.enqueue_batch(NarrationPacing::default().question_batch(&question()));
        queue.speak("Correto!");
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(recorder.texts(), ["Qual letra vem depois do A?", "Correto!"]);
        assert_eq!(*recorder.stops.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_queue_cancels_timers() {
        let recorder = Arc::new(Recorder::default());
        let queue = NarrationQueue::new(recorder.clone());
        queue.enqueue_batch(NarrationPacing::default().question_batch(&question()));
        drop(queue);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(recorder.texts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_voice_degrades_to_silence() {
        let queue = NarrationQueue::new(Arc::new(Mute));
        queue.speak("Olá");
        queue.enqueue_batch(NarrationPacing::default().question_batch(&question()));
        tokio::time::sleep(Duration::from_secs(5)).await;
        queue.cancel_all();

        let silent = NarrationQueue::silent();
        assert!(silent.is_silent());
        silent.speak("Olá");
        silent.enqueue_batch(vec![Utterance::immediate("x")]);
        silent.cancel_all();
    }
}
