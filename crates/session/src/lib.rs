//! The per-session streaming pipeline's single receive loop.
//!
//! A [`Session`] owns one client connection's worth of state: the ASR
//! event stream, a map of per-speaker [`transcript::SpeakerState`], the
//! translator backends, and the outbound message queue back to the
//! client. Every mutation of a `SpeakerState` happens from inside
//! [`Session::run`] — translation, tone, and splitter completions arrive
//! as messages on a result channel read by that same loop, so nothing
//! ever needs a per-speaker lock.

mod config;
mod dispatch;
mod message;
mod pipeline_event;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use asr_adapter::{AsrEvent, EventKind, EventReceiver};
use splitter::SentenceSplitter;
use tone::ToneDetector;
use transcript::{PartialDispatch, SealedSentence, SpeakerState};
use translator::Translator;

pub use config::{DEFAULT_PARTIAL_INTERVAL, SessionConfig, TranslatorMode};
pub use message::{ClientMessage, ErrorKind};
pub use pipeline_event::{PipelineEvent, TranslationOutcome, context_pair};

/// How often the receive loop checks every speaker's silence timer.
/// Finer than the 3s threshold so the auto-confirm fires close to the
/// deadline rather than in multi-second jumps.
const SILENCE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A confirmed translation is retried once on a transient failure
/// before the pipeline gives up and surfaces the source text instead.
const MAX_CONFIRMED_ATTEMPTS: u8 = 2;

/// Owns one client connection's pipeline. Constructed by the transport
/// layer (`apps/server`) once the ASR vendor connection and translator
/// backends are ready; [`Session::run`] drives it to completion.
pub struct Session {
    config: SessionConfig,
    speakers: HashMap<String, SpeakerState>,

    asr_events: EventReceiver,
    outbound: mpsc::Sender<ClientMessage>,

    confirmed_translator: Arc<dyn Translator>,
    partial_translator: Arc<dyn Translator>,
    tone_detector: Arc<dyn ToneDetector>,
    splitter: Arc<dyn SentenceSplitter>,

    result_tx: mpsc::Sender<PipelineEvent>,
    result_rx: mpsc::Receiver<PipelineEvent>,
    tasks: JoinSet<()>,

    /// Set once a `translation_fatal` lands on the confirmed path;
    /// suppresses further confirmed translation dispatch so the
    /// pipeline degrades to transcripts-only rather than repeating a
    /// doomed call.
    confirmed_disabled: bool,
    /// Same, for the partial path. The two are independent because
    /// `translator_mode` can point confirmed and partial dispatch at
    /// different backends.
    partial_disabled: bool,

    /// Count of translation requests (confirmed or partial) that
    /// finished in error, surfaced as a `tracing` field rather than a
    /// separate metrics backend.
    translation_error_count: AtomicU64,

    shutdown: CancellationToken,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SessionConfig,
        asr_events: EventReceiver,
        outbound: mpsc::Sender<ClientMessage>,
        confirmed_translator: Arc<dyn Translator>,
        partial_translator: Arc<dyn Translator>,
        tone_detector: Arc<dyn ToneDetector>,
        splitter: Arc<dyn SentenceSplitter>,
        shutdown: CancellationToken,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(256);
        Self {
            config,
            speakers: HashMap::new(),
            asr_events,
            outbound,
            confirmed_translator,
            partial_translator,
            tone_detector,
            splitter,
            result_tx,
            result_rx,
            tasks: JoinSet::new(),
            confirmed_disabled: false,
            partial_disabled: false,
            translation_error_count: AtomicU64::new(0),
            shutdown,
        }
    }

    /// Increments and returns the running translation-error count.
    fn note_translation_error(&self) -> u64 {
        self.translation_error_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Drives the session until the ASR stream ends, the client
    /// disconnects (the caller cancels `shutdown`), or an `asr_fatal`
    /// condition is reported. Consumes `self`: a session is run exactly
    /// once.
    pub async fn run(mut self) {
        let mut silence_tick = tokio::time::interval(SILENCE_POLL_INTERVAL);
        silence_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = self.asr_events.recv() => {
                    match event {
                        Some(event) => {
                            let should_stop = self.handle_asr_event(event).await;
                            if should_stop {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(pe) = self.result_rx.recv() => {
                    self.handle_pipeline_event(pe).await;
                }
                _ = silence_tick.tick() => {
                    self.check_silence().await;
                }
            }
        }

        self.teardown().await;
    }

    /// Returns `true` if the loop should stop after this event (the ASR
    /// stream itself ended).
    async fn handle_asr_event(&mut self, event: AsrEvent) -> bool {
        match event.kind {
            EventKind::Eos => {
                if event.speaker_id == asr_adapter::BROADCAST_EOS_SPEAKER {
                    let ids: Vec<String> = self.speakers.keys().cloned().collect();
                    for id in ids {
                        self.flush_speaker(&id).await;
                    }
                    true
                } else {
                    self.flush_speaker(&event.speaker_id).await;
                    false
                }
            }
            EventKind::Update => {
                self.apply_update(event);
                false
            }
        }
    }

    fn apply_update(&mut self, event: AsrEvent) {
        let now = Instant::now();
        let speaker_id = event.speaker_id.clone();
        let words = event.into_transcript_words();

        let speaker = self.speaker_mut(&speaker_id, now);
        let outcome = speaker.apply_event(words, now);

        if let Some(text) = outcome.partial_transcript {
            self.send(ClientMessage::PartialTranscript {
                speaker: speaker_id.clone(),
                text,
            });
        }

        for sealed in outcome.sealed {
            self.dispatch_confirmed(&speaker_id, sealed, 0);
        }

        if let Some(dispatch) = outcome.dispatch_partial_translation {
            self.dispatch_partial(&speaker_id, dispatch);
        }

        if outcome.dispatch_splitter {
            let speaker = self.speaker_mut(&speaker_id, now);
            let text = speaker.remaining_text();
            let at_confirmed_word_count = speaker.confirmed_word_count;
            dispatch::spawn_splitter(
                &mut self.tasks,
                self.splitter.clone(),
                self.result_tx.clone(),
                speaker_id.clone(),
                text,
                at_confirmed_word_count,
            );
        }

        if outcome.dispatch_tone {
            let speaker = self.speaker_mut(&speaker_id, now);
            let source_text = speaker.confirmed_source_text.clone();
            dispatch::spawn_tone_detection(
                &mut self.tasks,
                self.tone_detector.clone(),
                self.result_tx.clone(),
                speaker_id.clone(),
                source_text,
            );
        }
    }

    async fn check_silence(&mut self) {
        let now = Instant::now();
        let ids: Vec<String> = self.speakers.keys().cloned().collect();
        for id in ids {
            let Some(speaker) = self.speakers.get_mut(&id) else {
                continue;
            };
            if let Some(sealed) = speaker.check_silence(now) {
                self.dispatch_confirmed(&id, sealed, 0);
            }
        }
    }

    async fn flush_speaker(&mut self, speaker_id: &str) {
        let Some(speaker) = self.speakers.get_mut(speaker_id) else {
            return;
        };
        if let Some(sealed) = speaker.flush() {
            self.dispatch_confirmed(speaker_id, sealed, 0);
        }
    }

    /// Emits the sealed transcript and, unless the confirmed path has
    /// already been disabled by a fatal translation error, dispatches
    /// the translation request.
    fn dispatch_confirmed(&mut self, speaker_id: &str, sealed: SealedSentence, attempt: u8) {
        self.send(ClientMessage::ConfirmedTranscript {
            speaker: speaker_id.to_string(),
            text: sealed.text.clone(),
        });

        if self.confirmed_disabled {
            return;
        }

        let Some(speaker) = self.speakers.get(speaker_id) else {
            return;
        };
        dispatch::spawn_confirmed_translation(
            &mut self.tasks,
            self.confirmed_translator.clone(),
            self.result_tx.clone(),
            speaker_id.to_string(),
            sealed.seal_seq,
            sealed.text,
            speaker.last_confirmed_pair.clone(),
            speaker.tone,
            self.config.target_lang.clone(),
            attempt,
        );
    }

    fn dispatch_partial(&mut self, speaker_id: &str, dispatch: PartialDispatch) {
        if self.partial_disabled {
            return;
        }
        let Some(speaker) = self.speakers.get(speaker_id) else {
            return;
        };
        dispatch::spawn_partial_translation(
            &mut self.tasks,
            self.partial_translator.clone(),
            self.result_tx.clone(),
            speaker_id.to_string(),
            dispatch.text,
            speaker.last_confirmed_pair.clone(),
            speaker.tone,
            self.config.target_lang.clone(),
            dispatch.seq,
        );
    }

    async fn handle_pipeline_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Translation(TranslationOutcome::Confirmed {
                speaker_id,
                seal_seq,
                result,
                pair_source,
                attempt,
            }) => self.handle_confirmed_result(speaker_id, seal_seq, result, pair_source, attempt),
            PipelineEvent::Translation(TranslationOutcome::Partial {
                speaker_id,
                seq,
                result,
            }) => self.handle_partial_result(speaker_id, seq, result),
            PipelineEvent::Tone { speaker_id, result } => self.handle_tone_result(speaker_id, result),
            PipelineEvent::Splitter {
                speaker_id,
                at_confirmed_word_count,
                result,
            } => self.handle_splitter_result(speaker_id, at_confirmed_word_count, result),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_confirmed_result(
        &mut self,
        speaker_id: String,
        seal_seq: u64,
        result: Result<String, translator::Error>,
        pair_source: String,
        attempt: u8,
    ) {
        match result {
            Ok(text) => {
                self.deliver_confirmed(&speaker_id, seal_seq, pair_source, text.clone(), text);
            }
            Err(translator::Error::Fatal(detail)) => {
                let total = self.note_translation_error();
                self.confirmed_disabled = true;
                tracing::warn!(speaker = %speaker_id, translation_error_total = total, "confirmed_translation_fatal");
                self.send(ClientMessage::Error {
                    kind: ErrorKind::TranslationFatal,
                    detail,
                });
            }
            Err(translator::Error::Cancelled) => {}
            Err(e) if attempt + 1 < MAX_CONFIRMED_ATTEMPTS => {
                let total = self.note_translation_error();
                tracing::warn!(speaker = %speaker_id, error = %e, attempt, translation_error_total = total, "confirmed_translation_retrying");
                let Some(speaker) = self.speakers.get(&speaker_id) else {
                    return;
                };
                dispatch::spawn_confirmed_translation(
                    &mut self.tasks,
                    self.confirmed_translator.clone(),
                    self.result_tx.clone(),
                    speaker_id,
                    seal_seq,
                    pair_source,
                    speaker.last_confirmed_pair.clone(),
                    speaker.tone,
                    self.config.target_lang.clone(),
                    attempt + 1,
                );
            }
            Err(e) => {
                let total = self.note_translation_error();
                tracing::warn!(speaker = %speaker_id, error = %e, translation_error_total = total, "confirmed_translation_failed_inline_marker");
                let emit_text = format!("[translation unavailable] {pair_source}");
                self.deliver_confirmed(&speaker_id, seal_seq, pair_source.clone(), pair_source, emit_text);
            }
        }
    }

    /// Records and emits a confirmed translation in seal order: results
    /// can land out of order (retries, backend latency), so completion
    /// is buffered per speaker until every earlier-sealed sentence has
    /// already been delivered. `context_translation` is what gets stored
    /// as the next request's context pair; `emit_text` is what the
    /// client sees — they differ for the inline-unavailable fallback,
    /// which records the plain source as context but shows the client a
    /// decorated marker.
    fn deliver_confirmed(
        &mut self,
        speaker_id: &str,
        seal_seq: u64,
        source: String,
        context_translation: String,
        emit_text: String,
    ) {
        let pair = context_pair(source, context_translation);
        let ready = {
            let Some(speaker) = self.speakers.get_mut(speaker_id) else {
                return;
            };
            speaker.enqueue_confirmed_delivery(seal_seq, (pair, emit_text))
        };
        for (pair, emit_text) in ready {
            if let Some(speaker) = self.speakers.get_mut(speaker_id) {
                speaker.record_confirmed_translation(pair);
            }
            self.send(ClientMessage::ConfirmedTranslation {
                speaker: speaker_id.to_string(),
                text: emit_text,
            });
        }
    }

    fn handle_partial_result(
        &mut self,
        speaker_id: String,
        seq: u64,
        result: Result<String, translator::Error>,
    ) {
        let accepted = self
            .speakers
            .get(&speaker_id)
            .is_some_and(|s| s.accept_partial_result(seq));

        match result {
            Ok(text) => {
                if accepted {
                    self.send(ClientMessage::PartialTranslation {
                        speaker: speaker_id,
                        text,
                    });
                }
            }
            Err(translator::Error::Fatal(detail)) => {
                let total = self.note_translation_error();
                self.partial_disabled = true;
                tracing::warn!(speaker = %speaker_id, translation_error_total = total, "partial_translation_fatal");
                self.send(ClientMessage::Error {
                    kind: ErrorKind::TranslationFatal,
                    detail,
                });
            }
            Err(translator::Error::Cancelled) => {}
            Err(e) => {
                let total = self.note_translation_error();
                tracing::debug!(speaker = %speaker_id, error = %e, translation_error_total = total, "partial_translation_dropped");
            }
        }
    }

    fn handle_tone_result(&mut self, speaker_id: String, result: Result<transcript::Tone, tone::Error>) {
        match result {
            Ok(label) => {
                if let Some(speaker) = self.speakers.get_mut(&speaker_id) {
                    speaker.tone = label;
                }
            }
            Err(e) => {
                tracing::debug!(speaker = %speaker_id, error = %e, "tone_detection_failed");
                self.send(ClientMessage::Error {
                    kind: ErrorKind::ToneFailure,
                    detail: e.to_string(),
                });
            }
        }
    }

    fn handle_splitter_result(
        &mut self,
        speaker_id: String,
        at_confirmed_word_count: usize,
        result: Result<Vec<usize>, splitter::Error>,
    ) {
        let boundary = match result {
            Ok(boundaries) => splitter::earliest_boundary(&boundaries),
            Err(e) => {
                tracing::debug!(speaker = %speaker_id, error = %e, "sentence_splitter_failed");
                self.send(ClientMessage::Error {
                    kind: ErrorKind::SplitterFailure,
                    detail: e.to_string(),
                });
                None
            }
        };

        let Some(speaker) = self.speakers.get_mut(&speaker_id) else {
            return;
        };
        if let Some(sealed) =
            speaker.apply_splitter_boundary(boundary.unwrap_or(0), at_confirmed_word_count)
        {
            self.dispatch_confirmed(&speaker_id, sealed, 0);
        }
    }

    fn speaker_mut(&mut self, speaker_id: &str, now: Instant) -> &mut SpeakerState {
        self.speakers.entry(speaker_id.to_string()).or_insert_with(|| {
            SpeakerState::new(
                speaker_id,
                self.config.aggressiveness,
                self.config.partial_interval,
                now,
            )
        })
    }

    fn send(&self, message: ClientMessage) {
        if self.outbound.try_send(message).is_err() {
            tracing::debug!(session_id = %self.config.session_id, "outbound_queue_full_or_closed");
        }
    }

    /// Cancels every in-flight task the session owns. No partial
    /// results are flushed after this point.
    async fn teardown(mut self) {
        self.shutdown.cancel();
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    use asr_adapter::AsrWord;
    use transcript::Aggressiveness;
    use translator::TranslationRequest;

    struct EchoTranslator;
    impl Translator for EchoTranslator {
        fn translate<'a>(
            &'a self,
            request: TranslationRequest,
        ) -> Pin<Box<dyn Future<Output = Result<String, translator::Error>> + Send + 'a>> {
            Box::pin(async move { Ok(request.text.to_uppercase()) })
        }
    }

    struct FatalTranslator;
    impl Translator for FatalTranslator {
        fn translate<'a>(
            &'a self,
            _request: TranslationRequest,
        ) -> Pin<Box<dyn Future<Output = Result<String, translator::Error>> + Send + 'a>> {
            Box::pin(async { Err(translator::Error::Fatal("quota exceeded".into())) })
        }
    }

    struct NoTone;
    impl ToneDetector for NoTone {
        fn classify<'a>(
            &'a self,
            _source_text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<transcript::Tone, tone::Error>> + Send + 'a>>
        {
            Box::pin(async { Ok(transcript::Tone::Generic) })
        }
    }

    struct NoSplit;
    impl SentenceSplitter for NoSplit {
        fn propose_boundaries<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<usize>, splitter::Error>> + Send + 'a>>
        {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    struct FixedSplitter(usize);
    impl SentenceSplitter for FixedSplitter {
        fn propose_boundaries<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<usize>, splitter::Error>> + Send + 'a>>
        {
            let boundary = self.0;
            Box::pin(async move { Ok(vec![boundary]) })
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            session_id: "test-session".into(),
            source_lang: None,
            target_lang: "es".into(),
            aggressiveness: Aggressiveness::High,
            partial_interval: 6,
            translator_mode: TranslatorMode::Quality,
        }
    }

    fn word(text: &str, is_final: bool) -> AsrWord {
        AsrWord {
            text: text.into(),
            is_final,
        }
    }

    #[tokio::test]
    async fn confirmed_translation_round_trip() {
        let (asr_tx, asr_rx) = asr_adapter::channel();
        let (out_tx, mut out_rx) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        let session = Session::new(
            test_config(),
            asr_rx,
            out_tx,
            Arc::new(EchoTranslator),
            Arc::new(EchoTranslator),
            Arc::new(NoTone),
            Arc::new(NoSplit),
            shutdown.clone(),
        );
        let handle = tokio::spawn(session.run());

        asr_tx
            .push(AsrEvent::update(
                "spk",
                vec![word("Hello", true), word("world.", true)],
            ))
            .await;

        let partial = out_rx.recv().await.unwrap();
        assert!(matches!(partial, ClientMessage::PartialTranscript { .. }));

        let confirmed_transcript = out_rx.recv().await.unwrap();
        match confirmed_transcript {
            ClientMessage::ConfirmedTranscript { speaker, text } => {
                assert_eq!(speaker, "spk");
                assert_eq!(text, "Hello world.");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let confirmed_translation = out_rx.recv().await.unwrap();
        match confirmed_translation {
            ClientMessage::ConfirmedTranslation { speaker, text } => {
                assert_eq!(speaker, "spk");
                assert_eq!(text, "HELLO WORLD.");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        asr_tx.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn fatal_translation_error_disables_further_confirmed_dispatch() {
        let (asr_tx, asr_rx) = asr_adapter::channel();
        let (out_tx, mut out_rx) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        let session = Session::new(
            test_config(),
            asr_rx,
            out_tx,
            Arc::new(FatalTranslator),
            Arc::new(FatalTranslator),
            Arc::new(NoTone),
            Arc::new(NoSplit),
            shutdown.clone(),
        );
        let handle = tokio::spawn(session.run());

        asr_tx
            .push(AsrEvent::update("spk", vec![word("One.", true)]))
            .await;

        let _partial = out_rx.recv().await.unwrap();
        let confirmed_transcript = out_rx.recv().await.unwrap();
        assert!(matches!(
            confirmed_transcript,
            ClientMessage::ConfirmedTranscript { .. }
        ));
        let error = out_rx.recv().await.unwrap();
        assert!(matches!(
            error,
            ClientMessage::Error {
                kind: ErrorKind::TranslationFatal,
                ..
            }
        ));

        asr_tx
            .push(AsrEvent::update("spk", vec![word("Two.", true)]))
            .await;

        let _partial2 = out_rx.recv().await.unwrap();
        let confirmed_transcript2 = out_rx.recv().await.unwrap();
        assert!(matches!(
            confirmed_transcript2,
            ClientMessage::ConfirmedTranscript { .. }
        ));

        // the fatal error disabled the confirmed path; no further
        // translation attempt and no second error should follow.
        assert!(out_rx.try_recv().is_err());

        asr_tx.close();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn silence_timer_seals_and_translates_without_punctuation() {
        let (asr_tx, asr_rx) = asr_adapter::channel();
        let (out_tx, mut out_rx) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        let session = Session::new(
            test_config(),
            asr_rx,
            out_tx,
            Arc::new(EchoTranslator),
            Arc::new(EchoTranslator),
            Arc::new(NoTone),
            Arc::new(NoSplit),
            shutdown.clone(),
        );
        let handle = tokio::spawn(session.run());

        asr_tx
            .push(AsrEvent::update(
                "spk",
                vec![word("And", true), word("then", true)],
            ))
            .await;

        let partial = out_rx.recv().await.unwrap();
        assert!(matches!(partial, ClientMessage::PartialTranscript { .. }));

        // No terminal punctuation in "And then" — only the 3s silence
        // timer, polled every 250ms, should seal it.
        tokio::time::advance(Duration::from_secs(3) + Duration::from_millis(1)).await;

        let confirmed_transcript = out_rx.recv().await.unwrap();
        match confirmed_transcript {
            ClientMessage::ConfirmedTranscript { speaker, text } => {
                assert_eq!(speaker, "spk");
                assert_eq!(text, "And then");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let confirmed_translation = out_rx.recv().await.unwrap();
        match confirmed_translation {
            ClientMessage::ConfirmedTranslation { speaker, text } => {
                assert_eq!(speaker, "spk");
                assert_eq!(text, "AND THEN");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        asr_tx.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn splitter_boundary_seals_and_translates() {
        let (asr_tx, asr_rx) = asr_adapter::channel();
        let (out_tx, mut out_rx) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        let session = Session::new(
            test_config(),
            asr_rx,
            out_tx,
            Arc::new(EchoTranslator),
            Arc::new(EchoTranslator),
            Arc::new(NoTone),
            Arc::new(FixedSplitter(5)),
            shutdown.clone(),
        );
        let handle = tokio::spawn(session.run());

        let words: Vec<AsrWord> = (0..16).map(|i| word(&format!("w{i}"), false)).collect();
        asr_tx.push(AsrEvent::update("spk", words)).await;

        let first = out_rx.recv().await.unwrap();
        assert!(matches!(first, ClientMessage::PartialTranscript { .. }));

        let mut saw_confirmed_transcript = false;
        let mut saw_confirmed_translation = false;
        let mut saw_partial_translation = false;
        for _ in 0..3 {
            match out_rx.recv().await.unwrap() {
                ClientMessage::ConfirmedTranscript { text, .. } => {
                    assert_eq!(text, "w0 w1 w2 w3 w4");
                    saw_confirmed_transcript = true;
                }
                ClientMessage::ConfirmedTranslation { text, .. } => {
                    assert_eq!(text, "W0 W1 W2 W3 W4");
                    saw_confirmed_translation = true;
                }
                ClientMessage::PartialTranslation { .. } => {
                    saw_partial_translation = true;
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }

        assert!(saw_confirmed_transcript);
        assert!(saw_confirmed_translation);
        assert!(saw_partial_translation);

        asr_tx.close();
        handle.await.unwrap();
    }
}
