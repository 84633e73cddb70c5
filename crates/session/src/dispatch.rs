use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use transcript::{ContextPair, Tone};
use translator::{TranslationKind, TranslationRequest, Translator};

use crate::pipeline_event::{PipelineEvent, TranslationOutcome};

/// Spawns a confirmed-translation request. Its completion is guaranteed
/// to be surfaced to the client — never dropped by staleness — so the
/// task unconditionally posts its result back.
#[allow(clippy::too_many_arguments)]
pub fn spawn_confirmed_translation(
    tasks: &mut JoinSet<()>,
    translator: Arc<dyn Translator>,
    result_tx: mpsc::Sender<PipelineEvent>,
    speaker_id: String,
    seal_seq: u64,
    text: String,
    prev_pair: ContextPair,
    tone: Tone,
    target_lang: String,
    attempt: u8,
) {
    tasks.spawn(async move {
        let pair_source = text.clone();
        let request = TranslationRequest {
            speaker_id: speaker_id.clone(),
            text,
            prev_pair,
            tone,
            target_lang,
            kind: TranslationKind::Confirmed,
        };
        let result = translator::with_deadline(translator.translate(request)).await;
        let _ = result_tx
            .send(PipelineEvent::Translation(TranslationOutcome::Confirmed {
                speaker_id,
                seal_seq,
                result,
                pair_source,
                attempt,
            }))
            .await;
    });
}

/// Spawns a partial-translation request. Staleness is resolved by the
/// orchestrator against `SpeakerState` when the result lands, not here.
pub fn spawn_partial_translation(
    tasks: &mut JoinSet<()>,
    translator: Arc<dyn Translator>,
    result_tx: mpsc::Sender<PipelineEvent>,
    speaker_id: String,
    text: String,
    prev_pair: ContextPair,
    tone: Tone,
    target_lang: String,
    seq: u64,
) {
    tasks.spawn(async move {
        let request = TranslationRequest {
            speaker_id: speaker_id.clone(),
            text,
            prev_pair,
            tone,
            target_lang,
            kind: TranslationKind::Partial { seq },
        };
        let result = translator::with_deadline(translator.translate(request)).await;
        let _ = result_tx
            .send(PipelineEvent::Translation(TranslationOutcome::Partial {
                speaker_id,
                seq,
                result,
            }))
            .await;
    });
}

pub fn spawn_tone_detection(
    tasks: &mut JoinSet<()>,
    detector: Arc<dyn tone::ToneDetector>,
    result_tx: mpsc::Sender<PipelineEvent>,
    speaker_id: String,
    source_text: String,
) {
    tasks.spawn(async move {
        let result = detector.classify(&source_text).await;
        let _ = result_tx
            .send(PipelineEvent::Tone { speaker_id, result })
            .await;
    });
}

pub fn spawn_splitter(
    tasks: &mut JoinSet<()>,
    splitter: Arc<dyn splitter::SentenceSplitter>,
    result_tx: mpsc::Sender<PipelineEvent>,
    speaker_id: String,
    text: String,
    at_confirmed_word_count: usize,
) {
    tasks.spawn(async move {
        let result = splitter.propose_boundaries(&text).await;
        let _ = result_tx
            .send(PipelineEvent::Splitter {
                speaker_id,
                at_confirmed_word_count,
                result,
            })
            .await;
    });
}
