use std::time::Duration;

use tokio::time::Instant;

use crate::outcome::{PartialDispatch, SealedSentence, SegmentationOutcome};
use crate::state::{ContextPair, SpeakerState};
use crate::word::{is_trailing_edit_of, join_words, Word};

/// Words stay unsealed until this many no-punctuation seconds pass; then the
/// whole remaining tail seals as if it had been punctuated.
pub const SILENCE_AUTO_CONFIRM: Duration = Duration::from_secs(3);

/// A sentence runs long enough to need semantic splitting once its unsealed
/// tail, still lacking terminal punctuation, exceeds this many tokens.
const SPLITTER_TRIGGER_WORDS: usize = 15;

/// Tone detection dispatches once confirmed source text reaches this many
/// words.
const TONE_TRIGGER_WORDS: usize = 30;

impl SpeakerState {
    /// Applies one ASR update: replaces the unsealed tail, seals every
    /// sentence the new tail completes, and decides whether a partial
    /// translation, a splitter pass, or tone detection is due.
    pub fn apply_event(&mut self, words: Vec<Word>, now: Instant) -> SegmentationOutcome {
        self.full_text.truncate(self.confirmed_word_count);
        self.full_text.extend(words);
        self.update_count += 1;
        self.last_activity = now;

        let mut outcome = SegmentationOutcome::default();

        let remaining_text = join_words(&self.full_text[self.confirmed_word_count..]);
        outcome.partial_transcript = Some(remaining_text.clone());
        if let Some(prev) = &self.last_remaining_text {
            if is_trailing_edit_of(prev, &remaining_text) {
                // Still a live transcript update (§4.2's per-update rule),
                // just not one that reopens segmentation: the vendor is
                // still refining the same trailing word.
                return outcome;
            }
        }
        self.last_remaining_text = Some(remaining_text);

        loop {
            let remaining = &self.full_text[self.confirmed_word_count..];
            let marks: Vec<usize> = remaining
                .iter()
                .enumerate()
                .filter(|(_, w)| w.ends_sentence())
                .map(|(i, _)| i)
                .collect();

            let needed = self.aggressiveness.confirm_punct_count();
            if marks.len() < needed {
                break;
            }

            let boundary = marks[needed - 1] + 1;
            outcome.sealed.push(self.seal(boundary));
        }

        if !outcome.sealed.is_empty() {
            outcome.partial_transcript =
                Some(join_words(&self.full_text[self.confirmed_word_count..]));
        } else if let Some(dispatch) = self.maybe_dispatch_partial() {
            outcome.dispatch_partial_translation = Some(dispatch);
        }

        let remaining = &self.full_text[self.confirmed_word_count..];
        if remaining.len() > SPLITTER_TRIGGER_WORDS
            && !self.splitter_in_flight
            && !remaining.iter().any(Word::ends_sentence)
        {
            self.splitter_in_flight = true;
            outcome.dispatch_splitter = true;
        }

        if !self.tone_triggered
            && self.confirmed_source_text.split_whitespace().count() >= TONE_TRIGGER_WORDS
        {
            self.tone_triggered = true;
            outcome.dispatch_tone = true;
        }

        outcome
    }

    /// Seals the silence timer fires on: the entire remaining tail, as if it
    /// had ended in punctuation. No-op if nothing is unsealed.
    pub fn check_silence(&mut self, now: Instant) -> Option<SealedSentence> {
        if self.remaining_word_count() == 0 {
            return None;
        }
        if now.duration_since(self.last_activity) < SILENCE_AUTO_CONFIRM {
            return None;
        }
        let boundary = self.remaining_word_count();
        Some(self.seal(boundary))
    }

    /// Force-seals whatever remains unsealed, regardless of elapsed
    /// silence. Used when the ASR stream itself ends (vendor disconnect):
    /// there will be no more events to wait on, so the remaining tail
    /// either seals now or never does.
    pub fn flush(&mut self) -> Option<SealedSentence> {
        if self.remaining_word_count() == 0 {
            return None;
        }
        let boundary = self.remaining_word_count();
        Some(self.seal(boundary))
    }

    /// Applies a splitter-proposed boundary (a word count into the unsealed
    /// tail). `at_confirmed_word_count` is the `confirmed_word_count`
    /// snapshot taken when the splitter was dispatched; if sealing has since
    /// raced ahead of it the result is stale and discarded.
    pub fn apply_splitter_boundary(
        &mut self,
        boundary: usize,
        at_confirmed_word_count: usize,
    ) -> Option<SealedSentence> {
        self.splitter_in_flight = false;
        if at_confirmed_word_count != self.confirmed_word_count {
            return None;
        }
        if boundary == 0 || boundary > self.remaining_word_count() {
            return None;
        }
        Some(self.seal(boundary))
    }

    /// Whether a completed partial translation with this `seq` may still be
    /// surfaced: stale sequence numbers and confirmations-in-flight both
    /// suppress it.
    pub fn accept_partial_result(&self, seq: u64) -> bool {
        seq >= self.latest_partial_seq && !self.partial_stale
    }

    /// Records a completed confirmed translation against the speaker's
    /// running context.
    pub fn record_confirmed_translation(&mut self, pair: ContextPair) {
        self.confirmed_translation.push_str(&pair.translation);
        self.last_confirmed_pair = pair;
    }

    /// Buffers a confirmed translation that finished for `seq`, then
    /// drains every consecutive, now-deliverable entry starting at the
    /// speaker's next expected sequence number. Translations can finish
    /// out of seal order (retries, backend latency); this never drops
    /// one, only delays delivery until its turn.
    pub fn enqueue_confirmed_delivery(
        &mut self,
        seq: u64,
        delivery: (ContextPair, String),
    ) -> Vec<(ContextPair, String)> {
        self.pending_confirmed_deliveries.insert(seq, delivery);
        let mut ready = Vec::new();
        while let Some(delivery) = self
            .pending_confirmed_deliveries
            .remove(&self.next_confirmed_delivery_seq)
        {
            self.next_confirmed_delivery_seq += 1;
            ready.push(delivery);
        }
        ready
    }

    fn seal(&mut self, boundary: usize) -> SealedSentence {
        let sealed_words = &self.full_text[self.confirmed_word_count..self.confirmed_word_count + boundary];
        let text = join_words(sealed_words);
        self.confirmed_word_count += boundary;
        self.confirmed_source_text = join_words(&self.full_text[..self.confirmed_word_count]);
        self.partial_stale = true;
        self.last_partial_source = None;
        self.last_remaining_text = None;
        let seal_seq = self.confirmed_seal_seq;
        self.confirmed_seal_seq += 1;
        SealedSentence {
            text,
            confirmed_word_count_after: self.confirmed_word_count,
            seal_seq,
        }
    }

    fn maybe_dispatch_partial(&mut self) -> Option<PartialDispatch> {
        let due = self.update_count == 1 || self.update_count % self.partial_interval == 0;
        if !due {
            return None;
        }
        let text = join_words(&self.full_text[self.confirmed_word_count..]);
        if self.last_partial_source.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.partial_seq += 1;
        self.latest_partial_seq = self.partial_seq;
        self.partial_stale = false;
        self.last_partial_source = Some(text.clone());
        Some(PartialDispatch {
            text,
            seq: self.partial_seq,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Aggressiveness;
    use std::time::Duration;
    use tokio::time::Instant;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts.iter().map(|t| Word::new(*t)).collect()
    }

    fn speaker(aggressiveness: Aggressiveness, partial_interval: u64) -> (SpeakerState, Instant) {
        let now = Instant::now();
        (
            SpeakerState::new("spk", aggressiveness, partial_interval, now),
            now,
        )
    }

    #[test]
    fn single_sentence_high_aggressiveness_seals_once() {
        let (mut s, now) = speaker(Aggressiveness::High, 6);
        let outcome = s.apply_event(words(&["Hello", "world."]), now);

        assert_eq!(outcome.sealed.len(), 1);
        assert_eq!(outcome.sealed[0].text, "Hello world.");
        assert_eq!(s.confirmed_word_count, 2);
        assert!(outcome.dispatch_partial_translation.is_none());
    }

    #[test]
    fn low_aggressiveness_needs_two_updates() {
        let (mut s, now) = speaker(Aggressiveness::Low, 6);

        let first = s.apply_event(words(&["Hi."]), now);
        assert!(first.sealed.is_empty());

        let second = s.apply_event(words(&["Hi.", "Done."]), now + Duration::from_millis(10));
        assert_eq!(second.sealed.len(), 1);
        assert_eq!(second.sealed[0].text, "Hi. Done.");
    }

    #[test]
    fn partial_throttle_fires_on_first_and_every_nth_update() {
        let (mut s, now) = speaker(Aggressiveness::High, 3);
        let mut fired = Vec::new();
        let mut tail: Vec<String> = Vec::new();

        for i in 1..=7u64 {
            tail.push(format!("word{i}"));
            let refs: Vec<&str> = tail.iter().map(String::as_str).collect();
            let outcome = s.apply_event(words(&refs), now + Duration::from_millis(i * 10));
            if outcome.dispatch_partial_translation.is_some() {
                fired.push(i);
            }
        }

        assert_eq!(fired, vec![1, 3, 6]);

        tail.push("word8.".to_string());
        let refs: Vec<&str> = tail.iter().map(String::as_str).collect();
        let seal = s.apply_event(words(&refs), now + Duration::from_millis(80));
        assert_eq!(seal.sealed.len(), 1);
        assert!(s.partial_stale);
    }

    #[test]
    fn asr_revision_seals_with_revised_text() {
        let (mut s, now) = speaker(Aggressiveness::High, 6);

        for i in 1..=5u64 {
            s.apply_event(
                words(&["the", "quick", "brown"]),
                now + Duration::from_millis(i * 10),
            );
        }

        let outcome = s.apply_event(
            words(&["the", "quick", "brown", "fox."]),
            now + Duration::from_millis(70),
        );

        assert_eq!(outcome.sealed.len(), 1);
        assert_eq!(outcome.sealed[0].text, "the quick brown fox.");
    }

    #[test]
    fn silence_auto_confirm_seals_remaining_tail() {
        let (mut s, now) = speaker(Aggressiveness::High, 6);
        s.apply_event(words(&["And", "then"]), now);

        assert!(s.check_silence(now + Duration::from_millis(500)).is_none());

        let sealed = s
            .check_silence(now + Duration::from_secs(3))
            .expect("should seal after 3s silence");
        assert_eq!(sealed.text, "And then");
        assert_eq!(s.confirmed_word_count, 2);
    }

    #[test]
    fn flush_seals_remaining_tail_immediately() {
        let (mut s, now) = speaker(Aggressiveness::High, 6);
        s.apply_event(words(&["And", "then"]), now);

        let sealed = s.flush().expect("should seal on flush");
        assert_eq!(sealed.text, "And then");
        assert!(s.flush().is_none());
    }

    #[test]
    fn multi_speaker_state_is_independent() {
        let now = Instant::now();
        let mut a = SpeakerState::new("a", Aggressiveness::High, 6, now);
        let mut b = SpeakerState::new("b", Aggressiveness::Low, 6, now);

        a.apply_event(words(&["Hello."]), now);
        assert_eq!(a.confirmed_word_count, 1);
        assert_eq!(b.confirmed_word_count, 0);
        assert_eq!(b.update_count, 0);
    }

    #[test]
    fn splitter_dispatches_on_long_unpunctuated_run() {
        let (mut s, now) = speaker(Aggressiveness::High, 100);
        let long_run: Vec<String> = (0..16).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = long_run.iter().map(String::as_str).collect();

        let outcome = s.apply_event(words(&refs), now);
        assert!(outcome.dispatch_splitter);
        assert!(s.splitter_in_flight());

        let second = s.apply_event(words(&refs), now + Duration::from_millis(10));
        assert!(!second.dispatch_splitter);
    }

    #[test]
    fn splitter_result_discarded_if_sealing_raced_ahead() {
        let (mut s, now) = speaker(Aggressiveness::High, 100);
        let long_run: Vec<String> = (0..16).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = long_run.iter().map(String::as_str).collect();

        s.apply_event(words(&refs), now);
        let dispatch_snapshot = s.confirmed_word_count;

        let mut sealed_words = refs.clone();
        *sealed_words.last_mut().unwrap() = "w15.";
        s.apply_event(words(&sealed_words), now + Duration::from_millis(10));

        let result = s.apply_splitter_boundary(5, dispatch_snapshot);
        assert!(result.is_none());
    }

    #[test]
    fn tone_dispatches_once_at_thirty_words() {
        let (mut s, now) = speaker(Aggressiveness::High, 1);
        let mut dispatched = 0;

        for i in 0..40u64 {
            let outcome = s.apply_event(words(&[&format!("w{i}.")]), now + Duration::from_millis(i));
            if outcome.dispatch_tone {
                dispatched += 1;
            }
        }

        assert_eq!(dispatched, 1);
    }

    #[test]
    fn partial_result_rejected_when_stale_or_superseded() {
        let (mut s, _now) = speaker(Aggressiveness::High, 1);
        s.latest_partial_seq = 5;
        s.partial_stale = false;
        assert!(!s.accept_partial_result(4));
        assert!(s.accept_partial_result(5));

        s.partial_stale = true;
        assert!(!s.accept_partial_result(5));
    }
}
