// src/speech.rs
//
// Voice answer state machine: Idle -> Listening -> {Matched, NoMatch,
// Error} -> Idle. The speech provider itself (microphone, recognizer) lives
// outside this crate; it only delivers events. Events that arrive while
// Idle are stale (a transcript landing after the question was already
// answered) and are dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Country;
use crate::config::{
    SIMILARITY_THRESHOLD, VOICE_ERROR_RESTART_DELAY_MS, VOICE_LONG_ERROR_DELAY_MS,
    VOICE_RESTART_DELAY_MS,
};
use crate::matching::{find_best_match, strip_speech_prefix, MatchResult};

// Consecutive provider errors before the longer restart delay kicks in
const ERROR_BACKOFF_AFTER: u32 = 2;

/// Configuration for the voice answer path
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub threshold: f64,               // Minimum similarity for a transcript match
    pub restart_delay_ms: u64,        // Restart delay after a transcript with no match
    pub error_restart_delay_ms: u64,  // Restart delay after a provider error
    pub long_error_delay_ms: u64,     // Backoff once errors repeat
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
            restart_delay_ms: VOICE_RESTART_DELAY_MS,
            error_restart_delay_ms: VOICE_ERROR_RESTART_DELAY_MS,
            long_error_delay_ms: VOICE_LONG_ERROR_DELAY_MS,
        }
    }
}

/// Notifications from the speech-to-text provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VoiceEvent {
    TranscriptReady(String),
    RecognitionError(String),
    SessionEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum VoicePhase {
    Idle,
    Listening,
}

/// What a listening attempt produced, for the presentation layer. NoMatch
/// and Unavailable are distinct conditions: the first may show a
/// disambiguation prompt, the second reports the provider as unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VoiceOutcome {
    Matched(MatchResult),
    NoMatch { transcript: String },
    Unavailable { reason: String },
}

pub struct VoiceController {
    config: VoiceConfig,
    phase: VoicePhase,
    consecutive_errors: u32,
}

impl VoiceController {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            phase: VoicePhase::Idle,
            consecutive_errors: 0,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.phase == VoicePhase::Listening
    }

    /// Arm the controller for the next utterance. Returns false when a
    /// listen is already in flight.
    pub fn begin_listening(&mut self) -> bool {
        match self.phase {
            VoicePhase::Idle => {
                self.phase = VoicePhase::Listening;
                log::debug!("[Voice] Listening");
                true
            }
            VoicePhase::Listening => false,
        }
    }

    /// Force the controller back to Idle (question answered by click, quiz
    /// over). A transcript that still arrives afterwards is stale.
    pub fn stop(&mut self) {
        self.phase = VoicePhase::Idle;
    }

    /// Process a provider event against the current question's options.
    /// Every path returns the controller to Idle; the caller decides
    /// whether and when to listen again via `restart_delay_after`.
    pub fn handle_event(&mut self, event: VoiceEvent, options: &[&Country]) -> Option<VoiceOutcome> {
        if self.phase == VoicePhase::Idle {
            log::debug!("[Voice] Dropping stale event: {:?}", event);
            return None;
        }

        self.phase = VoicePhase::Idle;

        match event {
            VoiceEvent::TranscriptReady(transcript) => {
                self.consecutive_errors = 0;
                let cleaned = strip_speech_prefix(&transcript);
                match find_best_match(&cleaned, options, self.config.threshold) {
                    Some(result) => {
                        log::info!(
                            "[Voice] Matched '{}' to {} (score {:.2}{})",
                            transcript,
                            result.code,
                            result.score,
                            result
                                .matched_alias
                                .as_deref()
                                .map(|a| format!(", via alias '{}'", a))
                                .unwrap_or_default()
                        );
                        Some(VoiceOutcome::Matched(result))
                    }
                    None => {
                        log::info!("[Voice] No option matched '{}'", transcript);
                        Some(VoiceOutcome::NoMatch { transcript })
                    }
                }
            }
            VoiceEvent::RecognitionError(reason) => {
                self.consecutive_errors += 1;
                log::warn!(
                    "[Voice] Recognition error ({} consecutive): {}",
                    self.consecutive_errors,
                    reason
                );
                Some(VoiceOutcome::Unavailable { reason })
            }
            VoiceEvent::SessionEnded => None,
        }
    }

    /// How long to wait before listening again after an outcome. None means
    /// do not restart (a match was submitted; listening resumes with the
    /// next question).
    pub fn restart_delay_after(&self, outcome: &VoiceOutcome) -> Option<Duration> {
        match outcome {
            VoiceOutcome::Matched(_) => None,
            VoiceOutcome::NoMatch { .. } => Some(Duration::from_millis(self.config.restart_delay_ms)),
            VoiceOutcome::Unavailable { .. } => {
                let delay_ms = if self.consecutive_errors >= ERROR_BACKOFF_AFTER {
                    self.config.long_error_delay_ms
                } else {
                    self.config.error_restart_delay_ms
                };
                Some(Duration::from_millis(delay_ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::country_by_code;

    fn question_options() -> Vec<&'static Country> {
        ["JO", "PS", "SY", "IQ"]
            .iter()
            .map(|code| country_by_code(code).unwrap())
            .collect()
    }

    #[test]
    fn test_transcript_with_filler_prefix_matches() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        assert!(voice.begin_listening());

        let outcome = voice
            .handle_event(
                VoiceEvent::TranscriptReady("I think it's Jordan".to_string()),
                &question_options(),
            )
            .unwrap();

        match &outcome {
            VoiceOutcome::Matched(result) => {
                assert_eq!(result.code, "JO");
                assert_eq!(result.matched_alias, None);
            }
            other => panic!("expected a match, got {:?}", other),
        }
        assert!(!voice.is_listening());
        assert_eq!(voice.restart_delay_after(&outcome), None);
    }

    #[test]
    fn test_transcript_matching_an_alias() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        let options: Vec<&Country> = ["AE", "JO", "PS", "KW"]
            .iter()
            .map(|code| country_by_code(code).unwrap())
            .collect();

        voice.begin_listening();
        let outcome = voice
            .handle_event(VoiceEvent::TranscriptReady("UAE".to_string()), &options)
            .unwrap();

        match outcome {
            VoiceOutcome::Matched(result) => {
                assert_eq!(result.code, "AE");
                assert_eq!(result.matched_alias.as_deref(), Some("UAE"));
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_unmatched_transcript_reports_no_match_and_restarts() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        voice.begin_listening();

        let outcome = voice
            .handle_event(
                VoiceEvent::TranscriptReady("Zimbabwe".to_string()),
                &question_options(),
            )
            .unwrap();

        assert_eq!(
            outcome,
            VoiceOutcome::NoMatch { transcript: "Zimbabwe".to_string() }
        );
        assert_eq!(
            voice.restart_delay_after(&outcome),
            Some(Duration::from_millis(VOICE_RESTART_DELAY_MS))
        );
    }

    #[test]
    fn test_empty_transcript_is_no_match_not_an_error() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        voice.begin_listening();

        let outcome = voice
            .handle_event(VoiceEvent::TranscriptReady(String::new()), &question_options())
            .unwrap();
        assert!(matches!(outcome, VoiceOutcome::NoMatch { .. }));
    }

    #[test]
    fn test_error_backoff_escalates_then_resets() {
        let mut voice = VoiceController::new(VoiceConfig::default());

        voice.begin_listening();
        let first = voice
            .handle_event(VoiceEvent::RecognitionError("network".to_string()), &question_options())
            .unwrap();
        assert_eq!(
            voice.restart_delay_after(&first),
            Some(Duration::from_millis(VOICE_ERROR_RESTART_DELAY_MS))
        );

        voice.begin_listening();
        let second = voice
            .handle_event(VoiceEvent::RecognitionError("network".to_string()), &question_options())
            .unwrap();
        assert_eq!(
            voice.restart_delay_after(&second),
            Some(Duration::from_millis(VOICE_LONG_ERROR_DELAY_MS))
        );

        // A successful transcript clears the error streak
        voice.begin_listening();
        voice.handle_event(VoiceEvent::TranscriptReady("Jordan".to_string()), &question_options());

        voice.begin_listening();
        let after_reset = voice
            .handle_event(VoiceEvent::RecognitionError("network".to_string()), &question_options())
            .unwrap();
        assert_eq!(
            voice.restart_delay_after(&after_reset),
            Some(Duration::from_millis(VOICE_ERROR_RESTART_DELAY_MS))
        );
    }

    #[test]
    fn test_events_while_idle_are_dropped() {
        let mut voice = VoiceController::new(VoiceConfig::default());

        // Never began listening: a late transcript must not produce an outcome
        let outcome = voice.handle_event(
            VoiceEvent::TranscriptReady("Jordan".to_string()),
            &question_options(),
        );
        assert!(outcome.is_none());
    }

    #[test]
    fn test_stop_makes_in_flight_transcript_stale() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        voice.begin_listening();

        // The question gets answered by a click; listening is stopped
        voice.stop();

        let outcome = voice.handle_event(
            VoiceEvent::TranscriptReady("Jordan".to_string()),
            &question_options(),
        );
        assert!(outcome.is_none());
    }

    #[test]
    fn test_begin_listening_is_not_reentrant() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        assert!(voice.begin_listening());
        assert!(!voice.begin_listening());
    }

    #[test]
    fn test_session_ended_returns_to_idle_without_outcome() {
        let mut voice = VoiceController::new(VoiceConfig::default());
        voice.begin_listening();

        let outcome = voice.handle_event(VoiceEvent::SessionEnded, &question_options());
        assert!(outcome.is_none());
        assert!(!voice.is_listening());
    }

    #[test]
    fn test_custom_restart_delays_are_respected() {
        let mut voice = VoiceController::new(VoiceConfig {
            restart_delay_ms: 50,
            ..VoiceConfig::default()
        });
        voice.begin_listening();

        let outcome = voice
            .handle_event(VoiceEvent::TranscriptReady("Wakanda".to_string()), &question_options())
            .unwrap();
        assert_eq!(voice.restart_delay_after(&outcome), Some(Duration::from_millis(50)));
    }
}
