// src/session.rs
//
// Quiz session state machine. A session owns its pre-generated questions
// and walks AwaitingAnswer -> Answered -> ... -> Complete. The first
// submitted answer per question wins; later submissions (a click racing a
// voice match, a stale callback) are silent no-ops. Scheduled callbacks
// compare the session generation to detect that they no longer apply.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::quiz::QuizQuestion;
use crate::scoring::calculate_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    AwaitingAnswer,
    Answered,
    Complete,
}

/// What a processed answer looked like, for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub points_awarded: u32,
    pub correct_code: &'static str,
}

pub struct QuizSession {
    session_id: String,
    started_at: DateTime<Utc>,
    questions: Vec<QuizQuestion>,
    question_index: usize,
    score: u32,
    phase: SessionPhase,
    selected_answer: Option<String>,
    was_correct: Option<bool>,
    last_points: u32,
    /// When the current question was shown; response times measure from here.
    presented_at: Instant,
    /// Bumped whenever a new question is presented. Timers scheduled for an
    /// older generation must no-op.
    generation: u64,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, String> {
        if questions.is_empty() {
            return Err("Cannot start a session with no questions".to_string());
        }

        let session_id = Uuid::new_v4().to_string();
        log::info!("[Session] {} started with {} questions", session_id, questions.len());

        Ok(Self {
            session_id,
            started_at: Utc::now(),
            questions,
            question_index: 0,
            score: 0,
            phase: SessionPhase::AwaitingAnswer,
            selected_answer: None,
            was_correct: None,
            last_points: 0,
            presented_at: Instant::now(),
            generation: 0,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.question_index]
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn was_correct(&self) -> Option<bool> {
        self.was_correct
    }

    pub fn last_points(&self) -> u32 {
        self.last_points
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Re-stamp the response-time clock for the current question. Called by
    /// the presentation layer when the question actually becomes visible
    /// (after the countdown), so setup time never counts against the player.
    pub fn mark_presented(&mut self) {
        if self.phase == SessionPhase::AwaitingAnswer {
            self.presented_at = Instant::now();
        }
    }

    /// Apply an answer for the current question. Valid only while awaiting
    /// an answer; any later call for the same question is ignored, which is
    /// what guarantees at most one scored answer per question when a voice
    /// match and a manual selection race.
    pub fn submit_answer(&mut self, code: &str) -> Option<AnswerOutcome> {
        if self.phase != SessionPhase::AwaitingAnswer {
            log::debug!("[Session] Ignoring answer '{}' in phase {:?}", code, self.phase);
            return None;
        }

        let question = &self.questions[self.question_index];
        let is_correct = code == question.correct.code;
        let elapsed_ms = self.presented_at.elapsed().as_millis() as u64;
        let points = if is_correct { calculate_score(elapsed_ms) } else { 0 };

        self.score += points;
        self.selected_answer = Some(code.to_string());
        self.was_correct = Some(is_correct);
        self.last_points = points;
        self.phase = SessionPhase::Answered;

        log::info!(
            "[Session] {} q{}: answered '{}' ({}) in {}ms, +{} points, total {}",
            self.session_id,
            self.question_index + 1,
            code,
            if is_correct { "correct" } else { "incorrect" },
            elapsed_ms,
            points,
            self.score
        );

        Some(AnswerOutcome {
            is_correct,
            points_awarded: points,
            correct_code: question.correct.code,
        })
    }

    /// Move past an answered question. On the last question the session
    /// becomes Complete and the score is final; otherwise the next question
    /// is presented with a fresh clock and a new generation.
    pub fn advance(&mut self) -> SessionPhase {
        match self.phase {
            SessionPhase::Answered => {
                if self.question_index + 1 == self.questions.len() {
                    self.phase = SessionPhase::Complete;
                    log::info!(
                        "[Session] {} complete: {} points over {} questions",
                        self.session_id,
                        self.score,
                        self.questions.len()
                    );
                } else {
                    self.question_index += 1;
                    self.phase = SessionPhase::AwaitingAnswer;
                    self.selected_answer = None;
                    self.was_correct = None;
                    self.last_points = 0;
                    self.presented_at = Instant::now();
                    self.generation += 1;
                }
            }
            _ => {
                log::debug!("[Session] Ignoring advance in phase {:?}", self.phase);
            }
        }
        self.phase
    }
}
