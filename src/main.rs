// Flagquiz terminal app. Plays the role of both external collaborators the
// engine expects: the presentation layer (numbered selection = click) and
// the speech provider (typed free text = transcript). All state transitions
// run on this single event loop; timers are tagged with the session
// generation they were scheduled for and no-op once it moves on.

use std::io::BufRead;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

// Import our modules
mod catalog;
mod config;
mod matching;
mod quiz;
mod scoring;
mod session;
mod speech;

use crate::config::{AppSettings, COUNTDOWN_SECONDS, DELAY_BEFORE_NEXT_MS, SETTINGS, VOICE_INIT_DELAY_MS};
use crate::session::{QuizSession, SessionPhase};
use crate::speech::{VoiceConfig, VoiceController, VoiceEvent, VoiceOutcome};

enum SessionEnd {
    Finished,
    Quit,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("Flagquiz - v{}", env!("CARGO_PKG_VERSION"));

    let settings = match SETTINGS.lock() {
        Ok(guard) => guard.clone(),
        Err(e) => {
            log::error!("[App] Settings lock poisoned ({}), using defaults", e);
            AppSettings::default()
        }
    };

    let mut input = spawn_input_thread();
    let mut voice_enabled = settings.voice.enabled;

    loop {
        match run_session(&mut input, &settings, &mut voice_enabled).await {
            SessionEnd::Quit => break,
            SessionEnd::Finished => {
                println!("\nPlay again? (y/n)");
                match input.recv().await {
                    Some(line) if line.trim().eq_ignore_ascii_case("y") => continue,
                    _ => break,
                }
            }
        }
    }

    println!("Thanks for playing!");
}

/// Dedicated thread feeding stdin lines into the event loop.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break; // Event loop is gone
                    }
                }
                Err(e) => {
                    log::error!("[App] Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

async fn run_session(
    input: &mut mpsc::UnboundedReceiver<String>,
    settings: &AppSettings,
    voice_enabled: &mut bool,
) -> SessionEnd {
    // --- Intro screen ---
    println!("\n=== Flag Quiz ===");
    println!("Identify each flag to earn points; the faster you answer, the more you get.");
    println!("Answer by typing the option number, or answer by voice: type what you would");
    println!("say out loud (e.g. \"I think it's France\").");
    loop {
        println!("Voice mode: {}  (Enter = start, v = toggle voice, q = quit)",
                 if *voice_enabled { "On" } else { "Off" });
        match input.recv().await {
            None => return SessionEnd::Quit,
            Some(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    break;
                } else if trimmed.eq_ignore_ascii_case("v") {
                    *voice_enabled = !*voice_enabled;
                    persist_voice_preference(*voice_enabled);
                } else if is_quit(trimmed) {
                    return SessionEnd::Quit;
                }
            }
        }
    }

    // --- Countdown before the first question ---
    for remaining in (1..=COUNTDOWN_SECONDS).rev() {
        println!("Starting in {}", remaining);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    // --- Build the session ---
    let questions = quiz::generate_quiz(settings.quiz.total_questions, &mut rand::thread_rng());
    let mut session = match QuizSession::new(questions) {
        Ok(session) => session,
        Err(e) => {
            log::error!("[App] Could not start session: {}", e);
            return SessionEnd::Quit;
        }
    };
    let mut voice = VoiceController::new(VoiceConfig {
        threshold: settings.quiz.similarity_threshold,
        restart_delay_ms: settings.voice.restart_delay_ms,
        error_restart_delay_ms: settings.voice.error_restart_delay_ms,
        ..VoiceConfig::default()
    });

    // --- Question loop ---
    while !session.is_complete() {
        session.mark_presented();
        present_question(&session);
        if *voice_enabled {
            tokio::time::sleep(Duration::from_millis(VOICE_INIT_DELAY_MS)).await;
            voice.begin_listening();
        }

        let generation = session.generation();
        // Pending voice-restart timer, tagged with the generation it belongs to
        let mut voice_restart: Option<(Instant, u64)> = None;

        // Wait for an answer
        let outcome = loop {
            let restart_deadline = voice_restart
                .map(|(deadline, _)| deadline)
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                maybe_line = input.recv() => {
                    let line = match maybe_line {
                        Some(line) => line,
                        None => return SessionEnd::Quit,
                    };
                    let trimmed = line.trim().to_string();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if is_quit(&trimmed) {
                        return SessionEnd::Quit;
                    }

                    if let Ok(number) = trimmed.parse::<usize>() {
                        // Manual selection path
                        let option_count = session.current_question().options.len();
                        if (1..=option_count).contains(&number) {
                            let code = session.current_question().options[number - 1].code;
                            voice.stop();
                            if let Some(outcome) = session.submit_answer(code) {
                                break outcome;
                            }
                        } else {
                            println!("Pick a number between 1 and {}.", option_count);
                        }
                    } else {
                        // Voice path: the typed text is the transcript
                        if !*voice_enabled {
                            println!("Voice mode is off — answer with a number.");
                            continue;
                        }
                        if !voice.is_listening() {
                            println!("(voice is restarting — try again in a moment, or answer with a number)");
                            continue;
                        }
                        let voice_outcome = {
                            let options = &session.current_question().options;
                            voice.handle_event(VoiceEvent::TranscriptReady(trimmed), options)
                        };
                        match voice_outcome {
                            Some(VoiceOutcome::Matched(result)) => {
                                let matched = session
                                    .current_question()
                                    .options
                                    .iter()
                                    .find(|c| c.code == result.code)
                                    .map(|c| c.name)
                                    .unwrap_or(result.code.as_str());
                                match &result.matched_alias {
                                    Some(alias) => println!("Matched to: {} (recognized as \"{}\")", matched, alias),
                                    None => println!("Matched to: {}", matched),
                                }
                                if let Some(outcome) = session.submit_answer(&result.code) {
                                    break outcome;
                                }
                            }
                            Some(VoiceOutcome::NoMatch { transcript }) => {
                                println!("You said: \"{}\" — no matching country found.", transcript);
                                println!("Did you mean one of these?");
                                for option in &session.current_question().options {
                                    println!("  - {}", option.name);
                                }
                                let outcome = VoiceOutcome::NoMatch { transcript };
                                if let Some(delay) = voice.restart_delay_after(&outcome) {
                                    voice_restart = Some((Instant::now() + delay, generation));
                                }
                            }
                            Some(VoiceOutcome::Unavailable { reason }) => {
                                // Typed transcripts cannot fail, but the arm stays honest
                                println!("Voice recognition unavailable: {}", reason);
                                let outcome = VoiceOutcome::Unavailable { reason };
                                if let Some(delay) = voice.restart_delay_after(&outcome) {
                                    voice_restart = Some((Instant::now() + delay, generation));
                                }
                            }
                            None => {}
                        }
                    }
                }
                _ = tokio::time::sleep_until(restart_deadline), if voice_restart.is_some() => {
                    let (_, timer_generation) = voice_restart.take().unwrap_or((Instant::now(), 0));
                    // A stale timer for an earlier question must not re-arm listening
                    if timer_generation == session.generation()
                        && session.phase() == SessionPhase::AwaitingAnswer
                    {
                        voice.begin_listening();
                        println!("(listening again...)");
                    }
                }
            }
        };

        log::debug!(
            "[App] Answer outcome: {}",
            serde_json::to_string(&outcome).unwrap_or_default()
        );
        print_feedback(&session);

        // Feedback pause before auto-advance; late inputs hit the session's
        // idempotency guard and are ignored
        let advance_at = Instant::now() + Duration::from_millis(DELAY_BEFORE_NEXT_MS);
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(advance_at) => break,
                maybe_line = input.recv() => {
                    match maybe_line {
                        None => return SessionEnd::Quit,
                        Some(line) if is_quit(line.trim()) => return SessionEnd::Quit,
                        Some(line) => {
                            // First answer already won this question
                            let _ = session.submit_answer(line.trim());
                        }
                    }
                }
            }
        }

        session.advance();
    }

    // --- Results ---
    println!("\n=== Quiz complete! ===");
    println!("Final score: {} over {} questions", session.score(), session.total_questions());
    log::info!(
        "[App] Session summary: {}",
        serde_json::json!({
            "session_id": session.session_id(),
            "started_at": session.started_at().to_rfc3339(),
            "score": session.score(),
            "total_questions": session.total_questions(),
        })
    );

    SessionEnd::Finished
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit")
}

fn persist_voice_preference(enabled: bool) {
    if let Ok(mut guard) = SETTINGS.lock() {
        guard.voice.enabled = enabled;
        if let Err(e) = guard.save() {
            log::warn!("[App] Could not save settings: {}", e);
        }
    }
}

fn present_question(session: &QuizSession) {
    let question = session.current_question();
    println!(
        "\nQuestion {} of {} — which country does this flag belong to?",
        session.question_index() + 1,
        session.total_questions()
    );
    println!("\n    {}\n", question.correct.flag_emoji());
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.name);
    }
}

fn print_feedback(session: &QuizSession) {
    let picked = session
        .selected_answer()
        .and_then(catalog::country_by_code)
        .map(|c| c.name)
        .unwrap_or("?");
    match session.was_correct() {
        Some(true) => println!(
            "{} — correct! +{} points (score: {})",
            picked,
            session.last_points(),
            session.score()
        ),
        Some(false) => println!(
            "{} — incorrect! The correct answer is {}.",
            picked,
            session.current_question().correct.name
        ),
        None => {}
    }
}
