// src/quiz.rs
//
// Quiz generation: picks a correct country and a set of visually-confusable
// decoys, shuffled so the correct answer's position is unpredictable.
// Generic over the RNG so tests can run with a seeded generator.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::catalog::{self, Country, COUNTRIES};
use crate::config::OPTION_COUNT;

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub correct: &'static Country,
    pub options: Vec<&'static Country>,
}

/// Generate a single question, avoiding countries in `exclude` as the
/// correct answer. Once every country has been used the no-repeat pool
/// resets and repeats become possible again.
pub fn generate_question<R: Rng>(exclude: &HashSet<&str>, rng: &mut R) -> QuizQuestion {
    // Filter out countries that have already been used as correct answers
    let available: Vec<&'static Country> = COUNTRIES
        .iter()
        .filter(|country| !exclude.contains(country.code))
        .collect();

    // If we've used all countries, reset and draw from the full catalog
    let pool = if available.is_empty() {
        log::debug!("[Quiz] No-repeat pool exhausted, resetting");
        COUNTRIES.iter().collect()
    } else {
        available
    };

    // Randomly select a country as the correct answer
    let correct = pool[rng.gen_range(0..pool.len())];

    // Collect decoys from the similar-flag list, in listed order. Codes that
    // don't resolve were already skipped; duplicates must not survive here.
    let decoy_quota = OPTION_COUNT - 1;
    let mut decoys: Vec<&'static Country> = Vec::with_capacity(decoy_quota);
    for candidate in catalog::similar_countries(correct.code, correct.similar_to.len()) {
        if decoys.len() == decoy_quota {
            break;
        }
        if candidate.code != correct.code && decoys.iter().all(|d| d.code != candidate.code) {
            decoys.push(candidate);
        }
    }

    // If we don't have enough similar countries, top up with random ones
    if decoys.len() < decoy_quota {
        let mut remaining: Vec<&'static Country> = COUNTRIES
            .iter()
            .filter(|country| {
                country.code != correct.code && decoys.iter().all(|d| d.code != country.code)
            })
            .collect();
        remaining.shuffle(rng);
        decoys.extend(remaining.into_iter().take(decoy_quota - decoys.len()));
    }

    // Combine and shuffle the options
    let mut options: Vec<&'static Country> = Vec::with_capacity(OPTION_COUNT);
    options.push(correct);
    options.extend(decoys);
    options.shuffle(rng);

    QuizQuestion { correct, options }
}

/// Generate a full quiz: `total_questions` questions whose correct answers
/// are pairwise distinct (unless the catalog is smaller than the quiz).
pub fn generate_quiz<R: Rng>(total_questions: usize, rng: &mut R) -> Vec<QuizQuestion> {
    let mut questions = Vec::with_capacity(total_questions);
    let mut used_codes: HashSet<&str> = HashSet::new();

    for _ in 0..total_questions {
        let question = generate_question(&used_codes, rng);
        used_codes.insert(question.correct.code);
        questions.push(question);
    }

    log::info!("[Quiz] Generated {} questions", questions.len());
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_well_formed(question: &QuizQuestion) {
        assert_eq!(question.options.len(), OPTION_COUNT);
        let codes: HashSet<&str> = question.options.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), OPTION_COUNT, "options must be unique");
        assert!(codes.contains(question.correct.code), "options must contain the correct answer");
    }

    #[test]
    fn test_question_has_four_unique_options_including_correct() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let question = generate_question(&HashSet::new(), &mut rng);
            assert_well_formed(&question);
        }
    }

    #[test]
    fn test_excluded_countries_are_not_correct_answers() {
        let mut rng = StdRng::seed_from_u64(7);
        let exclude: HashSet<&str> = ["JO", "PS", "SY", "FR", "NL"].into_iter().collect();
        for _ in 0..50 {
            let question = generate_question(&exclude, &mut rng);
            assert!(!exclude.contains(question.correct.code));
        }
    }

    #[test]
    fn test_pool_resets_when_everything_is_excluded() {
        let mut rng = StdRng::seed_from_u64(3);
        let exclude: HashSet<&str> = COUNTRIES.iter().map(|c| c.code).collect();
        let question = generate_question(&exclude, &mut rng);
        assert_well_formed(&question);
    }

    #[test]
    fn test_forced_correct_uses_confusables_as_decoys() {
        // Exclude everything except Jordan so the draw is deterministic
        let mut rng = StdRng::seed_from_u64(11);
        let exclude: HashSet<&str> = COUNTRIES
            .iter()
            .map(|c| c.code)
            .filter(|&code| code != "JO")
            .collect();
        let question = generate_question(&exclude, &mut rng);

        assert_eq!(question.correct.code, "JO");
        // Jordan's first three similar flags are Palestine, Syria, Iraq
        let codes: HashSet<&str> = question.options.iter().map(|c| c.code).collect();
        assert_eq!(codes, ["JO", "PS", "SY", "IQ"].into_iter().collect());
    }

    #[test]
    fn test_decoys_top_up_when_confusables_run_short() {
        // Belgium's similar list resolves to only two catalog entries
        let mut rng = StdRng::seed_from_u64(19);
        let exclude: HashSet<&str> = COUNTRIES
            .iter()
            .map(|c| c.code)
            .filter(|&code| code != "BE")
            .collect();
        let question = generate_question(&exclude, &mut rng);

        assert_eq!(question.correct.code, "BE");
        assert_well_formed(&question);
        let codes: HashSet<&str> = question.options.iter().map(|c| c.code).collect();
        assert!(codes.contains("RO"));
        assert!(codes.contains("MD"));
    }

    #[test]
    fn test_correct_answer_position_varies() {
        let exclude = HashSet::new();
        let mut positions = HashSet::new();
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let question = generate_question(&exclude, &mut rng);
            let position = question
                .options
                .iter()
                .position(|c| c.code == question.correct.code)
                .unwrap();
            positions.insert(position);
        }
        assert!(positions.len() > 1, "correct answer should not be positionally predictable");
    }

    #[test]
    fn test_quiz_has_requested_length_and_distinct_answers() {
        let mut rng = StdRng::seed_from_u64(99);
        let quiz = generate_quiz(10, &mut rng);

        assert_eq!(quiz.len(), 10);
        let correct_codes: HashSet<&str> = quiz.iter().map(|q| q.correct.code).collect();
        assert_eq!(correct_codes.len(), quiz.len(), "correct answers must not repeat");
        for question in &quiz {
            assert_well_formed(question);
        }
    }

    #[test]
    fn test_quiz_spanning_whole_catalog_stays_distinct() {
        let mut rng = StdRng::seed_from_u64(5);
        let quiz = generate_quiz(COUNTRIES.len(), &mut rng);
        let correct_codes: HashSet<&str> = quiz.iter().map(|q| q.correct.code).collect();
        assert_eq!(correct_codes.len(), COUNTRIES.len());
    }

    #[test]
    fn test_quiz_longer_than_catalog_allows_repeats_after_reset() {
        let mut rng = StdRng::seed_from_u64(13);
        let quiz = generate_quiz(COUNTRIES.len() + 5, &mut rng);
        assert_eq!(quiz.len(), COUNTRIES.len() + 5);
        for question in &quiz {
            assert_well_formed(question);
        }
    }
}
