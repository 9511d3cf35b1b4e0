use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use directories::ProjectDirs;
use once_cell::sync::Lazy; // Use Lazy for thread-safe static initialization
use std::sync::Mutex;
use toml;

// --- Engine constants ---
// Core functions take these as parameters; SETTINGS only overrides the
// quiz-shape values for the app shell.

/// Questions per session.
pub const TOTAL_QUESTIONS: usize = 10;
/// Options per question (one correct answer plus decoys).
pub const OPTION_COUNT: usize = 4;
/// Minimum similarity for a transcript to count as a match.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

// Scoring constants
pub const MIN_SCORE: u32 = 1000; // Minimum score for a correct answer
pub const MAX_SCORE: u32 = 2000; // Maximum score for a correct answer
pub const MIN_TIME_MS: u64 = 2_000; // At or below this response time, full points
pub const MAX_TIME_MS: u64 = 10_000; // At or above this response time, minimum points

// Countdown and feedback pacing
pub const COUNTDOWN_SECONDS: u32 = 3; // Countdown before the first question
pub const DELAY_BEFORE_NEXT_MS: u64 = 2_000; // Feedback display time before auto-advance

// Voice recognition restart timing
pub const VOICE_RESTART_DELAY_MS: u64 = 300; // Restart delay after a transcript with no match
pub const VOICE_ERROR_RESTART_DELAY_MS: u64 = 500; // Restart delay after a provider error
pub const VOICE_LONG_ERROR_DELAY_MS: u64 = 700; // Backoff once errors repeat
pub const VOICE_INIT_DELAY_MS: u64 = 100; // Small delay so a previous listen has fully stopped

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppSettings {
    #[serde(default = "default_quiz")]
    pub quiz: QuizSettings,
    #[serde(default = "default_voice")]
    pub voice: VoiceSettings,
}

/// Settings for quiz generation and matching. The option count is not a
/// setting: question layout is fixed at OPTION_COUNT.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizSettings {
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

/// Settings for the voice answer path
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoiceSettings {
    #[serde(default = "default_voice_enabled")]
    pub enabled: bool,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
    #[serde(default = "default_error_restart_delay_ms")]
    pub error_restart_delay_ms: u64,
}

fn default_quiz() -> QuizSettings {
    QuizSettings::default()
}

fn default_voice() -> VoiceSettings {
    VoiceSettings::default()
}

fn default_total_questions() -> usize {
    TOTAL_QUESTIONS
}

fn default_similarity_threshold() -> f64 {
    SIMILARITY_THRESHOLD
}

fn default_voice_enabled() -> bool {
    true // Voice answers on by default; typed selection always works
}

fn default_restart_delay_ms() -> u64 {
    VOICE_RESTART_DELAY_MS
}

fn default_error_restart_delay_ms() -> u64 {
    VOICE_ERROR_RESTART_DELAY_MS
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: default_voice_enabled(),
            restart_delay_ms: default_restart_delay_ms(),
            error_restart_delay_ms: default_error_restart_delay_ms(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            quiz: default_quiz(),
            voice: default_voice(),
        }
    }
}

// Use Lazy<Mutex<AppSettings>> for thread-safe static config
pub static SETTINGS: Lazy<Mutex<AppSettings>> = Lazy::new(|| {
    Mutex::new(load_settings())
});

// Helper function to get project directories
fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "flagquiz", "Flagquiz")
}

// Helper function to get the config file path
fn get_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|proj_dirs| {
        let config_dir = proj_dirs.config_dir();
        config_dir.join("config.toml")
    })
}

// Function to load settings from TOML file or create default
fn load_settings() -> AppSettings {
    if let Some(config_path) = get_config_path() {
        log::info!("[Config] Trying to load settings from: {}", config_path.display());
        match fs::read_to_string(&config_path) {
            Ok(contents) => {
                match toml::from_str::<AppSettings>(&contents) {
                    Ok(settings) => {
                        log::info!("[Config] Settings loaded: questions={}, threshold={:.2}, voice={}",
                                   settings.quiz.total_questions,
                                   settings.quiz.similarity_threshold, settings.voice.enabled);
                        return settings;
                    },
                    Err(e) => {
                        log::error!("[Config] Failed to parse config file '{}': {}", config_path.display(), e);
                        // Fall through to create default if parsing fails
                    }
                }
            },
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[Config] Config file not found. Creating default.");
                // Fall through to create default
            },
            Err(e) => {
                log::error!("[Config] Failed to read config file '{}': {}", config_path.display(), e);
            }
        }
    } else {
        log::error!("[Config] Could not determine project directories. Using default settings.");
    }

    // --- Create or use Default Settings ---
    let default_settings = AppSettings::default();
    if let Some(config_path) = get_config_path() {
        // Ensure the config directory exists
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                if let Err(e) = fs::create_dir_all(config_dir) {
                    log::error!("[Config] Failed to create config directory: {}", e);
                    // Proceed with default settings in memory anyway
                    return default_settings;
                }
            }
        }

        // Try to save the default config file
        match toml::to_string_pretty(&default_settings) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(&config_path, toml_string) {
                    log::error!("[Config] Failed to write default config file: {}", e);
                } else {
                    log::info!("[Config] Default config file created at {}", config_path.display());
                }
            },
            Err(e) => {
                log::error!("[Config] Failed to serialize default settings: {}", e);
            }
        }
    }

    default_settings // Return defaults if loading/saving failed
}

// Implementation for saving settings
impl AppSettings {
    pub fn config_path() -> Result<PathBuf, String> {
        get_config_path().ok_or_else(|| "Could not determine config path".to_string())
    }

    pub fn save(&self) -> Result<(), String> {
        let config_path = Self::config_path()?;

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
        }

        let config_content = toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;
        fs::write(&config_path, config_content).map_err(|e| format!("Failed to write config: {}", e))?;

        log::info!("[Config] Settings saved to {}", config_path.display());
        Ok(())
    }
}
