use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables.
///
/// The model credential and the store URL are optional: when either is missing
/// the corresponding component runs disabled for the whole process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
    pub total_questions: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let total_questions = std::env::var("TOTAL_QUESTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("TOTAL_QUESTIONS must be a positive integer")?;
        if total_questions == 0 {
            bail!("TOTAL_QUESTIONS must be at least 1");
        }

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            chat_model: optional_env("OPENAI_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            tts_model: optional_env("OPENAI_TTS_MODEL").unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: optional_env("OPENAI_TTS_VOICE").unwrap_or_else(|| "alloy".to_string()),
            stt_model: optional_env("OPENAI_STT_MODEL")
                .unwrap_or_else(|| "whisper-1".to_string()),
            total_questions,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration with every external collaborator disabled.
    #[cfg(test)]
    pub fn for_tests(total_questions: u32) -> Self {
        Config {
            database_url: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: "gpt-4".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            stt_model: "whisper-1".to_string(),
            total_questions,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads an env var, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
