//! Voice Bridge: text-to-speech for questions, speech-to-text for answers.
//!
//! Both directions are optional conveniences outside the scoring path. Audio
//! capture and playback happen on the client; this module only converts.

pub mod detect;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::voice::detect::{isolate_phrase, ListenWindow};

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("speech API returned no audio")]
    EmptyAudio,
}

/// Distinct outcomes of a failed listen. None of them records an answer.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("Timeout - no speech detected")]
    NoSpeech,

    #[error("Could not understand audio")]
    NotUnderstood,

    #[error("Unreadable audio clip: {0}")]
    InvalidAudio(String),

    #[error("Transcription failed: {0}")]
    Service(String),
}

impl From<VoiceError> for ListenError {
    fn from(e: VoiceError) -> Self {
        ListenError::Service(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Speech settings taken from configuration.
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
}

#[derive(Clone)]
pub struct VoiceClient {
    client: Client,
    api_key: String,
    base_url: String,
    settings: VoiceSettings,
    window: ListenWindow,
}

impl VoiceClient {
    pub fn new(api_key: String, base_url: impl Into<String>, settings: VoiceSettings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            settings,
            window: ListenWindow::default(),
        }
    }

    /// Synthesizes `text` as MP3.
    pub async fn speak(&self, text: &str) -> Result<Bytes, VoiceError> {
        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: &self.settings.tts_model,
                input: text,
                voice: &self.settings.tts_voice,
                response_format: "mp3",
            })
            .send()
            .await?;

        let response = check_status(response).await?;
        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(VoiceError::EmptyAudio);
        }
        debug!("Synthesized {} bytes of speech", audio.len());
        Ok(audio)
    }

    /// Isolates the spoken phrase in a recorded WAV clip and transcribes it.
    pub async fn listen(&self, clip: &[u8]) -> Result<String, ListenError> {
        let phrase = isolate_phrase(clip, &self.window)?.ok_or(ListenError::NoSpeech)?;
        info!(
            "Speech detected at {:.1}s, transcribing {:.1}s of audio",
            phrase.onset_secs, phrase.duration_secs
        );

        let text = self.transcribe(phrase.wav).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ListenError::NotUnderstood);
        }
        Ok(text.to_string())
    }

    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, VoiceError> {
        let file = Part::bytes(wav)
            .file_name("answer.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .text("model", self.settings.stt_model.clone())
            .text("response_format", "json")
            .part("file", file);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let transcription: TranscriptionResponse = response.json().await?;
        Ok(transcription.text)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(VoiceError::Api {
        status: status.as_u16(),
        message,
    })
}
