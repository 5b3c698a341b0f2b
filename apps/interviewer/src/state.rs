use crate::config::Config;
use crate::interview::evaluator::AnswerEvaluator;
use crate::interview::questions::QuestionGenerator;
use crate::interview::session::SessionStore;
use crate::store::InterviewStore;
use crate::voice::VoiceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub questions: QuestionGenerator,
    pub evaluator: AnswerEvaluator,
    /// `None` when no model credential is configured.
    pub voice: Option<VoiceClient>,
    pub store: InterviewStore,
    pub config: Config,
}

impl AppState {
    pub fn model_enabled(&self) -> bool {
        self.config.openai_api_key.is_some()
    }

    /// State with the model, voice and store all disabled.
    #[cfg(test)]
    pub fn for_tests(total_questions: u32) -> Self {
        Self {
            sessions: SessionStore::default(),
            questions: QuestionGenerator::new(None),
            evaluator: AnswerEvaluator::new(None),
            voice: None,
            store: InterviewStore::disabled(),
            config: Config::for_tests(total_questions),
        }
    }
}
