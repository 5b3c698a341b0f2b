//! Answer Evaluator: asks the model to score and critique one answer.
//!
//! The model is told to return `{"score": <number>, "feedback": "<string>"}`.
//! Decoding is a separate step ([`decode_evaluation`]) and any decode failure
//! is handled exactly like a failed call: the fixed fallback evaluation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::interview::models::InterviewType;
use crate::interview::outcome::Outcome;
use crate::interview::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM};
use crate::llm_client::prompts::{render, JSON_ONLY_SYSTEM};
use crate::llm_client::{strip_json_fences, CallParams, LlmClient};

pub const FALLBACK_SCORE: f64 = 7.0;
pub const FALLBACK_FEEDBACK: &str = "Unable to provide detailed feedback at this time.";

const EVALUATION_PARAMS: CallParams = CallParams {
    max_tokens: 300,
    temperature: 0.5,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// In [0, 10], one decimal of precision.
    pub score: f64,
    pub feedback: String,
}

impl Evaluation {
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("evaluation is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("evaluation is missing a numeric 'score'")]
    MissingScore,

    #[error("evaluation is missing a string 'feedback'")]
    MissingFeedback,
}

/// Decodes the model's evaluation text, tolerating code-fence wrapping.
pub fn decode_evaluation(text: &str) -> Result<Evaluation, DecodeError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .ok_or(DecodeError::MissingScore)?;
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingFeedback)?;

    Ok(Evaluation {
        score: normalize_score(score),
        feedback: feedback.trim().to_string(),
    })
}

/// Clamps into [0, 10] and rounds to one decimal.
pub fn normalize_score(score: f64) -> f64 {
    (score.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

#[derive(Clone)]
pub struct AnswerEvaluator {
    llm: Option<LlmClient>,
}

impl AnswerEvaluator {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    /// Scores one answer. Never fails: a disabled model, a failed call or an
    /// undecodable reply all yield [`Evaluation::fallback`].
    pub async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        job_description: &str,
        interview_type: InterviewType,
    ) -> Outcome<Evaluation> {
        let Some(llm) = &self.llm else {
            return fallback("Answer evaluation is disabled: model service not configured");
        };

        let prompt = render(
            EVALUATION_PROMPT_TEMPLATE,
            &[
                ("interview_type", interview_type.as_str()),
                ("question", question),
                ("answer", answer),
                ("jd_text", job_description),
            ],
        );
        let system = format!("{EVALUATION_SYSTEM} {JSON_ONLY_SYSTEM}");

        let text = match llm.call(&prompt, &system, EVALUATION_PARAMS).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Answer evaluation failed: {e}");
                return fallback(&format!("Error evaluating: {e}"));
            }
        };

        match decode_evaluation(&text) {
            Ok(evaluation) => {
                info!("Answer scored {}/10", evaluation.score);
                Outcome::Model(evaluation)
            }
            Err(e) => {
                warn!("Could not decode evaluation: {e}");
                fallback(&format!("Error evaluating: {e}"))
            }
        }
    }
}

fn fallback(reason: &str) -> Outcome<Evaluation> {
    Outcome::Fallback {
        value: Evaluation::fallback(),
        reason: reason.to_string(),
    }
}
