//! Question Generator: asks the model for the next interview question.

use tracing::{info, warn};

use crate::interview::models::InterviewType;
use crate::interview::outcome::Outcome;
use crate::interview::prompts::{QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::llm_client::prompts::{render, PLAIN_TEXT_ONLY};
use crate::llm_client::{CallParams, LlmClient};

pub const FALLBACK_QUESTION: &str = "Tell me about your relevant experience for this role.";

const QUESTION_PARAMS: CallParams = CallParams {
    max_tokens: 300,
    temperature: 0.7,
};

/// Everything the generator needs to produce question `question_num`.
#[derive(Debug, Clone, Copy)]
pub struct QuestionContext<'a> {
    pub resume: &'a str,
    pub job_description: &'a str,
    pub interview_type: InterviewType,
    pub question_num: u32,
    pub total_questions: u32,
    /// Prior (question, answer) pairs, oldest first.
    pub history: &'a [(String, String)],
}

#[derive(Clone)]
pub struct QuestionGenerator {
    llm: Option<LlmClient>,
}

impl QuestionGenerator {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    /// Generates the next question. Never fails: a disabled or failing model
    /// yields [`FALLBACK_QUESTION`].
    pub async fn generate(&self, ctx: QuestionContext<'_>) -> Outcome<String> {
        let Some(llm) = &self.llm else {
            return fallback("Question generation is disabled: model service not configured");
        };

        let prompt = build_question_prompt(&ctx);
        match llm.call(&prompt, QUESTION_SYSTEM, QUESTION_PARAMS).await {
            Ok(question) => {
                info!(
                    "Generated question {}/{} ({})",
                    ctx.question_num, ctx.total_questions, ctx.interview_type
                );
                Outcome::Model(question)
            }
            Err(e) => {
                warn!("Question generation failed: {e}");
                fallback(&format!("Error generating question: {e}"))
            }
        }
    }
}

fn fallback(reason: &str) -> Outcome<String> {
    Outcome::Fallback {
        value: FALLBACK_QUESTION.to_string(),
        reason: reason.to_string(),
    }
}

/// Renders prior answers as a numbered Q/A transcript, or nothing.
fn render_history(history: &[(String, String)]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nPrevious Questions and Answers:\n");
    for (i, (question, answer)) in history.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("\nQ{n}: {question}\nA{n}: {answer}\n"));
    }
    out
}

/// Fills the question template.
fn build_question_prompt(ctx: &QuestionContext<'_>) -> String {
    let question_num = ctx.question_num.to_string();
    let total_questions = ctx.total_questions.to_string();
    let history = render_history(ctx.history);
    render(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("interview_type", ctx.interview_type.as_str()),
            ("question_num", question_num.as_str()),
            ("total_questions", total_questions.as_str()),
            ("focus", ctx.interview_type.focus()),
            ("plain_text_only", PLAIN_TEXT_ONLY),
            ("history", history.as_str()),
            ("resume_text", ctx.resume),
            ("jd_text", ctx.job_description),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx<'a>(history: &'a [(String, String)], question_num: u32) -> QuestionContext<'a> {
        QuestionContext {
            resume: "Five years of Rust and Postgres.",
            job_description: "Backend engineer, async Rust, SQL.",
            interview_type: InterviewType::Technical,
            question_num,
            total_questions: 10,
            history,
        }
    }

    #[test]
    fn test_prompt_mentions_position_and_focus() {
        let prompt = build_question_prompt(&ctx(&[], 3));
        assert!(prompt.contains("This is question 3 out of 10 questions total."));
        assert!(prompt.contains("skills, problem-solving, coding experience"));
        assert!(prompt.contains("Backend engineer, async Rust, SQL."));
        assert!(!prompt.contains("Previous Questions and Answers"));
    }

    #[test]
    fn test_prompt_includes_numbered_history() {
        let history = vec![
            ("What is a borrow?".to_string(), "A reference.".to_string()),
            ("What is Send?".to_string(), "A marker trait.".to_string()),
        ];
        let prompt = build_question_prompt(&ctx(&history, 3));
        assert!(prompt.contains("Q1: What is a borrow?\nA1: A reference."));
        assert!(prompt.contains("Q2: What is Send?\nA2: A marker trait."));
    }

    #[test]
    fn test_hr_prompt_uses_behavioral_focus() {
        let mut c = ctx(&[], 1);
        c.interview_type = InterviewType::Hr;
        let prompt = build_question_prompt(&c);
        assert!(prompt.contains("conducting a hr interview"));
        assert!(prompt.contains("soft skills, culture fit, scenarios"));
    }

    #[test]
    fn test_candidate_text_cannot_inject_placeholders() {
        let mut c = ctx(&[], 2);
        c.resume = "I wrote {question_num} crates";
        let prompt = build_question_prompt(&c);
        assert!(prompt.contains("I wrote {question_num} crates"));
    }

    #[tokio::test]
    async fn test_disabled_generator_returns_fallback() {
        let generator = QuestionGenerator::new(None);
        let outcome = generator.generate(ctx(&[], 1)).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.value(), FALLBACK_QUESTION);
    }

    #[tokio::test]
    async fn test_model_error_returns_fallback_with_warning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let llm = LlmClient::new("sk-test".to_string(), server.uri(), "gpt-4");
        let outcome = QuestionGenerator::new(Some(llm)).generate(ctx(&[], 1)).await;
        assert_eq!(outcome.value(), FALLBACK_QUESTION);
        assert!(outcome.warning().unwrap().contains("Error generating question"));
    }

    #[tokio::test]
    async fn test_model_question_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "\nHow does tokio schedule tasks?  " } }]
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::new("sk-test".to_string(), server.uri(), "gpt-4");
        let outcome = QuestionGenerator::new(Some(llm)).generate(ctx(&[], 4)).await;
        assert_eq!(
            outcome,
            Outcome::Model("How does tokio schedule tasks?".to_string())
        );
    }
}
