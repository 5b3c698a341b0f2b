use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interview category. Controls question-generation emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Hr,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Hr => "hr",
        }
    }

    /// What the generator should probe for this interview type.
    pub fn focus(&self) -> &'static str {
        match self {
            InterviewType::Technical => "skills, problem-solving, coding experience",
            InterviewType::Hr => "soft skills, culture fit, scenarios",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(InterviewType::Technical),
            "hr" => Ok(InterviewType::Hr),
            other => Err(format!(
                "unknown interview type '{other}' (expected 'technical' or 'hr')"
            )),
        }
    }
}

/// One question/answer/score/feedback unit. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub number: u32,
    pub question: String,
    pub answer: String,
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Completed,
}

/// In-memory state of one interview attempt.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub resume: String,
    pub job_description: String,
    pub start_time: DateTime<Utc>,
    pub records: Vec<QaRecord>,
    /// 1-based; never exceeds `total_questions`.
    pub current_question_num: u32,
    pub current_question: String,
    pub total_questions: u32,
    pub phase: Phase,
    /// Transcript of the last successful voice capture, used when a submit
    /// carries no typed answer.
    pub draft_answer: Option<String>,
    pub persisted_id: Option<i64>,
}

/// Client-facing view of a session. Omits the raw documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub start_time: DateTime<Utc>,
    pub phase: Phase,
    pub current_question_num: u32,
    pub total_questions: u32,
    /// `None` once the interview is completed.
    pub current_question: Option<String>,
    pub progress: f64,
    pub answered: usize,
    pub draft_answer: Option<String>,
    pub persisted_id: Option<i64>,
}

impl From<&InterviewSession> for SessionView {
    fn from(session: &InterviewSession) -> Self {
        let answered = session.records.len();
        Self {
            session_id: session.id,
            candidate_name: session.candidate_name.clone(),
            job_title: session.job_title.clone(),
            interview_type: session.interview_type,
            start_time: session.start_time,
            phase: session.phase,
            current_question_num: session.current_question_num,
            total_questions: session.total_questions,
            current_question: match session.phase {
                Phase::InProgress => Some(session.current_question.clone()),
                Phase::Completed => None,
            },
            progress: answered as f64 / session.total_questions as f64,
            answered,
            draft_answer: session.draft_answer.clone(),
            persisted_id: session.persisted_id,
        }
    }
}
