//! Persistence Gateway: writes completed interviews and reads them back.
//!
//! The backend sits behind [`InterviewRepository`]; `AppState` holds an
//! [`InterviewStore`] that is either connected or disabled for the whole
//! process lifetime. Nothing here retries.

pub mod postgres;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::interview::models::InterviewSession;
use crate::models::interview::{InterviewRow, QuestionRow};

pub const STATUS_COMPLETED: &str = "completed";

/// Interview row to insert; the store generates `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewInterviewRow {
    pub candidate_name: String,
    pub job_title: String,
    pub interview_type: String,
    pub status: String,
    pub final_score: f64,
    pub start_time: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Question row to insert under an interview.
#[derive(Debug, Clone)]
pub struct NewQuestionRow {
    pub question_number: i32,
    pub question_text: String,
    pub answer: String,
    pub score: f64,
    pub feedback: String,
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Inserts the interview row and its question rows atomically and
    /// returns the generated id. `None` or an error means nothing was written.
    async fn insert_completed(
        &self,
        interview: &NewInterviewRow,
        questions: &[NewQuestionRow],
    ) -> Result<Option<i64>>;

    /// All interviews, most recently created first.
    async fn list_interviews(&self) -> Result<Vec<InterviewRow>>;

    /// Questions of one interview, by question number ascending.
    async fn list_questions(&self, interview_id: i64) -> Result<Vec<QuestionRow>>;

    /// Deletes an interview and, by cascade, its questions. `false` if absent.
    async fn delete_interview(&self, interview_id: i64) -> Result<bool>;
}

/// Persists a completed session: one interview row plus one question row per
/// record referencing the new id, in a single write. No id means no rows.
pub async fn save_interview(
    repo: &dyn InterviewRepository,
    session: &InterviewSession,
    final_score: f64,
) -> Result<i64, AppError> {
    let interview = NewInterviewRow {
        candidate_name: session.candidate_name.clone(),
        job_title: session.job_title.clone(),
        interview_type: session.interview_type.as_str().to_string(),
        status: STATUS_COMPLETED.to_string(),
        final_score,
        start_time: session.start_time,
        completed_at: Utc::now(),
    };

    let questions: Vec<NewQuestionRow> = session
        .records
        .iter()
        .map(|r| NewQuestionRow {
            question_number: r.number as i32,
            question_text: r.question.clone(),
            answer: r.answer.clone(),
            score: r.score,
            feedback: r.feedback.clone(),
        })
        .collect();

    let interview_id = repo
        .insert_completed(&interview, &questions)
        .await
        .map_err(|e| AppError::SaveFailed(format!("{e:#}")))?
        .ok_or_else(|| AppError::SaveFailed("store returned no interview id".to_string()))?;

    info!(
        "Saved interview {interview_id} for {} with {} questions",
        session.candidate_name,
        questions.len()
    );
    Ok(interview_id)
}

/// A read result that degrades to empty with a warning instead of failing.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Listing<T> {
    fn ok(items: Vec<T>) -> Self {
        Self {
            items,
            warning: None,
        }
    }

    fn empty(warning: String) -> Self {
        Self {
            items: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// The store as seen by handlers: connected or disabled.
#[derive(Clone)]
pub struct InterviewStore {
    repo: Option<Arc<dyn InterviewRepository>>,
}

impl InterviewStore {
    pub fn new(repo: Option<Arc<dyn InterviewRepository>>) -> Self {
        Self { repo }
    }

    pub fn disabled() -> Self {
        Self { repo: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.repo.is_some()
    }

    pub async fn save(&self, session: &InterviewSession, final_score: f64) -> Result<i64, AppError> {
        let repo = self.repo.as_deref().ok_or(AppError::StoreUnavailable)?;
        save_interview(repo, session, final_score).await
    }

    pub async fn interviews(&self) -> Listing<InterviewRow> {
        let Some(repo) = self.repo.as_deref() else {
            warn!("History requested but the interview store is not configured");
            return Listing::empty("Interview store is not configured".to_string());
        };
        match repo.list_interviews().await {
            Ok(rows) => Listing::ok(rows),
            Err(e) => {
                error!("Error fetching interviews: {e:#}");
                Listing::empty(format!("Error fetching interviews: {e}"))
            }
        }
    }

    pub async fn questions(&self, interview_id: i64) -> Listing<QuestionRow> {
        let Some(repo) = self.repo.as_deref() else {
            return Listing::empty("Interview store is not configured".to_string());
        };
        match repo.list_questions(interview_id).await {
            Ok(rows) => Listing::ok(rows),
            Err(e) => {
                error!("Error fetching questions for interview {interview_id}: {e:#}");
                Listing::empty(format!("Error fetching questions: {e}"))
            }
        }
    }

    pub async fn delete(&self, interview_id: i64) -> Result<(), AppError> {
        let repo = self.repo.as_deref().ok_or(AppError::StoreUnavailable)?;
        let deleted = repo.delete_interview(interview_id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("Interview {interview_id} not found")));
        }
        info!("Deleted interview {interview_id}");
        Ok(())
    }
}
