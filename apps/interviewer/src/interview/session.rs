//! Session State: in-memory progress of one interview attempt.
//!
//! Sessions live only in process memory. Each session sits behind its own
//! mutex and is locked for the whole of one orchestration step, so steps on
//! one session run strictly one after another.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::evaluator::Evaluation;
use crate::interview::models::{InterviewSession, InterviewType, Phase, QaRecord};

/// Validated inputs of the start-interview action.
#[derive(Debug, Clone)]
pub struct NewInterview {
    pub candidate_name: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub resume: String,
    pub job_description: String,
}

/// What happened to the session after an answer was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More questions remain; the caller must supply the next one.
    NextQuestion(u32),
    /// The last answer was recorded; the session moved to results.
    Completed,
}

impl InterviewSession {
    pub fn start(new: NewInterview, total_questions: u32, first_question: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_name: new.candidate_name,
            job_title: new.job_title,
            interview_type: new.interview_type,
            resume: new.resume,
            job_description: new.job_description,
            start_time: Utc::now(),
            records: Vec::with_capacity(total_questions as usize),
            current_question_num: 1,
            current_question: first_question,
            total_questions,
            phase: Phase::InProgress,
            draft_answer: None,
            persisted_id: None,
        }
    }

    /// Fails with a conflict once the interview has moved to results.
    pub fn ensure_in_progress(&self) -> Result<(), AppError> {
        match self.phase {
            Phase::InProgress => Ok(()),
            Phase::Completed => Err(AppError::Conflict(
                "Interview is already completed".to_string(),
            )),
        }
    }

    /// Fails with a conflict until every question has been answered.
    pub fn ensure_completed(&self) -> Result<(), AppError> {
        match self.phase {
            Phase::Completed => Ok(()),
            Phase::InProgress => Err(AppError::Conflict(format!(
                "Interview is still in progress ({} of {} answered)",
                self.records.len(),
                self.total_questions
            ))),
        }
    }

    /// Picks the answer to submit: the typed answer if present, otherwise the
    /// draft captured by voice. Blank answers are rejected without mutation.
    pub fn resolve_answer(&self, typed: Option<&str>) -> Result<String, AppError> {
        typed
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .or_else(|| {
                self.draft_answer
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
            })
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Validation("Please provide an answer before submitting".to_string())
            })
    }

    /// Appends the record for the current question.
    ///
    /// Moves to [`Phase::Completed`] when the record count reaches the total;
    /// otherwise returns the number of the next question, which the caller
    /// installs with [`InterviewSession::advance`].
    pub fn record_answer(
        &mut self,
        answer: String,
        evaluation: Evaluation,
    ) -> Result<(QaRecord, Progress), AppError> {
        self.ensure_in_progress()?;

        let record = QaRecord {
            number: self.current_question_num,
            question: self.current_question.clone(),
            answer,
            score: evaluation.score,
            feedback: evaluation.feedback,
        };
        self.records.push(record.clone());
        self.draft_answer = None;

        if self.records.len() as u32 >= self.total_questions {
            self.phase = Phase::Completed;
            return Ok((record, Progress::Completed));
        }
        Ok((record, Progress::NextQuestion(self.current_question_num + 1)))
    }

    /// Installs the next question. The index never passes the total.
    pub fn advance(&mut self, next_question: String) {
        if self.phase == Phase::InProgress && self.current_question_num < self.total_questions {
            self.current_question_num += 1;
            self.current_question = next_question;
        }
    }

    /// Prior (question, answer) pairs, oldest first.
    pub fn history(&self) -> Vec<(String, String)> {
        self.records
            .iter()
            .map(|r| (r.question.clone(), r.answer.clone()))
            .collect()
    }
}

pub type SharedSession = Arc<Mutex<InterviewSession>>;

/// All live sessions, keyed by session id.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: InterviewSession) -> Uuid {
        let id = session.id;
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
    }

    /// Discards a session unconditionally. Unsaved results are lost.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
