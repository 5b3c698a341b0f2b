//! Axum route handlers for the interview flow and interview history.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{extract_or_empty, DocumentKind};
use crate::errors::AppError;
use crate::interview::models::{InterviewSession, InterviewType, QaRecord, SessionView};
use crate::interview::questions::QuestionContext;
use crate::interview::results::{aggregate, export_file_name, ExportDocument, InterviewResult};
use crate::interview::session::{NewInterview, Progress};
use crate::models::interview::{InterviewRow, QuestionRow};
use crate::state::AppState;
use crate::store::postgres::SCHEMA_SQL;
use crate::store::Listing;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub session: SessionView,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub record: QaRecord,
    pub session: SessionView,
    /// Present once the last answer has been recorded.
    pub result: Option<InterviewResult>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceAnswerResponse {
    pub transcript: String,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub candidate_name: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub final_score: f64,
    pub percentage: f64,
    pub qa_pairs: Vec<QaRecord>,
    pub persisted_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub interview_id: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub interview: InterviewRow,
    pub percentage: Option<f64>,
}

/// One uploaded document as received.
struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

#[derive(Default)]
struct StartForm {
    candidate_name: Option<String>,
    job_title: Option<String>,
    interview_type: Option<String>,
    resume: Option<Upload>,
    job_description: Option<Upload>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed upload: {}", e.body_text()))
}

fn required_text(value: Option<String>, label: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{label} is required")))
}

fn required_upload(upload: Option<Upload>, label: &str) -> Result<(Upload, DocumentKind), AppError> {
    let upload = upload
        .filter(|u| !u.bytes.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{label} document is required")))?;
    let kind = DocumentKind::detect(upload.content_type.as_deref(), upload.file_name.as_deref())
        .ok_or_else(|| AppError::Validation(format!("{label} must be a PDF or TXT file")))?;
    Ok((upload, kind))
}

async fn read_start_form(mut multipart: Multipart) -> Result<StartForm, AppError> {
    let mut form = StartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" | "job_description" => {
                let upload = Upload {
                    content_type: field.content_type().map(str::to_string),
                    file_name: field.file_name().map(str::to_string),
                    bytes: field.bytes().await.map_err(multipart_error)?.to_vec(),
                };
                if name == "resume" {
                    form.resume = Some(upload);
                } else {
                    form.job_description = Some(upload);
                }
            }
            "candidate_name" => form.candidate_name = Some(field.text().await.map_err(multipart_error)?),
            "job_title" => form.job_title = Some(field.text().await.map_err(multipart_error)?),
            "interview_type" => form.interview_type = Some(field.text().await.map_err(multipart_error)?),
            other => warn!("Ignoring unexpected upload field '{other}'"),
        }
    }
    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Interview flow
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Multipart: candidate_name, job_title, interview_type, resume, job_description.
/// Extracts both documents (an unreadable document becomes empty text plus a
/// warning) and generates the first question.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<StartResponse>), AppError> {
    let form = read_start_form(multipart).await?;

    let candidate_name = required_text(form.candidate_name, "Candidate name")?;
    let job_title = required_text(form.job_title, "Job title")?;
    let interview_type: InterviewType = required_text(form.interview_type, "Interview type")?
        .parse()
        .map_err(AppError::Validation)?;
    let (resume_upload, resume_kind) = required_upload(form.resume, "Resume")?;
    let (jd_upload, jd_kind) = required_upload(form.job_description, "Job description")?;

    let mut warnings = Vec::new();
    let resume = extract_or_empty("resume", resume_upload.bytes, resume_kind).await;
    let jd = extract_or_empty("job description", jd_upload.bytes, jd_kind).await;
    warnings.extend(resume.warning);
    warnings.extend(jd.warning);

    let first = state
        .questions
        .generate(QuestionContext {
            resume: &resume.text,
            job_description: &jd.text,
            interview_type,
            question_num: 1,
            total_questions: state.config.total_questions,
            history: &[],
        })
        .await;
    warnings.extend(first.warning().map(str::to_string));

    let session = InterviewSession::start(
        NewInterview {
            candidate_name,
            job_title,
            interview_type,
            resume: resume.text,
            job_description: jd.text,
        },
        state.config.total_questions,
        first.into_value(),
    );
    let view = SessionView::from(&session);
    let id = state.sessions.insert(session).await;
    info!("Started {interview_type} interview {id} for {}", view.candidate_name);

    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            session: view,
            warnings,
        }),
    ))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

/// GET /api/v1/interviews/:id/question/audio
///
/// MP3 of the current question. On failure the question text remains
/// available from the session endpoint.
pub async fn handle_question_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let voice = state.voice.as_ref().ok_or(AppError::VoiceUnavailable)?;
    let question = {
        let session = state.sessions.get(id).await?;
        let session = session.lock().await;
        session.ensure_in_progress()?;
        session.current_question.clone()
    };

    let audio = voice
        .speak(&question)
        .await
        .map_err(|e| AppError::Voice(format!("Error with text-to-speech: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}

/// POST /api/v1/interviews/:id/answer/voice
///
/// Multipart field `audio`: a WAV recording. A successful transcript becomes
/// the session's draft answer; the interview does not advance.
pub async fn handle_voice_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<VoiceAnswerResponse>, AppError> {
    let voice = state.voice.as_ref().ok_or(AppError::VoiceUnavailable)?;

    let mut clip = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("audio") {
            clip = Some(field.bytes().await.map_err(multipart_error)?);
        }
    }
    let clip = clip
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("audio recording is required".to_string()))?;

    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.ensure_in_progress()?;

    let transcript = voice.listen(&clip).await?;
    session.draft_answer = Some(transcript.clone());

    Ok(Json(VoiceAnswerResponse {
        transcript,
        session: SessionView::from(&*session),
    }))
}

/// POST /api/v1/interviews/:id/answers
///
/// Evaluates the answer (typed, or the voice draft), records it, and either
/// generates the next question or moves the interview to results.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.ensure_in_progress()?;
    let answer = session.resolve_answer(request.answer.as_deref())?;

    let mut warnings = Vec::new();
    let evaluation = state
        .evaluator
        .evaluate(
            &session.current_question,
            &answer,
            &session.job_description,
            session.interview_type,
        )
        .await;
    warnings.extend(evaluation.warning().map(str::to_string));

    let (record, progress) = session.record_answer(answer, evaluation.into_value())?;

    let result = match progress {
        Progress::NextQuestion(question_num) => {
            let history = session.history();
            let next = state
                .questions
                .generate(QuestionContext {
                    resume: &session.resume,
                    job_description: &session.job_description,
                    interview_type: session.interview_type,
                    question_num,
                    total_questions: session.total_questions,
                    history: &history,
                })
                .await;
            warnings.extend(next.warning().map(str::to_string));
            session.advance(next.into_value());
            None
        }
        Progress::Completed => {
            info!("Interview {id} completed");
            aggregate(&session.records)
        }
    };

    Ok(Json(SubmitAnswerResponse {
        record,
        session: SessionView::from(&*session),
        result,
        warnings,
    }))
}

/// Aggregates a completed session; conflict while answers are outstanding.
fn completed_result(session: &InterviewSession) -> Result<InterviewResult, AppError> {
    session.ensure_completed()?;
    aggregate(&session.records)
        .ok_or_else(|| AppError::Conflict("Interview has no answers to score".to_string()))
}

/// GET /api/v1/interviews/:id/results
pub async fn handle_results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    let result = completed_result(&session)?;

    Ok(Json(ResultsResponse {
        candidate_name: session.candidate_name.clone(),
        job_title: session.job_title.clone(),
        interview_type: session.interview_type,
        final_score: result.final_score,
        percentage: result.percentage,
        qa_pairs: session.records.clone(),
        persisted_id: session.persisted_id,
    }))
}

/// GET /api/v1/interviews/:id/export
///
/// Downloadable JSON named `interview_{candidate}_{YYYYMMDD}.json`.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    let result = completed_result(&session)?;

    let document = ExportDocument::new(&session, result);
    let body = document
        .to_pretty_json()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize results: {e}")))?;
    let file_name = export_file_name(&session.candidate_name, Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}

/// POST /api/v1/interviews/:id/save
///
/// Persists a completed interview once; later calls return the same id.
pub async fn handle_save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SaveResponse>), AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    let result = completed_result(&session)?;

    if let Some(interview_id) = session.persisted_id {
        return Ok((StatusCode::OK, Json(SaveResponse { interview_id })));
    }

    let interview_id = state.store.save(&session, result.final_score).await?;
    session.persisted_id = Some(interview_id);

    Ok((StatusCode::CREATED, Json(SaveResponse { interview_id })))
}

/// DELETE /api/v1/interviews/:id
///
/// Starts over: the in-memory session is discarded whether or not it was saved.
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!("Discarded interview session {id}");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// History
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/history
///
/// Saved interviews, newest first. Empty with a warning when the store is
/// unavailable.
pub async fn handle_history(State(state): State<AppState>) -> Json<Listing<HistoryEntry>> {
    let listing = state.store.interviews().await;
    Json(Listing {
        items: listing
            .items
            .into_iter()
            .map(|interview| HistoryEntry {
                percentage: interview.final_score.map(|s| s * 10.0),
                interview,
            })
            .collect(),
        warning: listing.warning,
    })
}

/// GET /api/v1/history/:id/questions
pub async fn handle_history_questions(
    State(state): State<AppState>,
    Path(interview_id): Path<i64>,
) -> Json<Listing<QuestionRow>> {
    Json(state.store.questions(interview_id).await)
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Path(interview_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete(interview_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/setup/schema
pub async fn handle_schema() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], SCHEMA_SQL)
}
