//! Result Aggregator and JSON export.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::models::{InterviewSession, InterviewType, QaRecord};

/// Aggregated score of a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterviewResult {
    /// Arithmetic mean of the record scores, 0–10.
    pub final_score: f64,
    /// `final_score × 10`.
    pub percentage: f64,
}

/// Averages the scores. `None` for an empty slice.
pub fn aggregate(records: &[QaRecord]) -> Option<InterviewResult> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|r| r.score).sum();
    let final_score = total / records.len() as f64;
    Some(InterviewResult {
        final_score,
        percentage: final_score * 10.0,
    })
}

/// Downloadable results document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub candidate: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub final_score: f64,
    pub percentage: f64,
    pub qa_pairs: Vec<QaRecord>,
    pub date: DateTime<Utc>,
}

impl ExportDocument {
    pub fn new(session: &InterviewSession, result: InterviewResult) -> Self {
        Self {
            candidate: session.candidate_name.clone(),
            job_title: session.job_title.clone(),
            interview_type: session.interview_type,
            final_score: result.final_score,
            percentage: result.percentage,
            qa_pairs: session.records.clone(),
            date: session.start_time,
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `interview_{candidate}_{YYYYMMDD}.json`, with the candidate name reduced
/// to characters that are safe in a Content-Disposition header.
pub fn export_file_name(candidate: &str, today: NaiveDate) -> String {
    let name: String = candidate
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if name.is_empty() { "candidate".to_string() } else { name };
    format!("interview_{}_{}.json", name, today.format("%Y%m%d"))
}
