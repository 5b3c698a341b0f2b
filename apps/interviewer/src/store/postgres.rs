use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::interview::{InterviewRow, QuestionRow};
use crate::store::{InterviewRepository, NewInterviewRow, NewQuestionRow};

/// DDL for the two tables, served to operators from the setup endpoint.
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_interviews.sql");

/// PostgreSQL-backed repository.
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewRepository for PgInterviewStore {
    async fn insert_completed(
        &self,
        interview: &NewInterviewRow,
        questions: &[NewQuestionRow],
    ) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO interviews
                (candidate_name, job_title, interview_type, status,
                 final_score, start_time, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&interview.candidate_name)
        .bind(&interview.job_title)
        .bind(&interview.interview_type)
        .bind(&interview.status)
        .bind(interview.final_score)
        .bind(interview.start_time)
        .bind(interview.completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(interview_id) = id else {
            tx.rollback().await?;
            return Ok(None);
        };

        for row in questions {
            sqlx::query(
                r#"
                INSERT INTO questions
                    (interview_id, question_number, question_text, answer, score, feedback)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(interview_id)
            .bind(row.question_number)
            .bind(&row.question_text)
            .bind(&row.answer)
            .bind(row.score)
            .bind(&row.feedback)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping `tx` on an early `?` rolls back the interview row too.
        tx.commit().await?;
        Ok(Some(interview_id))
    }

    async fn list_interviews(&self) -> Result<Vec<InterviewRow>> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_questions(&self, interview_id: i64) -> Result<Vec<QuestionRow>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT * FROM questions WHERE interview_id = $1 ORDER BY question_number ASC",
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_interview(&self, interview_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(interview_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
