//! PostgreSQL implementation of CallRecordRepository
//!
//! The upsert mirrors `CallRecord::merge` so that the row converges no
//! matter which order events arrive in.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use callmeter::{CallRecord, CallRecordRepository, CallStatus, DomainError};

pub struct PgCallRecordRepository {
    pool: PgPool,
}

impl PgCallRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CallRecordRow {
    call_id: String,
    user_id: Uuid,
    company_id: Uuid,
    agent_id: Uuid,
    external_agent_id: String,
    status: String,
    last_event: String,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    end_time: Option<chrono::DateTime<chrono::Utc>>,
    duration_seconds: i64,
    cost: Option<Decimal>,
    from_number: Option<String>,
    to_number: Option<String>,
    recording_url: Option<String>,
    transcript: Option<String>,
    sentiment_score: Option<f64>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CallRecordRow> for CallRecord {
    fn from(row: CallRecordRow) -> Self {
        Self {
            call_id: row.call_id,
            user_id: row.user_id,
            company_id: row.company_id,
            agent_id: row.agent_id,
            external_agent_id: row.external_agent_id,
            status: CallStatus::from(row.status.as_str()),
            last_event: row.last_event,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_seconds: row.duration_seconds,
            cost: row.cost,
            from_number: row.from_number,
            to_number: row.to_number,
            recording_url: row.recording_url,
            transcript: row.transcript,
            sentiment_score: row.sentiment_score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CALL_COLUMNS: &str = "call_id, user_id, company_id, agent_id, external_agent_id, status, \
     last_event, start_time, end_time, duration_seconds, cost, from_number, to_number, \
     recording_url, transcript, sentiment_score, created_at, updated_at";

#[async_trait]
impl CallRecordRepository for PgCallRecordRepository {
    async fn upsert(&self, record: &CallRecord) -> Result<CallRecord, DomainError> {
        let row = sqlx::query_as::<_, CallRecordRow>(&format!(
            r#"
            INSERT INTO call_records ({CALL_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (call_id) DO UPDATE SET
                status = CASE
                    WHEN call_records.status IN ('completed', 'analyzed', 'failed')
                         AND EXCLUDED.status = 'in_progress'
                    THEN call_records.status
                    ELSE EXCLUDED.status
                END,
                user_id = EXCLUDED.user_id,
                company_id = EXCLUDED.company_id,
                agent_id = EXCLUDED.agent_id,
                external_agent_id = EXCLUDED.external_agent_id,
                last_event = EXCLUDED.last_event,
                start_time = COALESCE(EXCLUDED.start_time, call_records.start_time),
                end_time = COALESCE(EXCLUDED.end_time, call_records.end_time),
                duration_seconds = GREATEST(call_records.duration_seconds, EXCLUDED.duration_seconds),
                cost = COALESCE(EXCLUDED.cost, call_records.cost),
                from_number = COALESCE(EXCLUDED.from_number, call_records.from_number),
                to_number = COALESCE(EXCLUDED.to_number, call_records.to_number),
                recording_url = COALESCE(EXCLUDED.recording_url, call_records.recording_url),
                transcript = COALESCE(EXCLUDED.transcript, call_records.transcript),
                sentiment_score = COALESCE(EXCLUDED.sentiment_score, call_records.sentiment_score),
                updated_at = EXCLUDED.updated_at
            RETURNING {CALL_COLUMNS}
            "#
        ))
        .bind(&record.call_id)
        .bind(record.user_id)
        .bind(record.company_id)
        .bind(record.agent_id)
        .bind(&record.external_agent_id)
        .bind(record.status.as_str())
        .bind(&record.last_event)
        .bind(record.start_time)
        .bind(record.end_time)
        .bind(record.duration_seconds)
        .bind(record.cost)
        .bind(&record.from_number)
        .bind(&record.to_number)
        .bind(&record.recording_url)
        .bind(&record.transcript)
        .bind(record.sentiment_score)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.into())
    }

    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, DomainError> {
        let row = sqlx::query_as::<_, CallRecordRow>(&format!(
            "SELECT {CALL_COLUMNS} FROM call_records WHERE call_id = $1"
        ))
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(CallRecord::from))
    }

    async fn find_unbilled(&self, limit: i64) -> Result<Vec<CallRecord>, DomainError> {
        let rows = sqlx::query_as::<_, CallRecordRow>(&format!(
            r#"
            SELECT {CALL_COLUMNS} FROM call_records cr
            WHERE cr.status IN ('completed', 'analyzed')
              AND cr.duration_seconds > 0
              AND NOT EXISTS (
                  SELECT 1 FROM charge_claims cc
                  WHERE cc.call_id = cr.call_id AND cc.transaction_type = 'call_charge'
              )
              AND NOT EXISTS (
                  SELECT 1 FROM transactions t
                  WHERE t.call_id = cr.call_id AND t.transaction_type = 'call_charge'
              )
              AND EXISTS (
                  SELECT 1 FROM agents a
                  WHERE a.id = cr.agent_id AND a.rate_per_minute > 0
              )
              AND EXISTS (
                  SELECT 1 FROM credit_balances cb
                  WHERE cb.user_id = cr.user_id AND cb.is_blocked = false
              )
            ORDER BY cr.created_at ASC, cr.call_id ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(CallRecord::from).collect())
    }
}
