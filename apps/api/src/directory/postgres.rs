//! Postgres-backed directory.
//!
//! Expects `jobs (job_code, job_title, job_description, desired_skills TEXT[],
//! pay_min, pay_max, source, posted_by, latitude, longitude, created_at)` and
//! `candidates (email, first_name, last_name, education_level, skills TEXT[],
//! experience_summary, latitude, longitude, max_travel_miles)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{DirectoryError, TalentDirectory};
use crate::models::candidate::{Candidate, CandidateId};
use crate::models::job::{GeoPoint, Job, JobId, PayRange};
use crate::models::ModelError;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct JobRow {
    pub job_code: String,
    pub job_title: String,
    pub job_description: String,
    pub desired_skills: Vec<String>,
    pub pay_min: f64,
    pub pay_max: f64,
    pub source: String,
    pub posted_by: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CandidateRow {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub education_level: Option<String>,
    pub skills: Vec<String>,
    pub experience_summary: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_travel_miles: Option<f64>,
}

fn location(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<GeoPoint>, ModelError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).map(Some),
        _ => Ok(None),
    }
}

impl TryFrom<JobRow> for Job {
    type Error = ModelError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: JobId::new(row.job_code),
            title: row.job_title,
            description: row.job_description,
            desired_skills: row.desired_skills,
            pay_range: PayRange::new(row.pay_min, row.pay_max)?,
            source: row.source,
            posted_by: row.posted_by,
            location: location(row.latitude, row.longitude)?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = ModelError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(Candidate {
            id: CandidateId::new(&row.email),
            first_name: row.first_name,
            last_name: row.last_name,
            education_level: row.education_level,
            skills: row.skills,
            experience_summary: row.experience_summary,
            location: location(row.latitude, row.longitude)?,
            max_travel_miles: row.max_travel_miles,
        })
    }
}

pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TalentDirectory for PgDirectory {
    async fn job(&self, job_id: &JobId) -> Result<Option<Job>, DirectoryError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT job_code, job_title, job_description, desired_skills, pay_min, pay_max,
                   source, posted_by, latitude, longitude, created_at
            FROM jobs
            WHERE job_code = $1
            "#,
        )
        .bind(job_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Job::try_from).transpose()?)
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, DirectoryError> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT email, first_name, last_name, education_level, skills,
                   experience_summary, latitude, longitude, max_travel_miles
            FROM candidates
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Candidate::try_from(row).map_err(DirectoryError::from))
            .collect()
    }
}
