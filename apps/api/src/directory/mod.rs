//! Read-only access to jobs and the candidate pool. Job posting and profile
//! editing belong to other services; the pipeline only looks things up.

pub mod postgres;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::candidate::Candidate;
use crate::models::job::{Job, JobId};
use crate::models::ModelError;

pub use postgres::PgDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("directory record invalid: {0}")]
    Invalid(#[from] ModelError),

    #[error("failed to load directory seed {path}: {reason}")]
    Seed { path: String, reason: String },
}

#[async_trait]
pub trait TalentDirectory: Send + Sync {
    async fn job(&self, job_id: &JobId) -> Result<Option<Job>, DirectoryError>;

    /// The full candidate pool, before any eligibility filtering.
    async fn candidates(&self) -> Result<Vec<Candidate>, DirectoryError>;
}

/// Directory held in memory, optionally seeded from a JSON file of the form
/// `{ "jobs": [...], "candidates": [...] }`.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    jobs: HashMap<JobId, Job>,
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct DirectorySeed {
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl InMemoryDirectory {
    pub fn new(jobs: Vec<Job>, candidates: Vec<Candidate>) -> Self {
        Self {
            jobs: jobs.into_iter().map(|job| (job.id.clone(), job)).collect(),
            candidates,
        }
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let seed_error = |reason: String| DirectoryError::Seed {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
        let seed: DirectorySeed =
            serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))?;

        info!(
            "Loaded directory seed: {} jobs, {} candidates",
            seed.jobs.len(),
            seed.candidates.len()
        );
        Ok(Self::new(seed.jobs, seed.candidates))
    }
}

#[async_trait]
impl TalentDirectory for InMemoryDirectory {
    async fn job(&self, job_id: &JobId) -> Result<Option<Job>, DirectoryError> {
        Ok(self.jobs.get(job_id).cloned())
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, DirectoryError> {
        Ok(self.candidates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::{candidate, job};
    use std::io::Write;

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let directory = InMemoryDirectory::new(
            vec![job("ABC123", &["python"])],
            vec![candidate("john@example.com", &["python"])],
        );
        assert!(directory.job(&JobId::new("ABC123")).await.unwrap().is_some());
        assert!(directory.job(&JobId::new("nope")).await.unwrap().is_none());
        assert_eq!(directory.candidates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "jobs": [{{
                    "id": "ABC123",
                    "title": "Dev",
                    "description": "Need python dev",
                    "desired_skills": ["python"],
                    "pay_range": {{"min": 1, "max": 2}},
                    "source": "test",
                    "posted_by": "admin@example.com",
                    "created_at": "2025-01-01T00:00:00Z"
                }}],
                "candidates": [{{
                    "email": "John@Example.com",
                    "first_name": "John",
                    "last_name": "Doe",
                    "education_level": "College",
                    "skills": ["python"]
                }}]
            }}"#
        )
        .unwrap();

        let directory = InMemoryDirectory::from_seed_file(file.path()).unwrap();
        let job = directory.job(&JobId::new("ABC123")).await.unwrap().unwrap();
        assert_eq!(job.title, "Dev");
        let pool = directory.candidates().await.unwrap();
        assert_eq!(pool[0].id.as_str(), "john@example.com");
    }

    #[test]
    fn test_seed_with_bad_pay_range_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"jobs": [{{"id": "J", "title": "t", "description": "d",
                "pay_range": {{"min": 5, "max": 1}}, "source": "s", "posted_by": "p",
                "created_at": "2025-01-01T00:00:00Z"}}]}}"#
        )
        .unwrap();
        let err = InMemoryDirectory::from_seed_file(file.path()).unwrap_err();
        assert!(matches!(err, DirectoryError::Seed { .. }));
    }
}
