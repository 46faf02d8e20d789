//! Fixtures shared by the matching tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::directory::InMemoryDirectory;
use crate::matching::cache::InMemoryMatchCache;
use crate::matching::pipeline::MatchingPipeline;
use crate::matching::scorer::{MatchScorer, ScoredCandidate, ScorerError};
use crate::matching::workflow::WorkflowEngine;
use crate::models::candidate::{Candidate, CandidateId};
use crate::models::job::{Job, JobId, PayRange};

pub(crate) const JOB_ID: &str = "J-100";

pub(crate) fn job(id: &str, skills: &[&str]) -> Job {
    Job {
        id: JobId::new(id),
        title: "Data Analyst".to_string(),
        description: "Analyse things".to_string(),
        desired_skills: skills.iter().map(|s| s.to_string()).collect(),
        pay_range: PayRange::new(20.0, 30.0).unwrap(),
        source: "manual".to_string(),
        posted_by: "recruiter@acme.test".to_string(),
        location: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn candidate(id: &str, skills: &[&str]) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        first_name: "Sam".to_string(),
        last_name: "Rivera".to_string(),
        education_level: Some("College".to_string()),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        experience_summary: None,
        location: None,
        max_travel_miles: None,
    }
}

/// Scorer returning whatever rows it was scripted with.
#[derive(Default)]
pub(crate) struct ScriptedScorer {
    rows: Mutex<Vec<ScoredCandidate>>,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    delay_next: Mutex<Option<Duration>>,
    last_pool: Mutex<Vec<String>>,
}

impl ScriptedScorer {
    pub(crate) fn new(scores: &[(&str, f64)]) -> Self {
        let scorer = Self::default();
        scorer.set_scores(scores);
        scorer
    }

    pub(crate) fn set_scores(&self, scores: &[(&str, f64)]) {
        *self.rows.lock().unwrap() = scores
            .iter()
            .map(|(id, score)| ScoredCandidate {
                candidate_id: CandidateId::new(id),
                score: *score,
            })
            .collect();
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn delay_next(&self, delay: Duration) {
        *self.delay_next.lock().unwrap() = Some(delay);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_pool(&self) -> Vec<String> {
        self.last_pool.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchScorer for ScriptedScorer {
    async fn score(
        &self,
        _job: &Job,
        pool: &[Candidate],
    ) -> Result<Vec<ScoredCandidate>, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_pool.lock().unwrap() = pool.iter().map(|c| c.id.to_string()).collect();

        let delay = self.delay_next.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ScorerError::Unavailable("scripted failure".to_string()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    fn backend(&self) -> &'static str {
        "scripted"
    }
}

/// One job, a candidate pool and a pipeline wired over in-memory adapters.
pub(crate) struct Fixture {
    pub job_id: JobId,
    pub scorer: Arc<ScriptedScorer>,
    pub directory: Arc<InMemoryDirectory>,
    pub cache: Arc<InMemoryMatchCache>,
    pub pipeline: MatchingPipeline,
}

impl Fixture {
    /// Every scored id becomes a complete, eligible candidate.
    pub(crate) fn with_scores(scores: &[(&str, f64)]) -> Self {
        Self::with_cache(Arc::new(InMemoryMatchCache::new()), scores)
    }

    pub(crate) fn with_cache(cache: Arc<InMemoryMatchCache>, scores: &[(&str, f64)]) -> Self {
        let candidates = scores
            .iter()
            .map(|(id, _)| candidate(id, &["python"]))
            .collect();
        Self::build(candidates, scores, cache)
    }

    pub(crate) fn new(candidates: Vec<Candidate>, scores: &[(&str, f64)]) -> Self {
        Self::build(candidates, scores, Arc::new(InMemoryMatchCache::new()))
    }

    fn build(
        candidates: Vec<Candidate>,
        scores: &[(&str, f64)],
        cache: Arc<InMemoryMatchCache>,
    ) -> Self {
        let directory = Arc::new(InMemoryDirectory::new(
            vec![job(JOB_ID, &["python"])],
            candidates,
        ));
        let scorer = Arc::new(ScriptedScorer::new(scores));
        let pipeline = MatchingPipeline::new(
            directory.clone(),
            scorer.clone(),
            cache.clone(),
            WorkflowEngine::default(),
        );
        Self {
            job_id: JobId::new(JOB_ID),
            scorer,
            directory,
            cache,
            pipeline,
        }
    }

    /// A second pipeline over the same adapters with a custom scoring timeout.
    pub(crate) fn pipeline_with_timeout(&self, timeout: Duration) -> MatchingPipeline {
        MatchingPipeline::new(
            self.directory.clone(),
            self.scorer.clone(),
            self.cache.clone(),
            WorkflowEngine::default(),
        )
        .with_scoring_timeout(timeout)
    }
}
