//! Public entry point for matching and candidate-level workflow actions.
//!
//! Locking: every write for a job runs under that job's mutex; different jobs
//! never contend. Scoring happens before the mutex is taken, so a slow ranking
//! call never blocks transitions on the same job. Reads (`load_existing`,
//! `has_match`) go straight to the cache.
//!
//! The per-job workspace is a cache of the stored set. It is rebuilt whenever
//! the stored revision moves under it, which is how writes from other
//! processes sharing the same store become visible. Slots exist only for jobs
//! that have a stored set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::auth::Caller;
use crate::directory::TalentDirectory;
use crate::matching::cache::MatchCache;
use crate::matching::eligibility;
use crate::matching::error::MatchError;
use crate::matching::result_set::{MatchEntry, MatchResultSet};
use crate::matching::roster::RosterView;
use crate::matching::scorer::{MatchScorer, ScoredCandidate};
use crate::matching::status::MatchEvent;
use crate::matching::workflow::{JobWorkspace, WorkflowEngine};
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;

pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(30);

type JobSlot = Arc<AsyncMutex<Option<JobWorkspace>>>;

/// Outcome of one candidate in a bulk assignment.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAssignOutcome {
    pub candidate_id: CandidateId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<MatchEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkAssignError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkAssignError {
    pub code: &'static str,
    pub message: String,
    /// True when resubmitting the same candidate later may succeed.
    pub retryable: bool,
}

impl BulkAssignOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct MatchingPipeline {
    directory: Arc<dyn TalentDirectory>,
    scorer: Arc<dyn MatchScorer>,
    cache: Arc<dyn MatchCache>,
    engine: WorkflowEngine,
    scoring_timeout: Duration,
    slots: Mutex<HashMap<JobId, JobSlot>>,
}

impl MatchingPipeline {
    pub fn new(
        directory: Arc<dyn TalentDirectory>,
        scorer: Arc<dyn MatchScorer>,
        cache: Arc<dyn MatchCache>,
        engine: WorkflowEngine,
    ) -> Self {
        Self {
            directory,
            scorer,
            cache,
            engine,
            scoring_timeout: DEFAULT_SCORING_TIMEOUT,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_scoring_timeout(mut self, timeout: Duration) -> Self {
        self.scoring_timeout = timeout;
        self
    }

    // ────────────────────────────────────────────────────────────────────────
    // Matching
    // ────────────────────────────────────────────────────────────────────────

    /// Returns the stored result set, scoring the job first if none exists.
    /// Repeated calls never alter states already transitioned.
    pub async fn match_job(&self, job_id: &JobId) -> Result<Arc<MatchResultSet>, MatchError> {
        if let Some(existing) = self.cache.get(job_id).await? {
            return Ok(existing);
        }

        let scored = self.score(job_id).await?;

        let slot = self.slot(job_id);
        let mut workspace = slot.lock().await;

        // Another caller may have finished a pass while we were scoring.
        if let Some(existing) = self.cache.get(job_id).await? {
            return Ok(existing);
        }

        let set = Arc::new(MatchResultSet::fresh(job_id.clone(), scored, Utc::now()));
        self.cache.put(job_id, set.clone()).await?;
        *workspace = Some(JobWorkspace::hydrate(&set));

        info!(job_id = %job_id, candidates = set.len(), "match results stored");
        Ok(set)
    }

    /// Forces a new scoring pass and merges it into the stored set.
    pub async fn rematch(&self, job_id: &JobId) -> Result<Arc<MatchResultSet>, MatchError> {
        let scored = self.score(job_id).await?;

        let slot = self.slot(job_id);
        let mut workspace = slot.lock().await;

        let now = Utc::now();
        let set = match self.cache.get(job_id).await? {
            Some(current) => current.rescored(scored, now),
            None => MatchResultSet::fresh(job_id.clone(), scored, now),
        };
        let set = Arc::new(set);

        self.cache.put(job_id, set.clone()).await?;
        *workspace = Some(JobWorkspace::hydrate(&set));

        info!(job_id = %job_id, candidates = set.len(), "match results rescored");
        Ok(set)
    }

    /// Returns the stored set verbatim, without scoring.
    pub async fn load_existing(&self, job_id: &JobId) -> Result<Arc<MatchResultSet>, MatchError> {
        self.cache
            .get(job_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(job_id.clone()))
    }

    pub async fn has_match(&self, job_id: &JobId) -> Result<bool, MatchError> {
        Ok(self.cache.exists(job_id).await?)
    }

    pub async fn roster(&self, job_id: &JobId) -> Result<RosterView, MatchError> {
        self.read_workspace(job_id, |ws| ws.roster().view()).await
    }

    /// Candidates currently selected for the job but not yet committed.
    pub async fn selection(&self, job_id: &JobId) -> Result<Vec<CandidateId>, MatchError> {
        self.read_workspace(job_id, |ws| ws.selection().iter().cloned().collect())
            .await
    }

    pub fn selection_limit(&self) -> usize {
        self.engine.selection_limit()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Transitions
    // ────────────────────────────────────────────────────────────────────────

    pub async fn mark_interested(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<MatchEntry, MatchError> {
        self.transition(job_id, candidate_id, MatchEvent::MarkInterested)
            .await
    }

    pub async fn mark_not_interested(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<MatchEntry, MatchError> {
        self.transition(job_id, candidate_id, MatchEvent::MarkNotInterested)
            .await
    }

    pub async fn assign(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<MatchEntry, MatchError> {
        self.transition(job_id, candidate_id, MatchEvent::Assign)
            .await
    }

    pub async fn place(
        &self,
        caller: &Caller,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<MatchEntry, MatchError> {
        if let Err(err) = self.engine.authorize_placement(caller) {
            warn!(job_id = %job_id, caller = %caller.id, role = %caller.role, "placement refused");
            return Err(err);
        }
        self.transition(job_id, candidate_id, MatchEvent::Place)
            .await
    }

    /// Assigns each candidate in turn. A failing guard does not stop the batch.
    pub async fn bulk_assign(
        &self,
        job_id: &JobId,
        candidate_ids: &[CandidateId],
    ) -> Vec<BulkAssignOutcome> {
        let mut outcomes = Vec::with_capacity(candidate_ids.len());

        for candidate_id in candidate_ids {
            let outcome = match self.assign(job_id, candidate_id).await {
                Ok(entry) => BulkAssignOutcome {
                    candidate_id: candidate_id.clone(),
                    entry: Some(entry),
                    error: None,
                },
                Err(err) => BulkAssignOutcome {
                    candidate_id: candidate_id.clone(),
                    entry: None,
                    error: Some(BulkAssignError {
                        code: err.kind(),
                        message: err.to_string(),
                        retryable: err.is_retryable(),
                    }),
                },
            };
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            job_id = %job_id,
            requested = candidate_ids.len(),
            succeeded,
            "bulk assignment finished"
        );
        outcomes
    }

    async fn transition(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
        event: MatchEvent,
    ) -> Result<MatchEntry, MatchError> {
        let slot = self.stored_slot(job_id).await?;
        let mut guard = slot.lock().await;

        let set = self
            .cache
            .get(job_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(job_id.clone()))?;
        let workspace = current_workspace(&mut guard, &set);

        let prepared = self
            .engine
            .prepare(workspace, &set, candidate_id, event, Utc::now())
            .map_err(|err| {
                warn!(
                    job_id = %job_id,
                    candidate_id = %candidate_id,
                    %event,
                    code = err.kind(),
                    "transition rejected: {err}"
                );
                err
            })?;

        // Store first; the roster only moves once the entry is durable.
        self.cache.put(job_id, prepared.next.clone()).await?;
        workspace.commit(&prepared);

        info!(
            job_id = %job_id,
            candidate_id = %candidate_id,
            from = %prepared.transition.from,
            to = %prepared.transition.to,
            "transition committed"
        );
        Ok(prepared.entry)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────────

    fn slot(&self, job_id: &JobId) -> JobSlot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(job_id.clone()).or_default().clone()
    }

    /// Slot for a job that already has a stored set. Unknown ids get
    /// `NotFound` without leaving an entry behind.
    async fn stored_slot(&self, job_id: &JobId) -> Result<JobSlot, MatchError> {
        if !self.cache.exists(job_id).await? {
            return Err(MatchError::NotFound(job_id.clone()));
        }
        Ok(self.slot(job_id))
    }

    #[cfg(test)]
    fn tracked_jobs(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn read_workspace<T>(
        &self,
        job_id: &JobId,
        read: impl FnOnce(&JobWorkspace) -> T,
    ) -> Result<T, MatchError> {
        let slot = self.stored_slot(job_id).await?;
        let mut guard = slot.lock().await;

        let set = self
            .cache
            .get(job_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(job_id.clone()))?;
        Ok(read(current_workspace(&mut guard, &set)))
    }

    /// Runs one scoring pass without touching any stored state.
    async fn score(&self, job_id: &JobId) -> Result<Vec<ScoredCandidate>, MatchError> {
        let job = self
            .directory
            .job(job_id)
            .await?
            .ok_or_else(|| MatchError::UnknownJob(job_id.clone()))?;

        let pool = eligibility::eligible_pool(&job, self.directory.candidates().await?);
        if pool.is_empty() {
            info!(job_id = %job_id, "no eligible candidates; skipping scorer");
            return Ok(Vec::new());
        }

        let raw = match tokio::time::timeout(self.scoring_timeout, self.scorer.score(&job, &pool))
            .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                warn!(job_id = %job_id, backend = self.scorer.backend(), "scoring failed: {err}");
                return Err(MatchError::ScoringUnavailable(err.to_string()));
            }
            Err(_) => {
                warn!(
                    job_id = %job_id,
                    backend = self.scorer.backend(),
                    "scoring timed out after {:?}",
                    self.scoring_timeout
                );
                return Err(MatchError::ScoringUnavailable(format!(
                    "scorer timed out after {:?}",
                    self.scoring_timeout
                )));
            }
        };

        let pool_ids: HashSet<&CandidateId> = pool.iter().map(|c| &c.id).collect();
        let scored = sanitize(job_id, raw, &pool_ids);

        info!(
            job_id = %job_id,
            backend = self.scorer.backend(),
            eligible = pool.len(),
            scored = scored.len(),
            "scoring pass complete"
        );
        Ok(scored)
    }
}

/// Returns the workspace for `set`, rebuilding it if it reflects an older write.
fn current_workspace<'a>(
    slot: &'a mut Option<JobWorkspace>,
    set: &MatchResultSet,
) -> &'a mut JobWorkspace {
    let stale = slot.as_ref().map_or(true, |ws| !ws.is_current(set));
    if stale {
        if slot.is_some() {
            debug!(
                job_id = %set.job_id,
                revision = set.revision,
                "stored match results moved; rebuilding workspace"
            );
        }
        *slot = Some(JobWorkspace::hydrate(set));
    }
    slot.get_or_insert_with(|| JobWorkspace::hydrate(set))
}

/// Drops rows the scorer should not have produced: unknown candidates and
/// non-finite scores.
fn sanitize(
    job_id: &JobId,
    raw: Vec<ScoredCandidate>,
    pool_ids: &HashSet<&CandidateId>,
) -> Vec<ScoredCandidate> {
    raw.into_iter()
        .filter(|row| {
            let keep = row.score.is_finite() && pool_ids.contains(&row.candidate_id);
            if !keep {
                warn!(
                    job_id = %job_id,
                    candidate_id = %row.candidate_id,
                    score = row.score,
                    "dropping scorer row outside the eligible pool or with a non-finite score"
                );
            }
            keep
        })
        .collect()
}
