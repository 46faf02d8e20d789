//! Match entries and the per-job result set produced by a scoring pass.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::scorer::ScoredCandidate;
use crate::matching::status::MatchStatus;
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;

/// One scored candidate for one job. Never deleted, only transitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(alias = "email")]
    pub candidate_id: CandidateId,
    pub score: f64,
    #[serde(default)]
    pub status: MatchStatus,
    /// Time of the last state change (or of creation, for unranked entries).
    pub updated_at: DateTime<Utc>,
}

/// All entries for a job. Candidate ids are unique; ordering is descending score,
/// ties broken by ascending candidate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResultSet {
    pub job_id: JobId,
    /// Identifies the scoring pass that last refreshed this set.
    pub run_id: Uuid,
    /// Bumped on every write, so holders of a derived view can tell it is stale.
    #[serde(default)]
    pub revision: u64,
    pub scored_at: DateTime<Utc>,
    pub entries: Vec<MatchEntry>,
}

impl MatchResultSet {
    /// Builds a set from a first scoring pass; every entry starts unranked.
    pub fn fresh(job_id: JobId, scored: Vec<ScoredCandidate>, now: DateTime<Utc>) -> Self {
        let entries = collapse_duplicates(scored)
            .into_iter()
            .map(|(candidate_id, score)| MatchEntry {
                candidate_id,
                score,
                status: MatchStatus::Unranked,
                updated_at: now,
            })
            .collect();

        Self::from_parts(job_id, Uuid::new_v4(), now, entries)
    }

    /// Merges a new scoring pass into this set.
    ///
    /// Existing entries keep their status and `updated_at`; only the score moves.
    /// Candidates the scorer no longer returns are retained with their last score.
    /// New candidates enter as unranked.
    pub fn rescored(&self, scored: Vec<ScoredCandidate>, now: DateTime<Utc>) -> Self {
        let mut fresh_scores = collapse_duplicates(scored);

        let mut entries: Vec<MatchEntry> = self
            .entries
            .iter()
            .map(|entry| {
                let mut merged = entry.clone();
                if let Some(score) = fresh_scores.remove(&entry.candidate_id) {
                    merged.score = score;
                }
                merged
            })
            .collect();

        entries.extend(fresh_scores.into_iter().map(|(candidate_id, score)| MatchEntry {
            candidate_id,
            score,
            status: MatchStatus::Unranked,
            updated_at: now,
        }));

        let mut next = Self::from_parts(self.job_id.clone(), Uuid::new_v4(), now, entries);
        next.revision = self.revision + 1;
        next
    }

    /// Restores ordering over an already-built list of entries (e.g. read from
    /// storage). A candidate listed twice keeps its highest-scoring row.
    pub fn from_parts(
        job_id: JobId,
        run_id: Uuid,
        scored_at: DateTime<Utc>,
        entries: Vec<MatchEntry>,
    ) -> Self {
        let mut entries = dedup_entries(entries);
        sort_entries(&mut entries);
        Self {
            job_id,
            run_id,
            revision: 0,
            scored_at,
            entries,
        }
    }

    pub fn entry(&self, candidate_id: &CandidateId) -> Option<&MatchEntry> {
        self.entries.iter().find(|e| &e.candidate_id == candidate_id)
    }

    /// Copy of this set with one entry moved to `status`. Returns `None` if the
    /// candidate is absent.
    pub fn with_status(
        &self,
        candidate_id: &CandidateId,
        status: MatchStatus,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let position = self
            .entries
            .iter()
            .position(|e| &e.candidate_id == candidate_id)?;

        let mut next = self.clone();
        let entry = &mut next.entries[position];
        entry.status = status;
        entry.updated_at = now;
        next.revision += 1;
        Some(next)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, status: MatchStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

fn sort_entries(entries: &mut [MatchEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}

fn dedup_entries(entries: Vec<MatchEntry>) -> Vec<MatchEntry> {
    let mut best: HashMap<CandidateId, MatchEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        match best.get(&entry.candidate_id) {
            Some(current) if current.score >= entry.score => {}
            _ => {
                best.insert(entry.candidate_id.clone(), entry);
            }
        }
    }
    best.into_values().collect()
}

/// Keeps the highest score per candidate.
fn collapse_duplicates(scored: Vec<ScoredCandidate>) -> HashMap<CandidateId, f64> {
    let mut best: HashMap<CandidateId, f64> = HashMap::with_capacity(scored.len());
    for ScoredCandidate {
        candidate_id,
        score,
    } in scored
    {
        best.entry(candidate_id)
            .and_modify(|current| {
                if score > *current {
                    *current = score;
                }
            })
            .or_insert(score);
    }
    best
}
