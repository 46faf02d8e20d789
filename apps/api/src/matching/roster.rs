//! Per-job roster: which candidates sit in which workflow state.
//!
//! A derived view over the result set, kept current incrementally by the
//! workflow engine. Invariant: every bucket's size equals the number of
//! entries carrying that status.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::matching::result_set::MatchResultSet;
use crate::matching::status::MatchStatus;
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRoster {
    job_id: JobId,
    unranked: BTreeSet<CandidateId>,
    interested: BTreeSet<CandidateId>,
    assigned: BTreeSet<CandidateId>,
    placed: BTreeSet<CandidateId>,
    declined: BTreeSet<CandidateId>,
}

impl CandidateRoster {
    pub fn from_result_set(set: &MatchResultSet) -> Self {
        let mut roster = Self {
            job_id: set.job_id.clone(),
            unranked: BTreeSet::new(),
            interested: BTreeSet::new(),
            assigned: BTreeSet::new(),
            placed: BTreeSet::new(),
            declined: BTreeSet::new(),
        };
        for entry in &set.entries {
            roster
                .bucket_mut(entry.status)
                .insert(entry.candidate_id.clone());
        }
        roster
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn bucket(&self, status: MatchStatus) -> &BTreeSet<CandidateId> {
        match status {
            MatchStatus::Unranked => &self.unranked,
            MatchStatus::Interested => &self.interested,
            MatchStatus::Assigned => &self.assigned,
            MatchStatus::Placed => &self.placed,
            MatchStatus::Declined => &self.declined,
        }
    }

    fn bucket_mut(&mut self, status: MatchStatus) -> &mut BTreeSet<CandidateId> {
        match status {
            MatchStatus::Unranked => &mut self.unranked,
            MatchStatus::Interested => &mut self.interested,
            MatchStatus::Assigned => &mut self.assigned,
            MatchStatus::Placed => &mut self.placed,
            MatchStatus::Declined => &mut self.declined,
        }
    }

    pub fn status_of(&self, candidate_id: &CandidateId) -> Option<MatchStatus> {
        MatchStatus::ALL
            .into_iter()
            .find(|status| self.bucket(*status).contains(candidate_id))
    }

    /// Moves a candidate between buckets; a candidate sits in exactly one.
    pub(crate) fn apply_move(&mut self, candidate_id: &CandidateId, from: MatchStatus, to: MatchStatus) {
        self.bucket_mut(from).remove(candidate_id);
        self.bucket_mut(to).insert(candidate_id.clone());
    }

    pub fn count(&self, status: MatchStatus) -> usize {
        self.bucket(status).len()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn view(&self) -> RosterView {
        let list = |status| self.bucket(status).iter().cloned().collect::<Vec<_>>();
        RosterView {
            job_id: self.job_id.clone(),
            assigned_count: self.assigned_count(),
            placed_count: self.placed_count(),
            interested_count: self.count(MatchStatus::Interested),
            declined_count: self.count(MatchStatus::Declined),
            unranked_count: self.count(MatchStatus::Unranked),
            unranked: list(MatchStatus::Unranked),
            interested: list(MatchStatus::Interested),
            assigned: list(MatchStatus::Assigned),
            placed: list(MatchStatus::Placed),
            declined: list(MatchStatus::Declined),
        }
    }
}

/// Serializable roster snapshot for job listings.
#[derive(Debug, Clone, Serialize)]
pub struct RosterView {
    pub job_id: JobId,
    pub assigned_count: usize,
    pub placed_count: usize,
    pub interested_count: usize,
    pub declined_count: usize,
    pub unranked_count: usize,
    pub unranked: Vec<CandidateId>,
    pub interested: Vec<CandidateId>,
    pub assigned: Vec<CandidateId>,
    pub placed: Vec<CandidateId>,
    pub declined: Vec<CandidateId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::ScoredCandidate;
    use chrono::Utc;

    fn set() -> MatchResultSet {
        let now = Utc::now();
        MatchResultSet::fresh(
            JobId::new("J"),
            ["a@x.org", "b@x.org", "c@x.org"]
                .iter()
                .map(|id| ScoredCandidate {
                    candidate_id: CandidateId::new(id),
                    score: 0.5,
                })
                .collect(),
            now,
        )
        .with_status(&CandidateId::new("a@x.org"), MatchStatus::Assigned, now)
        .and_then(|s| s.with_status(&CandidateId::new("b@x.org"), MatchStatus::Placed, now))
        .unwrap()
    }

    #[test]
    fn test_counts_match_entries() {
        let set = set();
        let roster = CandidateRoster::from_result_set(&set);
        for status in MatchStatus::ALL {
            assert_eq!(roster.count(status), set.count(status), "{status}");
        }
        assert_eq!(roster.assigned_count(), 1);
        assert_eq!(roster.placed_count(), 1);
    }

    #[test]
    fn test_placement_leaves_assigned_bucket() {
        let mut roster = CandidateRoster::from_result_set(&set());
        let a = CandidateId::new("a@x.org");
        roster.apply_move(&a, MatchStatus::Assigned, MatchStatus::Placed);

        assert!(!roster.bucket(MatchStatus::Assigned).contains(&a));
        assert!(roster.bucket(MatchStatus::Placed).contains(&a));
        assert_eq!(roster.assigned_count(), 0);
        assert_eq!(roster.placed_count(), 2);
        assert_eq!(roster.status_of(&a), Some(MatchStatus::Placed));
    }

    #[test]
    fn test_view_lists_buckets() {
        let view = CandidateRoster::from_result_set(&set()).view();
        assert_eq!(view.unranked, vec![CandidateId::new("c@x.org")]);
        assert_eq!(view.assigned, vec![CandidateId::new("a@x.org")]);
        assert_eq!(view.unranked_count, 1);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["placed"][0], "b@x.org");
    }
}
