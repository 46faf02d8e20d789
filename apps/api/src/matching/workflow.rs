//! Guarded transitions for a single (job, candidate) pair.
//!
//! The engine never writes anything itself. `prepare` checks every guard and
//! returns the next result set; the pipeline stores it and only then calls
//! `JobWorkspace::commit`, so the entry and the roster move together or not
//! at all.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{Caller, Role};
use crate::matching::error::MatchError;
use crate::matching::result_set::{MatchEntry, MatchResultSet};
use crate::matching::roster::CandidateRoster;
use crate::matching::status::{self, MatchEvent, MatchStatus, SelectionEffect, Transition};
use crate::models::candidate::CandidateId;

pub const DEFAULT_SELECTION_LIMIT: usize = 3;

/// Decides who may invoke `place`.
pub trait PlacementPolicy: Send + Sync {
    fn may_place(&self, caller: &Caller) -> bool;
}

/// Placement is reserved to non-recruiter roles.
pub struct NonRecruiterPlacement;

impl PlacementPolicy for NonRecruiterPlacement {
    fn may_place(&self, caller: &Caller) -> bool {
        caller.role != Role::Recruiter
    }
}

/// Transient per-job state owned by the engine: the roster view and the set of
/// candidates selected but not yet committed.
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    roster: CandidateRoster,
    selection: BTreeSet<CandidateId>,
    /// `(run_id, revision)` of the stored set this view reflects.
    built_from: (Uuid, u64),
}

impl JobWorkspace {
    /// Rebuilds the workspace from stored entries. Interested entries are the
    /// ones still awaiting a commit.
    pub fn hydrate(set: &MatchResultSet) -> Self {
        let roster = CandidateRoster::from_result_set(set);
        let selection = roster.bucket(MatchStatus::Interested).clone();
        Self {
            roster,
            selection,
            built_from: (set.run_id, set.revision),
        }
    }

    /// False once any writer, in this process or another, has stored a newer set.
    pub fn is_current(&self, set: &MatchResultSet) -> bool {
        self.built_from == (set.run_id, set.revision)
    }

    pub fn roster(&self) -> &CandidateRoster {
        &self.roster
    }

    pub fn selection(&self) -> &BTreeSet<CandidateId> {
        &self.selection
    }

    /// Applies a prepared transition. Call only after its result set is stored.
    pub fn commit(&mut self, prepared: &PreparedTransition) {
        let candidate_id = &prepared.entry.candidate_id;
        let transition = prepared.transition;

        self.roster
            .apply_move(candidate_id, transition.from, transition.to);

        match transition.selection {
            SelectionEffect::Enter => {
                self.selection.insert(candidate_id.clone());
            }
            SelectionEffect::Leave => {
                self.selection.remove(candidate_id);
            }
            SelectionEffect::Unchanged => {}
        }
        self.built_from = (prepared.next.run_id, prepared.next.revision);
    }
}

/// A transition that passed every guard, with the result set it produces.
#[derive(Debug, Clone)]
pub struct PreparedTransition {
    pub transition: Transition,
    pub entry: MatchEntry,
    pub next: Arc<MatchResultSet>,
}

pub struct WorkflowEngine {
    selection_limit: usize,
    placement: Arc<dyn PlacementPolicy>,
}

impl WorkflowEngine {
    pub fn new(selection_limit: usize, placement: Arc<dyn PlacementPolicy>) -> Self {
        Self {
            selection_limit: selection_limit.max(1),
            placement,
        }
    }

    pub fn selection_limit(&self) -> usize {
        self.selection_limit
    }

    /// Role check for `place`. Other events are open to any caller that reached us.
    pub fn authorize_placement(&self, caller: &Caller) -> Result<(), MatchError> {
        if self.placement.may_place(caller) {
            Ok(())
        } else {
            Err(MatchError::Forbidden(caller.role))
        }
    }

    /// Runs every guard for `event` on `candidate_id` and builds the next set.
    pub fn prepare(
        &self,
        workspace: &JobWorkspace,
        set: &MatchResultSet,
        candidate_id: &CandidateId,
        event: MatchEvent,
        now: DateTime<Utc>,
    ) -> Result<PreparedTransition, MatchError> {
        let current = set
            .entry(candidate_id)
            .ok_or_else(|| MatchError::CandidateNotScored {
                job_id: set.job_id.clone(),
                candidate_id: candidate_id.clone(),
            })?;

        let transition =
            status::plan(current.status, event).ok_or(MatchError::InvalidTransition {
                from: current.status,
                event,
            })?;

        if transition.selection == SelectionEffect::Enter
            && !workspace.selection.contains(candidate_id)
            && workspace.selection.len() >= self.selection_limit
        {
            return Err(MatchError::SelectionLimitExceeded {
                job_id: set.job_id.clone(),
                limit: self.selection_limit,
            });
        }

        if event == MatchEvent::Assign {
            let roster = &workspace.roster;
            let already_committed = roster.bucket(MatchStatus::Assigned).contains(candidate_id)
                || roster.bucket(MatchStatus::Placed).contains(candidate_id);
            if already_committed {
                return Err(MatchError::InvalidTransition {
                    from: roster.status_of(candidate_id).unwrap_or(current.status),
                    event,
                });
            }
        }

        let next = set
            .with_status(candidate_id, transition.to, now)
            .ok_or_else(|| MatchError::CandidateNotScored {
                job_id: set.job_id.clone(),
                candidate_id: candidate_id.clone(),
            })?;
        let entry = next
            .entry(candidate_id)
            .cloned()
            .ok_or_else(|| MatchError::CandidateNotScored {
                job_id: set.job_id.clone(),
                candidate_id: candidate_id.clone(),
            })?;

        Ok(PreparedTransition {
            transition,
            entry,
            next: Arc::new(next),
        })
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_LIMIT, Arc::new(NonRecruiterPlacement))
    }
}
