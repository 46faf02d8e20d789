//! Pre-scoring filter. Ineligible candidates are excluded from the pool handed
//! to the scorer, not merely scored low.

use crate::models::candidate::Candidate;
use crate::models::job::Job;

/// Why a candidate was left out of a scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    IncompleteProfile,
    OutsideTravelRadius,
}

/// Checks one candidate against a job.
///
/// The travel rule only applies when both sides carry a location and the
/// candidate declared a radius.
pub fn check(job: &Job, candidate: &Candidate) -> Result<(), Ineligibility> {
    if !candidate.is_profile_complete() {
        return Err(Ineligibility::IncompleteProfile);
    }

    if let (Some(job_location), Some(home), Some(radius)) =
        (job.location, candidate.location, candidate.max_travel_miles)
    {
        if home.distance_miles(&job_location) > radius {
            return Err(Ineligibility::OutsideTravelRadius);
        }
    }

    Ok(())
}

/// Filters the candidate pool down to those eligible for `job`.
pub fn eligible_pool(job: &Job, candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| match check(job, candidate) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(
                    job_id = %job.id,
                    candidate_id = %candidate.id,
                    ?reason,
                    "candidate excluded from scoring pool"
                );
                false
            }
        })
        .collect()
}
