//! Candidate matching: scoring, cached result sets and the placement workflow.

pub mod cache;
pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod http_scorer;
pub mod pipeline;
pub mod result_set;
pub mod roster;
pub mod scorer;
pub mod status;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::MatchError;
pub use pipeline::MatchingPipeline;
