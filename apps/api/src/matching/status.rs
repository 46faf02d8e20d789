//! Workflow states for a (job, candidate) pair and the pure transition table.
//!
//! `next_status` is the whole state machine: everything else in the workflow
//! (guards, roster upkeep, selection bookkeeping) hangs off the `Transition`
//! it produces.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Per-entry workflow state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchStatus {
    /// Scored, no decision yet.
    #[default]
    Unranked,
    Interested,
    Assigned,
    Placed,
    Declined,
}

const PERSISTED_LABELS: &[&str] = &["unranked", "interested", "assigned", "placed", "declined"];

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        MatchStatus::Unranked,
        MatchStatus::Interested,
        MatchStatus::Assigned,
        MatchStatus::Placed,
        MatchStatus::Declined,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MatchStatus::Unranked => "unranked",
            MatchStatus::Interested => "interested",
            MatchStatus::Assigned => "assigned",
            MatchStatus::Placed => "placed",
            MatchStatus::Declined => "declined",
        }
    }

    /// Stored vocabulary: `unranked` is written as `null`.
    pub const fn persisted(self) -> Option<&'static str> {
        match self {
            MatchStatus::Unranked => None,
            other => Some(other.label()),
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Placed | MatchStatus::Declined)
    }

    fn from_persisted(raw: Option<&str>) -> Option<Self> {
        match raw {
            None | Some("unranked") => Some(MatchStatus::Unranked),
            Some("interested") => Some(MatchStatus::Interested),
            Some("assigned") => Some(MatchStatus::Assigned),
            Some("placed") => Some(MatchStatus::Placed),
            Some("declined") => Some(MatchStatus::Declined),
            Some(_) => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.persisted() {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        MatchStatus::from_persisted(raw.as_deref()).ok_or_else(|| {
            D::Error::unknown_variant(raw.as_deref().unwrap_or_default(), PERSISTED_LABELS)
        })
    }
}

/// Candidate-level actions a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEvent {
    MarkInterested,
    MarkNotInterested,
    Assign,
    Place,
}

impl MatchEvent {
    pub const fn label(self) -> &'static str {
        match self {
            MatchEvent::MarkInterested => "mark-interested",
            MatchEvent::MarkNotInterested => "mark-not-interested",
            MatchEvent::Assign => "assign",
            MatchEvent::Place => "place",
        }
    }
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a transition changes the job's transient selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEffect {
    Enter,
    Leave,
    Unchanged,
}

/// Result of applying an event to a state, before any guard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: MatchStatus,
    pub to: MatchStatus,
    pub event: MatchEvent,
    pub selection: SelectionEffect,
}

/// The transition table. `None` means the event is not allowed from `from`.
pub fn next_status(from: MatchStatus, event: MatchEvent) -> Option<MatchStatus> {
    use MatchEvent::*;
    use MatchStatus::*;

    match (from, event) {
        (Unranked, MarkInterested) => Some(Interested),
        (Unranked, MarkNotInterested) => Some(Declined),
        (Interested, Assign) => Some(Assigned),
        (Interested, MarkNotInterested) => Some(Declined),
        // Expedited hires may skip the assignment step.
        (Interested, Place) | (Assigned, Place) => Some(Placed),
        _ => None,
    }
}

/// Builds the full transition, including its effect on the selection set.
pub fn plan(from: MatchStatus, event: MatchEvent) -> Option<Transition> {
    let to = next_status(from, event)?;
    let selection = match (from, to) {
        (_, MatchStatus::Interested) => SelectionEffect::Enter,
        (MatchStatus::Interested, _) => SelectionEffect::Leave,
        _ => SelectionEffect::Unchanged,
    };

    Some(Transition {
        from,
        to,
        event,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use MatchEvent::*;
        use MatchStatus::*;

        let table = [
            (Unranked, MarkInterested, Interested),
            (Unranked, MarkNotInterested, Declined),
            (Interested, Assign, Assigned),
            (Interested, MarkNotInterested, Declined),
            (Interested, Place, Placed),
            (Assigned, Place, Placed),
        ];
        for (from, event, to) in table {
            assert_eq!(next_status(from, event), Some(to), "{from} --{event}-->");
        }
    }

    #[test]
    fn test_assigned_cannot_be_declined() {
        assert_eq!(
            next_status(MatchStatus::Assigned, MatchEvent::MarkNotInterested),
            None
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [MatchStatus::Placed, MatchStatus::Declined] {
            assert!(from.is_terminal());
            for event in [
                MatchEvent::MarkInterested,
                MatchEvent::MarkNotInterested,
                MatchEvent::Assign,
                MatchEvent::Place,
            ] {
                assert_eq!(next_status(from, event), None);
            }
        }
    }

    #[test]
    fn test_unranked_cannot_skip_to_assign_or_place() {
        assert_eq!(next_status(MatchStatus::Unranked, MatchEvent::Assign), None);
        assert_eq!(next_status(MatchStatus::Unranked, MatchEvent::Place), None);
    }

    #[test]
    fn test_selection_effects() {
        let enter = plan(MatchStatus::Unranked, MatchEvent::MarkInterested).unwrap();
        assert_eq!(enter.selection, SelectionEffect::Enter);

        let commit = plan(MatchStatus::Interested, MatchEvent::Assign).unwrap();
        assert_eq!(commit.selection, SelectionEffect::Leave);

        let decline = plan(MatchStatus::Interested, MatchEvent::MarkNotInterested).unwrap();
        assert_eq!(decline.selection, SelectionEffect::Leave);

        let place = plan(MatchStatus::Assigned, MatchEvent::Place).unwrap();
        assert_eq!(place.selection, SelectionEffect::Unchanged);
    }

    #[test]
    fn test_unranked_persists_as_null() {
        assert_eq!(serde_json::to_string(&MatchStatus::Unranked).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&MatchStatus::Placed).unwrap(),
            "\"placed\""
        );
    }

    #[test]
    fn test_deserialize_accepts_null_and_labels() {
        let parsed: Vec<MatchStatus> =
            serde_json::from_str(r#"[null, "unranked", "interested", "assigned", "placed", "declined"]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                MatchStatus::Unranked,
                MatchStatus::Unranked,
                MatchStatus::Interested,
                MatchStatus::Assigned,
                MatchStatus::Placed,
                MatchStatus::Declined,
            ]
        );
    }

    #[test]
    fn test_deserialize_rejects_unknown_status() {
        assert!(serde_json::from_str::<MatchStatus>("\"hired\"").is_err());
    }
}
