use std::fmt;

use serde::{Deserialize, Serialize};

use super::job::GeoPoint;

/// Candidate identifier: the contact address, normalized to trimmed lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CandidateId(String);

impl CandidateId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CandidateId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CandidateId> for String {
    fn from(value: CandidateId) -> Self {
        value.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate profile, read by reference. The pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(alias = "email")]
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_summary: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub max_travel_miles: Option<f64>,
}

impl Candidate {
    /// A profile is complete once it has a name, an education level and at least one skill.
    pub fn is_profile_complete(&self) -> bool {
        let filled = |value: &str| !value.trim().is_empty();

        !self.id.as_str().is_empty()
            && filled(&self.first_name)
            && filled(&self.last_name)
            && self.education_level.as_deref().is_some_and(filled)
            && self.skills.iter().any(|s| filled(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Candidate {
        Candidate {
            id: CandidateId::new("john@example.com"),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            education_level: Some("College".to_string()),
            skills: vec!["python".to_string()],
            experience_summary: None,
            location: None,
            max_travel_miles: None,
        }
    }

    #[test]
    fn test_candidate_id_normalized() {
        assert_eq!(
            CandidateId::new("  Jane.Roe@Example.COM "),
            CandidateId::new("jane.roe@example.com")
        );
    }

    #[test]
    fn test_candidate_id_deserialize_normalizes() {
        let id: CandidateId = serde_json::from_str("\"Ann@X.org\"").unwrap();
        assert_eq!(id.as_str(), "ann@x.org");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ann@x.org\"");
    }

    #[test]
    fn test_complete_profile() {
        assert!(profile().is_profile_complete());
    }

    #[test]
    fn test_missing_education_is_incomplete() {
        let mut candidate = profile();
        candidate.education_level = Some("  ".to_string());
        assert!(!candidate.is_profile_complete());
        candidate.education_level = None;
        assert!(!candidate.is_profile_complete());
    }

    #[test]
    fn test_blank_skills_are_incomplete() {
        let mut candidate = profile();
        candidate.skills = vec![" ".to_string()];
        assert!(!candidate.is_profile_complete());
    }

    #[test]
    fn test_email_alias_accepted() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"email": "Jane@Example.com", "first_name": "Jane", "last_name": "Roe"}"#,
        )
        .unwrap();
        assert_eq!(candidate.id.as_str(), "jane@example.com");
        assert!(!candidate.is_profile_complete());
    }
}
