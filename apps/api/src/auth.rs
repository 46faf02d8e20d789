//! Caller identity handed over by the authentication collaborator.
//!
//! Token validation happens upstream; this service only reads the resolved
//! identity and role from request headers.

use std::fmt;
use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    CareerServices,
    Applicant,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::CareerServices => "career_services",
            Role::Applicant => "applicant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            "career_services" | "career-services" | "staff" => Ok(Role::CareerServices),
            "applicant" | "student" => Ok(Role::Applicant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(CALLER_ID_HEADER).ok_or(AppError::Unauthorized)?;
        let role = header(CALLER_ROLE_HEADER)
            .ok_or(AppError::Unauthorized)?
            .parse::<Role>()
            .map_err(AppError::Validation)?;

        Ok(Caller {
            id: id.to_string(),
            role,
        })
    }
}
