use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Points credited to a puller for every completed ride.
pub const RIDE_COMPLETION_POINTS: i64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Puller,
    Consumer,
    Admin,
    Manager,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Puller => "puller",
            Role::Consumer => "consumer",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Student => "student",
        }
    }

    /// Accounts in these roles stay inactive until an admin approves them.
    pub fn requires_approval(&self) -> bool {
        matches!(self, Role::Puller | Role::Manager | Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "puller" => Ok(Role::Puller),
            "consumer" => Ok(Role::Consumer),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "student" => Ok(Role::Student),
            other => Err(DomainError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub identifier: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub role: Role,
    pub is_approved: bool,
    pub points: i64,
    pub rating: f64,
    pub total_rides: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn approve(&mut self) -> Result<(), DomainError> {
        if !self.role.requires_approval() {
            return Err(DomainError::Validation(format!(
                "Role {} does not need approval",
                self.role
            )));
        }

        self.is_approved = true;
        Ok(())
    }

    /// Credits a completed ride and returns the points awarded.
    pub fn credit_completed_ride(&mut self) -> i64 {
        self.points += RIDE_COMPLETION_POINTS;
        self.total_rides += 1;
        RIDE_COMPLETION_POINTS
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub identifier: String,
    pub display_name: Option<String>,
    pub credential_hash: String,
    pub role: Role,
    pub is_approved: bool,
}

impl NewUser {
    pub fn new(
        identifier: String,
        display_name: Option<String>,
        credential_hash: String,
        role: Role,
    ) -> Self {
        Self {
            identifier,
            display_name,
            credential_hash,
            role,
            is_approved: !role.requires_approval(),
        }
    }

    pub fn into_user(self, id: i64, created_at: DateTime<Utc>) -> User {
        User {
            id,
            identifier: self.identifier,
            display_name: self.display_name,
            credential_hash: self.credential_hash,
            role: self.role,
            is_approved: self.is_approved,
            points: 0,
            rating: 0.0,
            total_rides: 0,
            created_at,
        }
    }
}
