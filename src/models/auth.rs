use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Tenant,
    Landlord,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "TENANT",
            Role::Landlord => "LANDLORD",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TENANT" => Ok(Role::Tenant),
            "LANDLORD" => Ok(Role::Landlord),
            other => anyhow::bail!("unknown role: {}", other),
        }
    }
}

/// State of a tenant's request for landlord access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    Undefined,
    Pending,
    Approved,
    Rejected,
}

impl AccessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::Undefined => "UNDEFINED",
            AccessStatus::Pending => "PENDING",
            AccessStatus::Approved => "APPROVED",
            AccessStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for AccessStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNDEFINED" => Ok(AccessStatus::Undefined),
            "PENDING" => Ok(AccessStatus::Pending),
            "APPROVED" => Ok(AccessStatus::Approved),
            "REJECTED" => Ok(AccessStatus::Rejected),
            other => anyhow::bail!("unknown access status: {}", other),
        }
    }
}

/// User represents a registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: AccessStatus,
    pub created_at: DateTime<Utc>,
}

/// Request to register a new account
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// LoginRequest for authenticating a user
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
}

/// Decision on a pending landlord-access request
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewAccessRequest {
    pub approve: bool,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}
