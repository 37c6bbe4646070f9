//! Authenticated principal
//!
//! The auth collaborator resolves each request to a `Principal`; the
//! bidding engine trusts the bidder identity only from this resolved
//! principal, never from a request payload.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Role carried by an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular marketplace user (buyer or seller)
    User,
    /// Administrative operator with override powers
    Admin,
}

/// An authenticated caller as resolved by the auth collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            role: Role::User,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
