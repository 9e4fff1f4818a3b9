use chrono::{DateTime, Utc};

use corebank_auth::Role;
use corebank_core::UserId;

/// Authenticated principal for a request.
///
/// Inserted by the auth middleware; must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    email: String,
    role: Role,
}

impl AuthContext {
    pub fn new(user_id: UserId, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The raw bearer token a request presented.
///
/// Carried so logout and password change can revoke exactly this credential,
/// with its own expiry as the revocation entry's lifetime.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
