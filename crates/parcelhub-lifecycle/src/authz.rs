// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization gate: maps a verified identity to its stored role.

use parcelhub_core::{Collection, Filter, ParcelError, Role, User, VerifiedIdentity};
use tracing::debug;

use crate::store::{self, Store};

/// What an operation demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any verified identity, with or without a stored user record.
    Authenticated,
    Admin,
    Rider,
}

/// A verified caller together with the role stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Verified email, lower-cased.
    pub email: String,
    /// Stored role; callers without a user record count as `user`.
    pub role: Role,
    /// Identity of the stored user record, if there is one.
    pub user_id: Option<String>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether `email` names this caller.
    pub fn is(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }

    /// Checks a requirement against the stored role.
    pub fn require(&self, requirement: Requirement) -> Result<(), ParcelError> {
        let allowed = match requirement {
            Requirement::Authenticated => true,
            Requirement::Admin => self.role == Role::Admin,
            Requirement::Rider => self.role == Role::Rider,
        };
        if allowed {
            Ok(())
        } else {
            Err(ParcelError::Forbidden(format!(
                "{} role required",
                match requirement {
                    Requirement::Admin => "admin",
                    _ => "rider",
                }
            )))
        }
    }
}

/// Resolves identities to callers. Read-only.
#[derive(Clone)]
pub struct AuthorizationGate {
    store: Store,
}

impl AuthorizationGate {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Looks up the stored role for a verified identity.
    ///
    /// `None` means no credential was presented or it failed verification.
    pub async fn resolve(
        &self,
        identity: Option<&VerifiedIdentity>,
    ) -> Result<Caller, ParcelError> {
        let identity = identity.ok_or_else(|| {
            ParcelError::Unauthenticated("missing or invalid bearer credential".to_string())
        })?;
        let email = identity.email.to_ascii_lowercase();
        let user: Option<User> = store::find_one(
            &self.store,
            Collection::Users,
            &Filter::new().eq_ignore_case("email", email.as_str()),
        )
        .await?;

        let caller = match user {
            Some(user) => Caller {
                email,
                role: user.role,
                user_id: Some(user.id),
            },
            None => Caller {
                email,
                role: Role::User,
                user_id: None,
            },
        };
        debug!(email = %caller.email, role = %caller.role, "caller resolved");
        Ok(caller)
    }

    /// Resolves the identity and checks `requirement` in one step.
    pub async fn authorize(
        &self,
        identity: Option<&VerifiedIdentity>,
        requirement: Requirement,
    ) -> Result<Caller, ParcelError> {
        let caller = self.resolve(identity).await?;
        caller.require(requirement)?;
        Ok(caller)
    }
}
