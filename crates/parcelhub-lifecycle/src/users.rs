// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User records and role management.
//!
//! Emails are unique by convention only: `save_user` checks before it
//! inserts, and two concurrent first logins for one email can both insert.
//! Role lookups take the oldest record.

use parcelhub_core::types::{new_id, now_timestamp};
use parcelhub_core::{Collection, Filter, ParcelError, Role, User, VerifiedIdentity};
use serde_json::json;
use tracing::info;

use crate::authz::{Caller, Requirement};
use crate::store::{self, Store, assignments};

/// Result of `save_user`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedUser {
    pub user: User,
    /// False when the email already had a record.
    pub created: bool,
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Store,
}

impl UserDirectory {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ParcelError> {
        store::find_one(
            &self.store,
            Collection::Users,
            &Filter::new().eq_ignore_case("email", email),
        )
        .await
    }

    /// Records a login for the verified identity.
    ///
    /// New emails get a `user` record; existing records only have
    /// `last_login_at` refreshed, never their role.
    pub async fn save_user(
        &self,
        identity: &VerifiedIdentity,
        name: Option<String>,
    ) -> Result<SavedUser, ParcelError> {
        let email = identity.email.to_ascii_lowercase();
        let now = now_timestamp();

        if let Some(mut user) = self.find_by_email(&email).await? {
            self.store
                .update_one(
                    Collection::Users,
                    &Filter::by_id(user.id.clone()),
                    assignments(json!({ "last_login_at": now })),
                )
                .await?;
            user.last_login_at = Some(now);
            return Ok(SavedUser {
                user,
                created: false,
            });
        }

        let user = User {
            id: new_id(),
            email,
            name: name.filter(|n| !n.trim().is_empty()),
            role: Role::User,
            created_at: now.clone(),
            last_login_at: Some(now),
        };
        store::insert(&self.store, Collection::Users, &user).await?;
        info!(email = %user.email, "user registered");
        Ok(SavedUser {
            user,
            created: true,
        })
    }

    /// Role stored for `email`. Callers may ask about themselves; admins about anyone.
    pub async fn role_of(&self, caller: &Caller, email: &str) -> Result<Role, ParcelError> {
        if !caller.is(email) && !caller.is_admin() {
            return Err(ParcelError::Forbidden(
                "cannot look up another user's role".to_string(),
            ));
        }
        self.find_by_email(email)
            .await?
            .map(|u| u.role)
            .ok_or_else(|| ParcelError::not_found("user", email))
    }

    /// Overwrites a user's role. Admin only.
    pub async fn set_role(
        &self,
        caller: &Caller,
        user_id: &str,
        role: Role,
    ) -> Result<User, ParcelError> {
        caller.require(Requirement::Admin)?;
        let filter = Filter::by_id(user_id);
        let mut user: User = store::find_one(&self.store, Collection::Users, &filter)
            .await?
            .ok_or_else(|| ParcelError::not_found("user", user_id))?;

        self.store
            .update_one(
                Collection::Users,
                &filter,
                assignments(json!({ "role": role })),
            )
            .await?;
        info!(user_id, from = %user.role, to = %role, by = %caller.email, "user role changed");
        user.role = role;
        Ok(user)
    }

    /// Sets the role on the record for `email`, creating the record if absent.
    ///
    /// Admin records are left alone.
    pub(crate) async fn assign_role_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<(), ParcelError> {
        match self.find_by_email(email).await? {
            Some(user) if user.role == Role::Admin => {
                info!(email, "admin keeps admin role");
                Ok(())
            }
            Some(user) => {
                self.store
                    .update_one(
                        Collection::Users,
                        &Filter::by_id(user.id),
                        assignments(json!({ "role": role })),
                    )
                    .await?;
                Ok(())
            }
            None => {
                let user = User {
                    id: new_id(),
                    email: email.to_ascii_lowercase(),
                    name: None,
                    role,
                    created_at: now_timestamp(),
                    last_login_at: None,
                };
                store::insert(&self.store, Collection::Users, &user).await?;
                Ok(())
            }
        }
    }

    /// Resets `email` to `user` if, and only if, it currently holds `rider`.
    pub(crate) async fn revoke_rider_role(&self, email: &str) -> Result<(), ParcelError> {
        self.store
            .update_one(
                Collection::Users,
                &Filter::new()
                    .eq_ignore_case("email", email)
                    .eq("role", Role::Rider.to_string()),
                assignments(json!({ "role": Role::User })),
            )
            .await?;
        Ok(())
    }
}
