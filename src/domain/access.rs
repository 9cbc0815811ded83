//! Ownership and role checks shared by every resource.

use super::user::{User, UserRole};
use crate::shared::{DomainError, DomainResult};

pub const NOT_AUTHORIZED: &str = "Not authorized to access the resource";

/// The caller must hold one of `allowed`.
pub fn ensure_role(actor: &User, allowed: &[UserRole]) -> DomainResult<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(NOT_AUTHORIZED.to_string()))
    }
}

/// The caller must own the resource or be an admin; `denied` is the
/// resource-specific refusal message.
pub fn ensure_owner_or_admin(actor: &User, owner_id: &str, denied: &str) -> DomainResult<()> {
    if actor.id == owner_id || actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(denied.to_string()))
    }
}
