//! Authorization service: capability questions answered per subject.

use rolegate_core::{allows, Capability, PortalError, Result, Role};
use rolegate_store::DocumentStore;
use std::sync::Arc;
use uuid::Uuid;

/// Answers capability questions for a subject by resolving its stored role
/// and consulting the permission matrix. Holds no per-subject state; every
/// call re-reads the store so a committed role change is visible immediately.
#[derive(Clone)]
pub struct AuthorizationService {
    store: Arc<dyn DocumentStore>,
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The subject's current role. A missing subject resolves to `Guest` —
    /// fail-open to the least-privileged role, never an error that blocks
    /// reads. (An unrecognized stored role token already degraded to `Guest`
    /// at the storage boundary.)
    pub async fn role_of(&self, subject: Uuid) -> Result<Role> {
        Ok(self
            .store
            .account(subject)
            .await?
            .map(|account| account.role)
            .unwrap_or(Role::Guest))
    }

    /// Whether the subject holds `cap`. An anonymous subject (`None`) holds
    /// nothing, including `ViewFiles` — read access requires an authenticated
    /// identity at minimum `Guest`.
    pub async fn has_capability(&self, subject: Option<Uuid>, cap: Capability) -> Result<bool> {
        let Some(subject) = subject else {
            return Ok(false);
        };
        let role = self.role_of(subject).await?;
        Ok(allows(role, cap))
    }

    /// Same check as [`has_capability`](Self::has_capability), but signals
    /// `PermissionDenied` for use at mutation entry points.
    pub async fn require_capability(&self, subject: Option<Uuid>, cap: Capability) -> Result<()> {
        if self.has_capability(subject, cap).await? {
            Ok(())
        } else {
            tracing::warn!(?subject, capability = ?cap, "capability check failed");
            Err(PortalError::PermissionDenied(cap))
        }
    }
}
