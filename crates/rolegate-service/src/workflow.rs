//! Role mutation workflow: the guarded transition that changes a subject's
//! role.

use crate::authz::AuthorizationService;
use rolegate_core::{Capability, PortalError, Result, Role};
use rolegate_store::DocumentStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct RoleMutation {
    store: Arc<dyn DocumentStore>,
    authz: AuthorizationService,
}

impl RoleMutation {
    pub fn new(store: Arc<dyn DocumentStore>, authz: AuthorizationService) -> Self {
        Self { store, authz }
    }

    /// Change `target`'s role to the role named by `token`.
    ///
    /// Check order is fixed: malformed token (`InvalidRole`), then missing
    /// target (`NotFound`), then actor capability (`PermissionDenied`).
    /// Writing the already-stored role succeeds as a no-op. An actor editing
    /// its own role is permitted; any self-protection belongs to the
    /// surrounding policy, not this workflow.
    pub async fn change_role(
        &self,
        actor: Option<Uuid>,
        target: Uuid,
        token: &str,
    ) -> Result<Uuid> {
        let new_role: Role = token.parse()?;

        let account = self
            .store
            .account(target)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("account {target}")))?;

        self.authz
            .require_capability(actor, Capability::EditAccounts)
            .await?;

        if account.role != new_role {
            self.store.set_role(target, new_role).await?;
            tracing::info!(?actor, %target, role = %new_role, "role changed");
        }
        Ok(target)
    }
}
