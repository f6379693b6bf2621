//! Visibility filter: reduces a document set to what a subject may observe.
//!
//! Missing capability never surfaces as an error on the read path — it
//! degrades to an empty result, mirroring a subscription that simply yields
//! nothing.

use crate::authz::AuthorizationService;
use rolegate_core::{allows, AccountView, Capability, FileView, Result, VisibilityPolicy};
use rolegate_store::DocumentStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct VisibilityFilter {
    store: Arc<dyn DocumentStore>,
    authz: AuthorizationService,
    policy: Arc<VisibilityPolicy>,
}

impl VisibilityFilter {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        authz: AuthorizationService,
        policy: Arc<VisibilityPolicy>,
    ) -> Self {
        Self {
            store,
            authz,
            policy,
        }
    }

    /// Accounts the subject may observe, projected per policy.
    ///
    /// Pure function of (current role, current accounts, policy): the role is
    /// re-resolved and the projection recomputed on every call, so a role
    /// change is visible on the next read.
    pub async fn visible_accounts(&self, subject: Option<Uuid>) -> Result<Vec<AccountView>> {
        let Some(subject) = subject else {
            return Ok(Vec::new());
        };
        let role = self.authz.role_of(subject).await?;
        if !allows(role, Capability::ViewAccounts) {
            return Ok(Vec::new());
        }
        let with_detail = self.policy.account_detail(role);
        Ok(self
            .store
            .accounts()
            .await?
            .iter()
            .map(|account| AccountView::project(account, with_detail))
            .collect())
    }

    /// Files the subject may observe, restricted to the kinds the policy
    /// grants its role.
    pub async fn visible_files(&self, subject: Option<Uuid>) -> Result<Vec<FileView>> {
        let Some(subject) = subject else {
            return Ok(Vec::new());
        };
        let role = self.authz.role_of(subject).await?;
        if !allows(role, Capability::ViewFiles) {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .files()
            .await?
            .iter()
            .filter(|file| self.policy.kind_visible(role, file.kind))
            .map(FileView::from)
            .collect())
    }
}
