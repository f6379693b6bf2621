//! Deployment-declared visibility policy.
//!
//! The two observed variants of the source system disagree on field-level
//! account redaction and on which file kinds each role may see, so both are
//! policy tables a deployment declares in config rather than rules baked into
//! the filter.

use crate::rbac::Role;
use crate::types::FileKind;
use serde::Deserialize;
use std::collections::HashMap;

/// Per-role visibility tuning applied on top of the permission matrix.
///
/// The matrix decides *whether* a role sees a document set at all; this policy
/// decides how much of each record is exposed once that gate passes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisibilityPolicy {
    /// Roles that see account detail fields (email, created_at, color_tag).
    /// Every role with `ViewAccounts` still sees id, display name and role.
    pub account_detail_roles: Vec<Role>,
    /// Optional per-role restriction of visible file kinds. A role absent from
    /// the map sees every kind its `ViewFiles` capability exposes.
    pub file_kinds: HashMap<Role, Vec<FileKind>>,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            account_detail_roles: vec![Role::Admin, Role::Viewer],
            file_kinds: HashMap::new(),
        }
    }
}

impl VisibilityPolicy {
    /// Whether `role` sees account detail fields.
    pub fn account_detail(&self, role: Role) -> bool {
        self.account_detail_roles.contains(&role)
    }

    /// Whether `role` sees files of `kind`. Unrestricted roles see all kinds.
    pub fn kind_visible(&self, role: Role, kind: FileKind) -> bool {
        match self.file_kinds.get(&role) {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }

    /// Restrict the kinds visible to one role. Used by deployments that carve
    /// the catalog per role instead of exposing everything.
    pub fn restrict_kinds(mut self, role: Role, kinds: Vec<FileKind>) -> Self {
        self.file_kinds.insert(role, kinds);
        self
    }

    /// Restrict account detail to the given roles.
    pub fn detail_roles(mut self, roles: Vec<Role>) -> Self {
        self.account_detail_roles = roles;
        self
    }
}
