pub mod policy;
pub mod rbac;
pub mod types;

pub use policy::VisibilityPolicy;
pub use rbac::{allows, Capability, Role};
pub use types::{
    Account, AccountView, FileKind, FileMetadata, FileRecord, FileView, NewAccount, NewFile,
};

use thiserror::Error;

/// Core error type for portal operations.
///
/// Every variant is terminal for the single operation that raised it; none are
/// retried automatically. Visibility denial is never an error — the read paths
/// degrade to an empty result instead.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Authentication Failed: invalid email or secret")]
    AuthFailed,
    #[error("Invalid Role: {0}")]
    InvalidRole(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Permission Denied: missing capability {0:?}")]
    PermissionDenied(Capability),
    #[error("Validation Error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;
