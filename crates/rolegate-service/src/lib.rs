//! Authorization engine for the rolegate portal: identity resolution,
//! capability checks, visibility filtering, the role mutation workflow, and
//! the method surface tying them together over a [`DocumentStore`].
//!
//! There is no process-wide "current subject": every call takes an explicit
//! request-scoped subject id (`Option<Uuid>`, `None` meaning anonymous).
//!
//! [`DocumentStore`]: rolegate_store::DocumentStore

pub mod authz;
pub mod config;
pub mod identity;
pub mod methods;
pub mod visibility;
pub mod workflow;

pub use authz::AuthorizationService;
pub use config::Config;
pub use identity::{CredentialResolver, SecretHash};
pub use methods::PortalService;
pub use visibility::VisibilityFilter;
pub use workflow::RoleMutation;
