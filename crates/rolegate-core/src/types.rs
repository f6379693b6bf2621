use crate::rbac::Role;
use crate::{PortalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provisioned identity. The only field the authorization layer ever
/// mutates is `role`; email is never reassigned once provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    /// Opaque salted-hash encoding. Never leaves the identity resolver;
    /// views are projected through [`AccountView`] which has no such field.
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub color_tag: String,
    #[serde(default)]
    pub role: Role,
}

/// Request payload for provisioning a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub color_tag: String,
    /// Already-derived hash; the service layer never sees the raw secret
    /// after the identity resolver has encoded it.
    pub secret_hash: String,
    #[serde(default)]
    pub role: Role,
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(PortalError::Validation(format!(
                "invalid email address: {:?}",
                self.email
            )));
        }
        if self.display_name.trim().is_empty() {
            return Err(PortalError::Validation("display name is empty".into()));
        }
        Ok(())
    }

    pub fn into_account(self) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: self.email,
            secret_hash: self.secret_hash,
            created_at: Utc::now(),
            display_name: self.display_name,
            color_tag: self.color_tag,
            role: self.role,
        }
    }
}

/// Projection of an [`Account`] safe to hand to a viewer.
///
/// `id`, `display_name` and `role` are always present; the detail fields are
/// populated only when the viewer's role is granted detail access by the
/// deployment's visibility policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_tag: Option<String>,
}

impl AccountView {
    /// Project an account, including detail fields only when asked to.
    pub fn project(account: &Account, with_detail: bool) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name.clone(),
            role: account.role,
            email: with_detail.then(|| account.email.clone()),
            created_at: with_detail.then_some(account.created_at),
            color_tag: with_detail.then(|| account.color_tag.clone()),
        }
    }
}

/// Kind of stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub byte_size: u64,
    pub format: String,
    pub description: String,
}

/// A stored file record. Immutable after creation except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: FileKind,
    /// URI locating the content; the store holds metadata only.
    pub locator: String,
    pub metadata: FileMetadata,
    pub created_at: DateTime<Utc>,
}

/// Request payload for adding a file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFile {
    pub name: String,
    pub kind: FileKind,
    pub locator: String,
    pub metadata: FileMetadata,
}

impl NewFile {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PortalError::Validation("file name is empty".into()));
        }
        if self.locator.trim().is_empty() {
            return Err(PortalError::Validation("file locator is empty".into()));
        }
        Ok(())
    }

    pub fn into_record(self) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            name: self.name,
            kind: self.kind,
            locator: self.locator,
            metadata: self.metadata,
            created_at: Utc::now(),
        }
    }
}

/// Projection of a [`FileRecord`] handed to viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileView {
    pub id: Uuid,
    pub name: String,
    pub kind: FileKind,
    pub locator: String,
    pub metadata: FileMetadata,
    pub created_at: DateTime<Utc>,
}

impl From<&FileRecord> for FileView {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            kind: record.kind,
            locator: record.locator.clone(),
            metadata: record.metadata.clone(),
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_account() -> NewAccount {
        NewAccount {
            email: "john@example.com".into(),
            display_name: "John Doe".into(),
            color_tag: "#FF5733".into(),
            secret_hash: "pbkdf2-sha256$1$c2FsdA$aGFzaA".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn new_account_validation() {
        assert!(sample_new_account().validate().is_ok());

        let mut bad = sample_new_account();
        bad.email = "not-an-email".into();
        assert!(matches!(
            bad.validate(),
            Err(crate::PortalError::Validation(_))
        ));

        let mut bad = sample_new_account();
        bad.display_name = "  ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn account_role_defaults_to_guest_on_deserialize() {
        let json = r##"{
            "id": "6f2b8a9e-54d7-4f6e-9b1a-0c3d2e1f4a5b",
            "email": "bob@example.com",
            "secret_hash": "x",
            "created_at": "2024-01-01T00:00:00Z",
            "display_name": "Bob Johnson",
            "color_tag": "#3357FF"
        }"##;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.role, Role::Guest);
    }

    #[test]
    fn stored_wizard_role_reads_back_as_guest() {
        let json = r##"{
            "id": "6f2b8a9e-54d7-4f6e-9b1a-0c3d2e1f4a5b",
            "email": "bob@example.com",
            "secret_hash": "x",
            "created_at": "2024-01-01T00:00:00Z",
            "display_name": "Bob Johnson",
            "color_tag": "#3357FF",
            "role": "wizard"
        }"##;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.role, Role::Guest);
    }

    #[test]
    fn account_view_projection_redacts_detail() {
        let account = sample_new_account().into_account();

        let full = AccountView::project(&account, true);
        assert_eq!(full.email.as_deref(), Some("john@example.com"));
        assert!(full.created_at.is_some());

        let redacted = AccountView::project(&account, false);
        assert_eq!(redacted.display_name, "John Doe");
        assert_eq!(redacted.role, Role::Admin);
        assert!(redacted.email.is_none());
        assert!(redacted.created_at.is_none());
        assert!(redacted.color_tag.is_none());
    }

    #[test]
    fn new_file_validation() {
        let file = NewFile {
            name: "vacation.jpg".into(),
            kind: FileKind::Image,
            locator: "https://cdn.example.com/vacation.jpg".into(),
            metadata: FileMetadata {
                byte_size: 2 * 1024 * 1024,
                format: "jpeg".into(),
                description: "Beach".into(),
            },
        };
        assert!(file.validate().is_ok());

        let mut bad = file.clone();
        bad.locator = "".into();
        assert!(bad.validate().is_err());

        let mut bad = file;
        bad.name = " ".into();
        assert!(bad.validate().is_err());
    }
}
