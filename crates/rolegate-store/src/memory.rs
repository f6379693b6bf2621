//! In-memory reference store backed by DashMap.

use crate::{ChangeEvent, DocumentStore};
use async_trait::async_trait;
use dashmap::DashMap;
use rolegate_core::{Account, FileRecord, PortalError, Result, Role};
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANGE_FEED_CAPACITY: usize = 64;

/// DashMap-backed store. Map operations are sequentially consistent per key,
/// which gives the required read-after-write behavior on the role field;
/// concurrent `set_role` calls against one account serialize on the entry
/// lock and resolve last-write-wins.
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    files: DashMap<Uuid, FileRecord>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            accounts: DashMap::new(),
            files: DashMap::new(),
            changes,
        }
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine; nobody is subscribed yet.
        let _ = self.changes.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn account(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone()))
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.iter().map(|entry| entry.clone()).collect())
    }

    async fn insert_account(&self, account: Account) -> Result<Uuid> {
        if self
            .accounts
            .iter()
            .any(|entry| entry.email == account.email)
        {
            return Err(PortalError::Validation(format!(
                "email already registered: {}",
                account.email
            )));
        }
        let id = account.id;
        self.accounts.insert(id, account);
        tracing::debug!(%id, "account inserted");
        self.notify(ChangeEvent::AccountsChanged);
        Ok(id)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<()> {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| PortalError::NotFound(format!("account {id}")))?;
        if entry.role == role {
            return Ok(());
        }
        entry.role = role;
        drop(entry);
        tracing::info!(%id, role = %role, "account role updated");
        self.notify(ChangeEvent::AccountsChanged);
        Ok(())
    }

    async fn remove_account(&self, id: Uuid) -> Result<()> {
        self.accounts
            .remove(&id)
            .ok_or_else(|| PortalError::NotFound(format!("account {id}")))?;
        tracing::info!(%id, "account removed");
        self.notify(ChangeEvent::AccountsChanged);
        Ok(())
    }

    async fn file(&self, id: Uuid) -> Result<Option<FileRecord>> {
        Ok(self.files.get(&id).map(|f| f.clone()))
    }

    async fn files(&self) -> Result<Vec<FileRecord>> {
        Ok(self.files.iter().map(|entry| entry.clone()).collect())
    }

    async fn insert_file(&self, file: FileRecord) -> Result<Uuid> {
        let id = file.id;
        self.files.insert(id, file);
        tracing::debug!(%id, "file inserted");
        self.notify(ChangeEvent::FilesChanged);
        Ok(id)
    }

    async fn remove_file(&self, id: Uuid) -> Result<()> {
        self.files
            .remove(&id)
            .ok_or_else(|| PortalError::NotFound(format!("file {id}")))?;
        tracing::info!(%id, "file removed");
        self.notify(ChangeEvent::FilesChanged);
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rolegate_core::{FileKind, FileMetadata};

    fn account(email: &str, role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: email.into(),
            secret_hash: "hash".into(),
            created_at: Utc::now(),
            display_name: email.split('@').next().unwrap_or(email).into(),
            color_tag: "#000000".into(),
            role,
        }
    }

    fn file(name: &str, kind: FileKind) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            locator: format!("https://cdn.example.com/{name}"),
            metadata: FileMetadata {
                byte_size: 1024,
                format: "bin".into(),
                description: String::new(),
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_lookup_account() {
        let store = MemoryStore::new();
        let id = store
            .insert_account(account("john@example.com", Role::Admin))
            .await
            .unwrap();

        let found = store.account(id).await.unwrap().unwrap();
        assert_eq!(found.email, "john@example.com");
        assert_eq!(found.role, Role::Admin);

        let by_email = store
            .account_by_email("john@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_account(account("jane@example.com", Role::Viewer))
            .await
            .unwrap();
        let err = store
            .insert_account(account("jane@example.com", Role::Guest))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[tokio::test]
    async fn set_role_is_read_after_write() {
        let store = MemoryStore::new();
        let id = store
            .insert_account(account("bob@example.com", Role::Guest))
            .await
            .unwrap();

        store.set_role(id, Role::Admin).await.unwrap();
        let found = store.account(id).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
    }

    #[tokio::test]
    async fn set_role_on_missing_account_is_not_found() {
        let store = MemoryStore::new();
        let err = store.set_role(Uuid::new_v4(), Role::Admin).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[tokio::test]
    async fn idempotent_set_role_emits_no_event() {
        let store = MemoryStore::new();
        let id = store
            .insert_account(account("bob@example.com", Role::Viewer))
            .await
            .unwrap();

        let mut watcher = store.watch();
        store.set_role(id, Role::Viewer).await.unwrap();
        assert!(matches!(
            watcher.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        store.set_role(id, Role::Admin).await.unwrap();
        assert_eq!(watcher.try_recv().unwrap(), ChangeEvent::AccountsChanged);
    }

    #[tokio::test]
    async fn file_lifecycle() {
        let store = MemoryStore::new();
        let id = store
            .insert_file(file("vacation.jpg", FileKind::Image))
            .await
            .unwrap();

        assert_eq!(store.files().await.unwrap().len(), 1);
        assert!(store.file(id).await.unwrap().is_some());

        store.remove_file(id).await.unwrap();
        assert!(store.file(id).await.unwrap().is_none());

        let err = store.remove_file(id).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[tokio::test]
    async fn mutations_feed_the_change_channel() {
        let store = MemoryStore::new();
        let mut watcher = store.watch();

        store
            .insert_account(account("amy@example.com", Role::Guest))
            .await
            .unwrap();
        store
            .insert_file(file("notes.pdf", FileKind::Document))
            .await
            .unwrap();

        assert_eq!(watcher.try_recv().unwrap(), ChangeEvent::AccountsChanged);
        assert_eq!(watcher.try_recv().unwrap(), ChangeEvent::FilesChanged);
    }
}
