//! Document store collaborator: the contract the authorization layers read
//! and write through, plus the in-memory reference implementation.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use rolegate_core::{Account, FileRecord, Result, Role};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Coarse change notification emitted after every committed mutation.
///
/// Subscribers re-read and re-project on receipt, so the event only needs to
/// say which document set moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    AccountsChanged,
    FilesChanged,
}

/// Persistence contract for the two document sets.
///
/// Implementations must be read-after-write consistent on the role field: a
/// committed `set_role` is visible to the next `account` read. Concurrent
/// role writes against the same target may resolve last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn account(&self, id: Uuid) -> Result<Option<Account>>;
    async fn account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn accounts(&self) -> Result<Vec<Account>>;
    /// Insert a new account. Fails with `Validation` on a duplicate email.
    async fn insert_account(&self, account: Account) -> Result<Uuid>;
    /// Set the role of an existing account. Fails with `NotFound` when the
    /// target is missing. Writing the already-stored role is a no-op.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<()>;
    /// Remove an account. Fails with `NotFound` when missing.
    async fn remove_account(&self, id: Uuid) -> Result<()>;

    async fn file(&self, id: Uuid) -> Result<Option<FileRecord>>;
    async fn files(&self) -> Result<Vec<FileRecord>>;
    async fn insert_file(&self, file: FileRecord) -> Result<Uuid>;
    /// Remove a file. Fails with `NotFound` when missing.
    async fn remove_file(&self, id: Uuid) -> Result<()>;

    /// Subscribe to the change feed. Lagging receivers miss events, not data:
    /// every event is a cue to re-read.
    fn watch(&self) -> broadcast::Receiver<ChangeEvent>;
}
