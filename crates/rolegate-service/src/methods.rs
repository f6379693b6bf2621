//! Operation surface: the request/response methods the presentation and
//! data-exposure layers call, with every mutation gated server-side.

use crate::authz::AuthorizationService;
use crate::identity::CredentialResolver;
use crate::visibility::VisibilityFilter;
use crate::workflow::RoleMutation;
use rolegate_core::{
    AccountView, Capability, FileView, NewAccount, NewFile, Result, VisibilityPolicy,
};
use rolegate_store::{ChangeEvent, DocumentStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

const SUBSCRIPTION_BUFFER: usize = 8;

/// The portal's method surface over a shared document store.
///
/// Every mutation entry point calls `require_capability` itself — the caller's
/// interface hiding a button is not enforcement.
#[derive(Clone)]
pub struct PortalService {
    store: Arc<dyn DocumentStore>,
    authz: AuthorizationService,
    visibility: VisibilityFilter,
    roles: RoleMutation,
    resolver: Arc<CredentialResolver>,
}

impl PortalService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: VisibilityPolicy, iterations: u32) -> Self {
        let authz = AuthorizationService::new(store.clone());
        let visibility =
            VisibilityFilter::new(store.clone(), authz.clone(), Arc::new(policy));
        let roles = RoleMutation::new(store.clone(), authz.clone());
        let resolver = Arc::new(CredentialResolver::new(store.clone(), iterations));
        Self {
            store,
            authz,
            visibility,
            roles,
            resolver,
        }
    }

    pub fn authz(&self) -> &AuthorizationService {
        &self.authz
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Resolve credentials to a subject id.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Uuid> {
        self.resolver.login(email, secret).await
    }

    /// Change `target`'s role to the role named by `token`.
    pub async fn change_role(&self, actor: Option<Uuid>, target: Uuid, token: &str) -> Result<Uuid> {
        self.roles.change_role(actor, target, token).await
    }

    /// Provision an account without an acting subject. Reserved for
    /// provisioning-time setup (the first admin has no creator); all runtime
    /// account creation goes through [`add_account`](Self::add_account).
    pub async fn bootstrap_account(&self, account: NewAccount) -> Result<Uuid> {
        account.validate()?;
        self.store.insert_account(account.into_account()).await
    }

    pub async fn add_account(&self, actor: Option<Uuid>, account: NewAccount) -> Result<Uuid> {
        self.authz
            .require_capability(actor, Capability::AddAccounts)
            .await?;
        account.validate()?;
        self.store.insert_account(account.into_account()).await
    }

    pub async fn delete_account(&self, actor: Option<Uuid>, target: Uuid) -> Result<()> {
        self.authz
            .require_capability(actor, Capability::DeleteAccounts)
            .await?;
        self.store.remove_account(target).await
    }

    pub async fn add_file(&self, actor: Option<Uuid>, file: NewFile) -> Result<Uuid> {
        self.authz
            .require_capability(actor, Capability::AddFiles)
            .await?;
        file.validate()?;
        self.store.insert_file(file.into_record()).await
    }

    pub async fn delete_file(&self, actor: Option<Uuid>, file: Uuid) -> Result<()> {
        self.authz
            .require_capability(actor, Capability::DeleteFiles)
            .await?;
        self.store.remove_file(file).await
    }

    /// Point-in-time read of the accounts the subject may observe.
    pub async fn visible_accounts(&self, subject: Option<Uuid>) -> Result<Vec<AccountView>> {
        self.visibility.visible_accounts(subject).await
    }

    /// Point-in-time read of the files the subject may observe.
    pub async fn visible_files(&self, subject: Option<Uuid>) -> Result<Vec<FileView>> {
        self.visibility.visible_files(subject).await
    }

    /// Stream of account views: an initial snapshot, then one refreshed
    /// projection per relevant store change. The subject's role is re-resolved
    /// on every emission, so a role change surfaces on the next event with no
    /// stale-view window beyond the store's own.
    pub fn subscribe_accounts(&self, subject: Option<Uuid>) -> ReceiverStream<Vec<AccountView>> {
        let visibility = self.visibility.clone();
        self.subscription(move |event| {
            let visibility = visibility.clone();
            let relevant = matches!(event, None | Some(ChangeEvent::AccountsChanged));
            async move {
                if relevant {
                    visibility.visible_accounts(subject).await.map(Some)
                } else {
                    Ok(None)
                }
            }
        })
    }

    /// Stream of file views, same shape as
    /// [`subscribe_accounts`](Self::subscribe_accounts). Account events also
    /// trigger a refresh: a role change rides the accounts feed but alters
    /// which files this subject may see.
    pub fn subscribe_files(&self, subject: Option<Uuid>) -> ReceiverStream<Vec<FileView>> {
        let visibility = self.visibility.clone();
        self.subscription(move |_event| {
            let visibility = visibility.clone();
            async move { visibility.visible_files(subject).await.map(Some) }
        })
    }

    /// Pump: emit for the initial snapshot (`None` event), then once per store
    /// change the projection deems relevant. Ends when the subscriber drops.
    fn subscription<T, F, Fut>(&self, project: F) -> ReceiverStream<T>
    where
        T: Send + 'static,
        F: Fn(Option<ChangeEvent>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut watch = self.store.watch();
        tokio::spawn(async move {
            let mut event = None;
            loop {
                match project(event).await {
                    Ok(Some(view)) => {
                        if tx.send(view).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::error!(%err, "subscription projection failed");
                        break;
                    }
                }
                event = match watch.recv().await {
                    Ok(event) => Some(event),
                    // Lagged receivers just refresh; events carry no payload.
                    Err(RecvError::Lagged(_)) => None,
                    Err(RecvError::Closed) => break,
                };
            }
        });
        ReceiverStream::new(rx)
    }
}
