use tokio::sync::watch;

use super::token::Credential;

/// Snapshot of the session as seen by the gateway and by route guards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    /// Set when the session was ended (logout or failed refresh), reset by the next `set`.
    pub logged_out: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// Holder of the current access token.
///
/// Writes are last-writer-wins; each write replaces the whole [`SessionState`].
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential);
    fn clear(&self);
    fn state(&self) -> SessionState;
}

/// In-process credential store.
///
/// Observers can [`subscribe`](Self::subscribe) to react when the session ends,
/// e.g. to send the user back to a login screen.
///
/// # Example
/// ```
/// use authgate::auth::{Credential, CredentialStore, MemoryCredentialStore};
///
/// let store = MemoryCredentialStore::new();
/// store.set(Credential::new("T1"));
/// assert_eq!(store.get().unwrap().access_token, "T1");
/// store.clear();
/// assert!(store.get().is_none());
/// assert!(store.state().logged_out);
/// ```
#[derive(Debug)]
pub struct MemoryCredentialStore {
    state: watch::Sender<SessionState>,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        store.set(credential);
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.state.borrow().credential.clone()
    }

    fn set(&self, credential: Credential) {
        self.state.send_replace(SessionState {
            credential: Some(credential),
            logged_out: false,
        });
    }

    fn clear(&self) {
        self.state.send_replace(SessionState {
            credential: None,
            logged_out: true,
        });
    }

    fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }
}
