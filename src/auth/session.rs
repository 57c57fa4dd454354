//! Session state management for the POS client.
//!
//! `SessionStore` owns the authenticated user and bearer token, mirrors
//! both into the durable key-value store, and runs a periodic client-side
//! expiry check while a session is active.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{AuthService, Credentials};
use crate::models::{Role, User};
use crate::storage::KvStore;

use super::token;

/// Storage key for the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Storage key for the JSON-encoded user record.
pub const USER_KEY: &str = "user";

/// Interval between client-side token expiry checks.
const EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
    loading: bool,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Resets the loading flag when the initiating call exits, on every path
/// including cancellation of the in-flight future.
struct LoadingGuard {
    state: Arc<Mutex<SessionState>>,
}

impl LoadingGuard {
    fn acquire(state: &Arc<Mutex<SessionState>>) -> Self {
        lock(state).loading = true;
        Self {
            state: Arc::clone(state),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock(&self.state).loading = false;
    }
}

/// Client-side session store.
///
/// Cheap to clone; clones share the same underlying state. UI layers read
/// snapshots through the accessors and mutate exclusively through
/// `login`/`logout`/`update_user`. Remote and storage failures never reach
/// the caller: they degrade to `false` returns or logged no-ops.
#[derive(Clone)]
pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    kv: Arc<dyn KvStore>,
    state: Arc<Mutex<SessionState>>,
    watcher: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionStore {
    /// Create a store with no active session.
    ///
    /// `loading` starts true and stays true until `hydrate` completes.
    pub fn new(auth: Arc<dyn AuthService>, kv: Arc<dyn KvStore>) -> Self {
        Self {
            auth,
            kv,
            state: Arc::new(Mutex::new(SessionState {
                loading: true,
                ..Default::default()
            })),
            watcher: Arc::new(Mutex::new(None)),
        }
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// Snapshot of the authenticated user, if any.
    pub fn user(&self) -> Option<User> {
        lock(&self.state).user.clone()
    }

    /// True until the initial hydration has completed.
    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// True when both a user and a token are present.
    pub fn is_authenticated(&self) -> bool {
        let state = lock(&self.state);
        state.user.is_some() && state.token.is_some()
    }

    /// True iff a user is set and its role is one of `roles`.
    ///
    /// An unauthenticated session has no roles; this is a `false`, not an
    /// error.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        lock(&self.state)
            .user
            .as_ref()
            .map(|user| roles.contains(&user.role))
            .unwrap_or(false)
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Authenticate against the remote service.
    ///
    /// Returns true and installs the session on success. Any failure
    /// (network error, rejected credentials, malformed response) is logged
    /// and leaves the prior state unchanged.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        let _loading = LoadingGuard::acquire(&self.state);

        match self.auth.login(credentials).await {
            Ok(grant) => {
                self.persist(AUTH_TOKEN_KEY, &grant.token);
                self.persist_user(&grant.user);
                {
                    let mut state = lock(&self.state);
                    state.token = Some(grant.token);
                    state.user = Some(grant.user);
                }
                self.start_expiry_watcher();
                info!("Login successful");
                true
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                false
            }
        }
    }

    /// Terminate the session.
    ///
    /// The remote call is best-effort; local state and persisted keys are
    /// always cleared, so logout never fails from the caller's view.
    pub async fn logout(&self) {
        let token = {
            let state = lock(&self.state);
            if state.user.is_some() {
                state.token.clone()
            } else {
                None
            }
        };

        if let Some(token) = token {
            if let Err(e) = self.auth.logout(&token).await {
                warn!(error = %e, "Remote logout failed; clearing local session anyway");
            }
        }

        self.discard(AUTH_TOKEN_KEY);
        self.discard(USER_KEY);
        {
            let mut state = lock(&self.state);
            state.user = None;
            state.token = None;
        }
        self.stop_expiry_watcher();
        info!("Session cleared");
    }

    /// Replace the user record in memory and in storage.
    ///
    /// The token is untouched.
    pub fn update_user(&self, user: User) {
        self.persist_user(&user);
        lock(&self.state).user = Some(user);
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Restore a persisted session, revalidating it against the server.
    ///
    /// Call once after construction. On anything short of a confirmed
    /// valid token - absent keys, corrupt user blob, verification failure,
    /// network error - the persisted keys are purged and the session stays
    /// unauthenticated. `loading` drops to false on every exit path.
    pub async fn hydrate(&self) {
        let _loading = LoadingGuard::acquire(&self.state);

        let token = self.fetch(AUTH_TOKEN_KEY);
        let stored_user = self
            .fetch(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt persisted user");
                    None
                }
            });

        let (token, stored_user) = match (token, stored_user) {
            (Some(token), Some(user)) => (token, user),
            _ => {
                // Incomplete or corrupt pair: purge whatever is left
                self.discard(AUTH_TOKEN_KEY);
                self.discard(USER_KEY);
                debug!("No persisted session to restore");
                return;
            }
        };

        match self.auth.verify(&token).await {
            Ok(verification) if verification.valid => {
                // Prefer the server's copy of the user when the response
                // carries one
                let user = verification.user.unwrap_or(stored_user);
                self.persist_user(&user);
                {
                    let mut state = lock(&self.state);
                    state.token = Some(token);
                    state.user = Some(user);
                }
                self.start_expiry_watcher();
                info!("Session restored");
            }
            Ok(_) => {
                info!("Persisted token rejected by server; clearing session");
                self.discard(AUTH_TOKEN_KEY);
                self.discard(USER_KEY);
            }
            Err(e) => {
                warn!(error = %e, "Session verification failed; clearing session");
                self.discard(AUTH_TOKEN_KEY);
                self.discard(USER_KEY);
            }
        }
    }

    // =========================================================================
    // Expiry watcher
    // =========================================================================

    /// Spawn the periodic expiry check if it is not already running.
    fn start_expiry_watcher(&self) {
        let mut slot = self.watcher.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return;
        }

        let store = self.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EXPIRY_CHECK_INTERVAL);
            // The first interval tick fires immediately; consume it so the
            // first real check happens one period after session start
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !store.run_expiry_check().await {
                    break;
                }
            }
        }));
        debug!("Expiry watcher started");
    }

    /// Tear down the store's background work without touching session
    /// state.
    ///
    /// For application shutdown; `logout` already stops the watcher during
    /// normal session transitions.
    pub fn shutdown(&self) {
        self.stop_expiry_watcher();
    }

    /// Abort the watcher task, if any.
    fn stop_expiry_watcher(&self) {
        let handle = self
            .watcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("Expiry watcher stopped");
        }
    }

    /// One expiry check.
    ///
    /// Returns false when the watcher should stop, either because the
    /// session already ended or because this check ended it. Absent and
    /// undecodable tokens are treated the same as expired ones.
    async fn run_expiry_check(&self) -> bool {
        let token = {
            let state = lock(&self.state);
            if state.user.is_none() {
                return false;
            }
            state.token.clone()
        };

        let expired = token.map(|t| token::is_expired(&t)).unwrap_or(true);
        if expired {
            info!("Session token expired; logging out");
            self.logout().await;
            return false;
        }
        true
    }

    // =========================================================================
    // Storage helpers
    // =========================================================================

    fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.persist(USER_KEY, &json),
            Err(e) => warn!(error = %e, "Failed to encode user for storage"),
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.kv.set(key, value) {
            warn!(key, error = %e, "Failed to persist value");
        }
    }

    fn fetch(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted value");
                None
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.kv.remove(key) {
            warn!(key, error = %e, "Failed to remove persisted value");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
