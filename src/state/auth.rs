//! Auth-session state for the signed-in administrator.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthProvider` owns the only writable copy of the session phase. Screens
//! and route guards obtain an `AuthContext` from a mounted provider and read
//! or subscribe to the phase through it.
//!
//! STATE MACHINE
//! =============
//! `Uninitialized -> Checking` once, on mount. The check lands in
//! `Authenticated` or `Unauthenticated`. A successful login passes through
//! `Navigating` until the next route change; logout always ends in
//! `Unauthenticated` on the login route, and any move to a signed-out phase
//! cancels a dashboard navigation that has not fired yet. Every network
//! failure resolves to a defined phase.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::Method;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::navigator::{DASHBOARD_PATH, LOGIN_PATH, Navigator};
use crate::config::{ADMIN_LOGIN_PATH, ADMIN_LOGOUT_PATH, ADMIN_SESSION_PATH, AdminConfig};
use crate::error::{ApiError, AuthError};
use crate::net::api::ApiClient;
use crate::net::request::{RequestBody, RequestOptions};
use crate::net::types::{AdminUser, ErrorPayload, LoginPayload, LoginRequest, SessionPayload};

pub const DEFAULT_LOGIN_ERROR: &str = "Login failed";

/// Where the session currently stands. Exactly one phase holds at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthPhase {
    /// Provider not mounted yet.
    #[default]
    Uninitialized,
    /// Session validation in flight.
    Checking,
    Authenticated(AdminUser),
    Unauthenticated,
    /// Logged in; waiting for the dashboard route to take over.
    Navigating(AdminUser),
}

impl AuthPhase {
    #[must_use]
    pub fn user(&self) -> Option<&AdminUser> {
        match self {
            Self::Authenticated(user) | Self::Navigating(user) => Some(user),
            Self::Uninitialized | Self::Checking | Self::Unauthenticated => None,
        }
    }

    /// Protected UI shows a loading view instead of content or a redirect.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Checking | Self::Navigating(_))
    }
}

/// The `{ user, is_loading }` view most consumers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<AdminUser>,
    pub is_loading: bool,
}

impl From<&AuthPhase> for AuthSnapshot {
    fn from(phase: &AuthPhase) -> Self {
        Self { user: phase.user().cloned(), is_loading: phase.is_loading() }
    }
}

struct SessionInner {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    navigation_delay: Duration,
    phase: watch::Sender<AuthPhase>,
    mounted: AtomicBool,
    current_path: Mutex<Option<String>>,
    /// Delayed post-login navigation, if one has not fired yet.
    pending_navigation: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn set_phase(&self, next: AuthPhase) {
        // Only a session that is still signed in may reach the dashboard.
        if !matches!(next, AuthPhase::Navigating(_) | AuthPhase::Authenticated(_)) {
            self.cancel_navigation();
        }
        tracing::debug!(phase = ?next, "auth phase changed");
        self.phase.send_replace(next);
    }

    /// Validate the ambient session and settle into a definite phase.
    async fn check_session(&self) {
        let url = self.api.build_url(ADMIN_SESSION_PATH);
        let outcome = self.api.fetch().fetch_exempt(&url, RequestOptions::new(Method::POST)).await;
        let next = match outcome {
            Ok(response) if response.ok() => match response.json::<SessionPayload>() {
                Ok(payload) => payload.into_user().map_or(AuthPhase::Unauthenticated, AuthPhase::Authenticated),
                Err(e) => {
                    tracing::warn!(error = %e, "session payload unreadable");
                    AuthPhase::Unauthenticated
                }
            },
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "no valid session");
                AuthPhase::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "session check failed");
                AuthPhase::Unauthenticated
            }
        };
        self.set_phase(next);
    }

    fn schedule_navigation(&self, path: &'static str) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.navigation_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(path);
        });
        let previous = self
            .pending_navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_navigation(&self) {
        let pending = self.pending_navigation.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = pending {
            tracing::debug!("pending navigation cancelled");
            handle.abort();
        }
    }

    fn set_current_path(&self, path: &str) {
        *self.current_path.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_owned());
    }
}

/// Owner of the session state. Clones share the same state.
#[derive(Clone)]
pub struct AuthProvider {
    inner: Arc<SessionInner>,
}

impl AuthProvider {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>, navigation_delay: Duration) -> Self {
        let (phase, _) = watch::channel(AuthPhase::Uninitialized);
        let inner = SessionInner {
            api,
            navigator,
            navigation_delay,
            phase,
            mounted: AtomicBool::new(false),
            current_path: Mutex::new(None),
            pending_navigation: Mutex::new(None),
        };
        Self { inner: Arc::new(inner) }
    }

    /// Provider over the production transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &AdminConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let api = ApiClient::from_config(config)?;
        Ok(Self::new(api, navigator, config.navigation_delay))
    }

    /// Run the mount-time session check. Only the first call checks.
    pub async fn mount(&self) -> AuthContext {
        if !self.inner.mounted.swap(true, Ordering::SeqCst) {
            self.inner.set_phase(AuthPhase::Checking);
            self.inner.check_session().await;
        }
        AuthContext { inner: Arc::clone(&self.inner) }
    }

    /// Access the session from a consumer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotMounted` before `mount` has been called.
    pub fn use_auth(&self) -> Result<AuthContext, AuthError> {
        if self.inner.mounted.load(Ordering::SeqCst) {
            Ok(AuthContext { inner: Arc::clone(&self.inner) })
        } else {
            Err(AuthError::NotMounted)
        }
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.phase.borrow().clone()
    }
}

/// Consumer handle onto a mounted provider.
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<SessionInner>,
}

impl AuthContext {
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.phase.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<AdminUser> {
        self.inner.phase.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.phase.borrow().is_loading()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot::from(&*self.inner.phase.borrow())
    }

    /// Receive every subsequent phase change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthPhase> {
        self.inner.phase.subscribe()
    }

    /// The session-aware REST client, for screens.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Last path reported through `on_route_change`.
    #[must_use]
    pub fn current_path(&self) -> Option<String> {
        self.inner
            .current_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sign in and schedule the move to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LoginRejected` with the backend's message when the
    /// credentials are refused, or a transport/decode error. The phase is
    /// left untouched on every error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let body = RequestBody::json(&LoginRequest { email, password })?;
        let url = self.inner.api.build_url(ADMIN_LOGIN_PATH);
        let response = self
            .inner
            .api
            .fetch()
            .fetch_exempt(&url, RequestOptions::new(Method::POST).body(body))
            .await?;

        if !response.ok() {
            let message = response
                .json::<ErrorPayload>()
                .ok()
                .and_then(ErrorPayload::into_message)
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_owned());
            tracing::info!(status = response.status().as_u16(), "login rejected");
            return Err(AuthError::LoginRejected(message));
        }

        let admin = response
            .json::<LoginPayload>()?
            .admin
            .ok_or(AuthError::MalformedLogin)?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "admin logged in");
        // Login happens on the login screen; a host that never reported it
        // must not end `Navigating` by reporting it now.
        self.inner
            .current_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(|| LOGIN_PATH.to_owned());
        self.inner.set_phase(AuthPhase::Navigating(admin.clone()));
        self.inner.schedule_navigation(DASHBOARD_PATH);
        Ok(admin)
    }

    /// Best-effort server logout, then local sign-out and a move to login.
    ///
    /// The login route is recorded before the phase is published, so route
    /// guards watching the phase do not redirect a second time.
    pub async fn logout(&self) {
        let url = self.inner.api.build_url(ADMIN_LOGOUT_PATH);
        match self.inner.api.fetch().fetch_exempt(&url, RequestOptions::new(Method::POST)).await {
            Ok(response) if response.ok() => {}
            Ok(response) => tracing::warn!(status = response.status().as_u16(), "logout request rejected"),
            Err(e) => tracing::warn!(error = %e, "logout request failed"),
        }
        self.inner.set_current_path(LOGIN_PATH);
        self.inner.set_phase(AuthPhase::Unauthenticated);
        self.inner.navigator.navigate(LOGIN_PATH);
    }

    /// Re-run session validation without going through `Navigating`.
    pub async fn refresh_user(&self) {
        self.inner.check_session().await;
    }

    /// Report the current route. A change of path ends `Navigating` and
    /// touches nothing else.
    pub fn on_route_change(&self, path: &str) {
        {
            let mut current = self.inner.current_path.lock().unwrap_or_else(PoisonError::into_inner);
            if current.as_deref() == Some(path) {
                return;
            }
            *current = Some(path.to_owned());
        }
        self.inner.phase.send_if_modified(|phase| {
            let AuthPhase::Navigating(user) = &*phase else {
                return false;
            };
            let user = user.clone();
            *phase = AuthPhase::Authenticated(user);
            true
        });
    }
}
