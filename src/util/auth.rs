//! Shared route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected screens apply identical loading/redirect behavior, driven only
//! by the session phase and the route being shown.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::state::auth::{AuthContext, AuthPhase};
use crate::state::navigator::{LOGIN_PATH, Navigator};

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &["/", LOGIN_PATH];

/// What a screen should render for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Loading,
    Redirect(&'static str),
}

#[must_use]
pub fn is_protected_route(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { "/" } else { trimmed };
    !PUBLIC_ROUTES.contains(&normalized)
}

#[must_use]
pub fn should_redirect_unauth(phase: &AuthPhase) -> bool {
    matches!(phase, AuthPhase::Unauthenticated)
}

#[must_use]
pub fn guard_decision(phase: &AuthPhase, path: &str) -> GuardDecision {
    // The post-login transition covers every route, including /login itself.
    if matches!(phase, AuthPhase::Navigating(_)) {
        return GuardDecision::Loading;
    }
    if !is_protected_route(path) {
        return GuardDecision::Render;
    }
    match phase {
        AuthPhase::Authenticated(_) => GuardDecision::Render,
        AuthPhase::Unauthenticated => GuardDecision::Redirect(LOGIN_PATH),
        AuthPhase::Uninitialized | AuthPhase::Checking | AuthPhase::Navigating(_) => GuardDecision::Loading,
    }
}

/// Redirect to `/login` whenever the session settles unauthenticated while a
/// protected route (or an unreported one) is showing.
pub fn install_unauth_redirect(ctx: &AuthContext, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
    let ctx = ctx.clone();
    let mut rx = ctx.subscribe();
    tokio::spawn(async move {
        loop {
            let redirect = should_redirect_unauth(&rx.borrow_and_update());
            if redirect && ctx.current_path().is_none_or(|p| is_protected_route(&p)) {
                tracing::debug!("unauthenticated on protected route; redirecting");
                navigator.navigate(LOGIN_PATH);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
