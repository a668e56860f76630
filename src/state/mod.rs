//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` holds the session state machine; `navigator` is the seam through
//! which it asks the host to change routes.

pub mod auth;
pub mod navigator;
