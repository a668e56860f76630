//! Helpers shared by admin screens.

pub mod auth;
