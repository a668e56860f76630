//! Session-aware REST client core for the turf booking admin dashboard.
//!
//! ARCHITECTURE
//! ============
//! `net` builds and sends credentialed requests and recovers from one expired
//! session per call. `state` tracks who is signed in and drives login/logout
//! navigation. `util` turns session state into route-guard decisions.

pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

pub use config::AdminConfig;
pub use error::{ApiError, AuthError};
pub use net::api::ApiClient;
pub use net::types::AdminUser;
pub use state::auth::{AuthContext, AuthPhase, AuthProvider, AuthSnapshot};
pub use state::navigator::{Navigator, RecordingNavigator, TracingNavigator};
