//! Async client for a user-management REST backend.
//!
//! The crate covers three collaborating pieces: a [`repositories::session::SessionStore`]
//! that persists the authentication token and cached directory snapshots in durable
//! local storage, an auth gateway ([`services::auth`]) that logs in against the backend
//! and decides from the decoded token whether the session is still valid, and a request
//! authorizer ([`middleware_layer::auth`]) that attaches the stored token to every
//! outgoing call. Directory CRUD lives in [`services::users`].
//!
//! Tokens are decoded locally without signature verification; the backend re-verifies
//! the signature on every authorized request.

pub mod config;
pub mod error;
pub mod state;
pub mod token;

pub mod models {
    pub mod response;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod store;
}

pub mod services {
    pub mod auth;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
