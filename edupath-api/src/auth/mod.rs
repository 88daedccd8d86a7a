//! Access control
//!
//! External ID tokens are exchanged for local session tokens; protected routes
//! resolve the session to an active user.

pub mod identity;
pub mod middleware;
pub mod session;

pub use identity::{ExternalIdentity, FirebaseVerifier, IdentityVerifier};
pub use middleware::{require_session, CurrentUser};
pub use session::{SessionClaims, SessionIssuer};
