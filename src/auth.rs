//! Client identity, redacted secrets, cached credentials, and the authenticator that keeps one
//! valid bearer token available to rate clients.

pub mod authenticator;
pub mod cache;
pub mod credential;
pub mod id;
pub mod secret;

pub use authenticator::*;
pub use cache::*;
pub use credential::*;
pub use id::*;
pub use secret::*;
