//! Provider identity and metadata discovery.
//!
//! `id` exposes the validated [`ProviderId`] used for messages and environment variable
//! names. `discovery` fetches the OpenID Connect discovery document of a Cognito user pool
//! and turns it into [`ProviderMetadata`]; `cache` offers an opt-in, short-lived cache of
//! that metadata keyed by issuer.

pub mod cache;
pub mod discovery;
pub mod id;

pub use cache::*;
pub use discovery::*;
pub use id::*;
