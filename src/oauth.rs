//! Hand-rolled OAuth 2.0 / OpenID Connect protocol calls.
//!
//! The stock authorization-code helpers always target the hosted login page, while the
//! sign-up flow needs the hosted sign-up page and must tell a provider rejection (HTTP 401)
//! apart from a transport failure. The pieces live here:
//!
//! - `authorize` builds the sign-up redirect URL.
//! - `token` exchanges an authorization code for tokens.
//! - `userinfo` fetches the authenticated user's claims.

pub mod authorize;
pub mod token;
pub mod userinfo;

pub use authorize::*;
pub use token::*;
pub use userinfo::*;

pub use oauth2;
