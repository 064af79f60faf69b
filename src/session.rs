//! Session collaborator contract and the minimal record the flow hands to it.
//!
//! Sessions usually end up encrypted in a cookie, which caps them at a few kilobytes. The
//! sign-up flow therefore stores only `preferred_username`, `email`, and the access token; the
//! login flow stores the user fields plus `email_verified` and the login time. Either way the
//! serialized size is checked before the record is handed over.

pub mod memory;

pub use memory::MemorySessionStore;

// self
use crate::{
	_prelude::*,
	flows::SignupRequest,
	oauth::{TokenSet, UserProfile},
	secret::Secret,
};

/// Size ceiling applied to serialized session records by default.
pub const DEFAULT_SESSION_LIMIT: usize = 4096;

/// Future returned by [`SessionWriter`] implementations.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// The "set session" collaborator: persists the record for the requesting user.
pub trait SessionWriter
where
	Self: Send + Sync,
{
	/// Persists `record` for the user behind `request`, replacing any previous session.
	fn set_user_session<'a>(
		&'a self,
		request: &'a SignupRequest,
		record: SessionRecord,
	) -> SessionFuture<'a, ()>;
}

/// Error type produced around [`SessionWriter`] calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// The serialized record exceeds the storage ceiling.
	#[error("Session record is {size} bytes, above the {limit} byte limit.")]
	TooLarge {
		/// Serialized size in bytes.
		size: usize,
		/// Configured ceiling in bytes.
		limit: usize,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Public part of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
	/// Username chosen at sign-up.
	pub preferred_username: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Whether the email address was verified; recorded by the login flow only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email_verified: Option<bool>,
}

/// Server-only part of the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureSessionData {
	/// Access token for calls made on the user's behalf.
	pub access_token: Secret,
}

/// Minimal session written after a successful sign-up or login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
	/// Public user fields.
	pub user: SessionUser,
	/// Server-only fields; absent for login sessions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secure: Option<SecureSessionData>,
	/// When the login completed, as RFC 3339.
	#[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
	pub logged_in_at: Option<OffsetDateTime>,
}
impl SessionRecord {
	/// Picks the sign-up fields out of a profile and token set.
	pub fn minimal(profile: &UserProfile, tokens: &TokenSet) -> Self {
		Self {
			user: SessionUser {
				preferred_username: profile.preferred_username.clone(),
				email: profile.email.clone(),
				email_verified: None,
			},
			secure: Some(SecureSessionData { access_token: tokens.access_token.clone() }),
			logged_in_at: None,
		}
	}

	/// Picks the login fields out of a profile, stamped with `now`.
	pub fn login(profile: &UserProfile, now: OffsetDateTime) -> Self {
		Self {
			user: SessionUser {
				preferred_username: profile.preferred_username.clone(),
				email: profile.email.clone(),
				email_verified: profile.email_verified,
			},
			secure: None,
			logged_in_at: Some(now),
		}
	}

	/// Serialized size in bytes (JSON, before any encryption by the collaborator).
	pub fn encoded_len(&self) -> Result<usize, SessionError> {
		serde_json::to_vec(self)
			.map(|bytes| bytes.len())
			.map_err(|e| SessionError::Serialization { message: e.to_string() })
	}

	/// Fails when the serialized record exceeds `limit` bytes.
	pub fn ensure_within(&self, limit: usize) -> Result<(), SessionError> {
		let size = self.encoded_len()?;

		if size > limit { Err(SessionError::TooLarge { size, limit }) } else { Ok(()) }
	}
}
