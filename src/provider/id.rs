//! Strongly typed provider identifier.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Provider identifier cannot be empty.")]
	Empty,
	/// The identifier contains characters outside `[A-Za-z0-9_-]`.
	#[error("Provider identifier contains an invalid character: {character:?}.")]
	InvalidCharacter {
		/// First offending character.
		character: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("Provider identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Identifier of the OAuth provider a flow talks to (e.g. `cognito`).
///
/// The identifier feeds environment variable names and user-facing messages, so it is
/// restricted to ASCII alphanumerics, `-`, and `_`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);
impl ProviderId {
	/// Identifier used for Cognito user pools.
	pub const COGNITO: &'static str = "cognito";

	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// The Cognito provider identifier.
	pub fn cognito() -> Self {
		Self(Self::COGNITO.to_owned())
	}

	/// Human-facing name with the first letter capitalized (`cognito` → `Cognito`).
	pub fn display_name(&self) -> String {
		let mut chars = self.0.chars();

		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		}
	}

	/// Upper-case form used inside environment variable names.
	pub fn env_segment(&self) -> String {
		self.0.to_ascii_uppercase().replace('-', "_")
	}
}
impl Deref for ProviderId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ProviderId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ProviderId> for String {
	fn from(value: ProviderId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for ProviderId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Default for ProviderId {
	fn default() -> Self {
		Self::cognito()
	}
}
impl Debug for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if let Some(character) =
		view.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
	{
		return Err(IdentifierError::InvalidCharacter { character });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
