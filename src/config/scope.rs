//! Ordered OAuth scope lists.

// self
use crate::_prelude::*;

/// Scopes requested when the configuration does not name any.
pub const DEFAULT_SIGNUP_SCOPES: [&str; 2] = ["openid", "profile"];

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Ordered, duplicate-free list of OAuth scopes.
///
/// Unlike a set, the order in which scopes were configured is preserved when the list is
/// joined into the `scope` query parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Creates a validated scope list, dropping later duplicates.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut list = Vec::new();

		for scope in scopes {
			let scope = scope.into();

			if scope.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if scope.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope });
			}
			if !list.contains(&scope) {
				list.push(scope);
			}
		}

		Ok(Self(list))
	}

	/// Leniently parses a delimited list (e.g. `openid,email`).
	///
	/// Entries are trimmed; empty entries and entries with inner whitespace are skipped so
	/// that configuration resolution never fails.
	pub fn from_delimited(raw: &str, delimiter: char) -> Self {
		Self::lenient(raw.split(delimiter))
	}

	/// Leniently builds a list from arbitrary strings, skipping invalid entries.
	pub fn lenient<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut list: Vec<String> = Vec::new();

		for scope in scopes {
			let scope = scope.as_ref().trim();

			if scope.is_empty() || scope.chars().any(char::is_whitespace) {
				continue;
			}
			if !list.iter().any(|existing| existing == scope) {
				list.push(scope.to_owned());
			}
		}

		Self(list)
	}

	/// Default sign-up scopes (`openid profile`).
	pub fn signup_default() -> Self {
		Self(DEFAULT_SIGNUP_SCOPES.iter().map(|scope| (*scope).to_owned()).collect())
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over scopes in configured order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Joins scopes with the provided delimiter.
	pub fn join(&self, delimiter: &str) -> String {
		self.0.join(delimiter)
	}
}
impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ScopeList> for Vec<String> {
	fn from(value: ScopeList) -> Self {
		value.0
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.join(" "))
	}
}
