//! Opt-in, short-lived cache of discovered provider metadata.
//!
//! Flows re-discover on every request unless a cache is attached. Entries expire after a
//! short TTL and are dropped whenever a call to a discovered endpoint fails, so a stale
//! endpoint is never trusted for longer than one failure.

// self
use crate::{
	_prelude::*,
	error::DiscoveryError,
	provider::{DiscoveryBase, ProviderMetadata},
};

/// Cache key: the issuer the metadata was discovered for.
///
/// The issuer already folds in the discovery base, region, and user pool, so flows pointed at
/// different hosts never share entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiscoveryKey {
	/// Issuer identifier.
	pub issuer: String,
}
impl DiscoveryKey {
	/// Wraps an issuer identifier.
	pub fn new(issuer: impl Into<String>) -> Self {
		Self { issuer: issuer.into() }
	}

	/// Derives the key of a user pool discovered through `base`.
	pub fn resolve(
		base: &DiscoveryBase,
		region: &str,
		user_pool_id: &str,
	) -> Result<Self, DiscoveryError> {
		base.issuer(region, user_pool_id).map(Self::new)
	}
}

#[derive(Clone, Debug)]
struct CachedMetadata {
	fetched_at: OffsetDateTime,
	metadata: Arc<ProviderMetadata>,
}

/// Thread-safe metadata cache with a fixed TTL.
#[derive(Debug)]
pub struct DiscoveryCache {
	ttl: Duration,
	entries: Mutex<HashMap<DiscoveryKey, CachedMetadata>>,
}
impl DiscoveryCache {
	/// TTL used by [`DiscoveryCache::default`].
	pub const DEFAULT_TTL: Duration = Duration::minutes(5);

	/// Creates an empty cache; negative TTLs are clamped to zero (caching disabled).
	pub fn new(ttl: Duration) -> Self {
		let ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		Self { ttl, entries: Default::default() }
	}

	/// Configured TTL.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Returns a fresh entry, evicting it if it has expired.
	pub fn get(&self, key: &DiscoveryKey, now: OffsetDateTime) -> Option<Arc<ProviderMetadata>> {
		let mut entries = self.entries.lock();

		match entries.get(key) {
			Some(entry) if now - entry.fetched_at < self.ttl => Some(entry.metadata.clone()),
			Some(_) => {
				entries.remove(key);

				None
			},
			None => None,
		}
	}

	/// Stores metadata fetched at `now`.
	pub fn insert(&self, key: DiscoveryKey, metadata: Arc<ProviderMetadata>, now: OffsetDateTime) {
		if self.ttl.is_zero() {
			return;
		}

		self.entries.lock().insert(key, CachedMetadata { fetched_at: now, metadata });
	}

	/// Drops the entry for `key`.
	pub fn invalidate(&self, key: &DiscoveryKey) {
		self.entries.lock().remove(key);
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}
}
impl Default for DiscoveryCache {
	fn default() -> Self {
		Self::new(Self::DEFAULT_TTL)
	}
}
