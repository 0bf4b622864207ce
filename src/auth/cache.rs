//! Single-slot, thread-safe credential cache.

// self
use crate::{_prelude::*, auth::Credential};

/// Holds at most one [`Credential`]; reads never wait on network I/O.
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<Option<Credential>>);
impl TokenCache {
	/// Returns the cached credential when it is fresh at `instant` given `buffer`.
	pub fn fresh_at(&self, instant: OffsetDateTime, buffer: Duration) -> Option<Credential> {
		self.0.read().as_ref().filter(|credential| credential.is_fresh_at(instant, buffer)).cloned()
	}

	/// Returns the cached credential regardless of freshness.
	pub fn snapshot(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	/// Replaces the cached credential.
	pub fn put(&self, credential: Credential) {
		*self.0.write() = Some(credential);
	}

	/// Empties the cache; returns whether a credential was present.
	pub fn clear(&self) -> bool {
		self.0.write().take().is_some()
	}
}
