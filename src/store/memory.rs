//! Thread-safe in-memory [`TokenStore`] with TTL support, for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{Clock, StoreFuture, SystemClock, TokenKey, TokenStore, ttl_seconds},
};

type StoreMap = Arc<RwLock<HashMap<TokenKey, Entry>>>;

#[derive(Clone, Debug)]
struct Entry {
	value: String,
	expires_at: Option<OffsetDateTime>,
}
impl Entry {
	fn is_live_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expires_at| now < expires_at)
	}
}

/// In-process store; expiry is evaluated lazily against the injected [`Clock`].
#[derive(Clone, Debug)]
pub struct MemoryStore {
	entries: StoreMap,
	clock: Arc<dyn Clock>,
}
impl MemoryStore {
	/// Creates an empty store driven by `clock`.
	pub fn with_clock(clock: impl 'static + Clock) -> Self {
		Self { entries: Default::default(), clock: Arc::new(clock) }
	}

	/// Number of entries held, including expired ones not yet evicted by a read.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether the store holds no entries at all.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn set_now(&self, key: &TokenKey, value: &str, ttl: Option<Duration>) {
		// An expiry past the last representable instant is kept as no expiry.
		let expires_at = ttl_seconds(ttl)
			.and_then(|secs| i64::try_from(secs).ok())
			.and_then(|secs| self.clock.now().checked_add(Duration::seconds(secs)));

		self.entries.write().insert(key.clone(), Entry { value: value.to_owned(), expires_at });
	}

	fn get_now(&self, key: &TokenKey) -> Option<String> {
		let now = self.clock.now();

		if let Some(entry) = self.entries.read().get(key) {
			if entry.is_live_at(now) {
				return Some(entry.value.clone());
			}
		} else {
			return None;
		}

		let mut guard = self.entries.write();

		// Re-check under the write lock; a writer may have replaced the entry meanwhile.
		match guard.get(key) {
			Some(entry) if entry.is_live_at(now) => Some(entry.value.clone()),
			Some(_) => {
				guard.remove(key);

				None
			},
			None => None,
		}
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::with_clock(SystemClock)
	}
}
impl TokenStore for MemoryStore {
	fn set<'a>(
		&'a self,
		key: &'a TokenKey,
		value: &'a str,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.set_now(key, value, ttl);

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a TokenKey) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.get_now(key)) })
	}
}
