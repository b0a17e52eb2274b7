//! Token store contract and built-in backends for per-user access tokens.

pub mod clock;
pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use clock::*;
pub use memory::MemoryStore;
#[cfg(feature = "redis")] pub use self::redis::RedisStore;

// self
use crate::{_prelude::*, auth::UserId};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key-value medium holding access tokens.
///
/// Implementations provide single-key atomic reads and writes and perform no retries; callers
/// decide what a failure means.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Writes `value` under `key`, replacing any previous value.
	///
	/// With a `ttl`, the entry disappears once it elapses; without one (or with a TTL shorter
	/// than one second) the entry never expires. TTLs beyond [`MAX_TTL_SECONDS`] are capped.
	fn set<'a>(
		&'a self,
		key: &'a TokenKey,
		value: &'a str,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()>;

	/// Reads the value under `key`; expired and missing entries both read as `None`.
	fn get<'a>(&'a self, key: &'a TokenKey) -> StoreFuture<'a, Option<String>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The medium could not be reached or rejected the command.
	#[error("Token store unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
}

/// Store key of a user's access token: `polar_access_token:<user_id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenKey(String);
impl TokenKey {
	/// Prefix shared by every access token key.
	pub const PREFIX: &'static str = "polar_access_token:";

	/// Key for `user_id`'s access token.
	pub fn for_user(user_id: &UserId) -> Self {
		Self(format!("{}{user_id}", Self::PREFIX))
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for TokenKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Longest TTL handed to a backend (100 years); longer lifetimes are capped to it.
pub const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Whole seconds of a TTL capped at [`MAX_TTL_SECONDS`], or `None` when the entry should never
/// expire.
pub(crate) fn ttl_seconds(ttl: Option<Duration>) -> Option<u64> {
	ttl.and_then(|ttl| u64::try_from(ttl.whole_seconds()).ok())
		.filter(|secs| *secs > 0)
		.map(|secs| secs.min(MAX_TTL_SECONDS))
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_bridge_error_with_source() {
		let store_error = StoreError::Unavailable { message: "connection refused".into() };
		let bridge_error: Error = store_error.clone().into();

		assert!(matches!(bridge_error, Error::Storage(_)));
		assert!(bridge_error.to_string().contains("connection refused"));
		assert_eq!(bridge_error.status_code(), 500);

		let source = StdError::source(&bridge_error)
			.expect("Bridge error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn token_key_uses_the_access_token_prefix() {
		let user = UserId::new("12345").expect("User fixture should be valid.");

		assert_eq!(TokenKey::for_user(&user).as_str(), "polar_access_token:12345");
	}

	#[test]
	fn ttl_seconds_drops_sub_second_and_negative_values() {
		assert_eq!(ttl_seconds(None), None);
		assert_eq!(ttl_seconds(Some(Duration::seconds(3600))), Some(3600));
		assert_eq!(ttl_seconds(Some(Duration::milliseconds(500))), None);
		assert_eq!(ttl_seconds(Some(Duration::seconds(-5))), None);
	}

	#[test]
	fn ttl_seconds_caps_huge_lifetimes() {
		assert_eq!(ttl_seconds(Some(Duration::seconds(i64::MAX))), Some(MAX_TTL_SECONDS));
		assert_eq!(ttl_seconds(Some(Duration::MAX)), Some(MAX_TTL_SECONDS));
	}
}
