//! Redis-backed [`TokenStore`] used in production.

// crates.io
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenKey, TokenStore, ttl_seconds},
};

/// Store over a shared Redis connection manager.
///
/// Writes with a TTL use `SETEX`, writes without one use `SET`. There is no in-process cache;
/// every read goes to Redis. Clones share the underlying connection, which is released when the
/// last clone is dropped.
#[derive(Clone)]
pub struct RedisStore {
	connection: ConnectionManager,
}
impl RedisStore {
	/// Opens a managed connection to the server at `url` (e.g. `redis://host:6379`).
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = Client::open(url)?;
		let connection = ConnectionManager::new(client).await?;

		Ok(Self { connection })
	}

	/// Wraps an existing connection manager.
	pub fn from_connection(connection: ConnectionManager) -> Self {
		Self { connection }
	}
}
impl Debug for RedisStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisStore").finish_non_exhaustive()
	}
}
impl TokenStore for RedisStore {
	fn set<'a>(
		&'a self,
		key: &'a TokenKey,
		value: &'a str,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		let mut connection = self.connection.clone();

		Box::pin(async move {
			match ttl_seconds(ttl) {
				Some(secs) => connection.set_ex::<_, _, ()>(key.as_str(), value, secs).await?,
				None => connection.set::<_, _, ()>(key.as_str(), value).await?,
			}

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a TokenKey) -> StoreFuture<'a, Option<String>> {
		let mut connection = self.connection.clone();

		Box::pin(async move { Ok(connection.get::<_, Option<String>>(key.as_str()).await?) })
	}
}

impl From<RedisError> for StoreError {
	fn from(e: RedisError) -> Self {
		Self::Unavailable { message: e.to_string() }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::env;
	// self
	use super::*;
	use crate::{auth::UserId, store::MAX_TTL_SECONDS};

	async fn live_store() -> RedisStore {
		let url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());

		RedisStore::connect(&url).await.expect("Redis at REDIS_URL should accept connections.")
	}

	async fn remaining_ttl(store: &RedisStore, key: &TokenKey) -> i64 {
		store
			.connection
			.clone()
			.ttl::<_, i64>(key.as_str())
			.await
			.expect("TTL lookup should succeed.")
	}

	#[tokio::test]
	#[ignore = "needs a Redis server at REDIS_URL"]
	async fn setex_and_set_round_trip() {
		let store = live_store().await;
		let key =
			TokenKey::for_user(&UserId::new("redis-it").expect("User fixture should be valid."));

		store
			.set(&key, "with-ttl", Some(Duration::hours(1)))
			.await
			.expect("SETEX should succeed.");

		assert_eq!(
			store.get(&key).await.expect("GET should succeed.").as_deref(),
			Some("with-ttl")
		);
		assert!((3590..=3600).contains(&remaining_ttl(&store, &key).await));

		store.set(&key, "no-ttl", None).await.expect("SET should succeed.");

		assert_eq!(
			store.get(&key).await.expect("GET should succeed.").as_deref(),
			Some("no-ttl")
		);
		assert_eq!(remaining_ttl(&store, &key).await, -1);

		store
			.set(&key, "huge-ttl", Some(Duration::seconds(i64::MAX / 2)))
			.await
			.expect("Huge TTLs should be capped rather than rejected.");

		let capped = remaining_ttl(&store, &key).await;

		assert!(capped > 0 && capped as u64 <= MAX_TTL_SECONDS);

		store
			.connection
			.clone()
			.del::<_, ()>(key.as_str())
			.await
			.expect("Cleanup should succeed.");
	}

	#[tokio::test]
	async fn malformed_urls_fail_before_connecting() {
		let err = RedisStore::connect("definitely not a redis url")
			.await
			.expect_err("Malformed connection strings must be rejected.");

		assert!(matches!(err, StoreError::Unavailable { .. }));
	}
}
