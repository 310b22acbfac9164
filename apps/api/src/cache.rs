//! Query cache: serves a stored result until its staleness window expires,
//! then refetches. Entries are JSON in Redis with a TTL equal to the window.
//! Redis trouble never fails a request; it only costs a direct fetch.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

const KEY_PREFIX: &str = "jobpilot";

/// Colon-separated cache key, e.g. `jobpilot:dashboard-stats:<user>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(scope: &str) -> Self {
        Self(format!("{KEY_PREFIX}:{scope}"))
    }

    pub fn part(mut self, part: impl fmt::Display) -> Self {
        self.0.push(':');
        self.0.push_str(&part.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct QueryCache {
    client: redis::Client,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(client: redis::Client, stale_time: Duration) -> Self {
        Self { client, stale_time }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    /// A zero staleness window disables caching.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if self.stale_time.is_zero() {
            return fetch().await;
        }

        match self.read::<T>(key).await {
            Ok(Some(hit)) => {
                debug!("Query cache hit for {key}");
                return Ok(hit);
            }
            Ok(None) => debug!("Query cache miss for {key}"),
            Err(e) => warn!("Query cache read failed for {key}: {e}"),
        }

        let value = fetch().await?;

        if let Err(e) = self.write(key, &value).await {
            warn!("Query cache write failed for {key}: {e}");
        }
        Ok(value)
    }

    async fn read<T: DeserializeOwned>(&self, key: &QueryKey) -> redis::RedisResult<Option<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut conn)
            .await?;
        // A payload that no longer deserializes is treated as a miss.
        Ok(raw.and_then(|r| serde_json::from_str(&r).ok()))
    }

    async fn write<T: Serialize>(&self, key: &QueryKey, value: &T) -> redis::RedisResult<()> {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Query result for {key} is not serializable: {e}");
                return Ok(());
            }
        };
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(self.stale_time.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_key_joins_parts() {
        let key = QueryKey::new("jobs").part("page").part(2);
        assert_eq!(key.as_str(), "jobpilot:jobs:page:2");
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_fetches() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let cache = QueryCache::new(client, Duration::ZERO);
        let key = QueryKey::new("dashboard-stats");

        let first: u32 = cache.fetch(&key, || async { Ok(1) }).await.unwrap();
        let second: u32 = cache.fetch(&key, || async { Ok(2) }).await.unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_fetch() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let cache = QueryCache::new(client, Duration::from_secs(60));
        let key = QueryKey::new("jobs").part("p1");

        let value: Vec<String> = cache
            .fetch(&key, || async { Ok(vec!["fresh".to_string()]) })
            .await
            .unwrap();
        assert_eq!(value, vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_returned() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let cache = QueryCache::new(client, Duration::ZERO);
        let result: Result<u32, AppError> = cache
            .fetch(&QueryKey::new("x"), || async {
                Err(AppError::Backend("boom".to_string()))
            })
            .await;
        assert!(matches!(result, Err(AppError::Backend(_))));
    }
}
