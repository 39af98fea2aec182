//! Best-effort TTL cache for analysis artifacts.
//!
//! Backed by redis when `REDIS_URL` is configured, an in-process map
//! otherwise. The pipeline never depends on the cache for correctness: every
//! failure — connection refused, serialization, decode — degrades to a miss
//! (on get) or a no-op (on set) with a warning, never an error.
//!
//! Cached here: company intel keyed by a digest of the company name, and the
//! public analysis result plus rendered reports keyed by analysis id.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

pub fn company_intel_key(company: &str) -> String {
    let digest = Sha256::digest(company.trim().to_lowercase().as_bytes());
    format!("intel:{digest:x}")
}

pub fn result_key(analysis_id: Uuid) -> String {
    format!("analysis:{analysis_id}")
}

pub fn report_key(analysis_id: Uuid, kind: &str) -> String {
    format!("report:{analysis_id}:{kind}")
}

/// Company intel rarely changes; keep it for a day.
pub const COMPANY_INTEL_TTL: Duration = Duration::from_secs(86_400);

pub struct AnalysisCache {
    redis: Option<redis::Client>,
    memory: Mutex<HashMap<String, (String, Instant)>>,
}

impl AnalysisCache {
    /// Opens the cache. An unparseable redis URL downgrades to memory mode
    /// rather than failing startup.
    pub fn connect(redis_url: Option<&str>) -> Self {
        let redis = match redis_url {
            Some(url) => match redis::Client::open(url) {
                Ok(client) => {
                    info!("Analysis cache: redis at {url}");
                    Some(client)
                }
                Err(e) => {
                    warn!("Invalid REDIS_URL ({e}); analysis cache falling back to memory");
                    None
                }
            },
            None => {
                info!("Analysis cache: in-process memory (REDIS_URL not set)");
                None
            }
        };

        Self {
            redis,
            memory: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match &self.redis {
            Some(client) => self.redis_get(client, key).await?,
            None => self.memory_get(key)?,
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cache entry {key} failed to decode: {e}");
                None
            }
        }
    }

    /// Returns whether the value was stored. A `false` is informational only.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!("Cache value for {key} failed to serialize: {e}");
                return false;
            }
        };

        match &self.redis {
            Some(client) => self.redis_set(client, key, payload, ttl).await,
            None => {
                self.memory_set(key, payload, ttl);
                true
            }
        }
    }

    async fn redis_get(&self, client: &redis::Client, key: &str) -> Option<String> {
        use redis::AsyncCommands;

        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Cache unavailable, treating {key} as a miss: {e}");
                return None;
            }
        };

        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache GET {key} failed: {e}");
                None
            }
        }
    }

    async fn redis_set(
        &self,
        client: &redis::Client,
        key: &str,
        payload: String,
        ttl: Duration,
    ) -> bool {
        use redis::AsyncCommands;

        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Cache unavailable, dropping write for {key}: {e}");
                return false;
            }
        };

        match conn
            .set_ex::<_, _, ()>(key, payload, ttl.as_secs())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache SET {key} failed: {e}");
                false
            }
        }
    }

    fn memory_get(&self, key: &str) -> Option<String> {
        let mut map = self.memory.lock().ok()?;
        match map.get(key) {
            Some((payload, expires_at)) if *expires_at > Instant::now() => Some(payload.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    fn memory_set(&self, key: &str, payload: String, ttl: Duration) {
        if let Ok(mut map) = self.memory.lock() {
            map.insert(key.to_string(), (payload, Instant::now() + ttl));
        }
    }
}
