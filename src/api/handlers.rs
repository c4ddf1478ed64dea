//! API Handlers
//!
//! HTTP request handlers for each cache host endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{
    shared, AdvancedCache, CacheStats, FileBackend, PersistenceBackend, SharedCache,
};
use crate::clock::system_clock;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{GetResponse, HasResponse, HealthResponse, MessageResponse, SetRequest};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared JSON-valued cache
    pub cache: SharedCache<Value>,
}

impl AppState {
    pub fn new(cache: AdvancedCache<Value>) -> Self {
        Self {
            cache: shared(cache),
        }
    }

    /// Builds the cache from configuration, with file-backed snapshots
    /// under `persistence_dir` when persistence is enabled.
    pub fn from_config(config: &Config) -> Self {
        let backend: Option<Arc<dyn PersistenceBackend>> = if config.enable_persistence {
            Some(Arc::new(FileBackend::new(&config.persistence_dir)))
        } else {
            None
        };
        let cache = AdvancedCache::build(config.cache_options(), system_clock(), backend);
        Self::new(cache)
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state
        .cache
        .write()
        .await
        .set(req.key.clone(), req.value, req.ttl);

    Ok(Json(MessageResponse::set(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads update hit counters and recency
    let value = state
        .cache
        .write()
        .await
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.write().await.has(&key);
    Json(HasResponse::new(key, exists))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.cache.write().await.remove(&key) {
        return Err(CacheError::NotFound(key));
    }
    Ok(Json(MessageResponse::deleted(key)))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.write().await.clear();
    Json(MessageResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.write().await.stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheOptions;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(AdvancedCache::new(CacheOptions::default()))
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "workout:monday".to_string(),
            value: json!({"sets": 5}),
            ttl: None,
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("workout:monday".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"sets": 5}));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_has_handler_does_not_count_hits() {
        let state = test_state();
        state.cache.write().await.set("k", json!(1), None);

        let response = has_handler(State(state.clone()), Path("k".to_string())).await;
        assert!(response.exists);

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.total_hits, 0);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        state.cache.write().await.set("to_delete", json!("v"), None);

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = delete_handler(State(state), Path("to_delete".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_and_stats_handler() {
        let state = test_state();
        state.cache.write().await.set("a", json!(1), None);
        state.cache.write().await.set("b", json!(2), None);

        assert_eq!(stats_handler(State(state.clone())).await.size, 2);

        clear_handler(State(state.clone())).await;
        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.size, 0);
        assert_eq!(stats.max_size, 100);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_from_config_survives_restart() {
        let dir = std::env::temp_dir().join(format!(
            "advanced_cache_state_{}_{}",
            std::process::id(),
            crate::clock::current_timestamp_ms()
        ));
        let config = Config {
            enable_persistence: true,
            persistence_key: "host-cache".to_string(),
            persistence_dir: dir.clone(),
            ..Config::default()
        };

        let state = AppState::from_config(&config);
        assert!(state.cache.read().await.is_persistent());
        let req = SetRequest {
            key: "session".to_string(),
            value: json!({"user": 7}),
            ttl: None,
        };
        set_handler(State(state), Json(req)).await.unwrap();
        assert!(dir.join("host-cache.json").exists());

        let restarted = AppState::from_config(&config);
        let response = get_handler(State(restarted), Path("session".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"user": 7}));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_from_config_without_persistence() {
        let state = AppState::from_config(&Config::default());
        assert!(!state.cache.read().await.is_persistent());
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("value"),
            ttl: None,
        };
        let result = set_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
