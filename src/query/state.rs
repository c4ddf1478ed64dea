//! Query state published to observers.

use std::sync::Arc;

use serde::Serialize;

// == Query Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// No data and nothing in flight
    Idle,
    /// A fetch is in flight
    Loading,
    /// Data present, last fetch did not fail
    Success,
    /// Last fetch failed; `data` may still hold an older value
    Error,
}

// == Query State ==
/// Snapshot of one query.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    /// Last fetched or cached value, possibly stale
    pub data: Option<V>,
    /// Error from the most recent fetch, cleared by the next success
    pub error: Option<Arc<anyhow::Error>>,
    pub is_loading: bool,
    /// Unix milliseconds of the last successful fetch, 0 if none
    pub last_fetch_at: u64,
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            last_fetch_at: 0,
        }
    }
}

impl<V> QueryState<V> {
    /// Creates an idle state holding previously cached data.
    pub fn seeded(data: Option<V>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn status(&self) -> QueryStatus {
        if self.is_loading {
            QueryStatus::Loading
        } else if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    /// Whether data older than `stale_time` ms should be refetched.
    pub fn is_stale(&self, now: u64, stale_time: u64) -> bool {
        now.saturating_sub(self.last_fetch_at) > stale_time
    }

    /// True when the last fetch failed but an older value is still available.
    pub fn has_stale_fallback(&self) -> bool {
        self.error.is_some() && self.data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let mut state: QueryState<u32> = QueryState::default();
        assert_eq!(state.status(), QueryStatus::Idle);

        state.is_loading = true;
        assert_eq!(state.status(), QueryStatus::Loading);

        state.is_loading = false;
        state.data = Some(1);
        assert_eq!(state.status(), QueryStatus::Success);
        assert!(!state.has_stale_fallback());

        state.error = Some(Arc::new(anyhow::anyhow!("boom")));
        assert_eq!(state.status(), QueryStatus::Error);
        assert!(state.has_stale_fallback());
    }

    #[test]
    fn test_is_stale() {
        let state: QueryState<u32> = QueryState {
            last_fetch_at: 1_000,
            ..QueryState::default()
        };

        assert!(!state.is_stale(1_000, 0));
        assert!(state.is_stale(1_001, 0));
        assert!(!state.is_stale(1_500, 500));
        assert!(state.is_stale(1_501, 500));
    }

    #[test]
    fn test_never_fetched_is_stale() {
        let state = QueryState::seeded(Some("cached"));
        assert_eq!(state.last_fetch_at, 0);
        assert!(state.is_stale(100_000_000, 60_000));
        assert_eq!(state.status(), QueryStatus::Success);
    }
}
