//! The single AQI state container.
//!
//! Created once at the root of the view tree and shared by `Arc`. All
//! mutation goes through its operations; readers take snapshots or
//! subscribe to changes.
//!
//! Overlapping fetches are ordered by a generation counter: only the most
//! recently issued fetch may settle the state, older settlements are dropped.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use aqiwatch_aqi::{AqiClient, AqiOverview};

/// Snapshot of everything the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AqiState {
    pub aqi_data: Option<AqiOverview>,
    /// When `aqi_data` was received
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_api_healthy: bool,
}

/// What happened to a fetch once it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Result was written to the state.
    Applied,
    /// A newer fetch had been issued; result discarded.
    Stale,
}

#[derive(Debug)]
struct Inner {
    state: AqiState,
    generation: u64,
}

#[derive(Debug)]
pub struct AqiStore {
    client: AqiClient,
    inner: Mutex<Inner>,
    changes: watch::Sender<AqiState>,
}

impl AqiStore {
    /// Create a store with a fixed health flag.
    pub fn new(client: AqiClient, is_api_healthy: bool) -> Self {
        let state = AqiState {
            is_api_healthy,
            ..Default::default()
        };
        let (changes, _) = watch::channel(state.clone());

        Self {
            client,
            inner: Mutex::new(Inner {
                state,
                generation: 0,
            }),
            changes,
        }
    }

    /// Create a store after probing backend health once.
    pub async fn initialize(client: AqiClient) -> Self {
        let healthy = match client.health_check().await {
            Ok(health) => {
                tracing::info!(
                    "AQI API is {} (predictor loaded: {})",
                    health.status,
                    health.predictor_loaded
                );
                true
            }
            Err(e) => {
                tracing::warn!("AQI API is not available: {}", e);
                false
            }
        };
        Self::new(client, healthy)
    }

    /// Create a store without probing; the backend is assumed healthy.
    pub fn assume_healthy(client: AqiClient) -> Self {
        Self::new(client, true)
    }

    pub fn snapshot(&self) -> AqiState {
        self.inner.lock().state.clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AqiState> {
        self.changes.subscribe()
    }

    pub fn is_api_healthy(&self) -> bool {
        self.inner.lock().state.is_api_healthy
    }

    /// Fetch the overview for a coordinate pair and settle the state.
    ///
    /// On success `aqi_data` is replaced and `error` cleared; on failure
    /// `error` is set and `aqi_data` keeps its previous value. `is_loading`
    /// is reset once the latest issued fetch settles, or when that fetch's
    /// future is dropped before settling.
    pub async fn fetch_aqi_data(&self, lat: f64, lon: f64, use_demo: bool) -> Settlement {
        let generation = self.update(|inner| {
            inner.generation += 1;
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.generation
        });
        let mut pending = PendingFetch {
            store: self,
            generation,
            settled: false,
        };

        let result = self.client.get_overview(lat, lon, use_demo).await;
        pending.settled = true;

        self.update(|inner| {
            if inner.generation != generation {
                tracing::debug!(
                    "Discarding stale AQI result (generation {}, latest {})",
                    generation,
                    inner.generation
                );
                return Settlement::Stale;
            }

            match result {
                Ok(data) => {
                    inner.state.aqi_data = Some(data);
                    inner.state.fetched_at = Some(Utc::now());
                    inner.state.error = None;
                }
                Err(e) => {
                    tracing::warn!("AQI fetch failed (status {:?}): {}", e.status(), e);
                    inner.state.error = Some(e.to_string());
                }
            }
            inner.state.is_loading = false;
            Settlement::Applied
        })
    }

    /// Drop the current data and error. Loading and health flags are untouched.
    pub fn clear_data(&self) {
        self.update(|inner| {
            inner.state.aqi_data = None;
            inner.state.fetched_at = None;
            inner.state.error = None;
        });
    }

    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock();
        let before = inner.state.clone();
        let out = f(&mut inner);
        if inner.state != before {
            self.changes.send_replace(inner.state.clone());
        }
        out
    }
}

/// Clears `is_loading` if a fetch is dropped before it settles and no newer
/// fetch has taken over.
struct PendingFetch<'a> {
    store: &'a AqiStore,
    generation: u64,
    settled: bool,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let generation = self.generation;
        self.store.update(|inner| {
            if inner.generation == generation {
                tracing::debug!("AQI fetch (generation {}) cancelled", generation);
                inner.state.is_loading = false;
            }
        });
    }
}
