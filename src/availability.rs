//! LLM availability tracking
//!
//! The monitor owns the write side; request handling only ever sees the
//! cloneable [`Availability`] handle. A stale flag is tolerated: a request may
//! still hit a backend that went down a moment ago and will fall back then.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::llm::ChatBackend;

/// Last known health of the LLM endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityState {
    pub available: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Read handle passed to request handling
#[derive(Debug, Clone, Default)]
pub struct Availability {
    state: Arc<RwLock<AvailabilityState>>,
}

impl Availability {
    /// Handle pinned to a value, never re-checked
    #[must_use]
    pub fn fixed(available: bool) -> Self {
        let handle = Self::default();
        handle.set(available);
        handle
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.snapshot().available
    }

    #[must_use]
    pub fn snapshot(&self) -> AvailabilityState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, available: bool) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let previous = state.available;
        state.available = available;
        state.last_checked = Some(Utc::now());
        previous
    }
}

/// Probes the LLM health endpoint and records the result
pub struct AvailabilityMonitor {
    backend: Option<Arc<dyn ChatBackend>>,
    availability: Availability,
    attempts: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl AvailabilityMonitor {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, config: &LlmConfig) -> Self {
        Self {
            backend: Some(backend),
            availability: Availability::default(),
            attempts: config.health_attempts.max(1),
            retry_delay: Duration::from_millis(config.health_retry_delay_ms),
            timeout: config.health_timeout(),
        }
    }

    /// Monitor without a backend; every check reports unavailable
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            backend: None,
            availability: Availability::default(),
            attempts: 1,
            retry_delay: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn handle(&self) -> Availability {
        self.availability.clone()
    }

    /// Probe the endpoint, retrying with a fixed delay. Only HTTP 200 counts as up.
    pub async fn check(&self) -> bool {
        let Some(backend) = &self.backend else {
            self.record(false);
            return false;
        };

        for attempt in 1..=self.attempts {
            match backend.probe_health(self.timeout).await {
                Ok(200) => {
                    debug!("LLM health check succeeded on attempt {}", attempt);
                    self.record(true);
                    return true;
                }
                Ok(status) => {
                    debug!(
                        "LLM health check attempt {}/{} returned status {}",
                        attempt, self.attempts, status
                    );
                }
                Err(e) => {
                    debug!(
                        "LLM health check attempt {}/{} failed: {}",
                        attempt, self.attempts, e
                    );
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        self.record(false);
        false
    }

    fn record(&self, available: bool) {
        let previous = self.availability.set(available);
        if previous != available {
            if available {
                info!("LLM endpoint is available");
            } else {
                warn!("LLM endpoint is unavailable, using rule-based fallbacks");
            }
        }
    }

    /// Fire-and-forget re-check
    pub fn spawn_check(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            monitor.check().await;
        })
    }

    /// Re-check on a fixed interval for the lifetime of the process
    pub fn spawn_refresh(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // the first tick fires immediately; startup already ran a check
            interval.tick().await;
            loop {
                interval.tick().await;
                monitor.check().await;
            }
        })
    }
}
