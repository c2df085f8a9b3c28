//! Dashboard statistics loading.
//!
//! The statistics fetch is the one call that retries on its own (rate limit
//! or network failure: 2 retries, 2s then 4s). Refreshes are last-write-wins:
//! each refresh takes a ticket, and only the most recently issued ticket may
//! publish, so a slow early response never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{with_retry, ApiClient, RetryPolicy};
use crate::models::{Activity, DashboardStats};

const STATS_FAILED: &str = "Failed to fetch dashboard statistics";

/// What a dashboard renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsView {
    pub stats: Option<DashboardStats>,
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Clone)]
pub struct StatsLoader {
    api: ApiClient,
    policy: RetryPolicy,
    issued: Arc<AtomicU64>,
    view: Arc<watch::Sender<StatsView>>,
}

impl StatsLoader {
    pub fn new(api: ApiClient) -> Self {
        Self::with_policy(api, RetryPolicy::dashboard_stats())
    }

    pub fn with_policy(api: ApiClient, policy: RetryPolicy) -> Self {
        let (view, _) = watch::channel(StatsView::default());
        Self {
            api,
            policy,
            issued: Arc::new(AtomicU64::new(0)),
            view: Arc::new(view),
        }
    }

    pub fn view(&self) -> StatsView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatsView> {
        self.view.subscribe()
    }

    /// Fetch statistics and publish the outcome. Returns `false` when a
    /// newer refresh was issued meanwhile and this result was dropped.
    pub async fn refresh(&self) -> bool {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.view.send_modify(|view| view.loading = true);

        let outcome = with_retry(&self.policy, || self.api.dashboard_stats()).await;

        let (stats, error) = match outcome {
            Ok(response) => match response.into_data() {
                Some(stats) => (Some(stats), None),
                None => (None, Some(STATS_FAILED.to_string())),
            },
            Err(e) => {
                warn!(error = %e, "Dashboard statistics unavailable");
                (None, Some(e.server_message().unwrap_or(STATS_FAILED).to_string()))
            }
        };

        self.view.send_if_modified(|view| {
            if self.issued.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Discarding superseded dashboard statistics");
                return false;
            }
            if stats.is_some() {
                view.stats = stats;
            }
            view.error = error;
            view.loading = false;
            true
        })
    }

    /// Refresh statistics and fetch the activity feed concurrently.
    /// A failed feed is logged and comes back empty.
    pub async fn refresh_with_activity(&self, limit: Option<u32>) -> Vec<Activity> {
        let (_, activity) = futures::future::join(self.refresh(), self.api.recent_activity(limit)).await;
        match activity {
            Ok(response) => response.into_data().unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Recent activity unavailable");
                Vec::new()
            }
        }
    }
}
