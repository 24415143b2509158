// Debounced search box bound to the dashboard filters

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::debounce::LatestOnly;
use crate::prefs_repo::RecentSearches;
use crate::view_model::DashboardViewModel;

pub struct DebouncedSearch {
    view_model: Arc<DashboardViewModel>,
    runner: LatestOnly,
    recent: Option<RecentSearches>,
}

impl DebouncedSearch {
    pub fn new(
        view_model: Arc<DashboardViewModel>,
        delay: Duration,
        recent: Option<RecentSearches>,
    ) -> Self {
        Self {
            view_model,
            runner: LatestOnly::new(delay),
            recent,
        }
    }

    /// Applies `term` once typing settles. Returns false when a newer term superseded it.
    pub async fn search(&self, term: &str) -> bool {
        let term = term.trim().to_string();
        let applied = self
            .runner
            .run(|_| self.view_model.apply_search(&term))
            .await
            .is_some();
        if !applied {
            debug!(term = %term, "search superseded");
            return false;
        }
        if let Some(recent) = &self.recent
            && !term.is_empty()
        {
            recent.add(&term).await;
        }
        true
    }

    pub async fn recent_searches(&self) -> Vec<String> {
        match &self.recent {
            Some(recent) => recent.list().await,
            None => Vec::new(),
        }
    }

    /// Drops any pending search.
    pub fn cancel(&self) {
        self.runner.cancel();
    }
}
