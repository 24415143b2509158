// Recent search terms, newest first, capped

use std::sync::Arc;

use tracing::warn;

use super::PrefsRepo;

pub const RECENT_SEARCHES_NAMESPACE: &str = "recent_searches";
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Moves `term` to the front (case-insensitive de-dup) and caps the list at `limit`.
pub fn push_recent(list: &[String], term: &str, limit: usize) -> Vec<String> {
    let term = term.trim();
    if term.is_empty() {
        return list.to_vec();
    }
    std::iter::once(term.to_string())
        .chain(
            list.iter()
                .filter(|t| !t.eq_ignore_ascii_case(term))
                .cloned(),
        )
        .take(limit)
        .collect()
}

/// Recent searches of one search box (`scope`). Storage failures are logged and swallowed.
#[derive(Clone)]
pub struct RecentSearches {
    repo: Arc<PrefsRepo>,
    scope: String,
    limit: usize,
}

impl RecentSearches {
    pub fn new(repo: Arc<PrefsRepo>, scope: &str, limit: usize) -> Self {
        Self {
            repo,
            scope: scope.to_string(),
            limit: limit.max(1),
        }
    }

    pub async fn list(&self) -> Vec<String> {
        match self
            .repo
            .get_json::<Vec<String>>(RECENT_SEARCHES_NAMESPACE, &self.scope)
            .await
        {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, operation = "recent_searches_list", "could not read recent searches");
                Vec::new()
            }
        }
    }

    pub async fn add(&self, term: &str) -> Vec<String> {
        let next = push_recent(&self.list().await, term, self.limit);
        self.store(&next).await;
        next
    }

    pub async fn remove(&self, term: &str) -> Vec<String> {
        let next: Vec<String> = self
            .list()
            .await
            .into_iter()
            .filter(|t| !t.eq_ignore_ascii_case(term.trim()))
            .collect();
        self.store(&next).await;
        next
    }

    pub async fn clear(&self) {
        if let Err(e) = self.repo.delete(RECENT_SEARCHES_NAMESPACE, &self.scope).await {
            warn!(error = %e, operation = "recent_searches_clear", "could not clear recent searches");
        }
    }

    async fn store(&self, list: &[String]) {
        if let Err(e) = self
            .repo
            .put_json(RECENT_SEARCHES_NAMESPACE, &self.scope, list)
            .await
        {
            warn!(error = %e, operation = "recent_searches_store", "could not save recent searches");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn newest_first_and_deduplicated() {
        let out = push_recent(&list(&["lettuce", "Basil", "kale"]), "basil", 5);
        assert_eq!(out, list(&["basil", "lettuce", "kale"]));
    }

    #[test]
    fn capped_at_limit() {
        let out = push_recent(&list(&["a", "b", "c", "d", "e"]), "f", 5);
        assert_eq!(out, list(&["f", "a", "b", "c", "d"]));
    }

    #[test]
    fn blank_term_is_ignored() {
        let out = push_recent(&list(&["a"]), "  ", 5);
        assert_eq!(out, list(&["a"]));
    }
}
