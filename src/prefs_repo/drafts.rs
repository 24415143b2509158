// Form drafts (auto-saved edits), capped; oldest draft is evicted first

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::PrefsRepo;

pub const FORM_DRAFTS_NAMESPACE: &str = "form_drafts";
pub const DEFAULT_MAX_DRAFTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft<T> {
    pub form_id: String,
    /// RFC 3339, UTC.
    pub saved_at: String,
    pub data: T,
}

/// Best effort: every storage error is logged and reported as "nothing saved/found".
#[derive(Clone)]
pub struct DraftStore {
    repo: Arc<PrefsRepo>,
    max_drafts: usize,
}

impl DraftStore {
    pub fn new(repo: Arc<PrefsRepo>, max_drafts: usize) -> Self {
        Self {
            repo,
            max_drafts: max_drafts.max(1),
        }
    }

    pub async fn save<T: Serialize>(&self, form_id: &str, data: &T) -> bool {
        let draft = Draft {
            form_id: form_id.to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            data,
        };
        if let Err(e) = self
            .repo
            .put_json(FORM_DRAFTS_NAMESPACE, form_id, &draft)
            .await
        {
            warn!(error = %e, form_id, operation = "draft_save", "could not save draft");
            return false;
        }
        self.evict_overflow().await;
        true
    }

    pub async fn load<T: DeserializeOwned>(&self, form_id: &str) -> Option<Draft<T>> {
        match self.repo.get_json(FORM_DRAFTS_NAMESPACE, form_id).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, form_id, operation = "draft_load", "could not load draft");
                None
            }
        }
    }

    pub async fn discard(&self, form_id: &str) {
        if let Err(e) = self.repo.delete(FORM_DRAFTS_NAMESPACE, form_id).await {
            warn!(error = %e, form_id, operation = "draft_discard", "could not discard draft");
        }
    }

    /// Stored form ids, oldest first.
    pub async fn form_ids(&self) -> Vec<String> {
        self.repo
            .keys_oldest_first(FORM_DRAFTS_NAMESPACE)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, operation = "draft_list", "could not list drafts");
                Vec::new()
            })
    }

    async fn evict_overflow(&self) {
        let ids = self.form_ids().await;
        let overflow = ids.len().saturating_sub(self.max_drafts);
        for id in ids.into_iter().take(overflow) {
            debug!(form_id = %id, "evicting oldest draft");
            self.discard(&id).await;
        }
    }
}
