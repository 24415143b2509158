// PrefsRepo tests: connect, init, JSON values, recent searches, drafts

use std::sync::Arc;

use farmdash::prefs_repo::{DraftStore, PrefsRepo, RecentSearches};
use farmdash::support::UnsavedChangesGuard;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

async fn repo(dir: &TempDir) -> Arc<PrefsRepo> {
    let path = dir.path().join("prefs.db");
    let repo = PrefsRepo::connect(path.to_str().unwrap())
        .await
        .expect("connect");
    repo.init().await.expect("init");
    Arc::new(repo)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EditForm {
    name: String,
    seed_types: Vec<String>,
}

fn form(name: &str) -> EditForm {
    EditForm {
        name: name.into(),
        seed_types: vec!["kale".into()],
    }
}

#[tokio::test]
async fn test_connect_and_init_are_repeatable() {
    let dir = TempDir::new().unwrap();
    let repo = repo(&dir).await;
    repo.init().await.expect("second init");
}

#[tokio::test]
async fn test_json_values_round_trip_and_delete() {
    let dir = TempDir::new().unwrap();
    let repo = repo(&dir).await;

    assert_eq!(repo.get_json::<Vec<String>>("ns", "k").await.unwrap(), None);
    repo.put_json("ns", "k", &vec!["a".to_string()]).await.unwrap();
    assert_eq!(
        repo.get_json::<Vec<String>>("ns", "k").await.unwrap(),
        Some(vec!["a".to_string()])
    );
    assert!(repo.updated_at("ns", "k").await.unwrap().is_some());
    // Same key in another namespace is independent.
    assert_eq!(repo.get_json::<Vec<String>>("other", "k").await.unwrap(), None);

    assert!(repo.delete("ns", "k").await.unwrap());
    assert!(!repo.delete("ns", "k").await.unwrap());
    assert_eq!(repo.updated_at("ns", "k").await.unwrap(), None);
}

#[tokio::test]
async fn test_keys_are_ordered_by_last_write() {
    let dir = TempDir::new().unwrap();
    let repo = repo(&dir).await;
    for key in ["a", "b", "c"] {
        repo.put_json("ns", key, &1).await.unwrap();
    }
    repo.put_json("ns", "a", &2).await.unwrap();
    assert_eq!(repo.keys_oldest_first("ns").await.unwrap(), vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_recent_searches_are_capped_and_deduplicated() {
    let dir = TempDir::new().unwrap();
    let recent = RecentSearches::new(repo(&dir).await, "dashboard", 5);
    assert!(recent.list().await.is_empty());

    for term in ["lettuce", "basil", "kale", "mint", "chard", "arugula"] {
        recent.add(term).await;
    }
    recent.add("KALE").await;

    assert_eq!(
        recent.list().await,
        vec!["KALE", "arugula", "chard", "mint", "basil"]
    );

    recent.remove("mint").await;
    assert_eq!(recent.list().await.len(), 4);
    recent.clear().await;
    assert!(recent.list().await.is_empty());
}

#[tokio::test]
async fn test_recent_searches_are_scoped() {
    let dir = TempDir::new().unwrap();
    let repo = repo(&dir).await;
    let dashboard = RecentSearches::new(repo.clone(), "dashboard", 5);
    let inventory = RecentSearches::new(repo, "inventory", 5);
    dashboard.add("basil").await;
    assert!(inventory.list().await.is_empty());
}

#[tokio::test]
async fn test_recent_searches_swallow_storage_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.db");
    // Table never created: every query fails.
    let repo = Arc::new(PrefsRepo::connect(path.to_str().unwrap()).await.unwrap());
    let recent = RecentSearches::new(repo, "dashboard", 5);
    assert_eq!(recent.add("basil").await, vec!["basil"]);
    assert!(recent.list().await.is_empty());
}

#[tokio::test]
async fn test_drafts_save_load_discard() {
    let dir = TempDir::new().unwrap();
    let drafts = DraftStore::new(repo(&dir).await, 5);

    assert!(drafts.save("edit-container-1", &form("north bay")).await);
    let draft = drafts
        .load::<EditForm>("edit-container-1")
        .await
        .expect("draft stored");
    assert_eq!(draft.form_id, "edit-container-1");
    assert_eq!(draft.data, form("north bay"));
    assert!(chrono::DateTime::parse_from_rfc3339(&draft.saved_at).is_ok());

    drafts.discard("edit-container-1").await;
    assert!(drafts.load::<EditForm>("edit-container-1").await.is_none());
}

#[tokio::test]
async fn test_drafts_evict_oldest_beyond_cap() {
    let dir = TempDir::new().unwrap();
    let drafts = DraftStore::new(repo(&dir).await, 5);
    for i in 1..=7 {
        drafts.save(&format!("form-{i}"), &form("x")).await;
    }
    assert_eq!(
        drafts.form_ids().await,
        vec!["form-3", "form-4", "form-5", "form-6", "form-7"]
    );
    assert!(drafts.load::<EditForm>("form-1").await.is_none());
}

#[tokio::test]
async fn test_unsaved_guard_autosaves_and_restores() {
    let dir = TempDir::new().unwrap();
    let drafts = DraftStore::new(repo(&dir).await, 5);

    let mut guard = UnsavedChangesGuard::new(form("north bay"));
    assert!(!guard.autosave(&drafts, "create-container").await);

    guard.update(form("south bay"));
    assert!(guard.autosave(&drafts, "create-container").await);

    let mut reopened = UnsavedChangesGuard::new(form("north bay"));
    assert!(reopened.restore_draft(&drafts, "create-container").await);
    assert_eq!(reopened.current(), &form("south bay"));
    assert!(reopened.is_dirty());
    assert!(!reopened.restore_draft(&drafts, "missing").await);
}
