// Reusable UI-support units: debounce, polling, unsaved-changes guard, search box

pub mod debounce;
pub mod polling;
pub mod search;
pub mod unsaved;

pub use debounce::{Debouncer, LatestOnly};
pub use polling::{AdaptiveInterval, Poller, PollingConfig, RetryPolicy};
pub use search::DebouncedSearch;
pub use unsaved::UnsavedChangesGuard;
