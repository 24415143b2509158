// Farm API contract consumed by the view-model. Implementations live in submodules.

pub mod http;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ApiFilters, ContainerPayload, ContainerPurpose, ContainerStatus, ContainerType, FilterOptions,
    Location, PaginationPayload, PerformancePayload, TimeRange,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid payload from {operation}: {message}")]
    InvalidPayload {
        operation: &'static str,
        message: String,
    },
}

/// One page of the container list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPage {
    pub containers: Vec<ContainerPayload>,
    pub pagination: PaginationPayload,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ContainerType,
    pub tenant_id: i64,
    pub purpose: ContainerPurpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub seed_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update; only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<ContainerPurpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContainerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: i64,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub successes: Vec<ContainerPayload>,
    pub failures: Vec<BatchFailure>,
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn get_containers(&self, query: &ApiFilters) -> Result<ContainerPage, ServiceError>;

    async fn create_container(
        &self,
        draft: &ContainerDraft,
    ) -> Result<ContainerPayload, ServiceError>;

    async fn update_container(
        &self,
        id: i64,
        update: &ContainerUpdate,
    ) -> Result<ContainerPayload, ServiceError>;

    async fn delete_container(&self, id: i64) -> Result<(), ServiceError>;

    async fn shutdown_container(&self, id: i64, reason: Option<&str>)
    -> Result<(), ServiceError>;

    /// Runs the updates concurrently; each one succeeds or fails on its own.
    async fn batch_update_containers(&self, updates: &[(i64, ContainerUpdate)]) -> BatchOutcome {
        let results = join_all(
            updates
                .iter()
                .map(|(id, update)| async move { (*id, self.update_container(*id, update).await) }),
        )
        .await;
        results
            .into_iter()
            .fold(BatchOutcome::default(), |mut acc, (id, result)| {
                match result {
                    Ok(container) => acc.successes.push(container),
                    Err(e) => acc.failures.push(BatchFailure {
                        id,
                        error: e.to_string(),
                    }),
                }
                acc
            })
    }

    async fn get_dashboard_metrics(
        &self,
        time_range: &TimeRange,
        container_type: Option<ContainerType>,
    ) -> Result<PerformancePayload, ServiceError>;

    async fn get_filter_options(&self) -> Result<FilterOptions, ServiceError>;

    /// Options used to seed the filter bar on first load.
    async fn initialize_filters(&self) -> Result<FilterOptions, ServiceError> {
        self.get_filter_options().await
    }
}
