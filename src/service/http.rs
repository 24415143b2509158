// Farm API over HTTP via reqwest. Payloads are decoded into typed shapes here;
// anything that does not decode is rejected before it reaches the domain models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{ContainerDraft, ContainerPage, ContainerUpdate, DashboardService, ServiceError};
use crate::models::{
    ApiFilters, ContainerPayload, ContainerType, FilterOptions, PerformancePayload, TimeRange,
};

const API_PREFIX: &str = "/api/v1";

pub struct HttpDashboardService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct MetricsQuery<'a> {
    time_range: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_type: Option<ContainerType>,
}

#[derive(Serialize)]
struct ShutdownBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

impl HttpDashboardService {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Status {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        operation: &'static str,
    ) -> Result<T, ServiceError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::InvalidPayload {
            operation,
            message: e.to_string(),
        })
    }
}

/// Pulls a human-readable message out of an error body (`detail`, `error` or `message`).
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    ["detail", "error", "message"]
        .iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
        .or_else(|| Some(trimmed.to_string()))
}

fn validate_page(page: ContainerPage) -> Result<ContainerPage, ServiceError> {
    let invalid = |message: String| ServiceError::InvalidPayload {
        operation: "get_containers",
        message,
    };
    if page.pagination.page == 0 {
        return Err(invalid("pagination.page must be >= 1".into()));
    }
    if page.pagination.limit == 0 {
        return Err(invalid("pagination.limit must be >= 1".into()));
    }
    if page.containers.len() > page.pagination.limit as usize {
        return Err(invalid(format!(
            "{} containers returned for a page of {}",
            page.containers.len(),
            page.pagination.limit
        )));
    }
    Ok(page)
}

#[async_trait]
impl DashboardService for HttpDashboardService {
    #[instrument(skip(self, query), fields(service = "http", operation = "get_containers", page = query.page))]
    async fn get_containers(&self, query: &ApiFilters) -> Result<ContainerPage, ServiceError> {
        let response = Self::send(self.client.get(self.url("/containers")).query(query)).await?;
        let page: ContainerPage = Self::decode(response, "get_containers").await?;
        validate_page(page)
    }

    #[instrument(skip(self, draft), fields(service = "http", operation = "create_container"))]
    async fn create_container(
        &self,
        draft: &ContainerDraft,
    ) -> Result<ContainerPayload, ServiceError> {
        let response = Self::send(self.client.post(self.url("/containers")).json(draft)).await?;
        Self::decode(response, "create_container").await
    }

    #[instrument(skip(self, update), fields(service = "http", operation = "update_container"))]
    async fn update_container(
        &self,
        id: i64,
        update: &ContainerUpdate,
    ) -> Result<ContainerPayload, ServiceError> {
        let url = self.url(&format!("/containers/{}", id));
        let response = Self::send(self.client.put(url).json(update)).await?;
        Self::decode(response, "update_container").await
    }

    #[instrument(skip(self), fields(service = "http", operation = "delete_container"))]
    async fn delete_container(&self, id: i64) -> Result<(), ServiceError> {
        let url = self.url(&format!("/containers/{}", id));
        Self::send(self.client.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(service = "http", operation = "shutdown_container"))]
    async fn shutdown_container(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!("/containers/{}/shutdown", id));
        Self::send(self.client.post(url).json(&ShutdownBody { reason })).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(service = "http", operation = "get_dashboard_metrics", time_range = time_range.kind.as_str()))]
    async fn get_dashboard_metrics(
        &self,
        time_range: &TimeRange,
        container_type: Option<ContainerType>,
    ) -> Result<PerformancePayload, ServiceError> {
        let query = MetricsQuery {
            time_range: time_range.kind.as_str(),
            start_date: time_range.start_date.map(|d| d.to_string()),
            end_date: time_range.end_date.map(|d| d.to_string()),
            container_type,
        };
        let response =
            Self::send(self.client.get(self.url("/dashboard/metrics")).query(&query)).await?;
        Self::decode(response, "get_dashboard_metrics").await
    }

    #[instrument(skip(self), fields(service = "http", operation = "get_filter_options"))]
    async fn get_filter_options(&self) -> Result<FilterOptions, ServiceError> {
        let response = Self::send(self.client.get(self.url("/containers/filter-options"))).await?;
        Self::decode(response, "get_filter_options").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"detail":"tenant not found"}"#).as_deref(),
            Some("tenant not found")
        );
        assert_eq!(error_message("gateway down").as_deref(), Some("gateway down"));
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpDashboardService::new("http://farm.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(svc.url("/containers"), "http://farm.local/api/v1/containers");
    }
}
