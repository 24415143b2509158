// Shared test helpers: an in-memory farm API and payload builders

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use farmdash::models::*;
use farmdash::service::{
    ContainerDraft, ContainerPage, ContainerUpdate, DashboardService, ServiceError,
};

pub fn container(
    id: i64,
    name: &str,
    container_type: ContainerType,
    status: ContainerStatus,
) -> ContainerPayload {
    ContainerPayload {
        id,
        name: name.into(),
        type_: container_type,
        tenant_id: 1,
        purpose: ContainerPurpose::Production,
        status,
        location: None,
        alerts: None,
        seed_types: None,
        metrics: None,
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
    }
}

pub fn with_metrics(mut c: ContainerPayload, yield_kg: f64, space_utilization_pct: f64) -> ContainerPayload {
    c.metrics = Some(ContainerMetrics {
        yield_kg,
        space_utilization_pct,
        ..Default::default()
    });
    c
}

pub fn with_alert(mut c: ContainerPayload, severity: AlertSeverity, active: bool) -> ContainerPayload {
    let alerts = c.alerts.get_or_insert_with(Vec::new);
    alerts.push(Alert {
        id: alerts.len() as i64 + 1,
        active,
        severity,
    });
    c
}

pub fn filter_options() -> FilterOptions {
    FilterOptions {
        tenants: vec![
            TenantOption {
                id: 1,
                name: "Acme Farms".into(),
            },
            TenantOption {
                id: 2,
                name: "Green Roots".into(),
            },
        ],
        purposes: vec![
            ContainerPurpose::Development,
            ContainerPurpose::Research,
            ContainerPurpose::Production,
        ],
        statuses: vec![
            ContainerStatus::Created,
            ContainerStatus::Active,
            ContainerStatus::Maintenance,
            ContainerStatus::Inactive,
        ],
        container_types: vec![ContainerType::Physical, ContainerType::Virtual],
    }
}

pub fn performance(physical: u32, virtual_: u32, time_range: TimeRange) -> PerformancePayload {
    let metrics = |count: u32, total: f64| TypeMetrics {
        container_count: count,
        yield_: YieldMetrics {
            average: if count == 0 { 0.0 } else { total / count as f64 },
            total,
        },
        space_utilization: SpaceUtilizationMetrics { average: 75.0 },
        chart: vec![
            ChartPoint {
                date: "2026-01-01".into(),
                value: total / 2.0,
                is_current_period: false,
                is_future: false,
            },
            ChartPoint {
                date: "2026-01-02".into(),
                value: total / 2.0,
                is_current_period: true,
                is_future: false,
            },
        ],
    };
    PerformancePayload {
        physical: metrics(physical, 100.0),
        virtual_: metrics(virtual_, 60.0),
        time_range,
        generated_at: "2026-01-02T12:00:00Z".into(),
    }
}

/// In-memory farm API. Counts every call; failures and latency are switchable per test.
#[derive(Default)]
pub struct FakeService {
    pub containers: Mutex<Vec<ContainerPayload>>,
    pub queries: Mutex<Vec<ApiFilters>>,
    /// Consumed one per `get_containers` call; empty means no latency.
    pub containers_delays: Mutex<VecDeque<Duration>>,
    pub action_delay: Mutex<Option<Duration>>,
    pub fail_containers: AtomicBool,
    pub fail_metrics: AtomicBool,
    pub fail_filter_options: AtomicBool,
    pub fail_actions: AtomicBool,
    /// Ids whose update is rejected.
    pub reject_updates: Mutex<Vec<i64>>,
    pub get_containers_calls: AtomicUsize,
    pub metrics_calls: AtomicUsize,
    pub filter_options_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub shutdown_reasons: Mutex<Vec<Option<String>>>,
}

impl FakeService {
    pub fn with_containers(containers: Vec<ContainerPayload>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Default::default()
        }
    }

    pub fn seeded() -> Self {
        Self::with_containers(vec![
            with_metrics(
                container(1, "alpha", ContainerType::Physical, ContainerStatus::Active),
                20.0,
                80.0,
            ),
            with_alert(
                with_metrics(
                    container(2, "beta", ContainerType::Virtual, ContainerStatus::Active),
                    30.0,
                    90.0,
                ),
                AlertSeverity::Critical,
                true,
            ),
            container(3, "gamma", ContainerType::Physical, ContainerStatus::Maintenance),
        ])
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<ApiFilters> {
        self.queries.lock().unwrap().last().cloned()
    }

    async fn action_latency(&self) {
        let delay = *self.action_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn action_failure(&self) -> Result<(), ServiceError> {
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 500,
                message: "action failed".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardService for FakeService {
    async fn get_containers(&self, query: &ApiFilters) -> Result<ContainerPage, ServiceError> {
        self.get_containers_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        let delay = self.containers_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_containers.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("connection refused".into()));
        }
        let matching: Vec<ContainerPayload> = self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| query.search.as_deref().is_none_or(|s| c.name.contains(s)))
            .filter(|c| query.container_type.is_none_or(|t| c.type_ == t))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let skip = ((query.page.max(1) - 1) * query.limit) as usize;
        Ok(ContainerPage {
            containers: matching
                .into_iter()
                .skip(skip)
                .take(query.limit as usize)
                .collect(),
            pagination: PaginationPayload {
                page: query.page,
                limit: query.limit,
                total,
                total_pages: None,
            },
        })
    }

    async fn create_container(
        &self,
        draft: &ContainerDraft,
    ) -> Result<ContainerPayload, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.action_latency().await;
        self.action_failure()?;
        let mut containers = self.containers.lock().unwrap();
        let id = containers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let mut created = container(id, &draft.name, draft.type_, ContainerStatus::Created);
        created.tenant_id = draft.tenant_id;
        created.purpose = draft.purpose;
        containers.push(created.clone());
        Ok(created)
    }

    async fn update_container(
        &self,
        id: i64,
        update: &ContainerUpdate,
    ) -> Result<ContainerPayload, ServiceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.action_latency().await;
        self.action_failure()?;
        if self.reject_updates.lock().unwrap().contains(&id) {
            return Err(ServiceError::Status {
                status: 422,
                message: format!("container {} is locked", id),
            });
        }
        let mut containers = self.containers.lock().unwrap();
        let target = containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::Status {
                status: 404,
                message: "not found".into(),
            })?;
        if let Some(name) = &update.name {
            target.name = name.clone();
        }
        if let Some(status) = update.status {
            target.status = status;
        }
        Ok(target.clone())
    }

    async fn delete_container(&self, id: i64) -> Result<(), ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.action_latency().await;
        self.action_failure()?;
        self.containers.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn shutdown_container(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<(), ServiceError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.action_latency().await;
        self.action_failure()?;
        self.shutdown_reasons
            .lock()
            .unwrap()
            .push(reason.map(str::to_string));
        if let Some(c) = self.containers.lock().unwrap().iter_mut().find(|c| c.id == id) {
            c.status = ContainerStatus::Inactive;
        }
        Ok(())
    }

    async fn get_dashboard_metrics(
        &self,
        time_range: &TimeRange,
        container_type: Option<ContainerType>,
    ) -> Result<PerformancePayload, ServiceError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metrics.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 503,
                message: "metrics unavailable".into(),
            });
        }
        let (physical, virtual_) = match container_type {
            Some(ContainerType::Physical) => (5, 0),
            Some(ContainerType::Virtual) => (0, 3),
            None => (5, 3),
        };
        Ok(performance(physical, virtual_, time_range.clone()))
    }

    async fn get_filter_options(&self) -> Result<FilterOptions, ServiceError> {
        self.filter_options_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_filter_options.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("timed out".into()));
        }
        Ok(filter_options())
    }
}
