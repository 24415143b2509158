// Render-ready projection of the dashboard, pushed to subscribers on every change

use std::collections::BTreeMap;

use serde::Serialize;

use super::ui::UiState;
use crate::models::{
    ContainerDomainModel, ContainerStatus, ContainerTypeFilter, DashboardDomainModel, ErrorState,
    FilterOptions, FilterState, LoadingState, PaginationDomainModel,
    PerformanceMetricsDomainModel, TimeRange,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_containers: usize,
    pub active_containers: usize,
    pub containers_with_alerts: usize,
    pub critical_alerts: usize,
    pub average_yield: f64,
    pub average_space_utilization: f64,
    pub status_summary: BTreeMap<ContainerStatus, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceView {
    pub metrics: PerformanceMetricsDomainModel,
    pub total_containers: u32,
    pub physical_ratio: f64,
    pub virtual_ratio: f64,
    pub total_yield: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationView {
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub start_item: u64,
    pub end_item: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl From<&PaginationDomainModel> for PaginationView {
    fn from(p: &PaginationDomainModel) -> Self {
        Self {
            current_page: p.current_page(),
            page_size: p.page_size(),
            total_items: p.total_items(),
            total_pages: p.total_pages(),
            start_item: p.start_item(),
            end_item: p.end_item(),
            has_next_page: p.has_next_page(),
            has_previous_page: p.has_previous_page(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewData {
    pub containers: Vec<ContainerDomainModel>,
    pub stats: DashboardStats,
    pub performance: Option<PerformanceView>,
    pub pagination: PaginationView,
    pub filters: FilterState,
    pub filter_options: FilterOptions,
    pub active_filters_count: usize,
    pub selected_container_type: ContainerTypeFilter,
    pub selected_time_range: TimeRange,
    pub loading: LoadingState,
    pub errors: ErrorState,
    pub ui: UiState,
    pub can_refresh: bool,
}

impl ViewData {
    pub fn build(model: &DashboardDomainModel, ui: &UiState) -> Self {
        let state = model.state();
        Self {
            containers: model.get_filtered_containers(),
            stats: DashboardStats {
                total_containers: model.total_containers_count(),
                active_containers: model.active_containers_count(),
                containers_with_alerts: model.containers_with_alerts_count(),
                critical_alerts: model.critical_alerts_count(),
                average_yield: model.average_yield(),
                average_space_utilization: model.average_space_utilization(),
                status_summary: model.status_summary(),
            },
            performance: model.performance().map(|p| PerformanceView {
                metrics: p.clone(),
                total_containers: p.total_containers(),
                physical_ratio: p.physical_ratio(),
                virtual_ratio: p.virtual_ratio(),
                total_yield: p.total_yield(),
            }),
            pagination: PaginationView::from(model.pagination()),
            filters: model.filters().state().clone(),
            filter_options: model.filters().options().clone(),
            active_filters_count: model.filters().active_filters_count(),
            selected_container_type: state.selected_container_type,
            selected_time_range: state.selected_time_range.clone(),
            loading: state.loading,
            errors: state.errors.clone(),
            ui: ui.clone(),
            can_refresh: model.can_refresh_data() && !ui.actions.any(),
        }
    }
}
